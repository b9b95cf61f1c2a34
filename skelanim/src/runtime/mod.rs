mod animation;
mod attachments;
mod config;
mod hooks;
mod markers;
mod resolver;
mod root_motion;
mod skeleton;
mod source;
mod state;

pub use animation::*;
pub use attachments::*;
pub use config::*;
pub use hooks::*;
pub use markers::{MarkerEvent, TextKeyKind};
pub use resolver::*;
pub use root_motion::*;
pub use skeleton::*;
pub use source::*;
pub use state::*;

#[cfg(test)]
mod test_support;




#[cfg(test)]
mod root_motion_tests;
