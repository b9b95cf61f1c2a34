//! Per-actor skeletal animation playback.
//!
//! Several named groups play at once, each on a set of bone regions; the highest priority
//! group drives each region. Root motion of the clip is split from the in-place pose and
//! returned as a per-frame displacement, and text-key markers crossed during playback are
//! reported to the actor.
//!
//! Loading keyframe files is left to a [`SourceLoader`]; the `json` feature provides one for
//! a simple JSON source format.

#![forbid(unsafe_code)]

mod error;
mod model;
mod region;
mod runtime;

#[cfg(feature = "json")]
pub mod json;

pub use error::*;
pub use model::*;
pub use region::*;
pub use runtime::*;

#[cfg(all(test, feature = "json"))]
mod json_source_tests;
