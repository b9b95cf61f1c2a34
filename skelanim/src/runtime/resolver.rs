use super::state::StateTable;
use crate::{NUM_REGIONS, Region};

/// What drives a discrete region's pose.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RegionBinding {
    /// Rest pose, time fixed at zero, no displacement.
    #[default]
    Neutral,
    /// The state of this group.
    State(String),
}

impl RegionBinding {
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Neutral => None,
            Self::State(group) => Some(group.as_str()),
        }
    }
}

/// Picks the state driving each discrete region.
///
/// The winner is the highest-priority state claiming the region. States are visited in
/// insertion order and an equal priority replaces the current pick, so the most recently
/// inserted state wins ties.
pub fn resolve_regions(states: &StateTable) -> [RegionBinding; NUM_REGIONS] {
    let mut bindings: [RegionBinding; NUM_REGIONS] = Default::default();
    for region in Region::ALL {
        let mut active: Option<(&str, i32)> = None;
        for (group, state) in states.iter() {
            if !state.regions().contains(region.mask()) {
                continue;
            }
            if active.is_none_or(|(_, priority)| state.priority() >= priority) {
                active = Some((group, state.priority()));
            }
        }
        if let Some((group, _)) = active {
            bindings[region.index()] = RegionBinding::State(group.to_string());
        }
    }
    bindings
}
