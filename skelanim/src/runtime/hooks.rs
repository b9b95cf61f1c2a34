use super::markers::MarkerEvent;
use super::skeleton::Skeleton;
use glam::Vec3;

/// Extension points for actor-specific behaviour layered on the playback engine.
///
/// Every method has a no-op default so an actor implements only what it needs.
pub trait ActorHooks {
    /// A marker was crossed by a state that drives at least one region.
    fn on_marker(&mut self, _event: &MarkerEvent) {}

    /// An `equip attach` (`true`) or `unequip detach` (`false`) marker was crossed.
    fn show_weapons(&mut self, _show: bool) {}

    /// Called after the resolved pose has been written to the skeleton.
    fn on_pose_resolved(&mut self, _skeleton: &mut Skeleton) {}

    /// Called with this tick's root-motion displacement before it is returned.
    fn adjust_movement(&mut self, movement: Vec3) -> Vec3 {
        movement
    }
}
