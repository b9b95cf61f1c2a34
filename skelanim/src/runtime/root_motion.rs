use crate::{NodeTrack, TextKeyMap};
use glam::Vec3;

/// Accumulated displacement of the non-accumulating root between two times.
///
/// Each axis of `accumulation` is the share of the node's motion turned into world movement.
pub fn accumulated_displacement(
    track: &NodeTrack,
    old_time: f32,
    new_time: f32,
    accumulation: Vec3,
) -> Vec3 {
    accumulated_offset(track, new_time, accumulation)
        - accumulated_offset(track, old_time, accumulation)
}

/// The accumulated part of the node's translation at `time`.
pub fn accumulated_offset(track: &NodeTrack, time: f32, accumulation: Vec3) -> Vec3 {
    track.translation_at(time).unwrap_or(Vec3::ZERO) * accumulation
}

/// Distance per second covered by `group` between its loop (or start/stop) markers.
pub fn calc_anim_velocity(
    keys: &TextKeyMap,
    track: &NodeTrack,
    accumulation: Vec3,
    group: &str,
) -> f32 {
    let start = format!("{group}: start");
    let loop_start = format!("{group}: loop start");
    let loop_stop = format!("{group}: loop stop");
    let stop = format!("{group}: stop");

    // Searching backwards picks the last loop markers; some sources repeat them.
    let start_time = keys
        .keys()
        .iter()
        .rev()
        .find(|k| k.label == start || k.label == loop_start)
        .map(|k| k.time);

    let mut stop_time = None;
    for key in keys.keys().iter().rev() {
        if key.label == loop_stop {
            stop_time = Some(key.time);
            break;
        }
        if key.label == stop {
            stop_time = Some(key.time);
        }
    }

    match (start_time, stop_time) {
        (Some(start_time), Some(stop_time)) if stop_time > start_time => {
            let start_pos = accumulated_offset(track, start_time, accumulation);
            let stop_pos = accumulated_offset(track, stop_time, accumulation);
            start_pos.distance(stop_pos) / (stop_time - start_time)
        }
        _ => 0.0,
    }
}
