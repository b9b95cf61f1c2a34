use super::source::AnimSource;
use crate::Regions;
use std::sync::Arc;

/// How many more times a state wraps from its loop stop back to its loop start.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Loops {
    Count(usize),
    Forever,
}

impl Loops {
    /// Play through once without wrapping.
    pub const ONCE: Loops = Loops::Count(0);

    pub fn remaining(self) -> bool {
        !matches!(self, Loops::Count(0))
    }

    fn consume(&mut self) {
        if let Loops::Count(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

impl From<usize> for Loops {
    /// `0` loops forever; any other count wraps that many times.
    fn from(count: usize) -> Self {
        match count {
            0 => Loops::Forever,
            n => Loops::Count(n),
        }
    }
}

/// Per-group playback cursor over a shared source.
#[derive(Clone, Debug)]
pub struct PlaybackState {
    pub(crate) source: Arc<AnimSource>,
    pub(crate) start_time: f32,
    pub(crate) loop_start_time: f32,
    pub(crate) loop_stop_time: f32,
    pub(crate) stop_time: f32,

    pub(crate) time: f32,
    pub(crate) speed_mult: f32,

    pub(crate) playing: bool,
    pub(crate) loops: Loops,

    pub(crate) priority: i32,
    pub(crate) regions: Regions,
    pub(crate) auto_disable: bool,
}

impl PlaybackState {
    pub fn source(&self) -> &Arc<AnimSource> {
        &self.source
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    pub fn loop_start_time(&self) -> f32 {
        self.loop_start_time
    }

    pub fn loop_stop_time(&self) -> f32 {
        self.loop_stop_time
    }

    pub fn stop_time(&self) -> f32 {
        self.stop_time
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn speed_mult(&self) -> f32 {
        self.speed_mult
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn loops(&self) -> Loops {
        self.loops
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn regions(&self) -> Regions {
        self.regions
    }

    pub fn auto_disable(&self) -> bool {
        self.auto_disable
    }

    /// Normalized position between the start and stop markers.
    pub fn complete(&self) -> f32 {
        // `play` guarantees stop_time > start_time.
        (self.time - self.start_time) / (self.stop_time - self.start_time)
    }

    /// Wraps forward playback from the loop stop to the loop start, if loops remain.
    pub(crate) fn wrap_forward(&mut self) -> bool {
        if self.time < self.loop_stop_time || !self.loops.remaining() {
            return false;
        }
        self.loops.consume();
        self.time = self.loop_start_time;
        self.playing = true;
        true
    }

    /// Consumes whole loops that `remaining` seconds would replay beyond two more passes.
    /// Returns how many loops were skipped and the time left over.
    pub(crate) fn skip_loops(&mut self, remaining: f32) -> (usize, f32) {
        let length = self.loop_stop_time - self.loop_start_time;
        if length <= 0.0 || remaining < 2.0 * length {
            return (0, remaining);
        }
        let whole = (remaining / length).floor() - 1.0;
        match self.loops {
            Loops::Forever => (whole as usize, remaining.rem_euclid(length) + length),
            Loops::Count(n) => {
                let skipped = (whole as usize).min(n.saturating_sub(1));
                self.loops = Loops::Count(n - skipped);
                (skipped, remaining - skipped as f32 * length)
            }
        }
    }

    /// Wraps reverse playback from the loop start to the loop stop, if loops remain.
    pub(crate) fn wrap_reverse(&mut self) -> bool {
        if self.time > self.loop_start_time || !self.loops.remaining() {
            return false;
        }
        self.loops.consume();
        self.time = self.loop_stop_time;
        self.playing = true;
        true
    }
}

/// Active states keyed by group name, iterated in insertion order.
///
/// Iteration order breaks priority ties during region resolution, so replacing a group's state
/// moves it to the back.
#[derive(Clone, Debug, Default)]
pub struct StateTable {
    entries: Vec<(String, PlaybackState)>,
}

impl StateTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, group: &str) -> Option<&PlaybackState> {
        self.entries
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, state)| state)
    }

    pub(crate) fn get_mut(&mut self, group: &str) -> Option<&mut PlaybackState> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == group)
            .map(|(_, state)| state)
    }

    /// Inserts `state` as the most recent entry, replacing any state for `group`.
    pub(crate) fn insert(&mut self, group: &str, state: PlaybackState) {
        self.remove(group);
        self.entries.push((group.to_string(), state));
    }

    pub(crate) fn remove(&mut self, group: &str) -> Option<PlaybackState> {
        let index = self.entries.iter().position(|(name, _)| name == group)?;
        Some(self.entries.remove(index).1)
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> (String, PlaybackState) {
        self.entries.remove(index)
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> (&str, &mut PlaybackState) {
        let (name, state) = &mut self.entries[index];
        (name.as_str(), state)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlaybackState)> {
        self.entries
            .iter()
            .map(|(name, state)| (name.as_str(), state))
    }
}
