use super::attachments::{AttachmentTable, NodeHandle, ObjectId, TagPoint};
use super::config::AnimationConfig;
use super::hooks::ActorHooks;
use super::markers::{QueuedEvent, handle_text_key};
use super::resolver::{RegionBinding, resolve_regions};
use super::root_motion::{accumulated_displacement, accumulated_offset, calc_anim_velocity};
use super::skeleton::{Bone, Skeleton};
use super::source::{AnimSource, SourceLoader, keyframe_path};
use super::state::{Loops, PlaybackState, StateTable};
use crate::model::group_suffix;
use crate::{Error, NUM_REGIONS, NodeTrack, Region, Regions, SkeletonData, SourceData, TextKeyMap};
use glam::Vec3;
use std::collections::VecDeque;
use std::sync::Arc;

/// Result of [`Animation::info`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaybackInfo {
    /// 0 at the start marker, 1 at the stop marker.
    pub complete: f32,
    pub speed_mult: f32,
}

/// Resolved marker interval for a `play` request.
#[derive(Copy, Clone, Debug)]
struct Interval {
    start: f32,
    loop_start: f32,
    loop_stop: f32,
    stop: f32,
}

enum IntervalLookup {
    Found(Interval),
    Empty,
    Missing,
}

fn qualified_label(group: &str, name: &str) -> String {
    if group_suffix(name, group).is_some() {
        name.to_string()
    } else {
        format!("{group}: {name}")
    }
}

fn find_interval(keys: &TextKeyMap, group: &str, start: &str, stop: &str) -> IntervalLookup {
    let Some(group_start) = keys.find_group_start(group) else {
        return IntervalLookup::Missing;
    };

    let start_tag = qualified_label(group, start);
    let mut start_key = keys.find_label_from(group_start, &start_tag);
    if start_key.is_none() && group_suffix(&start_tag, group) == Some("loop start") {
        start_key = keys.find_label_from(group_start, &format!("{group}: start"));
    }
    let stop_key = keys.find_label_from(group_start, &qualified_label(group, stop));

    let (Some(start_key), Some(stop_key)) = (start_key, stop_key) else {
        return IntervalLookup::Missing;
    };
    let start = keys.keys()[start_key].time;
    let stop = keys.keys()[stop_key].time;
    if stop <= start {
        return IntervalLookup::Empty;
    }

    let inside = &keys.keys()[keys.lower_bound(start)..keys.upper_bound(stop)];
    let find_inside = |suffix: &str| {
        inside
            .iter()
            .find(|k| group_suffix(&k.label, group) == Some(suffix))
            .map(|k| k.time)
    };
    let (loop_start, loop_stop) = match (find_inside("loop start"), find_inside("loop stop")) {
        (Some(loop_start), Some(loop_stop)) if loop_stop > loop_start => (loop_start, loop_stop),
        (Some(loop_start), None) if loop_start < stop => (loop_start, stop),
        (None, Some(loop_stop)) if loop_stop > start => (start, loop_stop),
        _ => (start, stop),
    };

    IntervalLookup::Found(Interval {
        start,
        loop_start,
        loop_stop,
        stop,
    })
}

/// Root motion sampled while a state advances.
struct RootMotion<'a> {
    track: &'a NodeTrack,
    accumulation: Vec3,
}

fn move_to(
    state: &mut PlaybackState,
    new_time: f32,
    root_motion: Option<&RootMotion<'_>>,
    movement: &mut Vec3,
) {
    if let Some(root) = root_motion {
        *movement += accumulated_displacement(root.track, state.time, new_time, root.accumulation);
    }
    state.time = new_time;
}

/// Skips whole loops right after a wrap and adds their root motion. Returns the time left.
fn skip_whole_loops(
    state: &mut PlaybackState,
    remaining: f32,
    forward: bool,
    root_motion: Option<&RootMotion<'_>>,
    movement: &mut Vec3,
) -> f32 {
    let (loops, remaining) = state.skip_loops(remaining);
    if loops > 0 {
        if let Some(root) = root_motion {
            let per_loop = accumulated_displacement(
                root.track,
                state.loop_start_time,
                state.loop_stop_time,
                root.accumulation,
            );
            let per_loop = if forward { per_loop } else { -per_loop };
            *movement += per_loop * loops as f32;
        }
    }
    remaining
}

/// Advances one state by `duration` seconds of wall time, stepping marker by marker so loop
/// markers take effect as soon as they are crossed.
///
/// A single tick replays at most two passes over the loop; whole loops beyond that are skipped
/// without dispatching their markers.
fn advance_state(
    state: &mut PlaybackState,
    group: &str,
    duration: f32,
    root_motion: Option<&RootMotion<'_>>,
    movement: &mut Vec3,
    notify: bool,
    queue: &mut VecDeque<QueuedEvent>,
) {
    let source = Arc::clone(&state.source);
    let keys = &source.text_keys;
    let step = duration * state.speed_mult;
    if !step.is_finite() {
        return;
    }

    if step >= 0.0 {
        let mut remaining = step;
        let mut key = keys.upper_bound(state.time);
        while state.playing {
            let old = state.time;
            let mut new_time = (old + remaining).min(state.stop_time);
            if let Some(next) = keys.get(key) {
                new_time = new_time.min(next.time);
            }
            move_to(state, new_time, root_motion, movement);
            remaining = (remaining - (state.time - old)).max(0.0);
            state.playing = state.time < state.stop_time;

            while let Some(k) = keys.get(key) {
                if k.time > state.time {
                    break;
                }
                handle_text_key(state, group, k, notify, queue);
                key += 1;
            }

            if state.wrap_forward() {
                if state.time >= state.loop_stop_time {
                    break;
                }
                remaining = skip_whole_loops(state, remaining, true, root_motion, movement);
                key = keys.lower_bound(state.time);
                while let Some(k) = keys.get(key) {
                    if k.time > state.time {
                        break;
                    }
                    handle_text_key(state, group, k, notify, queue);
                    key += 1;
                }
            } else if state.time == old {
                break;
            }

            if remaining <= 0.0 {
                break;
            }
        }
    } else {
        let mut remaining = -step;
        // Keys still ahead of a reverse cursor are those below `key`.
        let mut key = keys.lower_bound(state.time);
        while state.playing {
            let old = state.time;
            let mut new_time = (old - remaining).max(state.start_time);
            if key > 0 {
                new_time = new_time.max(keys.keys()[key - 1].time);
            }
            move_to(state, new_time, root_motion, movement);
            remaining = (remaining - (old - state.time)).max(0.0);
            state.playing = state.time > state.start_time;

            while key > 0 && keys.keys()[key - 1].time >= state.time {
                handle_text_key(state, group, &keys.keys()[key - 1], notify, queue);
                key -= 1;
            }

            if state.wrap_reverse() {
                if state.time <= state.loop_start_time {
                    break;
                }
                remaining = skip_whole_loops(state, remaining, false, root_motion, movement);
                key = keys.upper_bound(state.time);
                while key > 0 && keys.keys()[key - 1].time >= state.time {
                    handle_text_key(state, group, &keys.keys()[key - 1], notify, queue);
                    key -= 1;
                }
            } else if state.time == old {
                break;
            }

            if remaining <= 0.0 {
                break;
            }
        }
    }
}

/// Per-actor playback engine.
///
/// Owns the skeleton root, the ordered list of animation sources, the table of playing
/// states and the bone attachments. Everything is driven from one thread through
/// [`Animation::run_animation`] once per frame.
///
/// Replacing the skeleton root with [`Animation::set_object_root`] invalidates every
/// [`NodeHandle`] and [`TagPoint`] handed out before. Resolving one afterwards panics.
pub struct Animation {
    config: AnimationConfig,
    skeleton: Option<Skeleton>,
    root_generation: u32,
    sources: Vec<Arc<AnimSource>>,
    states: StateTable,
    bindings: [RegionBinding; NUM_REGIONS],
    attachments: AttachmentTable,
    hooks: Option<Box<dyn ActorHooks>>,
    event_queue: VecDeque<QueuedEvent>,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("config", &self.config)
            .field("root_generation", &self.root_generation)
            .field("sources", &self.sources.len())
            .field("states", &self.states)
            .field("bindings", &self.bindings)
            .field("attachments", &self.attachments)
            .finish()
    }
}

impl Animation {
    pub fn new(mut config: AnimationConfig) -> Self {
        config.accumulation = config.accumulation.clamp(Vec3::ZERO, Vec3::ONE);
        Self {
            config,
            skeleton: None,
            root_generation: 0,
            sources: Vec::new(),
            states: StateTable::default(),
            bindings: Default::default(),
            attachments: AttachmentTable::default(),
            hooks: None,
            event_queue: VecDeque::new(),
        }
    }

    pub fn set_hooks<H: ActorHooks + 'static>(&mut self, hooks: H) {
        self.hooks = Some(Box::new(hooks));
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Sets which axes of root motion move the actor; each component is clamped to `[0, 1]`.
    pub fn set_accumulation(&mut self, accumulation: Vec3) {
        self.config.accumulation = accumulation.clamp(Vec3::ZERO, Vec3::ONE);
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    /// Number of times the skeleton root has been replaced.
    pub fn root_generation(&self) -> u32 {
        self.root_generation
    }

    /// Replaces the skeleton root.
    ///
    /// Sources must be cleared first; any still loaded are cleared here. Attachments are
    /// dropped and all previously returned handles become invalid. Sources must be added
    /// again before the next [`Animation::run_animation`].
    pub fn set_object_root(&mut self, data: Arc<SkeletonData>) {
        if !self.sources.is_empty() {
            log::warn!(
                "skeleton root replaced with {} animation source(s) still loaded",
                self.sources.len()
            );
            self.clear_anim_sources();
        }
        self.attachments.invalidate_all();
        self.root_generation = self.root_generation.wrapping_add(1);
        self.skeleton = Some(Skeleton::new(data));
        log::debug!("skeleton root replaced (generation {})", self.root_generation);
    }

    /// Loads the keyframe file belonging to `model` and appends it as a source.
    ///
    /// A model without keyframes, or whose keyframes carry no markers, adds nothing.
    pub fn add_anim_source(&mut self, model: &str, loader: &dyn SourceLoader) -> Result<(), Error> {
        if self.skeleton.is_none() {
            return Err(Error::NoSkeleton);
        }
        let path = keyframe_path(model);
        match loader.load(&path)? {
            Some(data) => self.add_source_data(&path, data),
            None => {
                log::debug!("model '{model}' has no keyframes at '{path}'");
                Ok(())
            }
        }
    }

    /// Appends already loaded source data, binding its tracks to the current skeleton.
    pub fn add_source_data(&mut self, path: &str, data: SourceData) -> Result<(), Error> {
        let skeleton = self.skeleton.as_ref().ok_or(Error::NoSkeleton)?;
        if data.text_keys.is_empty() {
            log::warn!("animation source '{path}' has no text keys; ignoring it");
            return Ok(());
        }
        let source = AnimSource::bind(path, data, skeleton);
        log::debug!(
            "added animation source '{path}' ({} text keys)",
            source.text_keys.len()
        );
        self.sources.push(Arc::new(source));
        Ok(())
    }

    /// Drops every source together with the states playing from them.
    pub fn clear_anim_sources(&mut self) {
        self.states.clear();
        self.sources.clear();
        self.reset_active_groups();
        if let Some(skeleton) = self.skeleton.as_mut() {
            skeleton.set_to_setup_pose();
            skeleton.update_world_transform();
        }
        log::debug!("animation sources cleared");
    }

    pub fn sources(&self) -> &[Arc<AnimSource>] {
        &self.sources
    }

    pub fn has_animation(&self, group: &str) -> bool {
        let start = format!("{group}: start");
        self.sources
            .iter()
            .any(|source| source.text_keys.keys().iter().any(|k| k.label == start))
    }

    /// Whether a playing state has exactly this priority.
    pub fn is_priority_active(&self, priority: i32) -> bool {
        self.states
            .iter()
            .any(|(_, state)| state.playing && state.priority == priority)
    }

    /// Plays `group` on `regions` from marker `start` to marker `stop`.
    ///
    /// Sources are searched most recently added first; the first source holding both markers
    /// decides. `start_point` is where to begin between the two markers (0 = start,
    /// 1 = stop). Marker names may be bare (`"start"`) or qualified (`"attack: start"`).
    /// On error any existing state for `group` is left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn play(
        &mut self,
        group: &str,
        priority: i32,
        regions: Regions,
        auto_disable: bool,
        speed_mult: f32,
        start: &str,
        stop: &str,
        start_point: f32,
        loops: Loops,
    ) -> Result<(), Error> {
        if regions.is_empty() {
            return Err(Error::InvalidValue {
                message: format!("group '{group}' must target at least one bone region"),
            });
        }
        if !speed_mult.is_finite() || !start_point.is_finite() {
            return Err(Error::InvalidValue {
                message: format!("group '{group}' needs a finite speed and start point"),
            });
        }

        let mut found = None;
        for source in self.sources.iter().rev() {
            match find_interval(&source.text_keys, group, start, stop) {
                IntervalLookup::Found(interval) => {
                    found = Some((Arc::clone(source), interval));
                    break;
                }
                IntervalLookup::Empty => {
                    return Err(Error::EmptyInterval {
                        group: group.to_string(),
                        start: start.to_string(),
                        stop: stop.to_string(),
                    });
                }
                IntervalLookup::Missing => {}
            }
        }
        let Some((source, interval)) = found else {
            log::warn!("failed to find animation '{group}' ({start} -> {stop})");
            return Err(Error::MarkersNotFound {
                group: group.to_string(),
                start: start.to_string(),
                stop: stop.to_string(),
            });
        };

        let start_point = start_point.clamp(0.0, 1.0);
        let time = interval.start + (interval.stop - interval.start) * start_point;
        let state = PlaybackState {
            source: Arc::clone(&source),
            start_time: interval.start,
            loop_start_time: interval.loop_start,
            loop_stop_time: interval.loop_stop,
            stop_time: interval.stop,
            time,
            speed_mult,
            playing: true,
            loops,
            priority,
            regions,
            auto_disable,
        };
        self.states.insert(group, state);
        self.reset_active_groups();

        let notify = self.should_notify(group);
        if let Some(state) = self.states.get_mut(group) {
            let keys = &source.text_keys;
            for key in &keys.keys()[keys.lower_bound(time)..keys.upper_bound(time)] {
                handle_text_key(state, group, key, notify, &mut self.event_queue);
            }
            // A cursor parked on its loop boundary wraps on the next tick.
            state.playing = state.loops.remaining()
                || if speed_mult >= 0.0 {
                    state.time < state.stop_time
                } else {
                    state.time > state.start_time
                };
        }
        self.drain_event_queue();
        Ok(())
    }

    /// Removes the state for `group`. Returns whether one existed.
    pub fn disable(&mut self, group: &str) -> bool {
        let removed = self.states.remove(group).is_some();
        if removed {
            self.reset_active_groups();
        }
        removed
    }

    pub fn is_playing(&self, group: &str) -> bool {
        self.states.get(group).is_some_and(|state| state.playing)
    }

    /// Completion and speed of an active group, `None` if the group has no state.
    pub fn info(&self, group: &str) -> Option<PlaybackInfo> {
        let state = self.states.get(group)?;
        Some(PlaybackInfo {
            complete: state.complete(),
            speed_mult: state.speed_mult,
        })
    }

    pub fn state(&self, group: &str) -> Option<&PlaybackState> {
        self.states.get(group)
    }

    pub fn states(&self) -> &StateTable {
        &self.states
    }

    pub fn region_binding(&self, region: Region) -> &RegionBinding {
        &self.bindings[region.index()]
    }

    pub fn active_group(&self, region: Region) -> Option<&str> {
        self.bindings[region.index()].group()
    }

    /// Time the region's pose is evaluated at; zero for an unbound region.
    pub fn region_time(&self, region: Region) -> f32 {
        self.active_group(region)
            .and_then(|group| self.states.get(group))
            .map_or(0.0, |state| state.time)
    }

    /// Speed in units per second at which `group` moves the actor.
    ///
    /// Uses the most recently added source that has the group; older sources are consulted
    /// while no movement has been found.
    pub fn velocity(&self, group: &str) -> f32 {
        let Some(non_accum) = self.non_accum_root() else {
            return 0.0;
        };
        let accumulation = self.config.accumulation;
        let candidates = self
            .sources
            .iter()
            .rev()
            .skip_while(|source| source.text_keys.find_group_start(group).is_none());

        let mut velocity = 0.0;
        for source in candidates {
            if let Some(ctrl) = source.controller_for(Region::LowerBody, non_accum) {
                velocity = calc_anim_velocity(&source.text_keys, &ctrl.track, accumulation, group);
            }
            if velocity > 0.0 {
                break;
            }
        }
        velocity
    }

    /// Advances every state by `duration` seconds, applies the resolved pose and returns the
    /// root-motion displacement for this tick.
    ///
    /// A non-finite `duration` is treated as zero.
    pub fn run_animation(&mut self, duration: f32) -> Vec3 {
        let duration = if duration.is_finite() {
            duration
        } else {
            log::warn!("ignoring non-finite animation step {duration}");
            0.0
        };
        let mut movement = Vec3::ZERO;
        self.reset_active_groups();

        let non_accum = self.non_accum_root();
        let accumulation = self.config.accumulation;
        let lower_body = self.bindings[Region::LowerBody.index()]
            .group()
            .map(str::to_string);

        let mut changed = false;
        let mut index = 0;
        while index < self.states.len() {
            let (group, state) = self.states.entry_mut(index);
            let notify = self.config.dispatch_inactive_markers
                || self.bindings.iter().any(|b| b.group() == Some(group));

            let source = Arc::clone(&state.source);
            let root_motion = match non_accum {
                Some(bone)
                    if lower_body.as_deref() == Some(group) && accumulation != Vec3::ZERO =>
                {
                    source
                        .controller_for(Region::LowerBody, bone)
                        .map(|ctrl| RootMotion {
                            track: &ctrl.track,
                            accumulation,
                        })
                }
                _ => None,
            };

            advance_state(
                state,
                group,
                duration,
                root_motion.as_ref(),
                &mut movement,
                notify,
                &mut self.event_queue,
            );

            if !state.playing && state.auto_disable {
                let (group, _) = self.states.remove_at(index);
                log::debug!("animation group '{group}' finished; disabled");
                changed = true;
            } else {
                index += 1;
            }
        }
        if changed {
            self.reset_active_groups();
        }

        self.drain_event_queue();
        self.apply_pose();

        if let (Some(hooks), Some(skeleton)) = (self.hooks.as_mut(), self.skeleton.as_mut()) {
            hooks.on_pose_resolved(skeleton);
        }
        match self.hooks.as_mut() {
            Some(hooks) => hooks.adjust_movement(movement),
            None => movement,
        }
    }

    /// Handle to the named bone of the current skeleton root.
    pub fn node(&self, name: &str) -> Option<NodeHandle> {
        let bone = self.skeleton.as_ref()?.find_bone(name)?;
        Some(NodeHandle {
            bone,
            generation: self.root_generation,
        })
    }

    /// The bone behind `handle`.
    ///
    /// # Panics
    ///
    /// If the skeleton root was replaced after `handle` was created.
    pub fn bone(&self, handle: NodeHandle) -> &Bone {
        assert_eq!(
            handle.generation, self.root_generation,
            "stale node handle from skeleton root generation {} (current {})",
            handle.generation, self.root_generation
        );
        match self.skeleton.as_ref() {
            Some(skeleton) => &skeleton.bones[handle.bone],
            None => panic!("node handle resolved without a skeleton root"),
        }
    }

    /// Attaches `object` to `bone_name`; `None` if the skeleton has no such bone.
    ///
    /// The returned tag point is valid until the next [`Animation::set_object_root`].
    pub fn attach_object_to_bone(&mut self, bone_name: &str, object: ObjectId) -> Option<TagPoint> {
        let Some(node) = self.node(bone_name) else {
            log::warn!("cannot attach object {object:?}: no bone named '{bone_name}'");
            return None;
        };
        let tag = TagPoint { node };
        self.attachments.attach(object, bone_name, tag);
        Some(tag)
    }

    pub fn detach_object_from_bone(&mut self, object: ObjectId) {
        self.attachments.detach(object);
    }

    pub fn attached_bone(&self, object: ObjectId) -> Option<&str> {
        self.attachments.bone_name(object)
    }

    pub fn attachments(&self) -> &AttachmentTable {
        &self.attachments
    }

    fn non_accum_root(&self) -> Option<usize> {
        self.skeleton
            .as_ref()?
            .find_bone(&self.config.non_accum_root)
    }

    fn should_notify(&self, group: &str) -> bool {
        self.config.dispatch_inactive_markers
            || self.bindings.iter().any(|b| b.group() == Some(group))
    }

    fn reset_active_groups(&mut self) {
        self.bindings = resolve_regions(&self.states);
    }

    fn apply_pose(&mut self) {
        let Some(skeleton) = self.skeleton.as_mut() else {
            return;
        };
        for region in Region::ALL {
            skeleton.reset_region(region);
            let Some(state) = self.bindings[region.index()]
                .group()
                .and_then(|group| self.states.get(group))
            else {
                continue;
            };
            for ctrl in state.source.controllers(region) {
                let bone = &mut skeleton.bones[ctrl.bone];
                if let Some(translation) = ctrl.track.translation_at(state.time) {
                    bone.translation = translation;
                }
                if let Some(rotation) = ctrl.track.rotation_at(state.time) {
                    bone.rotation = rotation;
                }
                if let Some(scale) = ctrl.track.scale_at(state.time) {
                    bone.scale = scale;
                }
            }
        }

        // The accumulation root moves back by what the actor moves, so the mesh stays put.
        let non_accum = skeleton.find_bone(&self.config.non_accum_root);
        if let Some(accum_root) = non_accum.and_then(|bone| skeleton.bones[bone].parent_index()) {
            let offset = non_accum
                .zip(
                    self.bindings[Region::LowerBody.index()]
                        .group()
                        .and_then(|group| self.states.get(group)),
                )
                .and_then(|(bone, state)| {
                    state
                        .source
                        .controller_for(Region::LowerBody, bone)
                        .map(|ctrl| {
                            accumulated_offset(&ctrl.track, state.time, self.config.accumulation)
                        })
                })
                .unwrap_or(Vec3::ZERO);
            skeleton.bones[accum_root].translation =
                skeleton.rest_translation(accum_root) - offset;
        }

        skeleton.update_world_transform();
    }

    fn drain_event_queue(&mut self) {
        let Some(hooks) = self.hooks.as_mut() else {
            self.event_queue.clear();
            return;
        };
        while let Some(event) = self.event_queue.pop_front() {
            match event {
                QueuedEvent::Marker(marker) => hooks.on_marker(&marker),
                QueuedEvent::ShowWeapons(show) => hooks.show_weapons(show),
            }
        }
    }
}
