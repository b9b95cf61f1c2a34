use super::state::PlaybackState;
use crate::TextKey;
use crate::model::group_suffix;
use std::collections::VecDeque;

/// What a marker label asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextKeyKind {
    /// `"sound: <id>"`
    Sound(String),
    /// `"soundgen: <kind>"`, a sound chosen by the actor (footsteps, moans).
    SoundGen(String),
    /// `"<group>: <suffix>"` for the group that crossed it.
    Group(String),
    Other,
}

impl TextKeyKind {
    pub fn classify(label: &str, group: &str) -> Self {
        if let Some(id) = label.strip_prefix("sound: ") {
            return Self::Sound(id.to_string());
        }
        if let Some(kind) = label.strip_prefix("soundgen: ") {
            return Self::SoundGen(kind.to_string());
        }
        match group_suffix(label, group) {
            Some(suffix) => Self::Group(suffix.to_string()),
            None => Self::Other,
        }
    }
}

/// A marker crossed by a playing group.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerEvent {
    pub group: String,
    pub time: f32,
    pub label: String,
    pub kind: TextKeyKind,
}

#[derive(Clone, Debug)]
pub(crate) enum QueuedEvent {
    Marker(MarkerEvent),
    ShowWeapons(bool),
}

/// Applies the engine side of a crossed marker and queues the notifications it raises.
///
/// Loop markers move the state's loop bounds even when `notify` is off.
pub(crate) fn handle_text_key(
    state: &mut PlaybackState,
    group: &str,
    key: &TextKey,
    notify: bool,
    queue: &mut VecDeque<QueuedEvent>,
) {
    let kind = TextKeyKind::classify(&key.label, group);
    if let TextKeyKind::Group(suffix) = &kind {
        match suffix.as_str() {
            "loop start" => state.loop_start_time = key.time,
            "loop stop" => state.loop_stop_time = key.time,
            "equip attach" => queue.push_back(QueuedEvent::ShowWeapons(true)),
            "unequip detach" => queue.push_back(QueuedEvent::ShowWeapons(false)),
            _ => {}
        }
    }
    if notify {
        queue.push_back(QueuedEvent::Marker(MarkerEvent {
            group: group.to_string(),
            time: key.time,
            label: key.label.clone(),
            kind,
        }));
    }
}
