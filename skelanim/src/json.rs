//! JSON keyframe sources.
//!
//! ```json
//! {
//!   "textKeys": [ { "time": 0.0, "label": "idle: start" }, { "time": 2.0, "label": "idle: stop" } ],
//!   "tracks": [
//!     {
//!       "bone": "Bip01",
//!       "translation": [ { "time": 0.0, "value": [0, 0, 0] }, { "time": 2.0, "value": [0, 90, 0] } ],
//!       "rotation": [ { "time": 0.0, "value": [0, 0, 0, 1], "curve": "stepped" } ],
//!       "scale": [ { "time": 0.0, "value": 1.0 } ]
//!     }
//!   ]
//! }
//! ```
//!
//! Rotations are quaternions in `[x, y, z, w]` order. Frames must be sorted by time.

use crate::{
    Curve, Error, FloatFrame, NodeTrack, QuatFrame, SourceData, SourceLoader, TextKey, TextKeyMap,
    Vec3Frame,
};
use glam::{Quat, Vec3};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Root {
    #[serde(default)]
    text_keys: Vec<TextKeyDef>,
    #[serde(default)]
    tracks: Vec<TrackDef>,
}

#[derive(Debug, Deserialize)]
struct TextKeyDef {
    time: f32,
    label: String,
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum CurveDef {
    #[default]
    Linear,
    Stepped,
}

impl From<CurveDef> for Curve {
    fn from(curve: CurveDef) -> Self {
        match curve {
            CurveDef::Linear => Curve::Linear,
            CurveDef::Stepped => Curve::Stepped,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FrameDef<T> {
    time: f32,
    value: T,
    #[serde(default)]
    curve: CurveDef,
}

#[derive(Debug, Deserialize)]
struct TrackDef {
    bone: String,
    #[serde(default)]
    translation: Vec<FrameDef<[f32; 3]>>,
    #[serde(default)]
    rotation: Vec<FrameDef<[f32; 4]>>,
    #[serde(default)]
    scale: Vec<FrameDef<f32>>,
}

fn check_sorted<T>(bone: &str, channel: &str, frames: &[FrameDef<T>]) -> Result<(), Error> {
    if frames.windows(2).any(|pair| pair[1].time < pair[0].time) {
        return Err(Error::JsonParse {
            message: format!("{channel} frames for bone '{bone}' are not sorted by time"),
        });
    }
    Ok(())
}

impl SourceData {
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let root: Root = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;

        let text_keys = TextKeyMap::new(
            root.text_keys
                .into_iter()
                .map(|k| TextKey::new(k.time, k.label))
                .collect(),
        );

        let mut tracks = Vec::with_capacity(root.tracks.len());
        for def in root.tracks {
            check_sorted(&def.bone, "translation", &def.translation)?;
            check_sorted(&def.bone, "rotation", &def.rotation)?;
            check_sorted(&def.bone, "scale", &def.scale)?;

            let mut track = NodeTrack::new(def.bone);
            track.translations = def
                .translation
                .into_iter()
                .map(|f| Vec3Frame {
                    time: f.time,
                    value: Vec3::from_array(f.value),
                    curve: f.curve.into(),
                })
                .collect();
            track.rotations = def
                .rotation
                .into_iter()
                .map(|f| {
                    let value = Quat::from_array(f.value);
                    if !value.is_finite() || value.length_squared() < 1.0e-12 {
                        return Err(Error::JsonParse {
                            message: format!(
                                "rotation frame at {} for bone '{}' is not a valid quaternion",
                                f.time, track.bone
                            ),
                        });
                    }
                    Ok(QuatFrame {
                        time: f.time,
                        value: value.normalize(),
                        curve: f.curve.into(),
                    })
                })
                .collect::<Result<_, _>>()?;
            track.scales = def
                .scale
                .into_iter()
                .map(|f| FloatFrame {
                    time: f.time,
                    value: f.value,
                    curve: f.curve.into(),
                })
                .collect();
            tracks.push(track);
        }

        Ok(Self { text_keys, tracks })
    }
}

/// Reads JSON sources from files below a root directory.
#[derive(Clone, Debug)]
pub struct JsonSourceLoader {
    root: PathBuf,
}

impl JsonSourceLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl SourceLoader for JsonSourceLoader {
    fn load(&self, path: &str) -> Result<Option<SourceData>, Error> {
        let full = self.root.join(path.replace('\\', "/"));
        if !full.is_file() {
            return Ok(None);
        }
        let input = std::fs::read_to_string(&full).map_err(|e| Error::SourceLoad {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        SourceData::from_json_str(&input).map(Some)
    }
}
