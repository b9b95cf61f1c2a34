use crate::json::JsonSourceLoader;
use crate::{
    Animation, BoneData, Curve, Error, Loops, Regions, SkeletonData, SourceData, SourceLoader,
};
use glam::Vec3;

const WALK: &str = r#"
{
  "textKeys": [
    { "time": 1.0, "label": "walk: stop" },
    { "time": 0.0, "label": "walk: start" },
    { "time": 0.5, "label": "soundgen: left" }
  ],
  "tracks": [
    {
      "bone": "Bip01",
      "translation": [ { "time": 0.0, "value": [0, 0, 0] }, { "time": 1.0, "value": [0, 8, 0] } ],
      "rotation": [ { "time": 0.0, "value": [0, 0, 0, 2], "curve": "stepped" } ],
      "scale": [ { "time": 0.0, "value": 1.5 } ]
    },
    { "bone": "Bip01 Tail" }
  ]
}
"#;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-5,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

#[test]
fn parses_text_keys_and_tracks() {
    let data = SourceData::from_json_str(WALK).expect("parse");

    let labels: Vec<_> = data
        .text_keys
        .keys()
        .iter()
        .map(|k| k.label.as_str())
        .collect();
    assert_eq!(labels, vec!["walk: start", "soundgen: left", "walk: stop"]);

    assert_eq!(data.tracks.len(), 2);
    let bip = &data.tracks[0];
    assert_eq!(bip.bone, "Bip01");
    assert_eq!(bip.translations.len(), 2);
    assert_eq!(bip.translation_at(0.25), Some(Vec3::new(0.0, 2.0, 0.0)));
    assert_eq!(bip.rotations[0].curve, Curve::Stepped);
    assert_approx(bip.rotations[0].value.length(), 1.0);
    assert_approx(bip.scale_at(3.0).expect("scale keyed"), 1.5);

    let tail = &data.tracks[1];
    assert!(tail.translations.is_empty());
    assert!(tail.rotation_at(0.0).is_none());
}

#[test]
fn empty_document_is_an_empty_source() {
    let data = SourceData::from_json_str("{}").expect("parse");
    assert!(data.text_keys.is_empty());
    assert!(data.tracks.is_empty());
}

#[test]
fn rejects_malformed_input() {
    let err = SourceData::from_json_str("{ \"textKeys\": [ { \"time\": 0.0 } ] }").unwrap_err();
    assert!(matches!(err, Error::JsonParse { .. }));

    let unsorted = r#"
{
  "tracks": [
    { "bone": "Bip01", "scale": [ { "time": 1.0, "value": 1.0 }, { "time": 0.5, "value": 2.0 } ] }
  ]
}
"#;
    let err = SourceData::from_json_str(unsorted).unwrap_err();
    match err {
        Error::JsonParse { message } => {
            assert!(message.contains("scale"), "{message}");
            assert!(message.contains("Bip01"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_zero_length_rotations() {
    let degenerate = r#"
{
  "tracks": [
    { "bone": "Bip01 Spine1", "rotation": [ { "time": 0.0, "value": [0, 0, 0, 0] } ] }
  ]
}
"#;
    let err = SourceData::from_json_str(degenerate).unwrap_err();
    match err {
        Error::JsonParse { message } => {
            assert!(message.contains("Bip01 Spine1"), "{message}");
            assert!(message.contains("quaternion"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn loader_reads_keyframe_files_below_its_root() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir_all(dir.path().join("meshes")).expect("mkdir");
    std::fs::write(dir.path().join("meshes/xwalker.kf"), WALK).expect("write");
    std::fs::write(dir.path().join("meshes/xbroken.kf"), "not json").expect("write");

    let loader = JsonSourceLoader::new(dir.path());
    let data = loader
        .load("meshes/xwalker.kf")
        .expect("readable")
        .expect("present");
    assert_eq!(data.text_keys.len(), 3);
    assert!(loader.load("meshes/xmissing.kf").expect("no error").is_none());
    assert!(matches!(
        loader.load("meshes/xbroken.kf"),
        Err(Error::JsonParse { .. })
    ));

    let mut animation = Animation::default();
    animation.set_object_root(
        SkeletonData::new(vec![
            BoneData::new("Root", None),
            BoneData::new("Bip01", Some(0)),
        ])
        .expect("valid skeleton"),
    );
    animation
        .add_anim_source("meshes\\walker.nif", &loader)
        .expect("loads");
    assert_eq!(animation.sources().len(), 1);
    assert_eq!(animation.sources()[0].path, "meshes\\xwalker.kf");

    animation.set_accumulation(Vec3::Y);
    animation
        .play("walk", 1, Regions::ALL, true, 1.0, "start", "stop", 0.0, Loops::ONCE)
        .expect("walk markers exist");
    assert_approx(animation.velocity("walk"), 8.0);
    let movement = animation.run_animation(0.5);
    assert_approx(movement.y, 4.0);
}
