use super::test_support::{
    Recording, RecordingHooks, animation_with, assert_approx, assert_vec_approx, source,
    text_keys, translation_track,
};
use crate::{
    Animation, AnimationConfig, Loops, Regions, accumulated_displacement, calc_anim_velocity,
};
use glam::Vec3;

fn walking(accumulation: Vec3) -> Animation {
    animation_with(
        AnimationConfig {
            accumulation,
            ..AnimationConfig::default()
        },
        vec![(
            "meshes/xwalk.kf",
            source(
                &[
                    (0.0, "walk: start"),
                    (1.0, "walk: stop"),
                    (2.0, "stride: start"),
                    (2.5, "stride: loop start"),
                    (3.5, "stride: loop stop"),
                    (4.0, "stride: stop"),
                ],
                vec![translation_track(
                    "Bip01",
                    &[
                        (0.0, Vec3::ZERO),
                        (1.0, Vec3::new(10.0, 0.0, 5.0)),
                        (2.0, Vec3::ZERO),
                        (2.5, Vec3::new(0.0, 1.0, 0.0)),
                        (3.5, Vec3::new(0.0, 4.0, 0.0)),
                        (4.0, Vec3::new(0.0, 10.0, 0.0)),
                    ],
                )],
            ),
        )],
    )
}

fn play_walk(animation: &mut Animation, regions: Regions, loops: Loops) {
    animation
        .play("walk", 1, regions, false, 1.0, "start", "stop", 0.0, loops)
        .expect("walk markers exist");
}

fn bip01_world(animation: &Animation) -> Vec3 {
    let skeleton = animation.skeleton().expect("skeleton set");
    let bone = skeleton.find_bone("Bip01").expect("Bip01 exists");
    skeleton.world_translation(bone)
}

#[test]
fn full_accumulation_sums_to_track_displacement() {
    let mut animation = walking(Vec3::new(1.0, 0.0, 0.0));
    play_walk(&mut animation, Regions::ALL, Loops::ONCE);

    let mut total = Vec3::ZERO;
    for _ in 0..4 {
        total += animation.run_animation(0.25);
    }
    assert_vec_approx(total, Vec3::new(10.0, 0.0, 0.0));

    // Finished: further ticks do not move the actor.
    assert_vec_approx(animation.run_animation(0.25), Vec3::ZERO);
}

#[test]
fn accumulated_axes_are_removed_from_the_pose() {
    let mut animation = walking(Vec3::new(1.0, 0.0, 0.0));
    play_walk(&mut animation, Regions::ALL, Loops::ONCE);
    animation.run_animation(0.5);
    assert_vec_approx(bip01_world(&animation), Vec3::new(0.0, 0.0, 2.5));

    let mut in_place = walking(Vec3::ZERO);
    play_walk(&mut in_place, Regions::ALL, Loops::ONCE);
    assert_vec_approx(in_place.run_animation(0.5), Vec3::ZERO);
    assert_vec_approx(bip01_world(&in_place), Vec3::new(5.0, 0.0, 2.5));
}

#[test]
fn partial_accumulation_splits_motion() {
    let mut animation = walking(Vec3::new(0.5, 0.0, 1.0));
    play_walk(&mut animation, Regions::ALL, Loops::ONCE);

    let movement = animation.run_animation(1.0);
    assert_vec_approx(movement, Vec3::new(5.0, 0.0, 5.0));
    assert_vec_approx(bip01_world(&animation), Vec3::new(5.0, 0.0, 0.0));
}

#[test]
fn only_the_lower_body_state_moves_the_actor() {
    let mut animation = walking(Vec3::ONE);
    play_walk(&mut animation, Regions::UPPER_BODY, Loops::ONCE);
    assert_vec_approx(animation.run_animation(0.5), Vec3::ZERO);
}

#[test]
fn motion_continues_across_a_wrap() {
    let mut animation = walking(Vec3::new(1.0, 0.0, 0.0));
    play_walk(&mut animation, Regions::ALL, Loops::Forever);
    let movement = animation.run_animation(1.5);
    assert_vec_approx(movement, Vec3::new(15.0, 0.0, 0.0));
}

#[test]
fn skipped_loops_still_move_the_actor() {
    let mut animation = walking(Vec3::new(1.0, 0.0, 0.0));
    play_walk(&mut animation, Regions::ALL, Loops::Forever);
    let movement = animation.run_animation(10.25);
    assert_vec_approx(movement, Vec3::new(102.5, 0.0, 0.0));
    assert_approx(animation.state("walk").expect("walk").time(), 0.25);

    animation
        .play("walk", 1, Regions::ALL, false, -1.0, "start", "stop", 1.0, Loops::Forever)
        .expect("walk markers exist");
    let movement = animation.run_animation(10.25);
    assert_vec_approx(movement, Vec3::new(-102.5, 0.0, 0.0));
    assert_approx(animation.state("walk").expect("walk").time(), 0.75);
}

#[test]
fn reverse_playback_moves_backwards() {
    let mut animation = walking(Vec3::new(1.0, 0.0, 0.0));
    animation
        .play("walk", 1, Regions::ALL, false, -1.0, "start", "stop", 1.0, Loops::ONCE)
        .expect("walk markers exist");
    assert_vec_approx(animation.run_animation(0.5), Vec3::new(-5.0, 0.0, 0.0));
}

#[test]
fn velocity_uses_loop_markers_when_present() {
    let animation = walking(Vec3::new(1.0, 0.0, 0.0));
    assert_approx(animation.velocity("walk"), 10.0);
    assert_approx(animation.velocity("swim"), 0.0);

    let animation = walking(Vec3::ONE);
    assert_approx(animation.velocity("walk"), 125.0_f32.sqrt());
    // 3 units between loop start and loop stop, one second apart.
    assert_approx(animation.velocity("stride"), 3.0);
}

#[test]
fn velocity_needs_a_moving_axis() {
    let animation = walking(Vec3::ZERO);
    assert_approx(animation.velocity("walk"), 0.0);
}

#[test]
fn accumulation_is_clamped() {
    let mut animation = walking(Vec3::new(2.0, -1.0, 0.5));
    assert_eq!(animation.config().accumulation, Vec3::new(1.0, 0.0, 0.5));
    animation.set_accumulation(Vec3::new(-3.0, 7.0, 0.25));
    assert_eq!(animation.config().accumulation, Vec3::new(0.0, 1.0, 0.25));
}

#[test]
fn hooks_can_adjust_movement() {
    let mut animation = walking(Vec3::new(1.0, 0.0, 0.0));
    let recording = Recording {
        movement_scale: Some(0.5),
        ..Recording::default()
    };
    animation.set_hooks(RecordingHooks {
        recording: recording.clone(),
    });
    play_walk(&mut animation, Regions::ALL, Loops::ONCE);
    assert_vec_approx(animation.run_animation(1.0), Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(recording.labels(), vec!["walk: start", "walk: stop"]);
}

#[test]
fn displacement_helpers_scale_per_axis() {
    let track = translation_track(
        "Bip01",
        &[(0.0, Vec3::ZERO), (2.0, Vec3::new(4.0, 8.0, -2.0))],
    );
    let moved = accumulated_displacement(&track, 0.5, 1.5, Vec3::new(1.0, 0.5, 0.0));
    assert_vec_approx(moved, Vec3::new(2.0, 2.0, 0.0));

    let keys = text_keys(&[(0.0, "go: start"), (2.0, "go: stop")]);
    assert_approx(calc_anim_velocity(&keys, &track, Vec3::X, "go"), 2.0);
}
