//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack bracket search and degenerate pairs
//! - Blend factor computation
//! - Shortest-path quaternion blending (Lerp / Nlerp)
//! - AnimationClip time mapping and channel lookup
//! - Loading clips through a custom importer

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use glam::{Mat4, Quat, Vec3, Vec4};

use myth_avatar::animation::clip::{AnimationClip, BoneChannel};
use myth_avatar::animation::tracks::{Keyframe, KeyframePair, KeyframeTrack};
use myth_avatar::animation::values::Interpolatable;
use myth_avatar::assets::{ImportedAnimation, ImportedScene, NodeChannel, SceneImporter, SceneNode};
use myth_avatar::errors::{LoadError, Result};
use myth_avatar::settings::{PoseSettings, RotationBlend, DEFAULT_TICKS_PER_SECOND};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_track(keys: &[(f32, Vec3)]) -> KeyframeTrack<Vec3> {
    KeyframeTrack::new(keys.iter().map(|&(t, v)| Keyframe::new(t, v)).collect())
}

fn quat_approx(a: Quat, b: Quat) -> bool {
    Vec4::from(a).abs_diff_eq(Vec4::from(b), EPSILON)
}

// ============================================================================
// KeyframeTrack: Bracket Search
// ============================================================================

#[test]
fn frame_indices_inside_range() {
    let track = vec3_track(&[(0.0, Vec3::ZERO), (1.0, Vec3::ONE), (2.0, Vec3::ONE)]);

    assert_eq!(track.frame_indices(0.0), Some((0, 1)));
    assert_eq!(track.frame_indices(0.5), Some((0, 1)));
    assert_eq!(track.frame_indices(1.0), Some((1, 2)));
    assert_eq!(track.frame_indices(1.99), Some((1, 2)));
}

#[test]
fn frame_indices_outside_range_are_degenerate() {
    let track = vec3_track(&[(1.0, Vec3::ZERO), (2.0, Vec3::ONE)]);

    assert_eq!(track.frame_indices(0.5), Some((0, 0)));
    assert_eq!(track.frame_indices(2.5), Some((0, 0)));
}

#[test]
fn frame_indices_on_last_key() {
    let track = vec3_track(&[(0.0, Vec3::ZERO), (1.0, Vec3::ONE)]);
    assert_eq!(track.frame_indices(1.0), Some((1, 1)));
}

#[test]
fn frame_indices_single_key() {
    let track = vec3_track(&[(3.0, Vec3::ONE)]);

    assert_eq!(track.frame_indices(0.0), Some((0, 0)));
    assert_eq!(track.frame_indices(3.0), Some((0, 0)));
    assert_eq!(track.frame_indices(10.0), Some((0, 0)));
}

#[test]
fn empty_track_samples_nothing() {
    let track: KeyframeTrack<Vec3> = KeyframeTrack::default();
    assert!(track.is_empty());
    assert_eq!(track.frame_indices(0.0), None);
    assert_eq!(track.sample(0.0), None);
}

// ============================================================================
// Blend Factor
// ============================================================================

#[test]
fn blend_factor_is_relative_position() {
    let pair = KeyframePair {
        current: Keyframe::new(2.0, Vec3::ZERO),
        next: Keyframe::new(6.0, Vec3::ONE),
    };
    assert!(approx(pair.blend_factor(3.0), 0.25));
}

#[test]
fn blend_factor_zero_delta_is_zero() {
    let key = Keyframe::new(2.0, Vec3::ONE);
    let pair = KeyframePair { current: key, next: key };

    assert_eq!(pair.blend_factor(2.0), 0.0);
    assert_eq!(pair.blend_factor(7.0), 0.0);
}

// ============================================================================
// Vec3 Sampling
// ============================================================================

#[test]
fn sample_vec3_midpoint() {
    let track = vec3_track(&[(0.0, Vec3::ZERO), (1.0, Vec3::new(10.0, 20.0, 30.0))]);
    let val = track.sample(0.5).unwrap();

    assert!(approx(val.x, 5.0));
    assert!(approx(val.y, 10.0));
    assert!(approx(val.z, 15.0));
}

#[test]
fn sample_vec3_reproduces_keys_exactly() {
    let keys = [
        (0.0, Vec3::new(1.0, 2.0, 3.0)),
        (0.7, Vec3::new(-4.0, 0.5, 9.0)),
        (1.3, Vec3::new(8.0, -8.0, 0.25)),
    ];
    let track = vec3_track(&keys);

    for (time, value) in keys {
        assert_eq!(track.sample(time), Some(value), "t={time}");
    }
}

#[test]
fn sample_vec3_outside_range_uses_first_key() {
    let track = vec3_track(&[(1.0, Vec3::X), (2.0, Vec3::Y)]);

    assert_eq!(track.sample(0.0), Some(Vec3::X));
    assert_eq!(track.sample(5.0), Some(Vec3::X));
}

// ============================================================================
// Quaternion Blending
// ============================================================================

#[test]
fn quat_blend_takes_shortest_path() {
    let q1 = Quat::from_rotation_z(0.2);
    let q2 = -Quat::from_rotation_z(1.2); // same rotation, opposite hemisphere
    assert!(Vec4::from(q1).dot(Vec4::from(q2)) < 0.0);

    let track = KeyframeTrack::new(vec![Keyframe::new(0.0, q1), Keyframe::new(1.0, q2)]);
    let sampled = track.sample(0.5).unwrap();

    let via_negated = Quat::interpolate_linear(q1, -q2, 0.5);
    let naive = Quat::from_vec4(Vec4::from(q1).lerp(Vec4::from(q2), 0.5));

    assert!(quat_approx(sampled, via_negated));
    assert!(!quat_approx(sampled, naive));
    // The blend lands between 0.2 and 1.2 radians, not on the long arc
    assert!(quat_approx(sampled.normalize(), Quat::from_rotation_z(0.7)));
}

#[test]
fn quat_lerp_is_not_renormalized() {
    let q = Quat::interpolate_linear(Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2), 0.5);
    assert!(q.length() < 0.95, "length={}", q.length());
}

#[test]
fn quat_keys_are_reproduced() {
    let q0 = Quat::from_rotation_x(0.3);
    let q1 = Quat::from_rotation_y(1.1);
    let track = KeyframeTrack::new(vec![Keyframe::new(0.0, q0), Keyframe::new(2.0, q1)]);

    assert!(quat_approx(track.sample(0.0).unwrap(), q0));
    assert!(quat_approx(track.sample(2.0).unwrap(), q1));
}

// ============================================================================
// BoneChannel Local Transform
// ============================================================================

fn rotation_channel() -> BoneChannel {
    BoneChannel::new(
        "bone",
        vec3_track(&[(0.0, Vec3::new(1.0, 0.0, 0.0))]),
        KeyframeTrack::new(vec![
            Keyframe::new(0.0, Quat::IDENTITY),
            Keyframe::new(1.0, Quat::from_rotation_z(FRAC_PI_2)),
        ]),
        vec3_track(&[(0.0, Vec3::ONE)]),
    )
}

#[test]
fn channel_composes_translation_rotation_scale() {
    let channel = BoneChannel::new(
        "bone",
        vec3_track(&[(0.0, Vec3::new(1.0, 2.0, 3.0))]),
        KeyframeTrack::new(vec![Keyframe::new(0.0, Quat::from_rotation_y(0.4))]),
        vec3_track(&[(0.0, Vec3::splat(2.0))]),
    );

    let m = channel.local_transform(0.0, RotationBlend::Lerp, &Mat4::IDENTITY);
    let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
        * Mat4::from_quat(Quat::from_rotation_y(0.4))
        * Mat4::from_scale(Vec3::splat(2.0));

    assert!(m.abs_diff_eq(expected, EPSILON));
}

#[test]
fn channel_nlerp_keeps_unit_rotation() {
    let channel = rotation_channel();

    let lerp = channel.local_transform(0.5, RotationBlend::Lerp, &Mat4::IDENTITY);
    let nlerp = channel.local_transform(0.5, RotationBlend::Nlerp, &Mat4::IDENTITY);

    let expected = Mat4::from_translation(Vec3::X) * Mat4::from_rotation_z(FRAC_PI_2 * 0.5);
    assert!(nlerp.abs_diff_eq(expected, EPSILON));
    assert!(!lerp.abs_diff_eq(expected, 1e-3));
}

#[test]
fn channel_blend_modes_agree_on_keys() {
    let channel = rotation_channel();
    for time in [0.0, 1.0] {
        let lerp = channel.local_transform(time, RotationBlend::Lerp, &Mat4::IDENTITY);
        let nlerp = channel.local_transform(time, RotationBlend::Nlerp, &Mat4::IDENTITY);
        assert!(lerp.abs_diff_eq(nlerp, EPSILON), "t={time}");
    }
}

#[test]
fn channel_empty_tracks_use_bind_components() {
    let bind = Mat4::from_scale_rotation_translation(
        Vec3::splat(3.0),
        Quat::from_rotation_x(0.5),
        Vec3::new(0.0, 4.0, 0.0),
    );
    let channel = BoneChannel::new(
        "bone",
        KeyframeTrack::default(),
        KeyframeTrack::new(vec![Keyframe::new(0.0, Quat::from_rotation_z(0.25))]),
        KeyframeTrack::default(),
    );

    let m = channel.local_transform(0.0, RotationBlend::Lerp, &bind);
    let expected = Mat4::from_scale_rotation_translation(
        Vec3::splat(3.0),
        Quat::from_rotation_z(0.25),
        Vec3::new(0.0, 4.0, 0.0),
    );
    assert!(m.abs_diff_eq(expected, 1e-4));
}

// ============================================================================
// AnimationClip: Time Mapping
// ============================================================================

#[test]
fn local_time_scales_and_wraps() {
    let clip = AnimationClip::new("walk", 2.0, 4.0, Vec::new());

    assert!(approx(clip.local_time(0.25), 1.0));
    assert!(approx(clip.local_time(0.75), 1.0)); // 3 ticks wraps to 1
    assert!(approx(clip.local_time(0.5), 0.0));
}

#[test]
fn local_time_wraps_negative_times_forward() {
    let clip = AnimationClip::new("walk", 2.0, 1.0, Vec::new());
    let t = clip.local_time(-0.5);

    assert!(approx(t, 1.5), "got {t}");
}

#[test]
fn local_time_zero_duration() {
    let clip = AnimationClip::new("still", 0.0, 30.0, Vec::new());
    assert_eq!(clip.local_time(12.0), 0.0);
}

#[test]
fn zero_ticks_per_second_falls_back() {
    let clip = AnimationClip::new("walk", 50.0, 0.0, Vec::new());
    assert_eq!(clip.ticks_per_second, DEFAULT_TICKS_PER_SECOND);
    assert!(approx(clip.duration_seconds(), 2.0));

    let settings = PoseSettings {
        fallback_ticks_per_second: 10.0,
        ..Default::default()
    };
    let clip = AnimationClip::with_settings("walk", 50.0, 0.0, Vec::new(), &settings);
    assert_eq!(clip.ticks_per_second, 10.0);
}

// ============================================================================
// AnimationClip: Channel Lookup
// ============================================================================

#[test]
fn channel_lookup_by_exact_name() {
    let clip = AnimationClip::new("walk", 1.0, 1.0, vec![rotation_channel()]);

    assert!(clip.channel("bone").is_some());
    assert!(clip.channel("Bone").is_none());
    assert!(clip.channel("other").is_none());
}

#[test]
fn channel_lookup_prefers_first_duplicate() {
    let mut second = rotation_channel();
    second.position = vec3_track(&[(0.0, Vec3::splat(9.0))]);

    let clip = AnimationClip::new("walk", 1.0, 1.0, vec![rotation_channel(), second]);
    let found = clip.channel("bone").unwrap();

    assert_eq!(found.position.sample(0.0), Some(Vec3::X));
    assert_eq!(clip.channels().len(), 2);
}

// ============================================================================
// AnimationClip: Loading
// ============================================================================

struct ClipImporter {
    animations: Vec<ImportedAnimation>,
}

impl SceneImporter for ClipImporter {
    fn import(&self, path: &Path) -> Result<ImportedScene> {
        Ok(ImportedScene {
            source: path.display().to_string(),
            root: SceneNode::new("Scene", Mat4::IDENTITY),
            meshes: Vec::new(),
            animations: self.animations.clone(),
        })
    }
}

fn imported_animation(name: &str, ticks_per_second: f32) -> ImportedAnimation {
    let mut channel = NodeChannel::new("bone");
    channel.position_keys = vec![Keyframe::new(0.0, Vec3::X), Keyframe::new(4.0, Vec3::Y)];
    ImportedAnimation {
        name: name.to_string(),
        duration: 4.0,
        ticks_per_second,
        channels: vec![channel],
    }
}

#[test]
fn load_all_with_applies_importer_and_settings() {
    let importer = ClipImporter {
        animations: vec![imported_animation("walk", 2.0), imported_animation("idle", 0.0)],
    };
    let settings = PoseSettings {
        fallback_ticks_per_second: 8.0,
        ..Default::default()
    };

    let clips = AnimationClip::load_all_with(&importer, "virtual/clips", &settings).unwrap();

    let names: Vec<&str> = clips.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["walk", "idle"]);
    assert_eq!(clips[0].ticks_per_second, 2.0);
    assert_eq!(clips[1].ticks_per_second, 8.0);
    assert!(approx(clips[1].duration_seconds(), 0.5));
    assert_eq!(clips[1].channel("bone").unwrap().position.len(), 2);
}

#[test]
fn load_with_takes_first_animation() {
    let importer = ClipImporter {
        animations: vec![imported_animation("walk", 2.0), imported_animation("idle", 0.0)],
    };

    let clip = AnimationClip::load_with(&importer, "virtual/clips", &PoseSettings::default())
        .unwrap();
    assert_eq!(clip.name, "walk");
}

#[test]
fn load_all_with_empty_scene_reports_no_animation() {
    let importer = ClipImporter { animations: Vec::new() };

    let err = AnimationClip::load_all_with(&importer, "virtual/empty", &PoseSettings::default())
        .unwrap_err();
    assert!(matches!(err, LoadError::NoAnimation(_)), "{err}");
}
