use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::tracks::KeyframeTrack;
use crate::assets::{GltfImporter, ImportedAnimation, NodeChannel, SceneImporter};
use crate::errors::{LoadError, Result};
use crate::settings::{PoseSettings, RotationBlend};

/// Keyframe channels driving one bone.
///
/// Position, rotation and scale are sampled independently; each track may
/// hold a different number of keys at different times.
#[derive(Debug, Clone)]
pub struct BoneChannel {
    pub bone_name: String,
    pub position: KeyframeTrack<Vec3>,
    pub rotation: KeyframeTrack<Quat>,
    pub scale: KeyframeTrack<Vec3>,
}

impl BoneChannel {
    #[must_use]
    pub fn new(
        bone_name: impl Into<String>,
        position: KeyframeTrack<Vec3>,
        rotation: KeyframeTrack<Quat>,
        scale: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            bone_name: bone_name.into(),
            position,
            rotation,
            scale,
        }
    }

    /// Local bone transform at `time` (in ticks): `T * R * S`.
    ///
    /// An empty track contributes the matching component of `bind`.
    #[must_use]
    pub fn local_transform(&self, time: f32, blend: RotationBlend, bind: &Mat4) -> Mat4 {
        let position = self.position.sample(time);
        let rotation = self.rotation.sample(time).map(|q| match blend {
            RotationBlend::Lerp => q,
            RotationBlend::Nlerp => q.normalize(),
        });
        let scale = self.scale.sample(time);

        let (position, rotation, scale) = match (position, rotation, scale) {
            (Some(p), Some(r), Some(s)) => (p, r, s),
            (p, r, s) => {
                let (bind_scale, bind_rotation, bind_position) =
                    bind.to_scale_rotation_translation();
                (
                    p.unwrap_or(bind_position),
                    r.unwrap_or(bind_rotation),
                    s.unwrap_or(bind_scale),
                )
            }
        };

        Mat4::from_translation(position) * Mat4::from_quat(rotation) * Mat4::from_scale(scale)
    }
}

impl From<&NodeChannel> for BoneChannel {
    fn from(channel: &NodeChannel) -> Self {
        Self::new(
            channel.node_name.clone(),
            KeyframeTrack::new(channel.position_keys.clone()),
            KeyframeTrack::new(channel.rotation_keys.clone()),
            KeyframeTrack::new(channel.scale_keys.clone()),
        )
    }
}

/// A named set of per-bone channels plus playback metadata.
///
/// Clips are read-only once built and can be shared between any number of
/// avatars.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Length in ticks.
    pub duration: f32,
    pub ticks_per_second: f32,
    channels: Vec<BoneChannel>,
    channel_lookup: FxHashMap<String, usize>,
}

impl AnimationClip {
    /// A non-positive `ticks_per_second` falls back to
    /// [`DEFAULT_TICKS_PER_SECOND`](crate::settings::DEFAULT_TICKS_PER_SECOND).
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        duration: f32,
        ticks_per_second: f32,
        channels: Vec<BoneChannel>,
    ) -> Self {
        Self::with_settings(name, duration, ticks_per_second, channels, &PoseSettings::default())
    }

    #[must_use]
    pub fn with_settings(
        name: impl Into<String>,
        duration: f32,
        ticks_per_second: f32,
        channels: Vec<BoneChannel>,
        settings: &PoseSettings,
    ) -> Self {
        let ticks_per_second = if ticks_per_second > 0.0 {
            ticks_per_second
        } else {
            settings.fallback_ticks_per_second
        };

        // The first channel for a name wins, like a front-to-back scan would.
        let mut channel_lookup = FxHashMap::default();
        for (index, channel) in channels.iter().enumerate() {
            channel_lookup.entry(channel.bone_name.clone()).or_insert(index);
        }

        Self {
            name: name.into(),
            duration,
            ticks_per_second,
            channels,
            channel_lookup,
        }
    }

    #[must_use]
    pub fn from_imported(animation: &ImportedAnimation) -> Self {
        Self::from_imported_with(animation, &PoseSettings::default())
    }

    #[must_use]
    pub fn from_imported_with(animation: &ImportedAnimation, settings: &PoseSettings) -> Self {
        Self::with_settings(
            animation.name.clone(),
            animation.duration,
            animation.ticks_per_second,
            animation.channels.iter().map(BoneChannel::from).collect(),
            settings,
        )
    }

    /// Loads the first animation stored in a glTF file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(&GltfImporter, path, &PoseSettings::default())
    }

    pub fn load_with(
        importer: &impl SceneImporter,
        path: impl AsRef<Path>,
        settings: &PoseSettings,
    ) -> Result<Self> {
        let path = path.as_ref();
        let scene = importer.import(path)?;
        let animation = scene.first_animation()?;

        let clip = Self::from_imported_with(animation, settings);
        log::debug!(
            "Loaded animation '{}' from {}: {} channels, {} ticks @ {} ticks/s",
            clip.name,
            path.display(),
            clip.channels.len(),
            clip.duration,
            clip.ticks_per_second
        );
        Ok(clip)
    }

    /// Loads every animation stored in a glTF file, in file order.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        Self::load_all_with(&GltfImporter, path, &PoseSettings::default())
    }

    pub fn load_all_with(
        importer: &impl SceneImporter,
        path: impl AsRef<Path>,
        settings: &PoseSettings,
    ) -> Result<Vec<Self>> {
        let path = path.as_ref();
        let scene = importer.import(path)?;
        if scene.animations.is_empty() {
            return Err(LoadError::NoAnimation(path.display().to_string()));
        }

        let clips: Vec<Self> = scene
            .animations
            .iter()
            .map(|animation| Self::from_imported_with(animation, settings))
            .collect();
        log::debug!("Loaded {} animations from {}", clips.len(), path.display());
        Ok(clips)
    }

    #[must_use]
    pub fn channels(&self) -> &[BoneChannel] {
        &self.channels
    }

    /// Channel animating `bone_name`, if any. Absence is normal for static
    /// bones.
    #[inline]
    #[must_use]
    pub fn channel(&self, bone_name: &str) -> Option<&BoneChannel> {
        self.channel_lookup
            .get(bone_name)
            .map(|&index| &self.channels[index])
    }

    /// Length in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    /// Maps wall-clock seconds to looping clip-local ticks in `[0, duration)`.
    #[must_use]
    pub fn local_time(&self, seconds: f32) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        let ticks = seconds * self.ticks_per_second;
        let wrapped = ticks.rem_euclid(self.duration);
        // rem_euclid may round up to exactly `duration` for tiny negatives
        if wrapped >= self.duration { 0.0 } else { wrapped }
    }
}
