//! Pose Evaluation Settings
//!
//! Configuration knobs for keyframe sampling and playback.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use myth_avatar::{PoseSettings, RotationBlend};
//!
//! // Default: component lerp, no renormalization
//! let settings = PoseSettings::default();
//!
//! // Renormalize blended rotations
//! let settings = PoseSettings {
//!     rotation_blend: RotationBlend::Nlerp,
//!     ..Default::default()
//! };
//!
//! let avatar = model.avatar_with_settings(settings);
//! ```

/// Ticks per second assumed when an animation declares none.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

// ---------------------------------------------------------------------------
// RotationBlend
// ---------------------------------------------------------------------------

/// How two rotation keyframes are blended.
///
/// Both modes normalize the input keys and flip the second one when the
/// pair lies on opposite hemispheres, so interpolation always follows the
/// shorter arc. They differ only in what happens after the blend.
///
/// | Mode    | Result after blend       | Unit length  | Exact angle  |
/// |---------|--------------------------|--------------|--------------|
/// | `Lerp`  | raw component-wise blend | only at keys | only at keys |
/// | `Nlerp` | blend, then normalized   | always       | nlerp angle  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationBlend {
    /// Component-wise linear blend, left unnormalized.
    ///
    /// Between keys the quaternion is shorter than unit length. The matrix
    /// built from it is not a pure rotation: its axes are scaled unevenly
    /// and skewed, and the rotation angle lags the keyed motion. Halfway
    /// between identity and a 90° turn the bone points at about 38.8°, not
    /// 45°, and the error compounds down a chain (two such bones reach about
    /// 77.6° instead of 90°).
    ///
    /// Use [`Nlerp`](Self::Nlerp) when intermediate poses must be rigid.
    #[default]
    Lerp,
    /// Component-wise linear blend followed by normalization.
    Nlerp,
}

// ---------------------------------------------------------------------------
// PoseSettings
// ---------------------------------------------------------------------------

/// Settings consumed by [`Avatar`](crate::Avatar) and
/// [`AnimationClip`](crate::AnimationClip) construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSettings {
    /// Rotation keyframe blending mode.
    pub rotation_blend: RotationBlend,
    /// Playback rate used when an animation declares `0` ticks per second.
    pub fallback_ticks_per_second: f32,
}

impl Default for PoseSettings {
    fn default() -> Self {
        Self {
            rotation_blend: RotationBlend::default(),
            fallback_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
        }
    }
}
