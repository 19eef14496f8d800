pub mod values;
pub mod tracks;
pub mod clip;

pub use clip::{AnimationClip, BoneChannel};
pub use tracks::{Keyframe, KeyframePair, KeyframeTrack};
pub use values::Interpolatable;
