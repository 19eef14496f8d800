pub mod bone;
pub mod skin;

pub use bone::{BoneIter, BoneNode};
pub use skin::{SkinBinding, SkinJoint};
