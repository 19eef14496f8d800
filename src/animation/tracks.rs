use crate::animation::values::Interpolatable;

/// A single time-stamped sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    #[must_use]
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// The two keyframes bracketing a sample time.
///
/// A degenerate pair (`current` and `next` are the same key) has a zero
/// time delta and always blends with factor `0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframePair<T> {
    pub current: Keyframe<T>,
    pub next: Keyframe<T>,
}

impl<T: Interpolatable> KeyframePair<T> {
    /// `(time - current.time) / (next.time - current.time)`, or `0` when the
    /// two keys share a timestamp.
    #[must_use]
    pub fn blend_factor(&self, time: f32) -> f32 {
        let delta = self.next.time - self.current.time;
        if delta > 0.0 {
            (time - self.current.time) / delta
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn interpolate(&self, time: f32) -> T {
        T::interpolate_linear(self.current.value, self.next.value, self.blend_factor(time))
    }
}

/// Time-ordered keyframe sequence for one animated property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeTrack<T> {
    keys: Vec<Keyframe<T>>,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Keys must already be sorted ascending by time.
    #[must_use]
    pub fn new(keys: Vec<Keyframe<T>>) -> Self {
        debug_assert!(
            keys.windows(2).all(|w| w[0].time <= w[1].time),
            "keyframes must be sorted by time"
        );
        Self { keys }
    }

    #[must_use]
    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Indices of the keys bracketing `time`.
    ///
    /// `current` is the last key whose time does not exceed `time` and
    /// `next` the one after it. Times before the first key or after the last
    /// one, and single-key tracks, resolve to `(0, 0)`. A time exactly on the
    /// last key resolves to `(last, last)`.
    #[must_use]
    pub fn frame_indices(&self, time: f32) -> Option<(usize, usize)> {
        let len = self.keys.len();
        if len == 0 {
            return None;
        }
        if len == 1 {
            return Some((0, 0));
        }

        // First index whose time is strictly greater than `time`
        let next_idx = self.keys.partition_point(|k| k.time <= time);

        let pair = if next_idx == 0 {
            (0, 0)
        } else if next_idx == len {
            if time == self.keys[len - 1].time {
                (len - 1, len - 1)
            } else {
                (0, 0)
            }
        } else {
            (next_idx - 1, next_idx)
        };

        Some(pair)
    }

    #[must_use]
    pub fn key_pair(&self, time: f32) -> Option<KeyframePair<T>> {
        let (current, next) = self.frame_indices(time)?;
        Some(KeyframePair {
            current: self.keys[current],
            next: self.keys[next],
        })
    }

    /// Samples the track at `time`. Returns `None` only for an empty track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        self.key_pair(time).map(|pair| pair.interpolate(time))
    }
}

impl<T: Interpolatable> From<Vec<Keyframe<T>>> for KeyframeTrack<T> {
    fn from(keys: Vec<Keyframe<T>>) -> Self {
        Self::new(keys)
    }
}
