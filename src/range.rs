use glam::{Vec2, Vec4};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A min/max pair that particle attributes are drawn from.
///
/// Callers must keep `min <= max`; sampling an inverted pair is unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy> Bounds<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// A range collapsed to a single value.
    pub fn splat(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
}

impl Bounds<f32> {
    /// Draw a uniform value from `[min, max]`.
    ///
    /// Inclusive, so a collapsed pair (`min == max`) yields that single
    /// value.
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        rng.gen_range(self.min..=self.max)
    }
}

impl Bounds<Vec2> {
    /// Draw each component independently from its own `[min, max]`.
    pub fn sample(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
        )
    }
}

impl Bounds<Vec4> {
    /// Draw a color between `min` and `max` using a single blend factor.
    ///
    /// All four channels share one factor, so the result always lies on the
    /// straight line between the two bound colors rather than anywhere in
    /// the channel-independent box.
    pub fn sample_blend(&self, rng: &mut impl Rng) -> Vec4 {
        self.min.lerp(self.max, rng.gen::<f32>())
    }
}

/// Start and end sampling ranges for an attribute that interpolates over a
/// particle's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeBounds<T> {
    pub start: Bounds<T>,
    pub end: Bounds<T>,
}

impl<T: Copy> RangeBounds<T> {
    pub fn new(start: Bounds<T>, end: Bounds<T>) -> Self {
        Self { start, end }
    }

    /// Start and end both collapsed to the same single value.
    pub fn splat(value: T) -> Self {
        Self {
            start: Bounds::splat(value),
            end: Bounds::splat(value),
        }
    }

    /// Fixed start value interpolating to a fixed end value.
    pub fn fixed(start: T, end: T) -> Self {
        Self {
            start: Bounds::splat(start),
            end: Bounds::splat(end),
        }
    }
}
