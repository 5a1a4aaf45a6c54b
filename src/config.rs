use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::particle::{BlendMode, CollisionSides};
use crate::range::{Bounds, RangeBounds};

/// How initial particle velocity is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LaunchMode {
    /// Each velocity component is sampled independently.
    #[default]
    Square,
    /// A launch angle and speed are sampled, then converted to cartesian.
    Circle,
}

/// Errors from loading or saving an [`EmitterConfig`] file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read emitter config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse emitter config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every ranged attribute and scalar flag an emitter samples from.
///
/// Owned by the emitter and mutated through its setters. All angular values
/// are radians, times are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Velocity derivation mode.
    pub launch_mode: LaunchMode,
    /// Start/end velocity ranges. In circle mode the sampled vectors only
    /// contribute their magnitude.
    pub velocity: RangeBounds<Vec2>,
    /// Start/end rotation rate ranges, radians per second.
    pub angular_velocity: RangeBounds<f32>,
    /// Spawn angle range (start) and target angle range (end). The end
    /// range is only consumed when `ignore_angular_velocity` is set.
    pub angle: RangeBounds<f32>,
    /// Replace sampled rotation rates with a constant rate that carries the
    /// particle from its start angle to its end angle over its lifespan.
    pub ignore_angular_velocity: bool,
    /// Launch direction range for circle mode, radians.
    pub launch_angle: Bounds<f32>,
    /// Particle time to live, seconds. A sampled 0 means immortal.
    pub lifespan: Bounds<f32>,
    /// Start/end scale ranges.
    pub scale: RangeBounds<Vec2>,
    /// Reuse the sampled x scale for y, keeping particles square.
    pub keep_scale_ratio: bool,
    /// Start/end opacity ranges.
    pub alpha: RangeBounds<f32>,
    /// Start/end RGBA color ranges.
    pub color: RangeBounds<Vec4>,
    /// Start/end drag ranges (per-axis deceleration).
    pub drag: RangeBounds<Vec2>,
    /// Start/end acceleration ranges.
    pub acceleration: RangeBounds<Vec2>,
    /// Start/end elasticity ranges.
    pub elasticity: RangeBounds<f32>,
    /// Spawned particles skip motion integration.
    pub immovable: bool,
    /// Spawned particles ask the renderer to refresh their hitbox.
    pub auto_update_hitbox: bool,
    /// Collision side mask copied to spawned particles. An empty mask also
    /// marks them non-solid.
    pub allow_collisions: CollisionSides,
    /// Compositing mode copied to spawned particles.
    pub blend: BlendMode,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            launch_mode: LaunchMode::Square,
            velocity: RangeBounds::new(
                Bounds::new(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0)),
                Bounds::new(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0)),
            ),
            angular_velocity: RangeBounds::splat(0.0),
            angle: RangeBounds::splat(0.0),
            ignore_angular_velocity: false,
            launch_angle: Bounds::new(-PI, PI),
            lifespan: Bounds::splat(3.0),
            scale: RangeBounds::splat(Vec2::ONE),
            keep_scale_ratio: false,
            alpha: RangeBounds::splat(1.0),
            color: RangeBounds::splat(Vec4::ONE),
            drag: RangeBounds::splat(Vec2::ZERO),
            acceleration: RangeBounds::splat(Vec2::ZERO),
            elasticity: RangeBounds::splat(0.0),
            immovable: false,
            auto_update_hitbox: false,
            allow_collisions: CollisionSides::empty(),
            blend: BlendMode::Normal,
        }
    }
}

impl EmitterConfig {
    /// Load a config from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        log::debug!("loaded emitter config from {}", path.display());
        Ok(config)
    }

    /// Write this config to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), text)?;
        Ok(())
    }
}
