//! Pooled 2D particle emitter.
//!
//! An [`Emitter`] decides when particles are born and what start/end values
//! they are born with; attributes are drawn from configurable ranges and
//! interpolated over each particle's lifetime. Rendering and collision
//! response stay outside this crate: drive [`Emitter::step`] once per frame
//! and read the pool.

pub mod config;
pub mod effects;
pub mod emitter;
pub mod particle;
pub mod pool;
pub mod range;

pub use config::{ConfigError, EmitterConfig, LaunchMode};
pub use effects::{EffectPreset, ParticleEffect};
pub use emitter::{EmissionState, Emitter};
pub use particle::{BlendMode, CollisionSides, EmitterParticle, Lerp, Particle, PropertyRange};
pub use pool::ParticlePool;
pub use range::{Bounds, RangeBounds};
