use bitflags::bitflags;
use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which sides of a particle may collide with its surroundings.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CollisionSides: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
    }
}

impl CollisionSides {
    /// All four sides.
    pub const ANY: Self = Self::all();
}

/// How a particle is composited when drawn by an external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Multiply,
    Screen,
}

/// A resolved start/end interpolation for one particle attribute.
///
/// `active` is decided by exact equality of the sampled endpoints. Two
/// independently-sampled floats almost never compare equal, so in practice
/// interpolation only deactivates when both sampling ranges were collapsed
/// to the same single value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PropertyRange<T> {
    pub start: T,
    pub end: T,
    pub active: bool,
}

impl<T: Copy + PartialEq> PropertyRange<T> {
    /// Store the endpoints and recompute `active`.
    pub fn set(&mut self, start: T, end: T) {
        self.start = start;
        self.end = end;
        self.active = start != end;
    }
}

impl<T: Lerp + PartialEq> PropertyRange<T> {
    /// Value at `t` in `[0, 1]` along the start..end segment.
    pub fn at(&self, t: f32) -> T {
        self.start.lerp_by(self.end, t)
    }
}

/// Linear interpolation between two values of the same type.
pub trait Lerp: Copy {
    fn lerp_by(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_by(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp_by(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

impl Lerp for Vec4 {
    fn lerp_by(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

/// Capability interface an emitter needs from a pooled particle.
///
/// The default [`Particle`] implements it directly; custom particle types
/// embed a `Particle` body and forward to it, adding whatever extra state
/// their renderer needs.
pub trait EmitterParticle: Default {
    fn body(&self) -> &Particle;
    fn body_mut(&mut self) -> &mut Particle;

    /// Revive at a position with all attributes back at their defaults.
    fn reset(&mut self, x: f32, y: f32) {
        self.body_mut().reset(x, y);
    }

    /// Advance lifetime, interpolation, and motion by `dt` seconds.
    fn update(&mut self, dt: f32) {
        self.body_mut().advance(dt);
    }

    /// Called once after the emitter has finished initializing this
    /// particle, so dependent state (e.g. a hitbox) can react.
    fn on_spawn(&mut self) {}

    fn is_alive(&self) -> bool {
        self.body().is_alive()
    }

    fn kill(&mut self) {
        self.body_mut().kill();
    }
}

/// A pooled 2D particle.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Position in world space.
    pub position: Vec2,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Acceleration in units per second squared.
    pub acceleration: Vec2,
    /// Per-axis deceleration applied where acceleration is zero.
    pub drag: Vec2,
    /// Rotation rate in radians per second.
    pub angular_velocity: f32,
    /// Rotation in radians.
    pub angle: f32,
    /// Render scale per axis.
    pub scale: Vec2,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// RGBA tint.
    pub color: Vec4,
    /// Bounciness used by external collision response.
    pub elasticity: f32,
    /// Total time to live in seconds. Zero means immortal.
    pub lifespan: f32,
    /// Seconds lived so far.
    pub age: f32,
    /// Velocity interpolation over the lifetime.
    pub velocity_range: PropertyRange<Vec2>,
    /// Angular velocity interpolation over the lifetime.
    pub angular_velocity_range: PropertyRange<f32>,
    /// Scale interpolation over the lifetime.
    pub scale_range: PropertyRange<Vec2>,
    /// Alpha interpolation over the lifetime.
    pub alpha_range: PropertyRange<f32>,
    /// Color interpolation over the lifetime.
    pub color_range: PropertyRange<Vec4>,
    /// Drag interpolation over the lifetime.
    pub drag_range: PropertyRange<Vec2>,
    /// Acceleration interpolation over the lifetime.
    pub acceleration_range: PropertyRange<Vec2>,
    /// Elasticity interpolation over the lifetime.
    pub elasticity_range: PropertyRange<f32>,
    /// Immovable particles skip motion integration.
    pub immovable: bool,
    /// Whether external collision checks should consider this particle.
    pub solid: bool,
    /// Collision side mask copied from the emitter.
    pub allow_collisions: CollisionSides,
    /// Whether the renderer should refresh the hitbox after spawn.
    pub auto_update_hitbox: bool,
    /// Compositing mode copied from the emitter.
    pub blend: BlendMode,
    alive: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            drag: Vec2::ZERO,
            angular_velocity: 0.0,
            angle: 0.0,
            scale: Vec2::ONE,
            alpha: 1.0,
            color: Vec4::ONE,
            elasticity: 0.0,
            lifespan: 0.0,
            age: 0.0,
            velocity_range: PropertyRange::default(),
            angular_velocity_range: PropertyRange::default(),
            scale_range: PropertyRange::default(),
            alpha_range: PropertyRange::default(),
            color_range: PropertyRange::default(),
            drag_range: PropertyRange::default(),
            acceleration_range: PropertyRange::default(),
            elasticity_range: PropertyRange::default(),
            immovable: false,
            solid: false,
            allow_collisions: CollisionSides::empty(),
            auto_update_hitbox: false,
            blend: BlendMode::Normal,
            alive: false,
        }
    }
}

impl Particle {
    /// Revive this particle at a position with default attributes.
    pub fn reset(&mut self, x: f32, y: f32) {
        *self = Self {
            position: Vec2::new(x, y),
            alive: true,
            ..Self::default()
        };
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn revive(&mut self) {
        self.alive = true;
    }

    /// Fraction of the lifespan already lived, in `[0, 1]`.
    pub fn lifetime_percent(&self) -> f32 {
        if self.lifespan > 0.0 {
            (self.age / self.lifespan).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Advance lifetime, active interpolations, then motion.
    pub fn advance(&mut self, dt: f32) {
        if !self.alive {
            return;
        }

        self.age += dt;
        if self.lifespan > 0.0 && self.age >= self.lifespan {
            self.kill();
            return;
        }

        if self.lifespan > 0.0 {
            let t = self.age / self.lifespan;

            if self.velocity_range.active {
                self.velocity = self.velocity_range.at(t);
            }
            if self.angular_velocity_range.active {
                self.angular_velocity = self.angular_velocity_range.at(t);
            }
            if self.scale_range.active {
                self.scale = self.scale_range.at(t);
            }
            if self.alpha_range.active {
                self.alpha = self.alpha_range.at(t);
            }
            if self.color_range.active {
                self.color = self.color_range.at(t);
            }
            if self.drag_range.active {
                self.drag = self.drag_range.at(t);
            }
            if self.acceleration_range.active {
                self.acceleration = self.acceleration_range.at(t);
            }
            if self.elasticity_range.active {
                self.elasticity = self.elasticity_range.at(t);
            }
        }

        if !self.immovable {
            self.velocity.x = step_axis(self.velocity.x, self.acceleration.x, self.drag.x, dt);
            self.velocity.y = step_axis(self.velocity.y, self.acceleration.y, self.drag.y, dt);
            self.position += self.velocity * dt;
            self.angle += self.angular_velocity * dt;
        }
    }
}

impl EmitterParticle for Particle {
    fn body(&self) -> &Particle {
        self
    }

    fn body_mut(&mut self) -> &mut Particle {
        self
    }
}

/// Integrate one velocity axis. Drag only decelerates toward zero and only
/// on axes with no acceleration, so accelerated motion is never damped.
fn step_axis(velocity: f32, acceleration: f32, drag: f32, dt: f32) -> f32 {
    if acceleration != 0.0 {
        velocity + acceleration * dt
    } else if drag != 0.0 {
        let d = drag * dt;
        if velocity - d > 0.0 {
            velocity - d
        } else if velocity + d < 0.0 {
            velocity + d
        } else {
            0.0
        }
    } else {
        velocity
    }
}
