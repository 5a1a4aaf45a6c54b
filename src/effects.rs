use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Vec2, Vec4};

use crate::config::LaunchMode;
use crate::emitter::Emitter;
use crate::particle::{BlendMode, CollisionSides};
use crate::range::{Bounds, RangeBounds};

/// Pre-configured particle effects built from one or more emitters.
///
/// Coordinates are y-up; presets that fall (snow) use negative y velocity
/// and presets that rise (fountains, smoke) use positive.
pub struct ParticleEffect {
    pub name: String,
    pub emitters: Vec<Emitter>,
}

/// Common effect presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPreset {
    Fountain,
    Explosion,
    Smoke,
    Sparks,
    Confetti,
    Snowfall,
}

impl ParticleEffect {
    /// Build an effect from a preset, already started at `(x, y)`.
    pub fn from_preset(preset: EffectPreset, x: f32, y: f32) -> Self {
        match preset {
            EffectPreset::Fountain => Self::fountain(x, y),
            EffectPreset::Explosion => Self::explosion(x, y),
            EffectPreset::Smoke => Self::smoke(x, y),
            EffectPreset::Sparks => Self::sparks(x, y),
            EffectPreset::Confetti => Self::confetti(x, y),
            EffectPreset::Snowfall => Self::snowfall(x, y),
        }
    }

    /// Water jet shooting upward and pulled back down by gravity.
    fn fountain(x: f32, y: f32) -> Self {
        let mut jet: Emitter = Emitter::new(256);
        jet.make_particles(256);
        jet.set_position(x, y);
        jet.set_launch_mode(LaunchMode::Circle)
            .set_launch_angle(Bounds::new(FRAC_PI_2 - 0.25, FRAC_PI_2 + 0.25))
            .set_velocity(RangeBounds::new(
                Bounds::new(Vec2::new(220.0, 0.0), Vec2::new(320.0, 0.0)),
                Bounds::new(Vec2::new(220.0, 0.0), Vec2::new(320.0, 0.0)),
            ))
            .set_acceleration(RangeBounds::splat(Vec2::new(0.0, -400.0)))
            .set_lifespan(Bounds::new(1.2, 2.0))
            .set_alpha(RangeBounds::fixed(1.0, 0.0))
            .set_color(RangeBounds::splat(Vec4::new(0.5, 0.7, 1.0, 1.0)))
            .set_scale(RangeBounds::splat(Vec2::splat(0.5)));
        jet.start(false, 0.008, 0);

        Self {
            name: "Fountain".to_string(),
            emitters: vec![jet],
        }
    }

    /// Radial burst that decelerates outward and fades.
    fn explosion(x: f32, y: f32) -> Self {
        let mut blast: Emitter = Emitter::new(128);
        blast.make_particles(128);
        blast.set_position(x, y);
        blast
            .set_launch_mode(LaunchMode::Circle)
            .set_launch_angle(Bounds::new(-PI, PI))
            .set_velocity(RangeBounds::new(
                Bounds::new(Vec2::new(100.0, 0.0), Vec2::new(320.0, 0.0)),
                Bounds::splat(Vec2::ZERO),
            ))
            .set_lifespan(Bounds::new(0.4, 0.9))
            .set_alpha(RangeBounds::fixed(1.0, 0.0))
            .set_color(RangeBounds::new(
                Bounds::new(Vec4::new(1.0, 0.9, 0.3, 1.0), Vec4::new(1.0, 0.5, 0.1, 1.0)),
                Bounds::new(Vec4::new(0.6, 0.1, 0.0, 1.0), Vec4::new(0.8, 0.2, 0.0, 1.0)),
            ))
            .set_blend(BlendMode::Add);
        blast.start(true, 0.0, 0);

        Self {
            name: "Explosion".to_string(),
            emitters: vec![blast],
        }
    }

    /// Slow rising puffs that grow and thin out.
    fn smoke(x: f32, y: f32) -> Self {
        let mut puffs: Emitter = Emitter::new(96);
        puffs.make_particles(96);
        puffs.set_position(x, y);
        puffs.set_size(12.0, 4.0);
        puffs
            .set_velocity(RangeBounds::new(
                Bounds::new(Vec2::new(-8.0, 30.0), Vec2::new(8.0, 60.0)),
                Bounds::new(Vec2::new(-20.0, 10.0), Vec2::new(20.0, 25.0)),
            ))
            .set_lifespan(Bounds::new(2.0, 4.0))
            .set_scale(RangeBounds::new(
                Bounds::new(Vec2::splat(0.4), Vec2::splat(0.7)),
                Bounds::new(Vec2::splat(1.6), Vec2::splat(2.4)),
            ))
            .set_keep_scale_ratio(true)
            .set_alpha(RangeBounds::new(Bounds::new(0.4, 0.6), Bounds::splat(0.0)))
            .set_color(RangeBounds::new(
                Bounds::new(Vec4::new(0.25, 0.25, 0.25, 1.0), Vec4::new(0.4, 0.4, 0.4, 1.0)),
                Bounds::new(Vec4::new(0.5, 0.5, 0.5, 1.0), Vec4::new(0.65, 0.65, 0.65, 1.0)),
            ));
        puffs.start(false, 0.05, 0);

        Self {
            name: "Smoke".to_string(),
            emitters: vec![puffs],
        }
    }

    /// A short bounded shower of bouncy sparks.
    fn sparks(x: f32, y: f32) -> Self {
        let mut shower: Emitter = Emitter::new(64);
        shower.make_particles(64);
        shower.set_position(x, y);
        shower
            .set_launch_mode(LaunchMode::Circle)
            .set_launch_angle(Bounds::new(FRAC_PI_2 - 1.0, FRAC_PI_2 + 1.0))
            .set_velocity(RangeBounds::new(
                Bounds::new(Vec2::new(140.0, 0.0), Vec2::new(260.0, 0.0)),
                Bounds::new(Vec2::new(40.0, 0.0), Vec2::new(80.0, 0.0)),
            ))
            .set_acceleration(RangeBounds::splat(Vec2::new(0.0, -500.0)))
            .set_lifespan(Bounds::new(0.5, 1.2))
            .set_elasticity(RangeBounds::fixed(0.6, 0.2))
            .set_allow_collisions(CollisionSides::ANY)
            .set_color(RangeBounds::splat(Vec4::new(1.0, 0.85, 0.4, 1.0)))
            .set_blend(BlendMode::Add);
        shower.start(false, 0.002, 40);

        Self {
            name: "Sparks".to_string(),
            emitters: vec![shower],
        }
    }

    /// Tumbling colored pieces with air resistance.
    fn confetti(x: f32, y: f32) -> Self {
        let mut pieces: Emitter = Emitter::new(200);
        pieces.make_particles(200);
        pieces.set_position(x, y);
        pieces.set_size(30.0, 4.0);
        pieces
            .set_velocity(RangeBounds::new(
                Bounds::new(Vec2::new(-120.0, 140.0), Vec2::new(120.0, 260.0)),
                Bounds::new(Vec2::new(-30.0, -60.0), Vec2::new(30.0, -30.0)),
            ))
            .set_angular_velocity(RangeBounds::new(
                Bounds::new(-12.0, 12.0),
                Bounds::new(-3.0, 3.0),
            ))
            .set_drag(RangeBounds::splat(Vec2::new(40.0, 0.0)))
            .set_acceleration(RangeBounds::splat(Vec2::new(0.0, -240.0)))
            .set_lifespan(Bounds::new(2.0, 3.5))
            .set_color(RangeBounds::new(
                Bounds::new(Vec4::new(1.0, 0.2, 0.2, 1.0), Vec4::new(0.2, 0.4, 1.0, 1.0)),
                Bounds::new(Vec4::new(1.0, 0.8, 0.2, 1.0), Vec4::new(0.3, 1.0, 0.5, 1.0)),
            ))
            .set_keep_scale_ratio(true)
            .set_scale(RangeBounds::splat(Vec2::splat(0.3)));
        pieces.start(false, 0.004, 150);

        Self {
            name: "Confetti".to_string(),
            emitters: vec![pieces],
        }
    }

    /// Wide drifting snowfall.
    fn snowfall(x: f32, y: f32) -> Self {
        let mut flakes: Emitter = Emitter::new(300);
        flakes.make_particles(300);
        flakes.set_position(x - 200.0, y);
        flakes.set_size(400.0, 2.0);
        flakes
            .set_velocity(RangeBounds::new(
                Bounds::new(Vec2::new(-15.0, -60.0), Vec2::new(15.0, -25.0)),
                Bounds::new(Vec2::new(-25.0, -60.0), Vec2::new(25.0, -25.0)),
            ))
            .set_angular_velocity(RangeBounds::splat(0.0))
            .set_lifespan(Bounds::new(4.0, 8.0))
            .set_scale(RangeBounds::new(
                Bounds::new(Vec2::splat(0.15), Vec2::splat(0.4)),
                Bounds::new(Vec2::splat(0.15), Vec2::splat(0.4)),
            ))
            .set_keep_scale_ratio(true)
            .set_alpha(RangeBounds::new(Bounds::new(0.6, 1.0), Bounds::splat(0.0)));
        flakes.start(false, 0.02, 0);

        Self {
            name: "Snowfall".to_string(),
            emitters: vec![flakes],
        }
    }

    /// Advance every emitter by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        for emitter in &mut self.emitters {
            emitter.step(dt);
        }
    }

    /// Living particles across all emitters.
    pub fn alive_particles(&self) -> usize {
        self.emitters.iter().map(|e| e.pool().alive_count()).sum()
    }

    /// Whether every emitter has retired and all particles have expired.
    pub fn is_finished(&self) -> bool {
        self.emitters.iter().all(|e| {
            !e.is_emitting() && !e.state().wait_for_kill && e.pool().alive_count() == 0
        })
    }

    /// Stop all emitters, leaving live particles to expire on their own.
    pub fn stop(&mut self) {
        for emitter in &mut self.emitters {
            emitter.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_emit_particles() {
        let presets = [
            EffectPreset::Fountain,
            EffectPreset::Explosion,
            EffectPreset::Smoke,
            EffectPreset::Sparks,
            EffectPreset::Confetti,
            EffectPreset::Snowfall,
        ];

        for preset in presets {
            let mut effect = ParticleEffect::from_preset(preset, 0.0, 0.0);
            for _ in 0..30 {
                effect.step(1.0 / 60.0);
            }
            assert!(effect.alive_particles() > 0, "{} emitted nothing", effect.name);
        }
    }

    #[test]
    fn test_explosion_finishes() {
        let mut effect = ParticleEffect::from_preset(EffectPreset::Explosion, 0.0, 0.0);

        // Burst happens on the first step; everything expires within the
        // maximum lifespan and the emitter then auto-retires.
        for _ in 0..240 {
            effect.step(1.0 / 60.0);
        }

        assert!(effect.is_finished());
    }

    #[test]
    fn test_fountain_streams_continuously() {
        let mut effect = ParticleEffect::from_preset(EffectPreset::Fountain, 0.0, 0.0);

        for _ in 0..600 {
            effect.step(1.0 / 60.0);
        }

        assert!(!effect.is_finished());
        assert!(effect.alive_particles() > 50);
    }
}
