use glam::{Vec2, Vec4};
use rand::{thread_rng, Rng};

use crate::config::{EmitterConfig, LaunchMode};
use crate::particle::{BlendMode, CollisionSides, EmitterParticle, Particle};
use crate::pool::ParticlePool;
use crate::range::{Bounds, RangeBounds};

/// Transient emission bookkeeping, reset on every [`Emitter::start`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionState {
    /// Whether particles are being emitted this step.
    pub emitting: bool,
    /// Burst mode: emit everything in one step instead of streaming.
    pub explode: bool,
    /// Stream accumulator while emitting, retirement clock afterwards.
    pub timer: f32,
    /// Seconds between stream emissions. Zero or less streams one per step.
    pub frequency: f32,
    /// Remaining requested emissions. Zero means unbounded.
    pub quantity: u32,
    /// Particles emitted since the current `start`.
    pub counter: u32,
    /// Set once emission ends, until every particle has had time to expire.
    pub wait_for_kill: bool,
}

/// A pooled particle emitter.
///
/// The emitter decides when particles are born and what initial and
/// end-state values they are born with. Rendering, collision response, and
/// the driving game loop are external; they call [`step`](Self::step) once
/// per frame and read the pool.
pub struct Emitter<P: EmitterParticle = Particle> {
    /// Left edge of the spawn region.
    pub x: f32,
    /// Top edge of the spawn region.
    pub y: f32,
    /// Width of the spawn region. Zero collapses spawning to a point.
    pub width: f32,
    /// Height of the spawn region.
    pub height: f32,
    active: bool,
    visible: bool,
    config: EmitterConfig,
    state: EmissionState,
    pool: ParticlePool<P>,
}

impl<P: EmitterParticle> Emitter<P> {
    /// Create an idle emitter whose pool is capped at `max_size` particles
    /// (0 = unbounded).
    pub fn new(max_size: usize) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            active: false,
            visible: false,
            config: EmitterConfig::default(),
            state: EmissionState::default(),
            pool: ParticlePool::new(max_size),
        }
    }

    /// Pre-populate the pool with `count` dead particles.
    pub fn make_particles(&mut self, count: usize) -> &mut Self {
        self.pool.make_particles(count);
        self
    }

    /// (Re)activate the emitter.
    ///
    /// `quantity` is added to any still-pending quantity rather than
    /// replacing it, so repeated calls without an intervening stop stack.
    /// A quantity of 0 streams forever, or in explode mode bursts the whole
    /// current pool.
    pub fn start(&mut self, explode: bool, frequency: f32, quantity: u32) -> &mut Self {
        log::debug!(
            "emitter start: explode={}, frequency={}, quantity={}",
            explode,
            frequency,
            quantity
        );
        self.active = true;
        self.visible = true;
        self.state.emitting = true;
        self.state.explode = explode;
        self.state.frequency = frequency;
        self.state.quantity += quantity;
        self.state.counter = 0;
        self.state.timer = 0.0;
        self.state.wait_for_kill = false;
        self
    }

    /// Advance the emitter by `dt` seconds. Called once per frame.
    pub fn step(&mut self, dt: f32) {
        if self.state.emitting {
            if self.state.explode {
                self.burst();
            } else {
                self.stream(dt);
            }
        } else if self.state.wait_for_kill {
            self.state.timer += dt;
            let max_life = self.config.lifespan.max;
            if max_life > 0.0 && self.state.timer > max_life {
                log::debug!("emitter auto-retired after {:.2}s", self.state.timer);
                self.kill();
                return;
            }
        }

        self.pool.update(dt);
    }

    /// Stop emitting without touching pooled particles.
    pub fn stop(&mut self) {
        self.state.emitting = false;
        self.state.wait_for_kill = false;
    }

    /// Stop, hide, and kill every pooled particle.
    pub fn kill(&mut self) {
        self.stop();
        self.active = false;
        self.visible = false;
        self.pool.kill_all();
    }

    /// Emit a single particle right now.
    ///
    /// Returns `false` when the pool cannot supply a particle, in which
    /// case the attempt is aborted.
    pub fn emit_one(&mut self) -> bool {
        let origin = Vec2::new(self.x, self.y);
        let size = Vec2::new(self.width, self.height);
        let config = &self.config;
        let mut rng = thread_rng();

        match self.pool.recycle() {
            Some(particle) => {
                initialize_particle(particle, origin, size, config, &mut rng);
                true
            }
            None => {
                log::trace!("particle pool exhausted, emission skipped");
                false
            }
        }
    }

    /// Recenter the spawn region on a point.
    pub fn focus_on(&mut self, midpoint_x: f32, midpoint_y: f32) {
        self.x = midpoint_x - self.width * 0.5;
        self.y = midpoint_y - self.height * 0.5;
    }

    pub fn set_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn set_size(&mut self, width: f32, height: f32) -> &mut Self {
        self.width = width;
        self.height = height;
        self
    }

    fn burst(&mut self) {
        self.state.emitting = false;
        self.state.wait_for_kill = true;

        let pooled = self.pool.len() as u32;
        let amount = if self.state.quantity == 0 || self.state.quantity > pooled {
            pooled
        } else {
            self.state.quantity
        };

        for _ in 0..amount {
            if !self.emit_one() {
                break;
            }
            self.state.counter += 1;
        }

        self.state.quantity = 0;
    }

    fn stream(&mut self, dt: f32) {
        if self.state.frequency <= 0.0 {
            self.emit_counted();
        } else {
            self.state.timer += dt;
            while self.state.emitting && self.state.timer > self.state.frequency {
                self.state.timer -= self.state.frequency;
                self.emit_counted();
            }
        }
    }

    fn emit_counted(&mut self) {
        if !self.emit_one() {
            return;
        }

        self.state.counter += 1;
        if self.state.quantity > 0 && self.state.counter >= self.state.quantity {
            self.state.emitting = false;
            self.state.wait_for_kill = true;
            self.state.quantity = 0;
        }
    }

    pub fn is_emitting(&self) -> bool {
        self.state.emitting
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> &EmissionState {
        &self.state
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn pool(&self) -> &ParticlePool<P> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ParticlePool<P> {
        &mut self.pool
    }

    // Configuration setters. Each replaces the corresponding sampling range
    // for particles emitted from now on.

    /// Replace the whole configuration at once, e.g. one loaded from a file.
    pub fn set_config(&mut self, config: EmitterConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn set_launch_mode(&mut self, mode: LaunchMode) -> &mut Self {
        self.config.launch_mode = mode;
        self
    }

    pub fn set_velocity(&mut self, velocity: RangeBounds<Vec2>) -> &mut Self {
        self.config.velocity = velocity;
        self
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: RangeBounds<f32>) -> &mut Self {
        self.config.angular_velocity = angular_velocity;
        self
    }

    pub fn set_angle(&mut self, angle: RangeBounds<f32>) -> &mut Self {
        self.config.angle = angle;
        self
    }

    pub fn set_ignore_angular_velocity(&mut self, ignore: bool) -> &mut Self {
        self.config.ignore_angular_velocity = ignore;
        self
    }

    pub fn set_launch_angle(&mut self, launch_angle: Bounds<f32>) -> &mut Self {
        self.config.launch_angle = launch_angle;
        self
    }

    pub fn set_lifespan(&mut self, lifespan: Bounds<f32>) -> &mut Self {
        self.config.lifespan = lifespan;
        self
    }

    pub fn set_scale(&mut self, scale: RangeBounds<Vec2>) -> &mut Self {
        self.config.scale = scale;
        self
    }

    pub fn set_keep_scale_ratio(&mut self, keep: bool) -> &mut Self {
        self.config.keep_scale_ratio = keep;
        self
    }

    pub fn set_alpha(&mut self, alpha: RangeBounds<f32>) -> &mut Self {
        self.config.alpha = alpha;
        self
    }

    pub fn set_color(&mut self, color: RangeBounds<Vec4>) -> &mut Self {
        self.config.color = color;
        self
    }

    pub fn set_drag(&mut self, drag: RangeBounds<Vec2>) -> &mut Self {
        self.config.drag = drag;
        self
    }

    pub fn set_acceleration(&mut self, acceleration: RangeBounds<Vec2>) -> &mut Self {
        self.config.acceleration = acceleration;
        self
    }

    pub fn set_elasticity(&mut self, elasticity: RangeBounds<f32>) -> &mut Self {
        self.config.elasticity = elasticity;
        self
    }

    pub fn set_immovable(&mut self, immovable: bool) -> &mut Self {
        self.config.immovable = immovable;
        self
    }

    pub fn set_auto_update_hitbox(&mut self, auto: bool) -> &mut Self {
        self.config.auto_update_hitbox = auto;
        self
    }

    pub fn set_allow_collisions(&mut self, sides: CollisionSides) -> &mut Self {
        self.config.allow_collisions = sides;
        self
    }

    pub fn set_blend(&mut self, blend: BlendMode) -> &mut Self {
        self.config.blend = blend;
        self
    }
}

/// Sample every configured attribute and write it onto one recycled
/// particle. Each attribute is sampled independently per call, x and y
/// separately, except where circle launch requires one shared angle.
fn initialize_particle<P: EmitterParticle>(
    particle: &mut P,
    origin: Vec2,
    size: Vec2,
    config: &EmitterConfig,
    rng: &mut impl Rng,
) {
    let spawn_x = origin.x + rng.gen::<f32>() * size.x;
    let spawn_y = origin.y + rng.gen::<f32>() * size.y;
    particle.reset(spawn_x, spawn_y);

    let body = particle.body_mut();
    body.lifespan = config.lifespan.sample(rng);

    match config.launch_mode {
        LaunchMode::Square => {
            let start = config.velocity.start.sample(rng);
            let end = config.velocity.end.sample(rng);
            body.velocity_range.set(start, end);
        }
        LaunchMode::Circle => {
            // One launch angle couples start and end direction; the two
            // speeds come from the magnitudes of independent samples.
            let launch = config.launch_angle.sample(rng);
            let direction = Vec2::from_angle(launch);
            let start_speed = config.velocity.start.sample(rng).length();
            let end_speed = config.velocity.end.sample(rng).length();
            body.velocity_range
                .set(direction * start_speed, direction * end_speed);
        }
    }
    body.velocity = body.velocity_range.start;

    let start_angle = config.angle.start.sample(rng);
    if config.ignore_angular_velocity {
        let end_angle = config.angle.end.sample(rng);
        body.angular_velocity_range.set(0.0, 0.0);
        body.angular_velocity = if body.lifespan > 0.0 {
            (end_angle - start_angle) / body.lifespan
        } else {
            0.0
        };
    } else {
        let start = config.angular_velocity.start.sample(rng);
        let end = config.angular_velocity.end.sample(rng);
        body.angular_velocity_range.set(start, end);
        body.angular_velocity = start;
    }
    body.angle = start_angle;

    let mut scale_start = config.scale.start.sample(rng);
    let mut scale_end = config.scale.end.sample(rng);
    if config.keep_scale_ratio {
        scale_start.y = scale_start.x;
        scale_end.y = scale_end.x;
    }
    body.scale_range.set(scale_start, scale_end);
    body.scale = scale_start;

    body.alpha_range
        .set(config.alpha.start.sample(rng), config.alpha.end.sample(rng));
    body.alpha = body.alpha_range.start;

    body.color_range.set(
        config.color.start.sample_blend(rng),
        config.color.end.sample_blend(rng),
    );
    body.color = body.color_range.start;

    body.drag_range
        .set(config.drag.start.sample(rng), config.drag.end.sample(rng));
    body.drag = body.drag_range.start;

    body.acceleration_range.set(
        config.acceleration.start.sample(rng),
        config.acceleration.end.sample(rng),
    );
    body.acceleration = body.acceleration_range.start;

    body.elasticity_range.set(
        config.elasticity.start.sample(rng),
        config.elasticity.end.sample(rng),
    );
    body.elasticity = body.elasticity_range.start;

    body.immovable = config.immovable;
    body.allow_collisions = config.allow_collisions;
    body.solid = !config.allow_collisions.is_empty();
    body.auto_update_hitbox = config.auto_update_hitbox;
    body.blend = config.blend;

    particle.on_spawn();
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_3;

    fn test_emitter(pool_size: usize) -> Emitter {
        let mut emitter = Emitter::new(pool_size);
        emitter.make_particles(pool_size);
        emitter
    }

    #[test]
    fn test_degenerate_ranges_fix_start_and_activity() {
        let mut emitter = test_emitter(1);
        let v1 = Vec2::new(10.0, -4.0);
        let v2 = Vec2::new(-6.0, 2.0);
        emitter.set_velocity(RangeBounds::fixed(v1, v2));
        emitter.set_alpha(RangeBounds::splat(0.8));

        assert!(emitter.emit_one());
        let particle = emitter.pool().iter_alive().next().unwrap();

        assert_eq!(particle.velocity, v1);
        assert!(particle.velocity_range.active);
        assert_eq!(particle.alpha, 0.8);
        assert!(!particle.alpha_range.active);
    }

    #[test]
    fn test_explode_unbounded_quantity_empties_pool() {
        let mut emitter = test_emitter(16);
        emitter.start(true, 0.0, 0);
        emitter.step(0.0);

        assert_eq!(emitter.pool().alive_count(), 16);
        assert!(!emitter.is_emitting());
        assert!(emitter.state().wait_for_kill);
        assert_eq!(emitter.state().quantity, 0);
    }

    #[test]
    fn test_explode_quantity_capped_by_pool() {
        let mut emitter = test_emitter(8);
        emitter.start(true, 0.0, 100);
        emitter.step(0.0);
        assert_eq!(emitter.pool().alive_count(), 8);

        let mut emitter = test_emitter(8);
        emitter.start(true, 0.0, 3);
        emitter.step(0.0);
        assert_eq!(emitter.pool().alive_count(), 3);
    }

    #[test]
    fn test_stream_catch_up_over_large_dt() {
        let mut emitter = test_emitter(64);
        emitter.set_lifespan(Bounds::splat(100.0));
        emitter.start(false, 0.1, 0);
        emitter.step(1.05);

        assert_eq!(emitter.pool().alive_count(), 10);
        assert!(emitter.state().timer >= 0.0);
        assert!(emitter.state().timer < 0.1);
    }

    #[test]
    fn test_zero_frequency_streams_one_per_step() {
        let mut emitter = test_emitter(64);
        emitter.set_lifespan(Bounds::splat(100.0));
        emitter.start(false, 0.0, 0);

        for _ in 0..5 {
            emitter.step(1.0 / 60.0);
        }
        assert_eq!(emitter.pool().alive_count(), 5);
    }

    #[test]
    fn test_start_stacks_pending_quantity() {
        let mut emitter = test_emitter(64);
        emitter.start(false, 0.1, 5);
        emitter.start(false, 0.1, 5);

        assert_eq!(emitter.state().quantity, 10);
    }

    #[test]
    fn test_bounded_stream_stops_after_quantity() {
        let mut emitter = test_emitter(64);
        emitter.set_lifespan(Bounds::splat(100.0));
        emitter.start(false, 0.01, 5);
        emitter.step(1.0);

        assert_eq!(emitter.pool().alive_count(), 5);
        assert!(!emitter.is_emitting());
        assert!(emitter.state().wait_for_kill);
        assert_eq!(emitter.state().quantity, 0);
    }

    #[test]
    fn test_circle_launch_couples_angle_and_speed() {
        let mut emitter = test_emitter(1);
        let theta = FRAC_PI_3;
        emitter.set_launch_mode(LaunchMode::Circle);
        emitter.set_launch_angle(Bounds::splat(theta));
        // Fixed (3, 4) start sample gives speed 5; (6, 8) end gives 10.
        emitter.set_velocity(RangeBounds::fixed(
            Vec2::new(3.0, 4.0),
            Vec2::new(6.0, 8.0),
        ));

        assert!(emitter.emit_one());
        let particle = emitter.pool().iter_alive().next().unwrap();

        let speed = particle.velocity.length();
        assert!((speed - 5.0).abs() < 1e-4);
        assert!((particle.velocity.y.atan2(particle.velocity.x) - theta).abs() < 1e-5);

        assert!((particle.velocity_range.end.length() - 10.0).abs() < 1e-4);
        let end_dir = particle.velocity_range.end.normalize();
        assert!((end_dir.y.atan2(end_dir.x) - theta).abs() < 1e-5);
        assert!(particle.velocity_range.active);
    }

    #[test]
    fn test_ignore_angular_velocity_derives_constant_rate() {
        let mut emitter = test_emitter(1);
        emitter.set_ignore_angular_velocity(true);
        emitter.set_lifespan(Bounds::splat(2.0));
        emitter.set_angle(RangeBounds::fixed(0.5, 1.5));

        assert!(emitter.emit_one());
        let particle = emitter.pool().iter_alive().next().unwrap();

        assert!((particle.angular_velocity - 0.5).abs() < 1e-6);
        assert!(!particle.angular_velocity_range.active);
        assert_eq!(particle.angle, 0.5);
    }

    #[test]
    fn test_idle_step_zero_is_noop() {
        let mut emitter = test_emitter(4);
        let before = *emitter.state();

        for _ in 0..10 {
            emitter.step(0.0);
        }

        let after = emitter.state();
        assert_eq!(before.timer, after.timer);
        assert_eq!(before.counter, after.counter);
        assert_eq!(emitter.pool().alive_count(), 0);
    }

    #[test]
    fn test_wait_for_kill_auto_retires_once() {
        let mut emitter = test_emitter(4);
        emitter.set_lifespan(Bounds::new(0.1, 0.5));
        emitter.start(true, 0.0, 0);
        emitter.step(0.0);
        assert!(emitter.state().wait_for_kill);

        // Accumulate past lifespan.max; the emitter must fully deactivate.
        emitter.step(0.3);
        assert!(emitter.active());
        emitter.step(0.3);

        assert!(!emitter.active());
        assert!(!emitter.visible());
        assert!(!emitter.state().wait_for_kill);
        assert_eq!(emitter.pool().alive_count(), 0);

        // Further steps are inert; retirement fires only once.
        emitter.step(1.0);
        assert!(!emitter.active());
    }

    #[test]
    fn test_spawn_region_contains_particles() {
        let mut emitter = test_emitter(32);
        emitter.set_position(100.0, 200.0);
        emitter.set_size(50.0, 10.0);
        emitter.start(true, 0.0, 0);
        emitter.step(0.0);

        for particle in emitter.pool().iter_alive() {
            assert!((100.0..150.0).contains(&particle.position.x));
            assert!((200.0..210.0).contains(&particle.position.y));
        }
    }

    #[test]
    fn test_focus_on_recenters_region() {
        let mut emitter: Emitter = Emitter::new(1);
        emitter.set_size(40.0, 20.0);
        emitter.focus_on(100.0, 50.0);

        assert_eq!(emitter.x, 80.0);
        assert_eq!(emitter.y, 40.0);
    }

    #[test]
    fn test_flags_copied_onto_particle() {
        let mut emitter = test_emitter(1);
        emitter.set_immovable(true);
        emitter.set_allow_collisions(CollisionSides::ANY);
        emitter.set_auto_update_hitbox(true);
        emitter.set_blend(BlendMode::Add);

        assert!(emitter.emit_one());
        let particle = emitter.pool().iter_alive().next().unwrap();

        assert!(particle.immovable);
        assert!(particle.solid);
        assert_eq!(particle.allow_collisions, CollisionSides::ANY);
        assert!(particle.auto_update_hitbox);
        assert_eq!(particle.blend, BlendMode::Add);
    }

    #[test]
    fn test_non_colliding_particle_is_not_solid() {
        let mut emitter = test_emitter(1);
        emitter.set_allow_collisions(CollisionSides::empty());

        assert!(emitter.emit_one());
        let particle = emitter.pool().iter_alive().next().unwrap();
        assert!(!particle.solid);
    }

    #[test]
    fn test_keep_scale_ratio() {
        let mut emitter = test_emitter(1);
        emitter.set_keep_scale_ratio(true);
        emitter.set_scale(RangeBounds::new(
            Bounds::new(Vec2::new(0.5, 9.0), Vec2::new(2.0, 9.0)),
            Bounds::new(Vec2::new(0.5, 9.0), Vec2::new(2.0, 9.0)),
        ));

        assert!(emitter.emit_one());
        let particle = emitter.pool().iter_alive().next().unwrap();

        assert_eq!(particle.scale.x, particle.scale.y);
        assert_eq!(particle.scale_range.end.x, particle.scale_range.end.y);
    }

    #[test]
    fn test_color_endpoints_fixed_when_collapsed() {
        let mut emitter = test_emitter(1);
        let c1 = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let c2 = Vec4::new(0.0, 0.0, 1.0, 0.0);
        emitter.set_color(RangeBounds::fixed(c1, c2));

        assert!(emitter.emit_one());
        let particle = emitter.pool().iter_alive().next().unwrap();

        assert_eq!(particle.color, c1);
        assert_eq!(particle.color_range.end, c2);
        assert!(particle.color_range.active);
    }

    #[test]
    fn test_emission_aborts_on_exhausted_pool() {
        let mut emitter = test_emitter(2);
        assert!(emitter.emit_one());
        assert!(emitter.emit_one());
        assert!(!emitter.emit_one());
        assert_eq!(emitter.pool().alive_count(), 2);
    }

    #[test]
    fn test_stop_clears_emission_without_killing() {
        let mut emitter = test_emitter(8);
        emitter.set_lifespan(Bounds::splat(100.0));
        emitter.start(false, 0.0, 0);
        emitter.step(1.0 / 60.0);
        assert_eq!(emitter.pool().alive_count(), 1);

        emitter.stop();
        assert!(!emitter.is_emitting());
        assert!(!emitter.state().wait_for_kill);
        assert_eq!(emitter.pool().alive_count(), 1);

        // Particles keep advancing after the emitter stops emitting.
        emitter.step(1.0 / 60.0);
        assert_eq!(emitter.pool().alive_count(), 1);
    }
}
