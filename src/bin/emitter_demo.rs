use anyhow::Result;
use ember2d::{EffectPreset, Emitter, EmitterConfig, ParticleEffect};

const STEP: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== ember2d headless emitter demo ===\n");

    // With a path argument, simulate an emitter loaded from a JSON config
    // instead of the built-in presets.
    if let Some(path) = std::env::args().nth(1) {
        let config = EmitterConfig::load_json(&path)?;
        run_config(config);
        return Ok(());
    }

    run_preset(EffectPreset::Fountain, 600);
    run_preset(EffectPreset::Explosion, 240);
    run_preset(EffectPreset::Smoke, 600);
    run_preset(EffectPreset::Sparks, 300);
    run_preset(EffectPreset::Confetti, 400);
    run_preset(EffectPreset::Snowfall, 600);

    Ok(())
}

fn run_preset(preset: EffectPreset, steps: usize) {
    let mut effect = ParticleEffect::from_preset(preset, 0.0, 0.0);
    let name = effect.name.clone();

    let mut peak = 0;
    for _ in 0..steps {
        effect.step(STEP);
        peak = peak.max(effect.alive_particles());
    }

    println!("{name}:");
    println!("  steps simulated: {steps}");
    println!("  peak alive particles: {peak}");
    println!("  alive at end: {}", effect.alive_particles());
    println!("  finished: {}\n", effect.is_finished());
}

fn run_config(config: EmitterConfig) {
    let mut emitter: Emitter = Emitter::new(512);
    emitter.make_particles(512);
    emitter.set_config(config);
    emitter.start(false, 0.01, 0);

    let mut peak = 0;
    for _ in 0..600 {
        emitter.step(STEP);
        peak = peak.max(emitter.pool().alive_count());
    }

    println!("configured emitter:");
    println!("  peak alive particles: {peak}");
    println!("  alive at end: {}", emitter.pool().alive_count());
}
