//! Scripted run of the squad arena.
//!
//! Run with: cargo run --example arena_demo
//! Set `RUST_LOG=squad_arena_sim=debug` to see spawns and reloads.

use squad_arena_sim::{ArenaSim, ControlScheme, ClientCapabilities, Direction, InputDevice, MissionIntel};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Squad Arena - Simulation Demo ===\n");

    let caps = ClientCapabilities {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64)".to_string(),
        max_touch_points: 0,
    };
    let mut device = InputDevice::for_scheme(ControlScheme::detect(&caps));

    let mut sim = ArenaSim::new();
    let intel = MissionIntel::resolve(None);
    println!("{}\n  {}\n  Objective: {}\n", intel.operation_name, intel.briefing, intel.objective);
    sim.start_mission(intel);

    // One minute at 60 frames per second.
    for frame in 0..3600u32 {
        if let InputDevice::PointerAndKeys(keys) = &mut device {
            // Strafe left and right in four-second legs while sweeping the pointer.
            let leg = (frame / 240) % 2 == 0;
            keys.set_key(Direction::Left, leg);
            keys.set_key(Direction::Right, !leg);
            let sweep = frame as f32 * 0.02;
            keys.pointer_moved(glam::Vec2::new(640.0 + 400.0 * sweep.cos(), 360.0 + 300.0 * sweep.sin()));
            keys.set_button(true);
        }
        sim.set_input(device.snapshot());

        let snapshot = sim.snapshot();
        if snapshot.player.as_ref().is_some_and(|p| p.ammo == 0) {
            sim.request_reload();
        }

        sim.step(1000.0 / 60.0);

        let events = sim.events();
        if let Some(wave) = events.wave_changed {
            println!("--- Wave {wave} ---");
        }
        if events.game_over {
            println!("--- Squad leader down at tick {} ---", sim.current_tick());
            break;
        }

        if (frame + 1) % 600 == 0 {
            print_snapshot(&mut sim);
        }
    }

    println!("\n=== After Action Report ===");
    println!("  Score: {}  Wave: {}  Ticks: {}", sim.score(), sim.wave(), sim.current_tick());
}

fn print_snapshot(sim: &mut ArenaSim) {
    let snapshot = sim.snapshot();
    println!("--- Tick {} (t={:.1}s) ---", snapshot.tick, snapshot.time_ms / 1000.0);
    if let Some(player) = &snapshot.player {
        println!(
            "  Player: pos=({:.1}, {:.1}) hp={:.1} ammo={}/{}{} score={}",
            player.x,
            player.y,
            player.health,
            player.ammo,
            player.ammo_max,
            if player.reloading { " [reloading]" } else { "" },
            player.score
        );
    }
    for ally in &snapshot.allies {
        println!(
            "  Ally {}: pos=({:.1}, {:.1}) hp={:.1} [{}]",
            ally.slot, ally.x, ally.y, ally.health, ally.state
        );
    }
    println!(
        "  Enemies: {}  Bullets: {}  Particles: {}",
        snapshot.enemies.len(),
        snapshot.bullets.len(),
        snapshot.particles.len()
    );
}
