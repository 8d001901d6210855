//! Full-tick benchmarks for the arena simulation.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use squad_arena_sim::{Aim, ArenaSim, EnemyKind, InputSnapshot, MissionIntel};

fn busy_arena(enemies: usize) -> ArenaSim {
    let mut sim = ArenaSim::new();
    sim.start_mission(MissionIntel::default());
    sim.set_spawning(false);
    for i in 0..enemies {
        let x = (i % 40) as f32 * 32.0;
        let y = -50.0 - (i / 40) as f32 * 30.0;
        sim.spawn_enemy(EnemyKind::Grunt, x, y);
    }
    sim.set_input(InputSnapshot {
        aim: Aim::Angle(-1.2),
        fire: true,
        ..Default::default()
    });
    sim
}

fn bench_tick(c: &mut Criterion) {
    for enemies in [0usize, 100, 500] {
        c.bench_function(&format!("tick_{enemies}_enemies"), |b| {
            b.iter_batched_ref(
                || busy_arena(enemies),
                |sim| sim.step(black_box(16.0)),
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_snapshot(c: &mut Criterion) {
    let mut sim = busy_arena(200);
    for _ in 0..30 {
        sim.step(16.0);
    }
    c.bench_function("snapshot_json_200_enemies", |b| b.iter(|| black_box(sim.snapshot_json())));
}

criterion_group!(benches, bench_tick, bench_snapshot);
criterion_main!(benches);
