use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use jungle_speed::{GameEngine, PlayerId};

/// Helper to create a dealt game with N players
fn setup_game_with_players(n_players: usize) -> (GameEngine, Vec<PlayerId>) {
    let mut game = GameEngine::new();
    let ids: Vec<PlayerId> = (0..n_players)
        .map(|i| PlayerId::new(format!("player{i}")))
        .collect();
    for id in &ids {
        game.join(id.clone(), id.as_str().into()).unwrap();
    }
    game.start_game().unwrap();
    (game, ids)
}

/// Benchmark dealing a fresh round
fn bench_start_game(c: &mut Criterion) {
    let mut group = c.benchmark_group("start_game");
    for n_players in [2, 3, 4] {
        group.bench_with_input(
            BenchmarkId::from_parameter(n_players),
            &n_players,
            |b, &n| {
                let (mut game, _) = setup_game_with_players(n);
                b.iter(|| game.start_game().unwrap());
            },
        );
    }
    group.finish();
}

/// Benchmark a full pass of draws around the table
fn bench_draw_round(c: &mut Criterion) {
    c.bench_function("draw_round_4_players", |b| {
        b.iter_batched(
            || setup_game_with_players(4),
            |(mut game, _)| {
                for _ in 0..4 {
                    let current = game.current_player().map(|p| p.id.clone());
                    if let Some(id) = current {
                        let _ = game.draw(&id);
                    }
                }
                game
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark grab resolution after a few draws
fn bench_grab(c: &mut Criterion) {
    c.bench_function("grab_after_draws", |b| {
        b.iter_batched(
            || {
                let (mut game, ids) = setup_game_with_players(4);
                for _ in 0..8 {
                    let current = game.current_player().map(|p| p.id.clone());
                    if let Some(id) = current {
                        let _ = game.draw(&id);
                    }
                }
                (game, ids)
            },
            |(mut game, ids)| {
                let _ = game.grab_bottle(&ids[0]);
                game
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark snapshot creation for broadcast
fn bench_snapshot(c: &mut Criterion) {
    let (game, _) = setup_game_with_players(4);
    c.bench_function("snapshot_4_players", |b| {
        b.iter(|| game.snapshot());
    });
}

criterion_group!(
    benches,
    bench_start_game,
    bench_draw_round,
    bench_grab,
    bench_snapshot
);
criterion_main!(benches);
