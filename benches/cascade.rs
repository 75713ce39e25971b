use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hexstack::core::failsafe;
use hexstack::core::{resolve, Board, GameState, RulesConfig, ScoreTracker};
use hexstack::engine::autoplay;
use hexstack::types::{Color, Hex};

fn crowded_board(radius: u8) -> Board {
    let mut board = Board::new(radius);
    let palette = [Color::Red, Color::Green, Color::Blue, Color::Yellow];
    let coords: Vec<Hex> = board.coords().collect();
    for (i, at) in coords.into_iter().enumerate() {
        let height = 1 + i % 4;
        let pile: Vec<Color> = (0..height).map(|k| palette[(i * 3 + k) % 4]).collect();
        let _ = board.set_stack(at, pile);
    }
    board
}

fn bench_resolve_crowded(c: &mut Criterion) {
    let rules = RulesConfig::default();
    let template = crowded_board(4);

    c.bench_function("resolve_crowded_r4", |b| {
        b.iter(|| {
            let mut board = template.clone();
            let mut scoring = ScoreTracker::new(u32::MAX);
            resolve(&mut board, &mut scoring, black_box(Hex::ORIGIN), &rules)
        })
    });
}

fn bench_gather_elimination(c: &mut Criterion) {
    let rules = RulesConfig::default();

    c.bench_function("gather_to_elimination", |b| {
        b.iter(|| {
            let mut board = Board::new(2);
            let mut scoring = ScoreTracker::new(u32::MAX);
            let _ = board.set_stack(Hex::ORIGIN, vec![Color::Red]);
            for at in Hex::ORIGIN.neighbors().into_iter().take(3) {
                let _ = board.set_stack(at, vec![Color::Red; 3]);
            }
            resolve(&mut board, &mut scoring, Hex::ORIGIN, &rules)
        })
    });
}

fn bench_failsafe_scan(c: &mut Criterion) {
    let board = crowded_board(4);

    c.bench_function("failsafe_scan_r4", |b| {
        b.iter(|| failsafe::scan(black_box(&board)))
    });
}

fn bench_autoplay_game(c: &mut Criterion) {
    c.bench_function("autoplay_r3_50_moves", |b| {
        b.iter(|| {
            let mut state = GameState::new(RulesConfig::for_radius(3), black_box(12345)).unwrap();
            let _ = autoplay(&mut state, 50);
            state.score()
        })
    });
}

criterion_group!(
    benches,
    bench_resolve_crowded,
    bench_gather_elimination,
    bench_failsafe_scan,
    bench_autoplay_game
);
criterion_main!(benches);
