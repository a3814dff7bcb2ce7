use std::hint::black_box;
use std::time::Instant;

use stratavox_common::{BlockKind, BlockPos};
use stratavox_compose::{
    BlockVocabulary, CancelToken, Compositor, Directive, LayerStack, SpawnIsland, StampConfig,
};
use stratavox_kernel::GridBounds;
use stratavox_stream::{MemorySource, OverrideEntry};

fn world_bounds(side: i32) -> GridBounds {
    GridBounds::new(BlockPos::new(0, 0, 0), BlockPos::new(side, 128, side))
}

fn make_overrides(count: usize, side: i32) -> Vec<OverrideEntry> {
    (0..count)
        .map(|i| OverrideEntry {
            pos: BlockPos::new(
                (i as i32 * 7) % side,
                64 + (i as i32 % 40),
                (i as i32 * 13) % side,
            ),
            kind: if i % 5 == 0 {
                BlockKind::None
            } else {
                BlockKind::Sand
            },
        })
        .collect()
}

fn make_directives(side: i32) -> Vec<Directive> {
    (0..16)
        .map(|i| {
            let p = BlockPos::new(8 + i * (side - 24) / 16, 70 + (i % 9), 8 + i * 5);
            match i % 3 {
                0 => Directive::LandscapeColumn(p),
                1 => Directive::MarkerPole(p),
                _ => Directive::WaterPool(p),
            }
        })
        .collect()
}

fn bench_base_fill(side: i32, iterations: usize) {
    let compositor = Compositor::new(BlockVocabulary::new(), StampConfig::default());
    let layers = LayerStack::classic_flat(&StampConfig::default());
    let cancel = CancelToken::new();

    let start = Instant::now();
    for _ in 0..iterations {
        let grid = compositor
            .compose(
                black_box(world_bounds(side)),
                &layers,
                MemorySource::new(Vec::new()),
                &[],
                None,
                &cancel,
            )
            .unwrap();
        black_box(grid);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  base fill ({side}x128x{side}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_override_stream(side: i32, count: usize, iterations: usize) {
    let compositor = Compositor::new(BlockVocabulary::new(), StampConfig::default());
    let layers = LayerStack::classic_flat(&StampConfig::default());
    let entries = make_overrides(count, side);
    let cancel = CancelToken::new();

    let start = Instant::now();
    for _ in 0..iterations {
        let grid = compositor
            .compose(
                world_bounds(side),
                &layers,
                MemorySource::new(black_box(entries.clone())),
                &[],
                None,
                &cancel,
            )
            .unwrap();
        black_box(grid);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  overrides ({count} entries, {side}x128x{side}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_full_composition(side: i32, count: usize, iterations: usize) {
    let compositor = Compositor::new(BlockVocabulary::new(), StampConfig::default());
    let layers = LayerStack::classic_flat(&StampConfig::default());
    let entries = make_overrides(count, side);
    let directives = make_directives(side);
    let island = Some(SpawnIsland {
        center: BlockPos::new(side / 2, 64, side / 2),
    });
    let cancel = CancelToken::new();

    let start = Instant::now();
    for _ in 0..iterations {
        let grid = compositor
            .compose(
                world_bounds(side),
                &layers,
                MemorySource::new(black_box(entries.clone())),
                &directives,
                island,
                &cancel,
            )
            .unwrap();
        black_box(grid);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  full run ({count} entries, 16 directives, {side}x128x{side}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Compositor Benchmarks ===\n");

    println!("Base fill (classic flat stack):");
    bench_base_fill(64, 100);
    bench_base_fill(128, 25);
    bench_base_fill(256, 5);

    println!("\nOverride stream application:");
    bench_override_stream(128, 1_000, 50);
    bench_override_stream(128, 100_000, 5);

    println!("\nFull composition (overrides + stamps + island):");
    bench_full_composition(128, 10_000, 10);
    bench_full_composition(256, 100_000, 2);

    println!("\n=== Done ===");
}
