use stratavox_common::BlockPos;
use stratavox_kernel::{Block, GridBounds, WorldGrid};
use stratavox_stream::OverrideSource;

use crate::cancel::CancelToken;
use crate::error::ComposeError;
use crate::layers::LayerStack;
use crate::stamp::{Directive, SpawnIsland, StampConfig};
use crate::vocab::BlockVocabulary;

/// The four-phase world compositor.
///
/// A run is a strict, ordered single pass: base fill from the layer stack,
/// then the streamed sparse overrides, then procedural directive stamps,
/// then the optional spawn island. Each phase is a dominant paint over the
/// previous state, so precedence needs nothing beyond last-write-wins and a
/// run stays O(total writes), bit-reproducible for a fixed input order.
///
/// Any error aborts the whole run. The grid under construction is dropped,
/// never returned half-composed.
pub struct Compositor {
    vocab: BlockVocabulary,
    stamp: StampConfig,
}

impl Compositor {
    pub fn new(vocab: BlockVocabulary, stamp: StampConfig) -> Self {
        Self { vocab, stamp }
    }

    pub fn stamp(&self) -> &StampConfig {
        &self.stamp
    }

    /// Run all four phases over a freshly allocated grid and hand it back.
    ///
    /// The override source is consumed exactly once; it is not restartable
    /// and the run must not be retried with the same source value.
    pub fn compose<S: OverrideSource>(
        &self,
        bounds: GridBounds,
        layers: &LayerStack,
        overrides: S,
        directives: &[Directive],
        island: Option<SpawnIsland>,
        cancel: &CancelToken,
    ) -> Result<WorldGrid, ComposeError> {
        let _span = tracing::info_span!("compose", bounds = %bounds).entered();
        let mut grid = WorldGrid::new(bounds);

        self.fill_base(&mut grid, layers, cancel)?;
        self.apply_overrides(&mut grid, overrides, cancel)?;
        self.apply_directives(&mut grid, directives, cancel)?;
        if let Some(island) = island {
            self.raise_spawn_island(&mut grid, island)?;
        }
        Ok(grid)
    }

    fn fill_base(
        &self,
        grid: &mut WorldGrid,
        layers: &LayerStack,
        cancel: &CancelToken,
    ) -> Result<(), ComposeError> {
        if cancel.is_cancelled() {
            return Err(ComposeError::Cancelled);
        }
        for layer in layers.layers() {
            let material = self.vocab.material_for(layer.kind)?;
            grid.fill_y_range(layer.y_min, layer.y_max, material);
        }
        tracing::debug!(layers = layers.layers().len(), "base fill done");
        Ok(())
    }

    fn apply_overrides<S: OverrideSource>(
        &self,
        grid: &mut WorldGrid,
        mut source: S,
        cancel: &CancelToken,
    ) -> Result<(), ComposeError> {
        let mut applied: u64 = 0;
        let mut skipped: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(ComposeError::Cancelled);
            }
            let Some(entry) = source.next_entry()? else {
                break;
            };
            match self.vocab.block_for(entry.kind)? {
                Some(block) => {
                    grid.set_block(entry.pos, block)?;
                    applied += 1;
                }
                None => skipped += 1,
            }
        }
        tracing::debug!(applied, skipped, "override stream drained");
        Ok(())
    }

    fn apply_directives(
        &self,
        grid: &mut WorldGrid,
        directives: &[Directive],
        cancel: &CancelToken,
    ) -> Result<(), ComposeError> {
        for directive in directives {
            if cancel.is_cancelled() {
                return Err(ComposeError::Cancelled);
            }
            match *directive {
                Directive::LandscapeColumn(pos) => self.stamp_column(grid, pos, Block::DIRT)?,
                Directive::MarkerPole(pos) => self.stamp_column(grid, pos, Block::STONE)?,
                Directive::WaterPool(pos) => self.stamp_pool(grid, pos)?,
            }
        }
        if !directives.is_empty() {
            tracing::debug!(count = directives.len(), "directives stamped");
        }
        Ok(())
    }

    /// Column from one above the dirt level up to, but excluding, `pos.y`.
    /// A target at or below that threshold stamps nothing.
    fn stamp_column(
        &self,
        grid: &mut WorldGrid,
        pos: BlockPos,
        block: Block,
    ) -> Result<(), ComposeError> {
        for y in (self.stamp.dirt_level + 1)..pos.y {
            grid.set_block(BlockPos::new(pos.x, y, pos.z), block)?;
        }
        Ok(())
    }

    /// Water square of the pool footprint, descending `pool_depth` cells from
    /// `pos.y` inclusive. Centering uses integer bisection.
    fn stamp_pool(&self, grid: &mut WorldGrid, pos: BlockPos) -> Result<(), ComposeError> {
        let half = self.stamp.pool_width / 2;
        for dx in -half..half {
            for dz in -half..half {
                for y in (pos.y - self.stamp.pool_depth + 1)..=pos.y {
                    grid.set_block(BlockPos::new(pos.x + dx, y, pos.z + dz), Block::WATER)?;
                }
            }
        }
        Ok(())
    }

    /// Grass platform of the island footprint, descending `island_depth`
    /// cells from sea level inclusive. The center's own y is ignored; the
    /// island always tops out at sea level.
    fn raise_spawn_island(
        &self,
        grid: &mut WorldGrid,
        island: SpawnIsland,
    ) -> Result<(), ComposeError> {
        let half = self.stamp.island_width / 2;
        let top = self.stamp.sea_level;
        for dx in -half..half {
            for dz in -half..half {
                for y in (top - self.stamp.island_depth + 1)..=top {
                    grid.set_block(
                        BlockPos::new(island.center.x + dx, y, island.center.z + dz),
                        Block::GRASS,
                    )?;
                }
            }
        }
        tracing::debug!(center = %island.center, "spawn island raised");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratavox_common::{BlockKind, Layer};
    use stratavox_kernel::GridError;
    use stratavox_stream::{MemorySource, OverrideEntry, SourceError};

    fn pos(x: i32, y: i32, z: i32) -> BlockPos {
        BlockPos::new(x, y, z)
    }

    fn bounds(max_x: i32, max_y: i32, max_z: i32) -> GridBounds {
        GridBounds::new(pos(0, 0, 0), pos(max_x, max_y, max_z))
    }

    fn entry(x: i32, y: i32, z: i32, kind: BlockKind) -> OverrideEntry {
        OverrideEntry {
            pos: pos(x, y, z),
            kind,
        }
    }

    fn compositor() -> Compositor {
        Compositor::new(BlockVocabulary::new(), StampConfig::default())
    }

    fn no_overrides() -> MemorySource {
        MemorySource::new(Vec::new())
    }

    fn stack(layers: Vec<Layer>) -> LayerStack {
        LayerStack::new(layers).unwrap()
    }

    /// Source that trips a shared cancel token after a fixed number of pulls.
    struct CancellingSource {
        inner: MemorySource,
        token: CancelToken,
        cancel_after: usize,
        pulled: usize,
    }

    impl OverrideSource for CancellingSource {
        fn next_entry(&mut self) -> Result<Option<OverrideEntry>, SourceError> {
            if self.pulled == self.cancel_after {
                self.token.cancel();
            }
            self.pulled += 1;
            self.inner.next_entry()
        }
    }

    /// Source whose underlying storage fails mid-stream.
    struct FailingSource {
        remaining: usize,
    }

    impl OverrideSource for FailingSource {
        fn next_entry(&mut self) -> Result<Option<OverrideEntry>, SourceError> {
            if self.remaining == 0 {
                return Err(SourceError::Malformed {
                    line: 3,
                    message: "truncated record".into(),
                });
            }
            self.remaining -= 1;
            Ok(Some(entry(0, 0, 0, BlockKind::Stone)))
        }
    }

    #[test]
    fn single_bedrock_layer_fills_the_floor() {
        let grid = compositor()
            .compose(
                bounds(8, 4, 8),
                &stack(vec![Layer::new(BlockKind::UnbreakableStone, 0, 1)]),
                no_overrides(),
                &[],
                None,
                &CancelToken::new(),
            )
            .unwrap();
        for x in 0..8 {
            for z in 0..8 {
                assert_eq!(grid.block_at(pos(x, 0, z)), Some(Block::BEDROCK));
                assert_eq!(grid.block_at(pos(x, 1, z)), Some(Block::AIR));
            }
        }
    }

    #[test]
    fn water_override_pierces_the_strata() {
        let layers = stack(vec![
            Layer::new(BlockKind::UnbreakableStone, 0, 1),
            Layer::new(BlockKind::Stone, 1, 5),
            Layer::new(BlockKind::Soil, 5, 8),
        ]);
        let overrides = MemorySource::new(vec![entry(2, 3, 2, BlockKind::Water)]);
        let grid = compositor()
            .compose(bounds(8, 8, 8), &layers, overrides, &[], None, &CancelToken::new())
            .unwrap();
        assert_eq!(grid.block_at(pos(2, 3, 2)), Some(Block::WATER));
        assert_eq!(grid.block_at(pos(2, 2, 2)), Some(Block::STONE));
        assert_eq!(grid.block_at(pos(0, 0, 0)), Some(Block::BEDROCK));
        assert_eq!(grid.block_at(pos(3, 6, 3)), Some(Block::DIRT));
    }

    #[test]
    fn later_layer_wins_in_overlapping_range() {
        let layers = stack(vec![
            Layer::new(BlockKind::Stone, 0, 6),
            Layer::new(BlockKind::Water, 4, 6),
        ]);
        let grid = compositor()
            .compose(bounds(4, 8, 4), &layers, no_overrides(), &[], None, &CancelToken::new())
            .unwrap();
        assert_eq!(grid.block_at(pos(1, 3, 1)), Some(Block::STONE));
        assert_eq!(grid.block_at(pos(1, 4, 1)), Some(Block::WATER));
        assert_eq!(grid.block_at(pos(1, 5, 1)), Some(Block::WATER));
    }

    #[test]
    fn later_override_wins_at_the_same_position() {
        let layers = stack(vec![Layer::new(BlockKind::Stone, 0, 1)]);
        let overrides = MemorySource::new(vec![
            entry(1, 1, 1, BlockKind::Stone),
            entry(1, 1, 1, BlockKind::Glass),
        ]);
        let grid = compositor()
            .compose(bounds(4, 4, 4), &layers, overrides, &[], None, &CancelToken::new())
            .unwrap();
        assert_eq!(grid.block_at(pos(1, 1, 1)), Some(Block::GLASS));
    }

    #[test]
    fn none_override_leaves_base_untouched() {
        let layers = stack(vec![Layer::new(BlockKind::Stone, 0, 2)]);
        let overrides = MemorySource::new(vec![
            entry(1, 1, 1, BlockKind::None),
            entry(1, 3, 1, BlockKind::None),
        ]);
        let grid = compositor()
            .compose(bounds(4, 4, 4), &layers, overrides, &[], None, &CancelToken::new())
            .unwrap();
        assert_eq!(grid.block_at(pos(1, 1, 1)), Some(Block::STONE));
        assert_eq!(grid.block_at(pos(1, 3, 1)), Some(Block::AIR));
    }

    #[test]
    fn identical_inputs_compose_identical_grids() {
        let layers = stack(vec![
            Layer::new(BlockKind::UnbreakableStone, 0, 1),
            Layer::new(BlockKind::Stone, 1, 5),
        ]);
        let entries = vec![
            entry(2, 6, 2, BlockKind::Sand),
            entry(2, 6, 2, BlockKind::Gravel),
            entry(0, 7, 3, BlockKind::Glass),
        ];
        let directives = [
            Directive::LandscapeColumn(pos(5, 12, 5)),
            Directive::WaterPool(pos(8, 10, 8)),
        ];
        let run = |entries: Vec<OverrideEntry>| {
            compositor()
                .compose(
                    bounds(16, 64, 16),
                    &layers,
                    MemorySource::new(entries),
                    &directives,
                    None,
                    &CancelToken::new(),
                )
                .unwrap()
        };
        assert_eq!(run(entries.clone()), run(entries));
    }

    #[test]
    fn landscape_column_grows_dirt_below_the_target() {
        let layers = stack(vec![Layer::new(BlockKind::UnbreakableStone, 0, 1)]);
        let directives = [Directive::LandscapeColumn(pos(3, 12, 3))];
        let grid = compositor()
            .compose(bounds(8, 16, 8), &layers, no_overrides(), &directives, None, &CancelToken::new())
            .unwrap();
        for y in 8..12 {
            assert_eq!(grid.block_at(pos(3, y, 3)), Some(Block::DIRT));
        }
        assert_eq!(grid.block_at(pos(3, 7, 3)), Some(Block::AIR));
        assert_eq!(grid.block_at(pos(3, 12, 3)), Some(Block::AIR));
        assert_eq!(grid.block_at(pos(4, 9, 3)), Some(Block::AIR));
    }

    #[test]
    fn column_at_or_below_dirt_level_is_a_no_op() {
        let layers = stack(vec![Layer::new(BlockKind::UnbreakableStone, 0, 1)]);
        let directives = [Directive::LandscapeColumn(pos(3, 8, 3))];
        let grid = compositor()
            .compose(bounds(8, 16, 8), &layers, no_overrides(), &directives, None, &CancelToken::new())
            .unwrap();
        assert_eq!(grid.non_air_blocks(), 8 * 8);
    }

    #[test]
    fn marker_pole_uses_stone_over_the_column_span() {
        let layers = stack(vec![Layer::new(BlockKind::UnbreakableStone, 0, 1)]);
        let directives = [Directive::MarkerPole(pos(2, 11, 2))];
        let grid = compositor()
            .compose(bounds(8, 16, 8), &layers, no_overrides(), &directives, None, &CancelToken::new())
            .unwrap();
        for y in 8..11 {
            assert_eq!(grid.block_at(pos(2, y, 2)), Some(Block::STONE));
        }
        assert_eq!(grid.block_at(pos(2, 11, 2)), Some(Block::AIR));
    }

    #[test]
    fn water_pool_stamps_a_descending_square() {
        let layers = stack(vec![Layer::new(BlockKind::UnbreakableStone, 0, 1)]);
        let directives = [Directive::WaterPool(pos(10, 20, 10))];
        let grid = compositor()
            .compose(bounds(32, 32, 32), &layers, no_overrides(), &directives, None, &CancelToken::new())
            .unwrap();
        // 10 wide footprint centered by bisection: x and z in [5, 15).
        for x in 5..15 {
            for z in 5..15 {
                for y in 16..=20 {
                    assert_eq!(grid.block_at(pos(x, y, z)), Some(Block::WATER));
                }
            }
        }
        assert_eq!(grid.block_at(pos(4, 18, 10)), Some(Block::AIR));
        assert_eq!(grid.block_at(pos(15, 18, 10)), Some(Block::AIR));
        assert_eq!(grid.block_at(pos(10, 15, 10)), Some(Block::AIR));
        assert_eq!(grid.block_at(pos(10, 21, 10)), Some(Block::AIR));
    }

    #[test]
    fn spawn_island_overwrites_water_at_sea_level() {
        let stamp = StampConfig {
            sea_level: 64,
            ..StampConfig::default()
        };
        let layers = stack(vec![
            Layer::new(BlockKind::UnbreakableStone, 0, 1),
            Layer::new(BlockKind::Water, 1, 65),
        ]);
        let island = Some(SpawnIsland {
            center: pos(50, 64, 50),
        });
        let grid = Compositor::new(BlockVocabulary::new(), stamp)
            .compose(
                GridBounds::new(pos(0, 0, 0), pos(100, 80, 100)),
                &layers,
                no_overrides(),
                &[],
                island,
                &CancelToken::new(),
            )
            .unwrap();
        // 50 wide footprint centered by bisection: x and z in [25, 75).
        for &(x, z) in &[(25, 25), (50, 50), (74, 74), (25, 74)] {
            for y in 60..=64 {
                assert_eq!(grid.block_at(pos(x, y, z)), Some(Block::GRASS));
            }
            assert_eq!(grid.block_at(pos(x, 59, z)), Some(Block::WATER));
        }
        assert_eq!(grid.block_at(pos(24, 62, 50)), Some(Block::WATER));
        assert_eq!(grid.block_at(pos(75, 62, 50)), Some(Block::WATER));
    }

    #[test]
    fn directives_apply_in_slice_order() {
        let layers = stack(vec![Layer::new(BlockKind::UnbreakableStone, 0, 1)]);
        let directives = [
            Directive::WaterPool(pos(8, 12, 8)),
            Directive::MarkerPole(pos(8, 13, 8)),
        ];
        let grid = compositor()
            .compose(bounds(16, 16, 16), &layers, no_overrides(), &directives, None, &CancelToken::new())
            .unwrap();
        // The pole runs through the pool and wins where both wrote.
        for y in 8..13 {
            assert_eq!(grid.block_at(pos(8, y, 8)), Some(Block::STONE));
        }
        assert_eq!(grid.block_at(pos(7, 12, 8)), Some(Block::WATER));
    }

    #[test]
    fn unsupported_layer_kind_aborts_the_run() {
        let layers = stack(vec![Layer::new(BlockKind::Glass, 0, 1)]);
        let err = compositor()
            .compose(bounds(4, 4, 4), &layers, no_overrides(), &[], None, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ComposeError::UnsupportedBlockKind { kind: BlockKind::Glass, .. }
        ));
    }

    #[test]
    fn wood_override_aborts_the_run() {
        let layers = stack(vec![Layer::new(BlockKind::Stone, 0, 1)]);
        let overrides = MemorySource::new(vec![
            entry(0, 1, 0, BlockKind::Sand),
            entry(1, 1, 1, BlockKind::Wood),
        ]);
        let err = compositor()
            .compose(bounds(4, 4, 4), &layers, overrides, &[], None, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ComposeError::UnsupportedBlockKind { kind: BlockKind::Wood, .. }
        ));
    }

    #[test]
    fn out_of_bounds_override_is_fatal() {
        let layers = stack(vec![Layer::new(BlockKind::Stone, 0, 1)]);
        let overrides = MemorySource::new(vec![entry(9, 1, 0, BlockKind::Sand)]);
        let err = compositor()
            .compose(bounds(4, 4, 4), &layers, overrides, &[], None, &CancelToken::new())
            .unwrap_err();
        match err {
            ComposeError::OutOfBounds(GridError::OutOfBounds { pos: p, .. }) => {
                assert_eq!(p, pos(9, 1, 0));
            }
            other => panic!("expected out of bounds, got {other:?}"),
        }
    }

    #[test]
    fn out_of_bounds_directive_is_fatal() {
        let layers = stack(vec![Layer::new(BlockKind::Stone, 0, 1)]);
        let directives = [Directive::WaterPool(pos(2, 10, 2))];
        let err = compositor()
            .compose(bounds(4, 16, 4), &layers, no_overrides(), &directives, None, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, ComposeError::OutOfBounds(_)));
    }

    #[test]
    fn pre_cancelled_token_stops_before_any_fill() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let layers = stack(vec![Layer::new(BlockKind::Stone, 0, 1)]);
        let err = compositor()
            .compose(bounds(4, 4, 4), &layers, no_overrides(), &[], None, &cancel)
            .unwrap_err();
        assert!(matches!(err, ComposeError::Cancelled));
    }

    #[test]
    fn cancellation_is_observed_between_entries() {
        let cancel = CancelToken::new();
        let entries: Vec<OverrideEntry> = (0..100)
            .map(|i| entry(i % 4, 1, i / 4 % 4, BlockKind::Sand))
            .collect();
        let source = CancellingSource {
            inner: MemorySource::new(entries),
            token: cancel.clone(),
            cancel_after: 10,
            pulled: 0,
        };
        let layers = stack(vec![Layer::new(BlockKind::Stone, 0, 1)]);
        let err = compositor()
            .compose(bounds(32, 4, 32), &layers, source, &[], None, &cancel)
            .unwrap_err();
        assert!(matches!(err, ComposeError::Cancelled));
    }

    #[test]
    fn stream_failure_propagates_as_override_stream_error() {
        let layers = stack(vec![Layer::new(BlockKind::Stone, 0, 1)]);
        let source = FailingSource { remaining: 2 };
        let err = compositor()
            .compose(bounds(4, 4, 4), &layers, source, &[], None, &CancelToken::new())
            .unwrap_err();
        match err {
            ComposeError::OverrideStream(SourceError::Malformed { line, .. }) => {
                assert_eq!(line, 3);
            }
            other => panic!("expected stream error, got {other:?}"),
        }
    }
}
