use serde::{Deserialize, Serialize};
use stratavox_common::BlockPos;

/// Thresholds and footprint sizes for the procedural stamping phases.
///
/// Defaults are the literal constants of the legacy flat-world path. Pool and
/// island footprints are centered with integer bisection (`width / 2`), so an
/// odd width lands off-center. That behavior is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    /// Top of the soil stratum; landscape columns grow from one above this.
    pub dirt_level: i32,
    /// Top of the stone stratum.
    pub stone_level: i32,
    /// Water surface height; the spawn island tops out here.
    pub sea_level: i32,
    pub pool_width: i32,
    pub pool_depth: i32,
    pub island_width: i32,
    pub island_depth: i32,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            dirt_level: 7,
            stone_level: 4,
            sea_level: 62,
            pool_width: 10,
            pool_depth: 5,
            island_width: 50,
            island_depth: 5,
        }
    }
}

/// One procedural stamping instruction for phase three, applied in slice
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// Dirt column from one above the dirt level up to, but excluding, the
    /// position's y.
    LandscapeColumn(BlockPos),
    /// Stone column over the same span, marking a reference point distinctly
    /// from terrain.
    MarkerPole(BlockPos),
    /// Water square of the configured pool footprint, descending from the
    /// position's y.
    WaterPool(BlockPos),
}

/// Grass platform stamped once at sea level so the spawn point always has
/// solid footing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnIsland {
    pub center: BlockPos,
}
