use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stratavox_common::{BlockPos, Layer, WorldMeta};
use stratavox_compose::{ComposeError, Directive, LayerStack, SpawnIsland, StampConfig};
use stratavox_kernel::GridBounds;

/// One world build, loaded from a JSON file: identity, grid extent, strata,
/// and stamping inputs.
///
/// Omitted `layers` means the classic flat stack derived from `stamp`; an
/// explicitly empty list is rejected when the stack is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub world: WorldMeta,
    pub bounds: GridBounds,
    #[serde(default)]
    pub layers: Option<Vec<Layer>>,
    #[serde(default)]
    pub stamp: StampConfig,
    /// Override stream path, plain `.jsonl` or `.jsonl.zst`.
    #[serde(default)]
    pub overrides: Option<PathBuf>,
    #[serde(default)]
    pub landscape: Vec<BlockPos>,
    #[serde(default)]
    pub marker_poles: Vec<BlockPos>,
    #[serde(default)]
    pub water_pools: Vec<BlockPos>,
    #[serde(default)]
    pub spawn_island: bool,
}

impl BuildConfig {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn layer_stack(&self) -> Result<LayerStack, ComposeError> {
        match &self.layers {
            Some(layers) => LayerStack::new(layers.clone()),
            None => Ok(LayerStack::classic_flat(&self.stamp)),
        }
    }

    /// Directives in the legacy application order: landscape columns, then
    /// marker poles, then water pools.
    pub fn directives(&self) -> Vec<Directive> {
        let mut out = Vec::with_capacity(
            self.landscape.len() + self.marker_poles.len() + self.water_pools.len(),
        );
        out.extend(self.landscape.iter().copied().map(Directive::LandscapeColumn));
        out.extend(self.marker_poles.iter().copied().map(Directive::MarkerPole));
        out.extend(self.water_pools.iter().copied().map(Directive::WaterPool));
        out
    }

    /// The spawn island directive, centered on the world's spawn point.
    pub fn island(&self) -> Option<SpawnIsland> {
        self.spawn_island.then(|| SpawnIsland {
            center: self.world.spawn_pos,
        })
    }
}
