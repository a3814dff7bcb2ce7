use stratavox_common::{BlockKind, Layer};

use crate::error::ComposeError;
use crate::stamp::StampConfig;

/// Validated, ordered sequence of strata.
///
/// Order is application order: later layers paint over earlier ones in any
/// overlapping y range, so a stack never needs exclusive ranges. The only
/// structural rule is non-emptiness; gaps and overlaps are legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    /// Wrap an ordered layer list, rejecting the empty case.
    ///
    /// An empty stack is a configuration error, not an "all air" world.
    pub fn new(layers: Vec<Layer>) -> Result<Self, ComposeError> {
        if layers.is_empty() {
            return Err(ComposeError::NoLayersDefined);
        }
        Ok(Self { layers })
    }

    /// The legacy flat-world stack: a bedrock floor, stone and soil strata,
    /// then water up to sea level.
    pub fn classic_flat(stamp: &StampConfig) -> Self {
        Self {
            layers: vec![
                Layer::new(BlockKind::UnbreakableStone, 0, 1),
                Layer::new(BlockKind::Stone, 1, stamp.stone_level + 1),
                Layer::new(BlockKind::Soil, stamp.stone_level + 1, stamp.dirt_level + 1),
                Layer::new(BlockKind::Water, stamp.dirt_level + 1, stamp.sea_level + 1),
            ],
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layer_list_is_rejected() {
        let err = LayerStack::new(Vec::new()).unwrap_err();
        assert!(matches!(err, ComposeError::NoLayersDefined));
    }

    #[test]
    fn single_layer_is_accepted() {
        let stack = LayerStack::new(vec![Layer::new(BlockKind::UnbreakableStone, 0, 1)]).unwrap();
        assert_eq!(stack.layers().len(), 1);
    }

    #[test]
    fn classic_flat_strata_abut_at_the_level_thresholds() {
        let stack = LayerStack::classic_flat(&StampConfig::default());
        let layers = stack.layers();
        assert_eq!(layers.len(), 4);
        assert_eq!((layers[0].y_min, layers[0].y_max), (0, 1));
        assert_eq!((layers[1].y_min, layers[1].y_max), (1, 5));
        assert_eq!((layers[2].y_min, layers[2].y_max), (5, 8));
        assert_eq!((layers[3].y_min, layers[3].y_max), (8, 63));
        assert_eq!(layers[3].kind, BlockKind::Water);
    }
}
