//! Flat persistence record for saving and reloading a grid.
//!
//! Storage itself is up to the caller; this only defines what must be kept
//! to rebuild a grid exactly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::grid::{Grid, Mode};
use crate::config::GridConfig;
use crate::error::ConfigError;

/// Everything needed to reconstruct a grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRecord {
    pub dimension: usize,
    /// States in x, y, z row-major order.
    pub states: Vec<u8>,
    /// Colour of each state present, as `0x`-prefixed hex.
    pub colours: BTreeMap<u8, String>,
    /// 0 = generalized rule, 1 = tree growth.
    pub mode: Mode,
}

/// Parse `0xRRGGBB` (prefix optional) into a packed colour.
pub fn parse_colour(text: &str) -> Result<u32, ConfigError> {
    let digits = text
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    match u32::from_str_radix(digits, 16) {
        Ok(colour) if colour <= 0xFF_FFFF => Ok(colour),
        _ => Err(ConfigError::InvalidColour(text.to_string())),
    }
}

impl Grid {
    /// Colours are read from the cells, so births keep their colour even when
    /// it differs from the grid's map. Cells sharing a state but not a colour
    /// collapse to the last one in scan order.
    pub fn to_record(&self) -> GridRecord {
        let colours = self
            .cells
            .iter()
            .map(|cell| (cell.state, format!("{:#x}", cell.colour)))
            .collect();
        GridRecord {
            dimension: self.dimension,
            states: self.states(),
            colours,
            mode: self.mode,
        }
    }

    pub fn from_record(record: &GridRecord, config: GridConfig) -> Result<Self, ConfigError> {
        let colours = record
            .colours
            .iter()
            .map(|(&state, text)| parse_colour(text).map(|colour| (state, colour)))
            .collect::<Result<BTreeMap<u8, u32>, ConfigError>>()?;
        Grid::new(
            record.dimension,
            record.states.clone(),
            colours,
            record.mode,
            config,
        )
    }
}
