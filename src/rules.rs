//! Survival/birth rule parameters and their compact `"a,b/c/T"` encoding.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidRuleError;

/// Shape of the neighbourhood gathered around each cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Neighborhood {
    /// Every point of the radius cube except the centre.
    #[default]
    Moore,
    /// Points of the radius cube within Manhattan distance `radius`.
    VonNeumann,
}

impl Neighborhood {
    /// Single-letter tag used in the rule encoding.
    pub fn tag(self) -> char {
        match self {
            Neighborhood::Moore => 'M',
            Neighborhood::VonNeumann => 'N',
        }
    }
}

impl FromStr for Neighborhood {
    type Err = InvalidRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" => Ok(Neighborhood::Moore),
            "N" => Ok(Neighborhood::VonNeumann),
            other => Err(InvalidRuleError::Neighborhood(other.to_string())),
        }
    }
}

/// Parameters of the generalized threshold rule.
///
/// Both sets empty means the classic 2,3/3 rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleParams {
    /// Live-neighbour counts that keep a live cell alive.
    pub stay_alive: BTreeSet<u32>,
    /// Live-neighbour counts that bring an empty cell to life.
    pub get_alive: BTreeSet<u32>,
    /// Neighbourhood used when counting.
    pub neighborhood: Neighborhood,
}

impl RuleParams {
    /// True when neither set has been configured.
    pub fn is_default(&self) -> bool {
        self.stay_alive.is_empty() && self.get_alive.is_empty()
    }
}

fn parse_counts(segment: &str) -> Result<BTreeSet<u32>, InvalidRuleError> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Ok(BTreeSet::new());
    }
    segment
        .split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<u32>()
                .map_err(|_| InvalidRuleError::Count(token.to_string()))
        })
        .collect()
}

impl FromStr for RuleParams {
    type Err = InvalidRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('/').collect();
        let [stay, get, tag] = segments.as_slice() else {
            return Err(InvalidRuleError::SegmentCount(segments.len()));
        };

        Ok(RuleParams {
            stay_alive: parse_counts(stay)?,
            get_alive: parse_counts(get)?,
            neighborhood: tag.parse()?,
        })
    }
}

fn write_counts(f: &mut fmt::Formatter<'_>, counts: &BTreeSet<u32>) -> fmt::Result {
    for (i, count) in counts.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{count}")?;
    }
    Ok(())
}

impl fmt::Display for RuleParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_counts(f, &self.stay_alive)?;
        f.write_str("/")?;
        write_counts(f, &self.get_alive)?;
        write!(f, "/{}", self.neighborhood.tag())
    }
}
