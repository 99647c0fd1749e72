//! Edge filter

use core::str::FromStr;

use crate::error::{ArgumentFault, Error};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Transitions a watch reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Edge {
    /// Low to high
    #[cfg_attr(feature = "serde", serde(alias = "re"))]
    Rising,
    /// High to low
    #[cfg_attr(feature = "serde", serde(alias = "fe"))]
    Falling,
    /// Either direction
    #[default]
    Both,
}

impl Edge {
    /// True if a transition to `high` passes this filter
    pub const fn accepts(self, high: bool) -> bool {
        match self {
            Edge::Rising => high,
            Edge::Falling => !high,
            Edge::Both => true,
        }
    }
}

impl FromStr for Edge {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "re" | "rising" | "1" => Ok(Edge::Rising),
            "fe" | "falling" | "0" => Ok(Edge::Falling),
            "both" => Ok(Edge::Both),
            _ => Err(ArgumentFault::Edge.into()),
        }
    }
}

impl TryFrom<u8> for Edge {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Edge::Rising),
            0 => Ok(Edge::Falling),
            _ => Err(ArgumentFault::Edge.into()),
        }
    }
}
