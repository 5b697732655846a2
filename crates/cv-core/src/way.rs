//! Way categories shared by every crate that needs to know what a convoy
//! runs on.
//!
//! The way representation itself (tiles, slopes, signals) lives outside this
//! workspace.  The physics only needs the category tag, which selects an
//! adverse-resistance profile in `cv-physics`, and the base friction added to
//! a vehicle's slope factor.

use std::fmt;
use std::str::FromStr;

use crate::CvError;

/// The kind of way a vehicle is built for or currently stands on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum WayType {
    /// Roads (trucks, buses, cars).  Also the fallback profile.
    #[default]
    Road,
    /// Standard-gauge railway.
    Track,
    /// Narrow-gauge railway.
    NarrowGauge,
    /// Street-running tram track.
    Tram,
    Monorail,
    Maglev,
    Water,
    Air,
    /// Any category not listed above.  Behaves like [`WayType::Road`].
    Other,
}

impl WayType {
    pub const ALL: [WayType; 9] = [
        WayType::Road,
        WayType::Track,
        WayType::NarrowGauge,
        WayType::Tram,
        WayType::Monorail,
        WayType::Maglev,
        WayType::Water,
        WayType::Air,
        WayType::Other,
    ];

    /// Friction factor added to `1000 · sin(slope)` for vehicles on this way.
    ///
    /// Rubber on tarmac needs four times the base friction of every other
    /// way.
    #[inline]
    pub fn base_friction(self) -> i16 {
        match self {
            WayType::Road | WayType::Other => 4,
            _ => 1,
        }
    }

    /// `true` for every guided (rail-like) way.
    #[inline]
    pub fn is_rail(self) -> bool {
        matches!(
            self,
            WayType::Track | WayType::NarrowGauge | WayType::Tram | WayType::Monorail | WayType::Maglev
        )
    }

    /// Lower-case label used in catalogs, traces and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            WayType::Road        => "road",
            WayType::Track       => "track",
            WayType::NarrowGauge => "narrow_gauge",
            WayType::Tram        => "tram",
            WayType::Monorail    => "monorail",
            WayType::Maglev      => "maglev",
            WayType::Water       => "water",
            WayType::Air         => "air",
            WayType::Other       => "other",
        }
    }
}

impl fmt::Display for WayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WayType {
    type Err = CvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        WayType::ALL
            .into_iter()
            .find(|w| w.as_str() == lower)
            .or(match lower.as_str() {
                "rail" | "train" => Some(WayType::Track),
                "narrowgauge"    => Some(WayType::NarrowGauge),
                "ship" | "sea"   => Some(WayType::Water),
                _                => None,
            })
            .ok_or_else(|| CvError::Parse(format!("unknown way type '{s}'")))
    }
}
