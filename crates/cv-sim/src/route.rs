//! A linear route of sections that convoys shuttle along.
//!
//! Positions are measured in steps from the start of the first section.  A
//! convoy's position is that of its head; the whole convoy is treated as
//! standing on the head's section.

use cv_core::{CvError, CvResult, SectionId, WayType};
use cv_physics::WayContext;

/// Which way along the route a convoy runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// One stretch of way with uniform properties.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    pub way:           WayType,
    pub length_steps:  u32,
    pub max_speed_kmh: i32,
    /// `1000 · sin(slope)` when running [`Direction::Forward`]; positive is
    /// uphill.
    #[cfg_attr(feature = "serde", serde(default))]
    pub slope:         i16,
    #[cfg_attr(feature = "serde", serde(default))]
    pub electrified:   bool,
}

impl Section {
    /// Level, unelectrified section.
    pub fn new(way: WayType, length_steps: u32, max_speed_kmh: i32) -> Self {
        Self {
            way,
            length_steps,
            max_speed_kmh,
            slope: 0,
            electrified: false,
        }
    }

    pub fn with_slope(mut self, sin_alpha_1000: i16) -> Self {
        self.slope = sin_alpha_1000;
        self
    }

    pub fn electrified(mut self) -> Self {
        self.electrified = true;
        self
    }

    /// What a vehicle running in `direction` sees of this section.
    pub fn way_context(&self, direction: Direction) -> WayContext {
        let slope = match direction {
            Direction::Forward => self.slope,
            Direction::Backward => self.slope.saturating_neg(),
        };
        let ctx = WayContext::flat(self.way, self.max_speed_kmh).with_slope(slope);
        if self.electrified { ctx.electrified() } else { ctx }
    }
}

/// A speed limit that starts some steps ahead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LimitPoint {
    pub steps:     u32,
    pub speed_kmh: i32,
}

/// An ordered, non-empty list of sections.
#[derive(Clone, Debug)]
pub struct Route {
    sections: Vec<Section>,
    /// `starts[i]` is the position where section `i` begins; the last entry
    /// is the route length.
    starts:   Vec<u32>,
}

impl Route {
    /// # Errors
    ///
    /// [`CvError::Config`] if `sections` is empty, a section has zero length
    /// or a non-positive speed limit, or the total length overflows.
    pub fn new(sections: Vec<Section>) -> CvResult<Self> {
        if sections.is_empty() {
            return Err(CvError::Config("a route needs at least one section".into()));
        }
        let mut starts = Vec::with_capacity(sections.len() + 1);
        let mut at = 0u32;
        starts.push(at);
        for (i, s) in sections.iter().enumerate() {
            if s.length_steps == 0 {
                return Err(CvError::Config(format!("section {i} has zero length")));
            }
            if s.max_speed_kmh <= 0 {
                return Err(CvError::Config(format!(
                    "section {i} has non-positive speed limit {} km/h",
                    s.max_speed_kmh
                )));
            }
            at = at
                .checked_add(s.length_steps)
                .ok_or_else(|| CvError::Config("route is longer than u32::MAX steps".into()))?;
            starts.push(at);
        }
        Ok(Self { sections, starts })
    }

    #[inline]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[inline]
    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.index())
    }

    /// Route length in steps.
    #[inline]
    pub fn len_steps(&self) -> u32 {
        self.starts[self.sections.len()]
    }

    /// Where a convoy running in `direction` stops.
    pub fn end_position(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Forward => self.len_steps(),
            Direction::Backward => 0,
        }
    }

    pub fn steps_to_end(&self, position: u32, direction: Direction) -> u32 {
        self.end_position(direction).abs_diff(position.min(self.len_steps()))
    }

    /// Move `steps` from `position`, stopping at the route end.
    pub fn advance(&self, position: u32, direction: Direction, steps: u32) -> u32 {
        match direction {
            Direction::Forward => position.saturating_add(steps).min(self.len_steps()),
            Direction::Backward => position.saturating_sub(steps),
        }
    }

    /// The section a head at `position` running in `direction` stands on.
    /// A head exactly on a boundary belongs to the section it is entering.
    pub fn section_at(&self, position: u32, direction: Direction) -> SectionId {
        let last = self.sections.len() - 1;
        let index = match direction {
            Direction::Forward => self.starts.partition_point(|&s| s <= position).saturating_sub(1),
            Direction::Backward => self.starts.partition_point(|&s| s < position).saturating_sub(1),
        };
        SectionId(index.min(last) as u32)
    }

    /// Every section boundary ahead with the limit that starts there, nearest
    /// first, ending with the route end (limit 0).
    pub fn limits_ahead(&self, position: u32, direction: Direction) -> Vec<LimitPoint> {
        let current = self.section_at(position, direction).index();
        let mut points = Vec::new();
        match direction {
            Direction::Forward => {
                for j in current + 1..self.sections.len() {
                    points.push(LimitPoint {
                        steps:     self.starts[j] - position,
                        speed_kmh: self.sections[j].max_speed_kmh,
                    });
                }
            }
            Direction::Backward => {
                for j in (0..current).rev() {
                    points.push(LimitPoint {
                        steps:     position - self.starts[j + 1],
                        speed_kmh: self.sections[j].max_speed_kmh,
                    });
                }
            }
        }
        points.push(LimitPoint {
            steps:     self.steps_to_end(position, direction),
            speed_kmh: 0,
        });
        points
    }
}
