//! Typed indices into the fleet's convoy list and the route's section list.
//!
//! The fleet hands out ids densely from 0 in plan order, so `index()` is a
//! direct `Vec` offset.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $label:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }

        /// Fails once the fleet or route outgrows the inner integer.
        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Position of a convoy in the fleet, in departure-plan order.
    pub struct ConvoyId(u32) => "convoy";
}

typed_id! {
    /// Position of a section along the route, counted from the forward start.
    pub struct SectionId(u32) => "section";
}
