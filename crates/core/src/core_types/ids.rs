//! Identifier namespaces
//!
//! Fire zones, spatial-management anchors and testable groups are all named
//! after a cell, but they are different things. Each gets its own newtype so a
//! zone id can never be passed where an anchor id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coord::GridCoord;

macro_rules! cell_named_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub GridCoord);

        impl $name {
            /// Cell this id is named after
            pub fn cell(self) -> GridCoord {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<GridCoord> for $name {
            fn from(coord: GridCoord) -> Self {
                Self(coord)
            }
        }
    };
}

cell_named_id!(
    /// Fire zone id: the seed cell chosen when the zone was first detected
    ///
    /// Zone ids order row-major, so "lowest zone id" means the seed cell
    /// closest to the top-left corner.
    ZoneId
);

cell_named_id!(
    /// Spatial-management anchor id (a sensor or managing anchor cell)
    AnchorId
);

cell_named_id!(
    /// Id of a connected group of testable cells
    TestableGroupId
);
