#![doc = include_str!("../readme.md")]
#![warn(missing_docs)]

mod area;
mod compact_cell;
mod compact_heightfield;
mod compact_span;
mod contours;
pub(crate) mod math;
mod region;

pub use area::AreaType;
pub use compact_cell::CompactCell;
pub use compact_heightfield::{CompactHeightfield, CompactHeightfieldError};
pub use compact_span::CompactSpan;
pub use contours::{BuildContoursFlags, Contour, ContourSet, RegionVertexId};
pub use math::Aabb3d;
pub use region::RegionId;
