use crate::{
    area::AreaType,
    compact_cell::CompactCell,
    compact_span::CompactSpan,
    math::{Aabb3d, dir_offset_x, dir_offset_z},
    region::RegionId,
};

/// A packed, column-oriented voxelization of a walkable surface.
///
/// This is the read-only input to contour extraction. It is produced by the
/// (out-of-scope) voxelization, erosion, distance-field, and region-labeling
/// stages; this crate never mutates it and never retains it past a
/// [`build_contours`](Self::build_contours) call.
#[derive(Debug, Clone)]
pub struct CompactHeightfield {
    /// The width of the heightfield along the x-axis in cell units.
    pub width: u16,
    /// The height of the heightfield along the z-axis in cell units.
    pub height: u16,
    /// The AABB border size used during the build of the field.
    pub border_size: u16,
    /// The maximum region id of any span within the field.
    pub max_region: RegionId,
    /// The AABB of the heightfield, in world space.
    pub aabb: Aabb3d,
    /// The size of each cell on the xz-plane.
    pub cell_size: f32,
    /// The size of each cell along the y-axis.
    pub cell_height: f32,
    /// The cells in the heightfield. `[Size: width * height]`
    pub cells: Vec<CompactCell>,
    /// All walkable spans in the heightfield.
    pub spans: Vec<CompactSpan>,
    /// Area type data, one entry per span. `[Size: spans.len()]`
    pub areas: Vec<AreaType>,
}

/// Errors that can occur when assembling a [`CompactHeightfield`] from raw arrays.
#[derive(Debug, thiserror::Error)]
pub enum CompactHeightfieldError {
    /// `cells.len()` did not match `width * height`.
    #[error("cells array has length {actual}, expected width * height = {expected}")]
    CellCountMismatch {
        /// The length the cells array should have had.
        expected: usize,
        /// The length the cells array actually had.
        actual: usize,
    },
    /// `spans.len()` did not match `areas.len()`.
    #[error("spans array has length {spans}, but areas array has length {areas}")]
    SpanAreaCountMismatch {
        /// The number of spans.
        spans: usize,
        /// The number of area entries.
        areas: usize,
    },
}

impl CompactHeightfield {
    /// Assembles a compact heightfield from already-computed cell, span, and area arrays.
    ///
    /// This crate does not perform voxelization or region labeling itself;
    /// callers (or test fixtures) populate these arrays directly.
    ///
    /// # Errors
    ///
    /// Returns an error if `cells.len() != width * height` or
    /// `spans.len() != areas.len()`.
    pub fn new(
        width: u16,
        height: u16,
        border_size: u16,
        cell_size: f32,
        cell_height: f32,
        aabb: Aabb3d,
        cells: Vec<CompactCell>,
        spans: Vec<CompactSpan>,
        areas: Vec<AreaType>,
        max_region: RegionId,
    ) -> Result<Self, CompactHeightfieldError> {
        let expected_cells = width as usize * height as usize;
        if cells.len() != expected_cells {
            return Err(CompactHeightfieldError::CellCountMismatch {
                expected: expected_cells,
                actual: cells.len(),
            });
        }
        if spans.len() != areas.len() {
            return Err(CompactHeightfieldError::SpanAreaCountMismatch {
                spans: spans.len(),
                areas: areas.len(),
            });
        }
        Ok(Self {
            width,
            height,
            border_size,
            max_region,
            aabb,
            cell_size,
            cell_height,
            cells,
            spans,
            areas,
        })
    }

    #[inline]
    pub(crate) fn column_index(&self, x: u16, z: u16) -> usize {
        x as usize + z as usize * self.width as usize
    }

    /// Returns the cell at the given coordinates. Panics if the coordinates are out of bounds.
    #[inline]
    pub fn cell_at(&self, x: u16, z: u16) -> &CompactCell {
        &self.cells[self.column_index(x, z)]
    }

    /// Returns the cell at the given coordinates, or `None` if out of bounds.
    #[inline]
    pub fn get_cell_at(&self, x: u16, z: u16) -> Option<&CompactCell> {
        self.cells.get(self.column_index(x, z))
    }

    /// `true` if `(x, z)` lies within the grid.
    #[inline]
    pub(crate) fn contains(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && x < self.width as i32 && z < self.height as i32
    }

    /// Resolves a neighbor span index given a base cell coordinate, a
    /// direction, and the layer index within that direction's connection data.
    ///
    /// Returns the neighbor cell's `(x, z)` coordinates and the resolved span
    /// index.
    pub(crate) fn con_indices(&self, x: i32, z: i32, dir: u8, layer: u8) -> (i32, i32, usize) {
        let n_x = x + dir_offset_x(dir) as i32;
        let n_z = z + dir_offset_z(dir) as i32;
        let cell = &self.cells[self.column_index(n_x as u16, n_z as u16)];
        (n_x, n_z, cell.index() as usize + layer as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_cell_count() {
        let result = CompactHeightfield::new(
            2,
            2,
            0,
            1.0,
            1.0,
            Aabb3d::default(),
            vec![CompactCell::default(); 3],
            vec![],
            vec![],
            RegionId::NONE,
        );
        assert!(matches!(
            result,
            Err(CompactHeightfieldError::CellCountMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn rejects_mismatched_span_area_count() {
        let result = CompactHeightfield::new(
            1,
            1,
            0,
            1.0,
            1.0,
            Aabb3d::default(),
            vec![CompactCell::default()],
            vec![CompactSpan::default()],
            vec![],
            RegionId::NONE,
        );
        assert!(matches!(
            result,
            Err(CompactHeightfieldError::SpanAreaCountMismatch { spans: 1, areas: 0 })
        ));
    }
}
