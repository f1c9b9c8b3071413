use glam::Vec3;

/// An axis-aligned bounding box in world space.
///
/// This is the contract shape expected from the (out-of-scope) voxelization
/// stage; this crate only ever shrinks it by a border pad, never computes it
/// from geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
pub struct Aabb3d {
    /// The minimum corner of the AABB.
    pub min: Vec3,
    /// The maximum corner of the AABB.
    pub max: Vec3,
}

/// Gets the standard width (x-axis) offset for the specified direction.
///
/// Direction encoding is fixed: `0 = -X, 1 = +Z, 2 = +X, 3 = -Z`, a
/// right-handed 4-neighborhood in clockwise order when viewed from above.
/// This table is a cross-cutting constant shared with the upstream
/// collaborator that produces span connections; it must not drift from it.
#[inline]
pub(crate) fn dir_offset_x(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [-1, 0, 1, 0];
    OFFSET[direction as usize & 0x3]
}

/// Gets the standard height (z-axis) offset for the specified direction.
#[inline]
pub(crate) fn dir_offset_z(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [0, 1, 0, -1];
    OFFSET[direction as usize & 0x3]
}

/// Turn clockwise: the edge/direction visited after `dir` while wall-following.
#[inline]
pub(crate) fn dir_cw(dir: u8) -> u8 {
    (dir + 1) & 0x3
}

/// Turn counter-clockwise: the direction taken when stepping into a connected neighbor.
#[inline]
pub(crate) fn dir_ccw(dir: u8) -> u8 {
    (dir + 3) & 0x3
}

/// Squared perpendicular distance from `point` to the segment `seg_a..seg_b`, in the XZ plane.
///
/// Endpoints are handled as segment-distance (clamped projection), not as an
/// infinite line.
pub(crate) fn dist_point_to_segment_sq(point: (i64, i64), seg_a: (i64, i64), seg_b: (i64, i64)) -> f64 {
    let dx = (seg_b.0 - seg_a.0) as f64;
    let dz = (seg_b.1 - seg_a.1) as f64;
    let px = (point.0 - seg_a.0) as f64;
    let pz = (point.1 - seg_a.1) as f64;

    let d = dx * dx + dz * dz;
    let mut t = dx * px + dz * pz;
    if d > 0.0 {
        t /= d;
    }
    let t = t.clamp(0.0, 1.0);

    let proj_x = seg_a.0 as f64 + t * dx - point.0 as f64;
    let proj_z = seg_a.1 as f64 + t * dz - point.1 as f64;
    proj_x * proj_x + proj_z * proj_z
}

/// `true` if `b` lies strictly left of, or on, the directed line `a -> c`.
///
/// Used by the hole-merge cone test: `(b.x - a.x) * (c.z - a.z) - (c.x - a.x) * (b.z - a.z) <= 0`.
pub(crate) fn left_or_on(a: (i64, i64), c: (i64, i64), b: (i64, i64)) -> bool {
    (b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1) <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_offsets_match_clockwise_table() {
        assert_eq!((dir_offset_x(0), dir_offset_z(0)), (-1, 0));
        assert_eq!((dir_offset_x(1), dir_offset_z(1)), (0, 1));
        assert_eq!((dir_offset_x(2), dir_offset_z(2)), (1, 0));
        assert_eq!((dir_offset_x(3), dir_offset_z(3)), (0, -1));
    }

    #[test]
    fn dir_cw_ccw_are_inverses() {
        for dir in 0..4u8 {
            assert_eq!(dir_ccw(dir_cw(dir)), dir);
        }
    }

    #[test]
    fn segment_distance_handles_endpoints() {
        let d = dist_point_to_segment_sq((0, 5), (0, 0), (0, 0));
        assert_eq!(d, 25.0);
    }
}
