use glam::UVec4;

use crate::{
    CompactHeightfield, RegionId,
    area::AreaType,
    math::{Aabb3d, dir_ccw, dir_cw, dir_offset_x, dir_offset_z, dist_point_to_segment_sq, left_or_on},
};

/// Hard cap on the number of edges a single ring walk may traverse.
///
/// Guards against malformed connectivity (e.g. a cycle of edge flags that
/// never returns to its start state) turning into an infinite loop. Hitting
/// this is always a sign of bad upstream data; the walk simply returns its
/// partial ring, which the driver then discards for being too short.
const WALK_ITERATION_CAP: usize = 40_000;

bitflags::bitflags! {
    /// The neighbor region id carried by a raw or simplified contour vertex,
    /// plus two classification bits packed into the high word.
    ///
    /// The low 16 bits ([`Self::REGION_MASK`]) are a [`RegionId`] in
    /// disguise: wherever a vertex's neighbor crosses into a different
    /// region (or into the heightfield's border), those bits hold that
    /// region's id. [`Self::BORDER_VERTEX`] and [`Self::AREA_BORDER`] are
    /// classification flags that live above the 16-bit region word and are
    /// never mistaken for part of it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
    pub struct RegionVertexId: u32 {
        /// No neighbor region, no flags.
        const NONE = 0;
        /// Mask over the bits that hold the packed [`RegionId`].
        const REGION_MASK = 0xFFFF;
        /// Set when this corner sits on the §4.2 border-vertex pattern; such
        /// vertices are eligible for later removal to match tile boundaries.
        const BORDER_VERTEX = 0x1_0000;
        /// Set when the two spans adjoining this edge have different area codes.
        const AREA_BORDER = 0x2_0000;
    }
}

impl From<RegionId> for RegionVertexId {
    fn from(region: RegionId) -> Self {
        RegionVertexId::from_bits_retain(region.bits() as u32)
    }
}

impl From<RegionVertexId> for RegionId {
    fn from(value: RegionVertexId) -> Self {
        let masked = value.bits() & RegionVertexId::REGION_MASK.bits();
        RegionId::from_bits_retain(masked as u16)
    }
}

bitflags::bitflags! {
    /// Contour build flags used by [`CompactHeightfield::build_contours`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
    pub struct BuildContoursFlags: u8 {
        /// Tessellate solid (impassable) edges during contour simplification.
        const TESSELLATE_WALL_EDGES = 1;
        /// Tessellate edges between areas during contour simplification.
        const TESSELLATE_AREA_EDGES = 2;

        /// Default flags for building contours.
        const DEFAULT = Self::TESSELLATE_WALL_EDGES.bits();
    }
}

impl Default for BuildContoursFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One vertex produced directly by the contour walker, before simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawVertex {
    x: u16,
    y: u16,
    z: u16,
    region: RegionVertexId,
}

/// A vertex kept by the simplifier, still pointing back at the raw vertex it came from.
#[derive(Debug, Clone, Copy)]
struct SimplifiedPoint {
    x: u16,
    y: u16,
    z: u16,
    raw_index: u32,
}

/// Represents a simple, non-overlapping contour in field space.
///
/// "Non-overlapping" is aspirational, not guaranteed: self-intersections can
/// occur and are accepted by downstream polygonization.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
pub struct Contour {
    vertices: Vec<UVec4>,
    raw_vertices: Vec<UVec4>,
    region_id: RegionId,
    area: AreaType,
}

impl Contour {
    /// The simplified vertices. Each `w` component packs the next vertex's
    /// neighbor region id plus this vertex's `BORDER_VERTEX` flag.
    pub fn vertices(&self) -> &[UVec4] {
        &self.vertices
    }

    /// The raw, per-voxel-corner vertices this contour was simplified from.
    /// Each `w` component is the full [`RegionVertexId`] bit pattern.
    pub fn raw_vertices(&self) -> &[UVec4] {
        &self.raw_vertices
    }

    /// The region this contour traces the boundary of.
    pub fn region_id(&self) -> RegionId {
        self.region_id
    }

    /// The area type of the region this contour traces.
    pub fn area(&self) -> AreaType {
        self.area
    }
}

/// Represents a group of related contours, one per labeled region.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
pub struct ContourSet {
    contours: Vec<Contour>,
    aabb: Aabb3d,
    cell_size: f32,
    cell_height: f32,
    width: u16,
    height: u16,
    border_size: u16,
    max_error: f32,
}

impl ContourSet {
    /// The contours in the set, in the order their spans were visited.
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// The AABB in world space, with the border pad already removed.
    pub fn aabb(&self) -> Aabb3d {
        self.aabb
    }

    /// The size of each cell on the xz-plane.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The size of each cell along the y-axis.
    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// The width of the set, in cell units, with the border removed.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// The height of the set, in cell units, with the border removed.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The AABB border size the source heightfield was built with.
    pub fn border_size(&self) -> u16 {
        self.border_size
    }

    /// The max edge error this contour set was simplified with.
    pub fn max_error(&self) -> f32 {
        self.max_error
    }
}

impl CompactHeightfield {
    /// Traces and simplifies the boundary of every labeled region into a contour.
    ///
    /// The raw contours match the region outlines exactly. `max_error` and
    /// `max_edge_len` control how closely the simplified contours are
    /// allowed to deviate from the raw ones; portal vertices (where the
    /// neighbor region or area changes) are always kept regardless of error.
    /// Setting `max_edge_len` to zero disables long-edge tessellation.
    pub fn build_contours(
        &self,
        max_error: f32,
        max_edge_len: u16,
        build_flags: BuildContoursFlags,
    ) -> ContourSet {
        let mut aabb = self.aabb;
        if self.border_size > 0 {
            let pad = self.border_size as f32 * self.cell_size;
            aabb.min.x += pad;
            aabb.min.z += pad;
            aabb.max.x -= pad;
            aabb.max.z -= pad;
        }

        let region_count = (self.max_region.bits() & !RegionId::BORDER.bits()) as usize;
        let mut contours = Vec::with_capacity(region_count.max(8));

        let mut flags = self.edge_flags();

        for z in 0..self.height {
            for x in 0..self.width {
                let cell = *self.cell_at(x, z);
                for i in cell.index_range() {
                    if flags[i] == 0 || flags[i] == 0xf {
                        flags[i] = 0;
                        continue;
                    }
                    let region = self.spans[i].region;
                    if region.is_border_or_null() {
                        continue;
                    }
                    let area = self.areas[i];

                    let raw = self.walk_contour(x, z, i, &mut flags);
                    if raw.is_empty() {
                        continue;
                    }

                    let simplified = simplify_contour(&raw, max_error, max_edge_len, build_flags);
                    let mut vertices = finalize_vertices(&raw, &simplified);
                    remove_degenerate_segments(&mut vertices);

                    if vertices.len() < 3 {
                        continue;
                    }

                    let mut raw_vertices: Vec<UVec4> = raw
                        .iter()
                        .map(|v| UVec4::new(v.x as u32, v.y as u32, v.z as u32, v.region.bits()))
                        .collect();

                    if self.border_size > 0 {
                        let border = self.border_size as u32;
                        for v in vertices.iter_mut() {
                            v.x -= border;
                            v.z -= border;
                        }
                        for v in raw_vertices.iter_mut() {
                            v.x -= border;
                            v.z -= border;
                        }
                    }

                    contours.push(Contour {
                        vertices,
                        raw_vertices,
                        region_id: region,
                        area,
                    });
                }
            }
        }

        merge_holes(&mut contours);

        ContourSet {
            contours,
            aabb,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            width: self.width - self.border_size * 2,
            height: self.height - self.border_size * 2,
            border_size: self.border_size,
            max_error,
        }
    }

    /// Computes, per span, which of its four horizontal edges cross a region
    /// boundary. Bit `d` is set iff the edge in direction `d` is *not*
    /// internal to the span's own region (including edges facing an absent
    /// or border/null neighbor).
    fn edge_flags(&self) -> Vec<u8> {
        let mut flags = vec![0u8; self.spans.len()];
        for z in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell_at(x, z);
                for i in cell.index_range() {
                    let span = &self.spans[i];
                    if span.region.is_border_or_null() {
                        flags[i] = 0;
                        continue;
                    }
                    let mut internal = 0u8;
                    for dir in 0..4u8 {
                        let neighbor_region = match span.con(dir) {
                            Some(con) => {
                                let (_nx, _nz, n_i) = self.con_indices(x as i32, z as i32, dir, con);
                                self.spans[n_i].region
                            }
                            None => RegionId::NONE,
                        };
                        if neighbor_region == span.region {
                            internal = mark_internal_edge(internal, dir);
                        }
                    }
                    flags[i] = flip_all_bits(internal);
                }
            }
        }
        flags
    }

    /// Traces one closed ring of raw vertices around the region containing
    /// span `i`, starting from its lowest unvisited boundary edge.
    ///
    /// Consumes (clears) every boundary edge bit it crosses in `flags`, so a
    /// given edge contributes to at most one ring across the whole build.
    fn walk_contour(&self, mut x: u16, mut z: u16, mut i: usize, flags: &mut [u8]) -> Vec<RawVertex> {
        let mut dir = 0u8;
        while flags[i] & (1 << dir) == 0 {
            dir += 1;
        }
        let start_i = i;
        let start_dir = dir;
        let mut points = Vec::new();

        for iteration in 0..WALK_ITERATION_CAP {
            if flags[i] & (1 << dir) != 0 {
                let area = self.areas[i];
                let (corner_y, is_border_vertex) = self.corner_height(x, z, i, dir);
                let (mut px, mut pz) = (x, z);
                match dir {
                    0 => pz += 1,
                    1 => {
                        px += 1;
                        pz += 1;
                    }
                    2 => px += 1,
                    _ => {}
                }

                let mut region = RegionVertexId::NONE;
                if let Some(con) = self.spans[i].con(dir) {
                    let (_nx, _nz, n_i) = self.con_indices(x as i32, z as i32, dir, con);
                    region = RegionVertexId::from(self.spans[n_i].region);
                    if area != self.areas[n_i] {
                        region |= RegionVertexId::AREA_BORDER;
                    }
                }
                if is_border_vertex {
                    region |= RegionVertexId::BORDER_VERTEX;
                }
                points.push(RawVertex {
                    x: px,
                    y: corner_y,
                    z: pz,
                    region,
                });

                flags[i] &= !(1 << dir);
                dir = dir_cw(dir);
            } else {
                let Some(con) = self.spans[i].con(dir) else {
                    tracing::warn!(
                        x,
                        z,
                        dir,
                        "contour walk stepped into an unconnected edge; aborting ring"
                    );
                    return points;
                };
                let n_x = (x as i32 + dir_offset_x(dir) as i32) as u16;
                let n_z = (z as i32 + dir_offset_z(dir) as i32) as u16;
                i = self.cell_at(n_x, n_z).index() as usize + con as usize;
                x = n_x;
                z = n_z;
                dir = dir_ccw(dir);
            }

            if i == start_i && dir == start_dir {
                return points;
            }
            if iteration == WALK_ITERATION_CAP - 1 {
                tracing::warn!(
                    x,
                    z,
                    "contour walk exceeded the iteration safety cap; returning partial ring"
                );
            }
        }
        points
    }

    /// Resolves the height and border-vertex classification of the voxel
    /// corner at the clockwise end of edge `dir` of span `i`.
    fn corner_height(&self, x: u16, z: u16, i: usize, dir: u8) -> (u16, bool) {
        let span = &self.spans[i];
        let mut corner_y = span.y;
        let dir_p = dir_cw(dir);

        let combined = |span_index: usize| -> u32 {
            self.spans[span_index].region.bits() as u32 | ((self.areas[span_index].0 as u32) << 16)
        };

        let mut regs = [0u32; 4];
        regs[0] = combined(i);

        if let Some(con) = span.con(dir) {
            let (a_x, a_z, a_i) = self.con_indices(x as i32, z as i32, dir, con);
            corner_y = corner_y.max(self.spans[a_i].y);
            regs[1] = combined(a_i);
            if let Some(con2) = self.spans[a_i].con(dir_p) {
                let (_b_x, _b_z, b_i) = self.con_indices(a_x, a_z, dir_p, con2);
                corner_y = corner_y.max(self.spans[b_i].y);
                regs[2] = combined(b_i);
            }
        }
        if let Some(con) = span.con(dir_p) {
            let (a_x, a_z, a_i) = self.con_indices(x as i32, z as i32, dir_p, con);
            corner_y = corner_y.max(self.spans[a_i].y);
            regs[3] = combined(a_i);
            if let Some(con2) = self.spans[a_i].con(dir) {
                let (_b_x, _b_z, b_i) = self.con_indices(a_x, a_z, dir, con2);
                corner_y = corner_y.max(self.spans[b_i].y);
                regs[2] = combined(b_i);
            }
        }

        let region_of = |packed: u32| RegionId::from_bits_retain((packed & 0xFFFF) as u16);

        // The vertex is a border vertex when there are two identical exterior
        // cells in a row, at least one of the remaining two is interior, both
        // of those two share an area code, and none of the four slots are unset.
        let is_border_vertex = (0..4u8).any(|j| {
            let a = regs[j as usize];
            let b = regs[((j + 1) & 0x3) as usize];
            let c = regs[((j + 2) & 0x3) as usize];
            let d = regs[((j + 3) & 0x3) as usize];

            let two_same_exts = a == b && region_of(a).is_border();
            let two_ints = !(region_of(c).is_border() && region_of(d).is_border());
            let ints_same_area = (c >> 16) == (d >> 16);
            let no_zeros = a != 0 && b != 0 && c != 0 && d != 0;
            two_same_exts && two_ints && ints_same_area && no_zeros
        });

        (corner_y, is_border_vertex)
    }
}

/// Flips all four direction bits of a span's internal-edge mask: turns "is
/// internal to my own region" into "is a boundary edge" (edge-flag builder,
/// §4.1), and is its own inverse.
#[inline]
fn flip_all_bits(f: u8) -> u8 {
    f ^ 0xf
}

/// Marks direction `dir` as internal (same-region) in a span's internal-edge
/// mask, ahead of the [`flip_all_bits`] step that turns it into a boundary
/// mask.
#[inline]
fn mark_internal_edge(mask: u8, dir: u8) -> u8 {
    mask | (1 << dir)
}

/// `true` if direction `dir` is set in an internal-edge mask.
#[inline]
fn is_connected(mask: u8, dir: u8) -> bool {
    mask & (1 << dir) != 0
}

fn lex_less(a: (u16, u16), b: (u16, u16)) -> bool {
    a.0 < b.0 || (a.0 == b.0 && a.1 < b.1)
}

/// Finds the indices of the lexicographically minimum and maximum raw
/// vertices, used to seed a simplification with no portals at all.
fn lex_extreme_indices(raw: &[RawVertex]) -> (usize, usize) {
    let mut min_i = 0;
    let mut max_i = 0;
    for (i, v) in raw.iter().enumerate().skip(1) {
        if lex_less((v.x, v.z), (raw[min_i].x, raw[min_i].z)) {
            min_i = i;
        }
        if lex_less((raw[max_i].x, raw[max_i].z), (v.x, v.z)) {
            max_i = i;
        }
    }
    (min_i, max_i)
}

/// Reduces a raw ring to a polyline respecting `max_error`, mandatory
/// portal/area-border breakpoints, and `max_edge_len`. Does not yet pack the
/// final region bits; see [`finalize_vertices`].
fn simplify_contour(
    raw: &[RawVertex],
    max_error: f32,
    max_edge_len: u16,
    build_flags: BuildContoursFlags,
) -> Vec<SimplifiedPoint> {
    let n = raw.len() as u32;
    let mut simplified = Vec::new();

    let has_connections = raw
        .iter()
        .any(|v| v.region.intersects(RegionVertexId::REGION_MASK));

    if has_connections {
        for i in 0..raw.len() {
            let next = (i + 1) % raw.len();
            let region = RegionId::from(raw[i].region);
            let next_region = RegionId::from(raw[next].region);
            let area_border_changes = raw[i].region.contains(RegionVertexId::AREA_BORDER)
                != raw[next].region.contains(RegionVertexId::AREA_BORDER);
            if region != next_region || area_border_changes {
                simplified.push(SimplifiedPoint {
                    x: raw[i].x,
                    y: raw[i].y,
                    z: raw[i].z,
                    raw_index: i as u32,
                });
            }
        }
    }

    if simplified.is_empty() {
        // Either a pure outer ring, or (rarely) a ring bordering a single
        // uniform neighbor throughout: either way, seed with the
        // lexicographic extremes so at least two points exist to refine from.
        let (min_i, max_i) = lex_extreme_indices(raw);
        for idx in [min_i, max_i] {
            simplified.push(SimplifiedPoint {
                x: raw[idx].x,
                y: raw[idx].y,
                z: raw[idx].z,
                raw_index: idx as u32,
            });
        }
    }

    let max_error_sq = (max_error as f64) * (max_error as f64);
    let mut i = 0;
    while i < simplified.len() {
        let next = (i + 1) % simplified.len();
        let mut a = simplified[i];
        let mut b = simplified[next];

        let forward = (b.x, b.z) > (a.x, a.z);
        let (mut c_i, c_step, end_i): (u32, u32, u32) = if forward {
            ((a.raw_index + 1) % n, 1, b.raw_index)
        } else {
            let step = n - 1;
            let c_i = (b.raw_index + step) % n;
            std::mem::swap(&mut a.x, &mut b.x);
            std::mem::swap(&mut a.z, &mut b.z);
            (c_i, step, a.raw_index)
        };

        // Never tessellate across a portal already seeded: only candidates
        // on an outer wall or an area-border edge are eligible, and
        // eligibility is decided once, from the first interior raw vertex.
        let eligible = {
            let candidate = &raw[c_i as usize];
            candidate
                .region
                .intersection(RegionVertexId::REGION_MASK)
                .is_empty()
                || candidate.region.contains(RegionVertexId::AREA_BORDER)
        };

        let mut max_deviation = 0.0f64;
        let mut max_raw_index: Option<u32> = None;
        if eligible {
            let mut k = c_i;
            while k != end_i {
                let p = &raw[k as usize];
                let deviation = dist_point_to_segment_sq(
                    (p.x as i64, p.z as i64),
                    (a.x as i64, a.z as i64),
                    (b.x as i64, b.z as i64),
                );
                if deviation > max_deviation {
                    max_deviation = deviation;
                    max_raw_index = Some(k);
                }
                k = (k + c_step) % n;
            }
        }

        match max_raw_index {
            Some(idx) if max_deviation > max_error_sq => {
                let v = &raw[idx as usize];
                simplified.insert(
                    i + 1,
                    SimplifiedPoint {
                        x: v.x,
                        y: v.y,
                        z: v.z,
                        raw_index: idx,
                    },
                );
            }
            _ => i += 1,
        }
    }

    if max_edge_len > 0 {
        let max_edge_len_sq = max_edge_len as i64 * max_edge_len as i64;
        let mut i = 0;
        while i < simplified.len() {
            let a = simplified[i];
            let b = simplified[(i + 1) % simplified.len()];

            let next_raw_index = (a.raw_index + 1) % n;
            let next_raw = &raw[next_raw_index as usize];
            let is_wall = next_raw
                .region
                .intersection(RegionVertexId::REGION_MASK)
                .is_empty();
            let is_area_border = next_raw.region.contains(RegionVertexId::AREA_BORDER);
            let tessellate = (is_wall && build_flags.contains(BuildContoursFlags::TESSELLATE_WALL_EDGES))
                || (is_area_border && build_flags.contains(BuildContoursFlags::TESSELLATE_AREA_EDGES));

            let mut inserted = false;
            if tessellate {
                let dx = b.x as i64 - a.x as i64;
                let dz = b.z as i64 - a.z as i64;
                if dx * dx + dz * dz > max_edge_len_sq {
                    let span = if b.raw_index < a.raw_index {
                        b.raw_index + n - a.raw_index
                    } else {
                        b.raw_index - a.raw_index
                    };
                    if span > 1 {
                        let forward = (b.x, b.z) > (a.x, a.z);
                        let mid = if forward {
                            (a.raw_index + span / 2) % n
                        } else {
                            (a.raw_index + (span + 1) / 2) % n
                        };
                        let v = &raw[mid as usize];
                        simplified.insert(
                            i + 1,
                            SimplifiedPoint {
                                x: v.x,
                                y: v.y,
                                z: v.z,
                                raw_index: mid,
                            },
                        );
                        inserted = true;
                    }
                }
            }
            if !inserted {
                i += 1;
            }
        }
    }

    simplified
}

/// Packs each simplified vertex's final `w` component: the neighbor region
/// id from the *next* raw vertex, and the `BORDER_VERTEX` flag from the
/// *current* one.
fn finalize_vertices(raw: &[RawVertex], simplified: &[SimplifiedPoint]) -> Vec<UVec4> {
    let n = raw.len() as u32;
    simplified
        .iter()
        .map(|p| {
            let next_index = (p.raw_index + 1) % n;
            let next_region = raw[next_index as usize]
                .region
                .intersection(RegionVertexId::REGION_MASK);
            let border_bit = raw[p.raw_index as usize]
                .region
                .intersection(RegionVertexId::BORDER_VERTEX);
            UVec4::new(
                p.x as u32,
                p.y as u32,
                p.z as u32,
                (next_region | border_bit).bits(),
            )
        })
        .collect()
}

/// Removes vertices coincident with their successor in the XZ plane.
///
/// Matches the source's single forward scan: the scan index always
/// advances, even right after a removal, so a new coincidence created
/// between the element before the removed one and its new successor can
/// survive a pass. Downstream stages tolerate the rare residual.
fn remove_degenerate_segments(vertices: &mut Vec<UVec4>) {
    let mut i = 0;
    while i < vertices.len() {
        let next = (i + 1) % vertices.len();
        if vertices[i].x == vertices[next].x && vertices[i].z == vertices[next].z {
            vertices.remove(i);
        }
        i += 1;
    }
}

/// Signed 2D area in the XZ plane, biased-rounded the way the source does it:
/// `(2A + 1) / 2` under truncating integer division. Positive for an outer
/// (clockwise-wound-as-seen-from-above) contour, negative for a hole.
fn signed_area(vertices: &[UVec4]) -> i64 {
    let n = vertices.len();
    let mut area: i64 = 0;
    for i in 0..n {
        let prev = if i == 0 { n - 1 } else { i - 1 };
        let (xi, zi) = (vertices[i].x as i64, vertices[i].z as i64);
        let (xp, zp) = (vertices[prev].x as i64, vertices[prev].z as i64);
        area += xi * zp - xp * zi;
    }
    (area + 1) / 2
}

/// Exhaustively searches for the closest mutually-visible vertex pair between
/// a positive-area outline and a hole, restricted to candidates that lie in
/// the forward cone of the outline vertex (both "left-or-on" tests against
/// its previous and next neighbor must hold).
fn closest_indices(outer: &[UVec4], hole: &[UVec4]) -> Option<(usize, usize)> {
    let m = outer.len();
    let k = hole.len();
    if m == 0 || k == 0 {
        return None;
    }

    let mut best: Option<(usize, usize, i64)> = None;
    for a in 0..m {
        let prev = outer[(a + m - 1) % m];
        let cur = outer[a];
        let next = outer[(a + 1) % m];
        let cur_xz = (cur.x as i64, cur.z as i64);
        let prev_xz = (prev.x as i64, prev.z as i64);
        let next_xz = (next.x as i64, next.z as i64);

        for b in 0..k {
            let cand = hole[b];
            let cand_xz = (cand.x as i64, cand.z as i64);
            let in_cone = left_or_on(cur_xz, prev_xz, cand_xz) && left_or_on(cur_xz, next_xz, cand_xz);
            if !in_cone {
                continue;
            }
            let dx = cand_xz.0 - cur_xz.0;
            let dz = cand_xz.1 - cur_xz.1;
            let dist = dx * dx + dz * dz;
            if best.is_none_or(|(_, _, best_dist)| dist < best_dist) {
                best = Some((a, b, dist));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

/// Splices `hole`, rotated to pivot `ib`, into `outer`, rotated to pivot
/// `ia`, doubling both pivot vertices. The resulting length is
/// `outer.len() + hole.len() + 2`.
fn splice(outer: &[UVec4], ia: usize, hole: &[UVec4], ib: usize) -> Vec<UVec4> {
    let m = outer.len();
    let k = hole.len();
    let mut result = Vec::with_capacity(m + k + 2);
    for offset in 0..=m {
        result.push(outer[(ia + offset) % m]);
    }
    for offset in 0..=k {
        result.push(hole[(ib + offset) % k]);
    }
    result
}

/// Reorients hole contours (negative signed area) by splicing each into a
/// same-region positive-area contour, via the closest mutually-visible
/// vertex pair. Holes with no mergeable outline, or no visible pair, are
/// left as-is.
fn merge_holes(contours: &mut [Contour]) {
    let areas: Vec<i64> = contours.iter().map(|c| signed_area(&c.vertices)).collect();

    for hole_idx in 0..contours.len() {
        if areas[hole_idx] >= 0 {
            continue;
        }
        let hole_region = contours[hole_idx].region_id;

        let Some(outer_idx) = contours.iter().position(|c| {
            c.region_id == hole_region && !c.vertices.is_empty() && signed_area(&c.vertices) > 0
        }) else {
            tracing::warn!(
                region = hole_region.bits(),
                "hole contour has no mergeable same-region outline; leaving as-is"
            );
            continue;
        };
        if outer_idx == hole_idx {
            continue;
        }

        let Some((ia, ib)) = closest_indices(&contours[outer_idx].vertices, &contours[hole_idx].vertices)
        else {
            tracing::warn!(
                region = hole_region.bits(),
                "no cone-visible vertex pair found between hole and outline; skipping merge"
            );
            continue;
        };

        let spliced = splice(&contours[outer_idx].vertices, ia, &contours[hole_idx].vertices, ib);
        contours[outer_idx].vertices = spliced;
    }
}
