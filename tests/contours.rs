//! Integration tests built from hand-assembled `CompactHeightfield` fixtures,
//! covering the concrete scenarios the contour-extraction stage is designed
//! against: a lone rectangular region, a shared portal edge, an annulus
//! (hole-merge), long-edge tessellation, an isolated 1x1 region, and the
//! `borderSize` coordinate offset.

use approx::assert_relative_eq;
use navmesh_contours::{Aabb3d, AreaType, BuildContoursFlags, CompactCell, CompactHeightfield, CompactSpan, RegionId};

/// Builds a single-span-per-cell heightfield from a row-major grid of
/// optional `(region, area)` pairs. `None` means no span at that cell (a
/// hole, or simply outside the walkable surface).
fn build_heightfield(
    width: u16,
    height: u16,
    border_size: u16,
    cell_size: f32,
    aabb: Aabb3d,
    cells_regions: &[Option<(RegionId, AreaType)>],
) -> CompactHeightfield {
    assert_eq!(cells_regions.len(), width as usize * height as usize);

    let mut cells = vec![CompactCell::default(); cells_regions.len()];
    let mut spans = Vec::new();
    let mut areas = Vec::new();
    let mut span_index = vec![None; cells_regions.len()];
    let mut max_region = RegionId::NONE;

    for z in 0..height {
        for x in 0..width {
            let idx = x as usize + z as usize * width as usize;
            let Some((region, area)) = cells_regions[idx] else {
                continue;
            };
            let mut cell = CompactCell::default();
            cell.set_index(spans.len() as u32);
            cell.set_count(1);
            cells[idx] = cell;
            span_index[idx] = Some(spans.len());

            let mut span = CompactSpan::default();
            span.y = 0;
            span.region = region;
            spans.push(span);
            areas.push(area);

            if region.bits() > max_region.bits() {
                max_region = region;
            }
        }
    }

    const DIR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];
    for z in 0..height {
        for x in 0..width {
            let idx = x as usize + z as usize * width as usize;
            let Some(i) = span_index[idx] else { continue };
            for (dir, (dx, dz)) in DIR_OFFSETS.into_iter().enumerate() {
                let nx = x as i32 + dx;
                let nz = z as i32 + dz;
                if nx < 0 || nz < 0 || nx >= width as i32 || nz >= height as i32 {
                    continue;
                }
                let n_idx = nx as usize + nz as usize * width as usize;
                if span_index[n_idx].is_some() {
                    spans[i].set_con(dir as u8, Some(0u8));
                }
            }
        }
    }

    CompactHeightfield::new(
        width,
        height,
        border_size,
        cell_size,
        cell_size,
        aabb,
        cells,
        spans,
        areas,
        max_region,
    )
    .expect("fixture arrays are consistent by construction")
}

fn solid_block(width: u16, height: u16, region: u16) -> CompactHeightfield {
    let cells = vec![Some((RegionId::from(region), AreaType::from(1))); width as usize * height as usize];
    build_heightfield(width, height, 0, 1.0, Aabb3d::default(), &cells)
}

fn has_vertex_at(vertices: &[glam::UVec4], x: u32, z: u32) -> bool {
    vertices.iter().any(|v| v.x == x && v.z == z)
}

#[test]
fn single_square_region_yields_one_rectangular_contour() {
    let heightfield = solid_block(4, 4, 1);
    let contour_set = heightfield.build_contours(1.0, 0, BuildContoursFlags::default());

    assert_eq!(contour_set.contours().len(), 1);
    let contour = &contour_set.contours()[0];
    assert_eq!(contour.region_id(), RegionId::from(1));
    assert_eq!(contour.vertices().len(), 4);
    for (x, z) in [(0, 0), (4, 0), (4, 4), (0, 4)] {
        assert!(
            has_vertex_at(contour.vertices(), x, z),
            "missing corner ({x}, {z}) in {:?}",
            contour.vertices()
        );
    }
}

#[test]
fn adjacent_regions_preserve_portal_seeds_at_large_error() {
    // A 4x2 grid: region 1 occupies x in [0, 2), region 2 occupies x in [2, 4).
    let mut cells = vec![None; 8];
    for z in 0..2u16 {
        for x in 0..4u16 {
            let region = if x < 2 { 1 } else { 2 };
            cells[x as usize + z as usize * 4] = Some((RegionId::from(region), AreaType::from(1)));
        }
    }
    let heightfield = build_heightfield(4, 2, 0, 1.0, Aabb3d::default(), &cells);
    let contour_set = heightfield.build_contours(100.0, 0, BuildContoursFlags::default());

    assert_eq!(contour_set.contours().len(), 2);

    let region_mask = 0xFFFFu32;
    let region_one = contour_set
        .contours()
        .iter()
        .find(|c| c.region_id() == RegionId::from(1))
        .expect("region 1 contour present");
    let region_two = contour_set
        .contours()
        .iter()
        .find(|c| c.region_id() == RegionId::from(2))
        .expect("region 2 contour present");

    assert!(
        region_one.vertices().iter().any(|v| (v.w & region_mask) == 2),
        "region 1 contour should carry a portal vertex referencing region 2: {:?}",
        region_one.vertices()
    );
    assert!(
        region_two.vertices().iter().any(|v| (v.w & region_mask) == 1),
        "region 2 contour should carry a portal vertex referencing region 1: {:?}",
        region_two.vertices()
    );
}

#[test]
fn annulus_hole_is_merged_into_its_enclosing_region() {
    // A 5x5 block of region 1 with a single missing cell at its center.
    let mut cells = vec![Some((RegionId::from(1), AreaType::from(1))); 25];
    cells[2 + 2 * 5] = None;
    let heightfield = build_heightfield(5, 5, 0, 1.0, Aabb3d::default(), &cells);
    let contour_set = heightfield.build_contours(0.01, 0, BuildContoursFlags::default());

    assert_eq!(contour_set.contours().len(), 2);
    assert!(
        contour_set.contours().iter().all(|c| c.region_id() == RegionId::from(1)),
        "both the outer and hole ring belong to the same region"
    );

    let merged = contour_set
        .contours()
        .iter()
        .max_by_key(|c| c.vertices().len())
        .unwrap();
    // Outer perimeter (4 corners) + inner hole boundary (4 corners) + 2 doubled pivots.
    assert_eq!(merged.vertices().len(), 10);
}

#[test]
fn isolated_single_cell_region_yields_four_vertices() {
    let mut cells = vec![None; 9];
    cells[1 + 1 * 3] = Some((RegionId::from(1), AreaType::from(1)));
    let heightfield = build_heightfield(3, 3, 0, 1.0, Aabb3d::default(), &cells);
    let contour_set = heightfield.build_contours(0.01, 0, BuildContoursFlags::default());

    assert_eq!(contour_set.contours().len(), 1);
    let contour = &contour_set.contours()[0];
    assert_eq!(contour.vertices().len(), 4);
    for (x, z) in [(1, 1), (2, 1), (2, 2), (1, 2)] {
        assert!(has_vertex_at(contour.vertices(), x, z));
    }
}

#[test]
fn long_wall_is_tessellated_only_when_flag_is_set() {
    let heightfield = solid_block(20, 1, 1);

    let tessellated = heightfield.build_contours(0.01, 2, BuildContoursFlags::TESSELLATE_WALL_EDGES);
    let contour = &tessellated.contours()[0];
    assert!(contour.vertices().len() > 4, "expected midpoint insertions to subdivide the long wall");
    for i in 0..contour.vertices().len() {
        let a = contour.vertices()[i];
        let b = contour.vertices()[(i + 1) % contour.vertices().len()];
        let dx = a.x as i64 - b.x as i64;
        let dz = a.z as i64 - b.z as i64;
        assert!(dx * dx + dz * dz <= 4, "edge ({a:?}, {b:?}) exceeds maxEdgeLen^2");
    }

    let untessellated = heightfield.build_contours(0.01, 2, BuildContoursFlags::empty());
    assert_eq!(untessellated.contours()[0].vertices().len(), 4);
}

#[test]
fn border_size_offset_is_subtracted_from_vertices_and_bounds() {
    let mut cells = vec![Some((RegionId::BORDER, AreaType::from(0))); 36];
    for z in 1..5u16 {
        for x in 1..5u16 {
            cells[x as usize + z as usize * 6] = Some((RegionId::from(1), AreaType::from(1)));
        }
    }
    let aabb = Aabb3d {
        min: glam::Vec3::new(0.0, 0.0, 0.0),
        max: glam::Vec3::new(6.0, 1.0, 6.0),
    };
    let heightfield = build_heightfield(6, 6, 1, 1.0, aabb, &cells);
    let contour_set = heightfield.build_contours(1.0, 0, BuildContoursFlags::default());

    assert_eq!(contour_set.contours().len(), 1);
    let contour = &contour_set.contours()[0];
    for (x, z) in [(0, 0), (4, 0), (4, 4), (0, 4)] {
        assert!(has_vertex_at(contour.vertices(), x, z));
    }

    let shrunk_aabb = contour_set.aabb();
    assert_relative_eq!(shrunk_aabb.min.x, 1.0);
    assert_relative_eq!(shrunk_aabb.min.z, 1.0);
    assert_relative_eq!(shrunk_aabb.max.x, 5.0);
    assert_relative_eq!(shrunk_aabb.max.z, 5.0);
}

#[test]
fn l_shaped_region_keeps_the_notch_at_tight_error_and_collapses_at_loose_error() {
    // A 2x2 block of region 1 with one corner cell missing: an L-tromino
    // whose outer boundary has six corners, one of them the inward notch.
    let cells = vec![
        Some((RegionId::from(1), AreaType::from(1))),
        Some((RegionId::from(1), AreaType::from(1))),
        Some((RegionId::from(1), AreaType::from(1))),
        None,
    ];
    let heightfield = build_heightfield(2, 2, 0, 1.0, Aabb3d::default(), &cells);

    let tight = heightfield.build_contours(0.1, 0, BuildContoursFlags::default());
    assert_eq!(tight.contours().len(), 1);
    assert_eq!(tight.contours()[0].vertices().len(), 6);
    assert!(has_vertex_at(tight.contours()[0].vertices(), 1, 1), "notch corner must survive a tight error bound");

    let loose = heightfield.build_contours(10.0, 0, BuildContoursFlags::default());
    assert!(
        loose.contours().is_empty(),
        "a lex-extreme two-vertex seed with no portals should be discarded for being too short"
    );
}

#[test]
fn no_consecutive_vertices_coincide_in_the_xz_plane() {
    let heightfield = solid_block(4, 4, 1);
    let contour_set = heightfield.build_contours(1.0, 0, BuildContoursFlags::default());
    for contour in contour_set.contours() {
        let vertices = contour.vertices();
        assert!(vertices.len() >= 3);
        for i in 0..vertices.len() {
            let a = vertices[i];
            let b = vertices[(i + 1) % vertices.len()];
            assert!(a.x != b.x || a.z != b.z, "consecutive vertices coincide: {a:?}, {b:?}");
        }
    }
}

#[test]
fn building_twice_from_the_same_input_is_bit_identical() {
    let heightfield = solid_block(6, 6, 3);
    let first = heightfield.build_contours(1.0, 4, BuildContoursFlags::default());
    let second = heightfield.build_contours(1.0, 4, BuildContoursFlags::default());
    assert_eq!(first, second);
}

#[test]
fn empty_heightfield_yields_no_contours() {
    let cells = vec![None; 16];
    let heightfield = build_heightfield(4, 4, 0, 1.0, Aabb3d::default(), &cells);
    let contour_set = heightfield.build_contours(1.0, 0, BuildContoursFlags::default());
    assert!(contour_set.contours().is_empty());
}
