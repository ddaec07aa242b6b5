//! Procedural geometry for the built-in primitives
//!
//! Every generator builds its mesh at the local origin with outward-facing,
//! counter-clockwise triangles. Mesh-backed shapes use [`sphere`] and
//! [`torus`]; the painter backend uses the rest to draw primitives.
//!
//! Segment, ring and slice counts above [`MAX_SEGMENTS`] produce an empty
//! mesh, which the render path treats as a failed build.

use std::f32::consts::{PI, TAU};

use log::debug;
use nalgebra::{Point3, Vector3};

use super::triangulate::triangulate;
use super::MeshData;

/// Largest segment, ring or slice count a generator accepts
pub const MAX_SEGMENTS: u32 = 1024;

/// Vertex count of a `(rows + 1) x (cols + 1)` grid of points
///
/// `None` when either count is above [`MAX_SEGMENTS`] or the total does not
/// fit a `u32` index.
fn grid_vertex_count(rows: u32, cols: u32) -> Option<u32> {
    if rows > MAX_SEGMENTS || cols > MAX_SEGMENTS {
        return None;
    }
    rows.checked_add(1)?.checked_mul(cols.checked_add(1)?)
}

fn too_many_segments(name: &str, counts: &[u32]) -> MeshData {
    debug!("{} counts {:?} exceed {}, generating nothing", name, counts, MAX_SEGMENTS);
    MeshData::new(name)
}

/// Axis-aligned box centered on the origin
pub fn cube(size: Vector3<f32>) -> MeshData {
    let h = size / 2.0;
    let vertices = vec![
        Point3::new(-h.x, -h.y, -h.z),
        Point3::new(h.x, -h.y, -h.z),
        Point3::new(h.x, h.y, -h.z),
        Point3::new(-h.x, h.y, -h.z),
        Point3::new(-h.x, -h.y, h.z),
        Point3::new(h.x, -h.y, h.z),
        Point3::new(h.x, h.y, h.z),
        Point3::new(-h.x, h.y, h.z),
    ];

    // Six quads, packed as [count, v0, v1, v2, v3]
    #[rustfmt::skip]
    let faces: [u32; 30] = [
        4, 4, 5, 6, 7, // front (+Z)
        4, 1, 0, 3, 2, // back (-Z)
        4, 5, 1, 2, 6, // right (+X)
        4, 0, 4, 7, 3, // left (-X)
        4, 7, 6, 2, 3, // top (+Y)
        4, 0, 1, 5, 4, // bottom (-Y)
    ];
    let indices = triangulate(&faces, 6, false)
        .map(|t| t.into_indices())
        .unwrap_or_default();

    MeshData::from_data(vertices, indices, "Cube")
}

/// UV sphere with `rings` latitude lines between the poles and `slices`
/// meridians
pub fn sphere(radius: f32, rings: u32, slices: u32) -> MeshData {
    let bands = rings.max(1).saturating_add(1);
    let slices = slices.max(2);
    let Some(vertex_count) = grid_vertex_count(bands, slices) else {
        return too_many_segments("Sphere", &[rings, slices]);
    };
    let row = slices + 1;

    let mut vertices = Vec::with_capacity(vertex_count as usize);
    for b in 0..=bands {
        let theta = PI * b as f32 / bands as f32;
        let y = radius * theta.cos();
        let ring_radius = radius * theta.sin();
        for s in 0..=slices {
            let phi = TAU * s as f32 / slices as f32;
            vertices.push(Point3::new(ring_radius * phi.cos(), y, ring_radius * phi.sin()));
        }
    }

    let mut indices = Vec::with_capacity((slices * (2 * bands - 2) * 3) as usize);
    for b in 0..bands {
        for s in 0..slices {
            let a = b * row + s;
            let below = (b + 1) * row + s;
            // Skip the degenerate half of each quad at the poles
            if b != 0 {
                indices.extend_from_slice(&[a, a + 1, below]);
            }
            if b != bands - 1 {
                indices.extend_from_slice(&[a + 1, below + 1, below]);
            }
        }
    }

    MeshData::from_data(vertices, indices, "Sphere")
}

/// Cylinder or cone from y = 0 up to y = `height`
///
/// A zero `radius_top` gives a pointed cone. Caps are only built for rings
/// with a non-zero radius.
pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    slices: u32,
    caps: bool,
) -> MeshData {
    let slices = slices.max(3);
    if slices > MAX_SEGMENTS {
        return too_many_segments("Cylinder", &[slices]);
    }
    let mut vertices = Vec::with_capacity((slices * 2 + 2) as usize);

    for (radius, y) in [(radius_bottom, 0.0), (radius_top, height)] {
        for i in 0..slices {
            let phi = TAU * i as f32 / slices as f32;
            vertices.push(Point3::new(radius * phi.cos(), y, radius * phi.sin()));
        }
    }

    let mut indices = Vec::new();
    for i in 0..slices {
        let j = (i + 1) % slices;
        let (b0, b1) = (i, j);
        let (t0, t1) = (slices + i, slices + j);
        indices.extend_from_slice(&[b0, t0, b1, b1, t0, t1]);
    }

    if caps {
        if radius_bottom > 0.0 {
            let center = vertices.len() as u32;
            vertices.push(Point3::new(0.0, 0.0, 0.0));
            for i in 0..slices {
                indices.extend_from_slice(&[center, i, (i + 1) % slices]);
            }
        }
        if radius_top > 0.0 {
            let center = vertices.len() as u32;
            vertices.push(Point3::new(0.0, height, 0.0));
            for i in 0..slices {
                indices.extend_from_slice(&[center, slices + (i + 1) % slices, slices + i]);
            }
        }
    }

    MeshData::from_data(vertices, indices, "Cylinder")
}

/// Flat rectangle on the XZ plane facing +Y
pub fn plane(width: f32, length: f32) -> MeshData {
    let (hw, hl) = (width / 2.0, length / 2.0);
    let vertices = vec![
        Point3::new(-hw, 0.0, -hl),
        Point3::new(hw, 0.0, -hl),
        Point3::new(hw, 0.0, hl),
        Point3::new(-hw, 0.0, hl),
    ];
    MeshData::from_data(vertices, vec![0, 2, 1, 0, 3, 2], "Plane")
}

/// Filled circle in the XY plane facing +Z
pub fn disc(radius: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    if segments > MAX_SEGMENTS {
        return too_many_segments("Disc", &[segments]);
    }
    let mut vertices = Vec::with_capacity(segments as usize + 1);
    vertices.push(Point3::origin());
    vertices.extend(circle_outline(radius, segments));

    let mut indices = Vec::with_capacity(segments as usize * 3);
    for i in 0..segments {
        indices.extend_from_slice(&[0, i + 1, (i + 1) % segments + 1]);
    }
    MeshData::from_data(vertices, indices, "Disc")
}

/// Rim points of a circle in the XY plane (not closed: last != first)
///
/// Empty above [`MAX_SEGMENTS`].
pub fn circle_outline(radius: f32, segments: u32) -> Vec<Point3<f32>> {
    let segments = segments.max(3);
    if segments > MAX_SEGMENTS {
        return Vec::new();
    }
    (0..segments)
        .map(|i| {
            let angle = TAU * i as f32 / segments as f32;
            Point3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
        })
        .collect()
}

/// Ring torus around the Y axis
///
/// `major_radius` is the distance from the center to the middle of the
/// tube, `minor_radius` the radius of the tube itself.
pub fn torus(
    major_radius: f32,
    minor_radius: f32,
    major_segments: u32,
    minor_segments: u32,
) -> MeshData {
    let major = major_segments.max(3);
    let minor = minor_segments.max(3);
    let Some(vertex_count) = grid_vertex_count(minor, major) else {
        return too_many_segments("Torus", &[major_segments, minor_segments]);
    };
    let row = major + 1;

    let mut vertices = Vec::with_capacity(vertex_count as usize);
    for j in 0..=minor {
        let v = TAU * j as f32 / minor as f32;
        for i in 0..=major {
            let u = TAU * i as f32 / major as f32;
            let ring = major_radius + minor_radius * v.cos();
            vertices.push(Point3::new(ring * u.cos(), minor_radius * v.sin(), ring * u.sin()));
        }
    }

    let mut indices = Vec::with_capacity((major * minor * 6) as usize);
    for j in 1..=minor {
        for i in 1..=major {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    MeshData::from_data(vertices, indices, "Torus")
}

/// Line segments of a grid on the XZ plane centered on the origin
///
/// Empty above [`MAX_SEGMENTS`] slices.
pub fn grid_lines(slices: u32, spacing: f32) -> Vec<(Point3<f32>, Point3<f32>)> {
    if slices > MAX_SEGMENTS {
        return Vec::new();
    }
    let half = (slices / 2) as i32;
    let extent = half as f32 * spacing;

    let mut lines = Vec::with_capacity((half as usize * 2 + 1) * 2);
    for i in -half..=half {
        let offset = i as f32 * spacing;
        lines.push((
            Point3::new(offset, 0.0, -extent),
            Point3::new(offset, 0.0, extent),
        ));
        lines.push((
            Point3::new(-extent, 0.0, offset),
            Point3::new(extent, 0.0, offset),
        ));
    }
    lines
}
