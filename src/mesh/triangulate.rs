//! Fan triangulation of packed polygon faces
//!
//! Scene files describe polygons as a flat index buffer where every face is
//! its vertex count followed by that many vertex indices:
//!
//! ```text
//! [n0, v0_0, v0_1, .., v0_{n0-1}, n1, v1_0, ..]
//! ```
//!
//! The renderer only accepts triangles, so each n-gon is split into `n - 2`
//! triangles that all share the face's first vertex:
//!
//! ```text
//! (v0, v1, v2), (v0, v2, v3), .., (v0, v_{n-2}, v_{n-1})
//! ```
//!
//! Faces with fewer than three vertices contribute nothing, but their
//! indices are still skipped so the following faces line up.
//!
//! ## Two passes
//!
//! The first pass only counts triangles so the output buffer is allocated
//! once at its final size. The second pass emits the indices. Both passes
//! walk the buffer through the same [`Faces`] iterator, so they always agree
//! on which faces exist.
//!
//! ## Malformed input
//!
//! Walking stops at the end of the buffer. A face whose declared vertex
//! count runs past the end is treated as truncated: it is not emitted and
//! nothing after it is read.

use log::debug;

/// Iterator over the faces of a packed face buffer
///
/// Yields the vertex indices of each face, including degenerate ones.
#[derive(Clone, Debug)]
pub struct Faces<'a> {
    data: &'a [u32],
    remaining: usize,
    position: usize,
    truncated: bool,
}

impl<'a> Faces<'a> {
    /// Walk at most `n_faces` faces of `data`
    pub fn new(data: &'a [u32], n_faces: usize) -> Self {
        Self {
            data,
            remaining: n_faces,
            position: 0,
            truncated: false,
        }
    }

    /// Offset of the next unread entry
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once a face ran past the end of the buffer
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<'a> Iterator for Faces<'a> {
    type Item = &'a [u32];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.position >= self.data.len() {
            return None;
        }

        let count = self.data[self.position] as usize;
        let start = self.position + 1;
        let end = match start.checked_add(count) {
            Some(end) if end <= self.data.len() => end,
            _ => {
                self.truncated = true;
                self.position = self.data.len();
                self.remaining = 0;
                return None;
            }
        };

        self.position = end;
        self.remaining -= 1;
        Some(&self.data[start..end])
    }
}

/// Triangle index buffer produced by [`triangulate`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triangulation {
    indices: Vec<u32>,
}

impl Triangulation {
    /// Flat index list, three entries per triangle
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn into_indices(self) -> Vec<u32> {
        self.indices
    }
}

/// Number of triangles fan triangulation would produce (first pass)
pub fn count_triangles(faces: &[u32], n_faces: usize) -> usize {
    Faces::new(faces, n_faces)
        .filter(|face| face.len() >= 3)
        .map(|face| face.len() - 2)
        .sum()
}

/// Fan-triangulate `n_faces` packed faces
///
/// With `reverse_winding` the last two indices of every triangle are
/// swapped, which restores front faces for geometry that was mirrored on
/// import (for example a Z-up to Y-up axis swap).
///
/// Returns `None` when no triangles are produced.
pub fn triangulate(faces: &[u32], n_faces: usize, reverse_winding: bool) -> Option<Triangulation> {
    let n_triangles = count_triangles(faces, n_faces);
    if n_triangles == 0 {
        return None;
    }

    let mut indices = Vec::with_capacity(n_triangles * 3);
    let mut walker = Faces::new(faces, n_faces);
    for face in walker.by_ref() {
        if face.len() < 3 {
            continue;
        }
        let pivot = face[0];
        for pair in face[1..].windows(2) {
            let (b, c) = (pair[0], pair[1]);
            if reverse_winding {
                indices.extend_from_slice(&[pivot, c, b]);
            } else {
                indices.extend_from_slice(&[pivot, b, c]);
            }
        }
    }

    if walker.is_truncated() {
        debug!(
            "face buffer truncated at entry {} of {}, kept {} triangles",
            walker.position(),
            faces.len(),
            n_triangles
        );
    }
    debug_assert_eq!(indices.len(), n_triangles * 3);

    Some(Triangulation { indices })
}

/// [`triangulate`] with an explicit bound on how much of `faces` may be read
///
/// `total_indices` larger than the buffer is clamped to the buffer length.
pub fn triangulate_bounded(
    faces: &[u32],
    n_faces: usize,
    total_indices: usize,
    reverse_winding: bool,
) -> Option<Triangulation> {
    let bound = total_indices.min(faces.len());
    triangulate(&faces[..bound], n_faces, reverse_winding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle() {
        let result = triangulate(&[3, 0, 1, 2], 1, false).unwrap();
        assert_eq!(result.indices(), &[0, 1, 2]);
        assert_eq!(result.triangle_count(), 1);

        let reversed = triangulate(&[3, 0, 1, 2], 1, true).unwrap();
        assert_eq!(reversed.indices(), &[0, 2, 1]);
        assert_eq!(reversed.triangle_count(), 1);
    }

    #[test]
    fn test_quad_fan() {
        let result = triangulate(&[4, 0, 1, 2, 3], 1, false).unwrap();
        assert_eq!(result.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(result.triangle_count(), 2);

        let reversed = triangulate(&[4, 0, 1, 2, 3], 1, true).unwrap();
        assert_eq!(reversed.indices(), &[0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn test_pentagon_pivots_on_first_vertex() {
        let result = triangulate(&[5, 10, 11, 12, 13, 14], 1, false).unwrap();
        let triangles: Vec<_> = result.triangles().collect();
        assert_eq!(triangles, vec![[10, 11, 12], [10, 12, 13], [10, 13, 14]]);
    }

    #[test]
    fn test_degenerate_face_is_skipped() {
        assert_eq!(triangulate(&[2, 0, 1], 1, false), None);
        assert_eq!(count_triangles(&[2, 0, 1], 1), 0);

        let mut walker = Faces::new(&[2, 0, 1], 1);
        assert_eq!(walker.next(), Some(&[0, 1][..]));
        assert_eq!(walker.position(), 3);
        assert!(!walker.is_truncated());
    }

    #[test]
    fn test_degenerate_face_keeps_alignment() {
        let faces = [2, 0, 1, 1, 7, 3, 4, 5, 6];
        let result = triangulate(&faces, 3, false).unwrap();
        assert_eq!(result.indices(), &[4, 5, 6]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(triangulate(&[], 0, false), None);
        assert_eq!(triangulate(&[3, 0, 1, 2], 0, false), None);
        assert_eq!(count_triangles(&[], 5), 0);
    }

    #[test]
    fn test_mixed_faces() {
        let faces = [3, 0, 1, 2, 4, 2, 3, 4, 5];
        assert_eq!(count_triangles(&faces, 2), 3);
        let result = triangulate(&faces, 2, false).unwrap();
        assert_eq!(result.indices(), &[0, 1, 2, 2, 3, 4, 2, 4, 5]);
    }

    #[test]
    fn test_face_count_limits_walk() {
        let faces = [3, 0, 1, 2, 3, 3, 4, 5];
        let result = triangulate(&faces, 1, false).unwrap();
        assert_eq!(result.triangle_count(), 1);
    }

    #[test]
    fn test_truncated_face_is_dropped() {
        // Second face claims 4 vertices but only 2 remain
        let faces = [3, 0, 1, 2, 4, 5, 6];
        let mut walker = Faces::new(&faces, 2);
        assert!(walker.next().is_some());
        assert!(walker.next().is_none());
        assert!(walker.is_truncated());
        assert_eq!(walker.position(), faces.len());

        let result = triangulate(&faces, 2, false).unwrap();
        assert_eq!(result.indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_more_faces_declared_than_present() {
        let result = triangulate(&[3, 0, 1, 2], 10, false).unwrap();
        assert_eq!(result.triangle_count(), 1);
    }

    #[test]
    fn test_bounded() {
        let faces = [3, 0, 1, 2, 3, 3, 4, 5];
        let result = triangulate_bounded(&faces, 2, 4, false).unwrap();
        assert_eq!(result.indices(), &[0, 1, 2]);

        // A bound past the end is clamped
        let result = triangulate_bounded(&faces, 2, 100, false).unwrap();
        assert_eq!(result.triangle_count(), 2);
    }
}
