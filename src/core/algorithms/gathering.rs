//! Breadth-first gathering of full cells with transient marks.
//!
//! The traversals here walk the neighbor graph outward from a start cell,
//! crossing a facet only while a predicate approves of what lies on the other
//! side. Visited cells carry a one-byte mark instead of living in an
//! auxiliary hash set; a second sweep clears every mark before the traversal
//! returns, so the mark discipline invariant holds between operations.
//!
//! Two predicates cover the classic queries: [`IncidentFullCells`] collects
//! the cells having a given face as a sub-simplex, and [`StarOfFace`]
//! collects the cells sharing at least one vertex with the face. On top of
//! those, `incident_faces` enumerates the k-faces around a vertex by sorting
//! each incident cell and walking vertex combinations.

use std::collections::VecDeque;

use crate::core::{
    collections::{FacetIndex, FastHashSet, SlotBuffer},
    face::Face,
    facet::Facet,
    traits::data_type::DataType,
    triangulation_data_structure::{CellKey, Tds, VertexKey},
};

// =============================================================================
// TRAVERSAL PREDICATES
// =============================================================================

/// Decides whether a gathering traversal crosses a facet.
///
/// `facet` is addressed from the cell being expanded; returning `true` lets
/// the traversal enqueue the neighbor on the far side.
pub trait FullCellTraversal<U, V, const D: usize>
where
    U: DataType,
    V: DataType,
{
    /// Returns `true` when the traversal should cross `facet`.
    fn test(&self, tds: &Tds<U, V, D>, facet: &Facet) -> bool;
}

/// Traversal predicate gathering the full cells *incident* to a face —
/// the cells having the face as a sub-simplex.
///
/// The traversal keeps going as long as crossing a facet does not drop a
/// vertex of the face: the covertex left behind must not belong to it.
pub struct IncidentFullCells {
    face_vertices: SlotBuffer<VertexKey>,
}

impl IncidentFullCells {
    /// Builds the predicate for `face`, resolving its vertices once.
    #[must_use]
    pub fn new<U, V, const D: usize>(tds: &Tds<U, V, D>, face: &Face) -> Self
    where
        U: DataType,
        V: DataType,
    {
        Self {
            face_vertices: tds.face_vertices(face),
        }
    }
}

impl<U, V, const D: usize> FullCellTraversal<U, V, D> for IncidentFullCells
where
    U: DataType,
    V: DataType,
{
    fn test(&self, tds: &Tds<U, V, D>, facet: &Facet) -> bool {
        let covertex = tds.vertex(facet.full_cell(), facet.index_of_covertex());
        !self.face_vertices.contains(&covertex)
    }
}

/// Traversal predicate gathering the *star* of a face — every full cell
/// sharing at least one vertex with it.
pub struct StarOfFace {
    face_vertices: SlotBuffer<VertexKey>,
}

impl StarOfFace {
    /// Builds the predicate for `face`, resolving its vertices once.
    #[must_use]
    pub fn new<U, V, const D: usize>(tds: &Tds<U, V, D>, face: &Face) -> Self
    where
        U: DataType,
        V: DataType,
    {
        Self {
            face_vertices: tds.face_vertices(face),
        }
    }
}

impl<U, V, const D: usize> FullCellTraversal<U, V, D> for StarOfFace
where
    U: DataType,
    V: DataType,
{
    fn test(&self, tds: &Tds<U, V, D>, facet: &Facet) -> bool {
        let neighbor = tds.neighbor(facet.full_cell(), facet.index_of_covertex());
        let dcur = tds.current_dimension() as usize;
        (0..=dcur).any(|j| self.face_vertices.contains(&tds.vertex(neighbor, j)))
    }
}

// =============================================================================
// GATHERING
// =============================================================================

impl<U, V, const D: usize> Tds<U, V, D>
where
    U: DataType,
    V: DataType,
{
    /// Breadth-first gathering from `start`: every dequeued cell is appended
    /// to `out`, and each unvisited neighbor is either enqueued (predicate
    /// true) or remembered as the last rejected boundary facet (predicate
    /// false).
    ///
    /// All marks set by the traversal are cleared again before returning, so
    /// the complex comes back mark-clean. Returns the last rejected facet,
    /// if any — useful as a seed when the gathered region feeds a hole
    /// insertion.
    pub fn gather_full_cells<P>(
        &mut self,
        start: CellKey,
        predicate: &P,
        out: &mut Vec<CellKey>,
    ) -> Option<Facet>
    where
        P: FullCellTraversal<U, V, D>,
    {
        let slots = if self.current_dimension() >= 0 {
            self.current_dimension() as usize + 1
        } else {
            0
        };
        let mut boundary = None;
        let mut queue = VecDeque::new();
        self.set_visited(start, true);
        queue.push_back(start);
        while let Some(s) = queue.pop_front() {
            out.push(s);
            for i in 0..slots {
                let n = self.neighbor(s, i);
                if self.get_visited(n) {
                    continue;
                }
                self.set_visited(n, true);
                let facet = Facet::new(s, i as FacetIndex);
                if predicate.test(self, &facet) {
                    queue.push_back(n);
                } else {
                    boundary = Some(facet);
                }
            }
        }
        self.clear_visited_marks(start);
        boundary
    }

    /// Clears the visited marks of the connected marked region containing
    /// `start` with a second breadth-first sweep.
    pub(crate) fn clear_visited_marks(&mut self, start: CellKey) {
        let slots = if self.current_dimension() >= 0 {
            self.current_dimension() as usize + 1
        } else {
            0
        };
        let mut queue = VecDeque::new();
        self.set_visited(start, false);
        queue.push_back(start);
        while let Some(s) = queue.pop_front() {
            for i in 0..slots {
                let n = self.neighbor(s, i);
                if self.get_visited(n) {
                    self.set_visited(n, false);
                    queue.push_back(n);
                }
            }
        }
    }

    /// All full cells having `face` as a sub-simplex.
    ///
    /// # Panics
    ///
    /// Panics if the face's cell or indices are not live.
    pub fn incident_full_cells(&mut self, face: &Face) -> Vec<CellKey> {
        let predicate = IncidentFullCells::new(self, face);
        let mut out = Vec::new();
        self.gather_full_cells(face.full_cell(), &predicate, &mut out);
        out
    }

    /// All full cells containing the vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is dead or not wired into a cell.
    pub fn incident_full_cells_of_vertex(&mut self, v: VertexKey) -> Vec<CellKey> {
        let s = self.full_cell_of(v);
        let mut face = Face::new(s);
        let slot = self
            .get_full_cell(s)
            .and_then(|cell| cell.index_of(v))
            .expect("vertex back-pointer names a cell that does not contain it");
        face.set_index(0, slot);
        self.incident_full_cells(&face)
    }

    /// All full cells sharing at least one vertex with `face`.
    ///
    /// # Panics
    ///
    /// Panics if the face's cell or indices are not live.
    pub fn star(&mut self, face: &Face) -> Vec<CellKey> {
        let predicate = StarOfFace::new(self, face);
        let mut out = Vec::new();
        self.gather_full_cells(face.full_cell(), &predicate, &mut out);
        out
    }

    /// All faces of feature dimension `dim` incident to `v`, each reported
    /// once.
    ///
    /// Faces of the current dimension or above are not sub-simplices, so the
    /// result is empty for `dim >= current_dimension`.
    ///
    /// # Panics
    ///
    /// Panics if `dim` is zero (ask for the incident cells of the vertex
    /// instead) or `v` is not a live, wired vertex.
    pub fn incident_faces(&mut self, v: VertexKey, dim: usize) -> Vec<Face> {
        self.incident_faces_impl(v, dim, false)
    }

    /// Like [`Tds::incident_faces`], but keeps only the faces in which `v` is
    /// the minimum vertex under the key order — enumerating upper faces over
    /// every vertex yields each face of the complex exactly once.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Tds::incident_faces`].
    pub fn incident_upper_faces(&mut self, v: VertexKey, dim: usize) -> Vec<Face> {
        self.incident_faces_impl(v, dim, true)
    }

    fn incident_faces_impl(&mut self, v: VertexKey, dim: usize, upper: bool) -> Vec<Face> {
        assert!(dim > 0, "use incident_full_cells_of_vertex for dimension 0");
        if dim as i32 >= self.current_dimension() {
            return Vec::new();
        }
        let dcur = self.current_dimension() as usize;
        let simps = self.incident_full_cells_of_vertex(v);

        let mut faces = Vec::new();
        let mut seen: FastHashSet<SlotBuffer<VertexKey>> = FastHashSet::default();
        for s in simps {
            // the vertices of the full cell, canonically ordered
            let mut verts: SlotBuffer<VertexKey> = (0..=dcur).map(|i| self.vertex(s, i)).collect();
            let v_idx = if upper {
                verts.sort_unstable();
                verts.iter().position(|&k| k == v).expect("gathered cell misses the vertex")
            } else {
                let pos = verts.iter().position(|&k| k == v).expect("gathered cell misses the vertex");
                verts.swap(0, pos);
                verts[1..].sort_unstable();
                0
            };
            if v_idx + dim > dcur {
                continue; // `v` is too far to the right
            }
            // cell slots of the sorted vertices
            let cell = self.get_full_cell(s).expect("gathered cell is live");
            let sorted_idx: SlotBuffer<usize> = verts
                .iter()
                .map(|&vk| cell.index_of(vk).expect("sorted vertex belongs to the cell"))
                .collect();

            for combo in CombinationEnumerator::new(dim, v_idx + 1, dcur) {
                let mut face = Face::new(s);
                face.set_index(0, sorted_idx[v_idx]);
                for (t, &ci) in combo.iter().enumerate() {
                    face.set_index(1 + t, sorted_idx[ci]);
                }
                let mut key: SlotBuffer<VertexKey> = std::iter::once(verts[v_idx])
                    .chain(combo.iter().map(|&ci| verts[ci]))
                    .collect();
                key.sort_unstable();
                if seen.insert(key) {
                    faces.push(face);
                }
            }
        }
        faces
    }
}

// =============================================================================
// COMBINATION ENUMERATION
// =============================================================================

/// Lexicographic enumeration of the k-combinations of `min..=max`.
struct CombinationEnumerator {
    current: SlotBuffer<usize>,
    max: usize,
    done: bool,
}

impl CombinationEnumerator {
    fn new(k: usize, min: usize, max: usize) -> Self {
        let done = min + k > max + 1;
        Self {
            current: (min..min + k).collect(),
            max,
            done,
        }
    }
}

impl Iterator for CombinationEnumerator {
    type Item = SlotBuffer<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.current.clone();
        let k = self.current.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            // position i may grow as long as the positions after it still fit
            if self.current[i] < self.max - (k - 1 - i) {
                self.current[i] += 1;
                for j in (i + 1)..k {
                    self.current[j] = self.current[j - 1] + 1;
                }
                break;
            }
        }
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn combos(k: usize, min: usize, max: usize) -> Vec<Vec<usize>> {
        CombinationEnumerator::new(k, min, max)
            .map(|c| c.to_vec())
            .collect()
    }

    #[test]
    fn combinations_of_one() {
        assert_eq!(combos(1, 1, 3), vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn combinations_of_two() {
        assert_eq!(
            combos(2, 0, 3),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    fn combinations_taking_everything() {
        assert_eq!(combos(3, 1, 3), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn combinations_of_too_many_are_empty() {
        assert!(combos(4, 1, 3).is_empty());
    }
}
