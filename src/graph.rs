//! Point storage and the graph arena shared by all build variants.
//!
//! Nodes live in an arena owned by the [`Graph`]; neighbor lists hold plain
//! `u32` arena indices rather than owning references, so the cyclic
//! neighborhood structure inherent to proximity graphs needs no reference
//! counting. Adjacency uses `SmallVec` sized for the typical degree bound.

use crate::distance;
use crate::error::{IndexError, Result};
use crate::search;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Attribute label attached to a point. Callers interning string tags map
/// them to dense `u32` keys before ingestion.
pub type Label = u32;

/// Neighbor list storage; inline capacity covers the common R=16-32 range.
pub(crate) type Adjacency = SmallVec<[u32; 32]>;

/// A small sorted set of labels with ANY-match semantics: two sets match
/// when they share at least one label. The single-scalar-filter case is a
/// singleton set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet(SmallVec<[Label; 4]>);

impl LabelSet {
    /// Build a label set, deduplicating and sorting the input.
    pub fn new(labels: impl IntoIterator<Item = Label>) -> Self {
        let mut v: SmallVec<[Label; 4]> = labels.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    /// A set holding exactly one label.
    pub fn singleton(label: Label) -> Self {
        Self(SmallVec::from_slice(&[label]))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    pub fn contains(&self, label: Label) -> bool {
        self.0.binary_search(&label).is_ok()
    }

    /// ANY-match: true when the two sets share at least one label.
    pub fn intersects(&self, other: &LabelSet) -> bool {
        // Both sides are sorted; a merge walk beats binary search at these sizes.
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// An indexed point: stable dense id, fixed-dimension coordinates, and zero
/// or more labels. Coordinates never change after ingestion.
#[derive(Debug, Clone)]
pub struct Point {
    id: u32,
    coords: Vec<f32>,
    labels: LabelSet,
}

impl Point {
    /// An unlabeled point.
    pub fn new(id: u32, coords: Vec<f32>) -> Self {
        Self {
            id,
            coords,
            labels: LabelSet::default(),
        }
    }

    /// A labeled point.
    pub fn with_labels(id: u32, coords: Vec<f32>, labels: LabelSet) -> Self {
        Self { id, coords, labels }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn coords(&self) -> &[f32] {
        &self.coords
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }
}

/// Directed proximity graph over a fixed point set.
///
/// Owns every [`Point`] plus one out-neighbor list per point. Invariants
/// maintained by the builders: no self-loops, no duplicate edges, and
/// out-degree at most R except in the moment between a reverse-edge
/// insertion and its immediate re-prune. Also carries the entry-point
/// table: a global medoid and/or one medoid per label.
#[derive(Debug, Clone)]
pub struct Graph {
    points: Vec<Point>,
    adjacency: Vec<Adjacency>,
    dimension: usize,
    entry_point: Option<u32>,
    label_medoids: HashMap<Label, u32>,
}

impl Graph {
    /// Wrap a point set in an edgeless graph.
    ///
    /// Ids must be dense and in positional order (`points[i].id() == i`),
    /// and every coordinate vector must have the same length; violations
    /// return [`IndexError::InvalidParameter`] and
    /// [`IndexError::DimensionMismatch`] respectively.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        let dimension = points.first().map_or(0, |p| p.coords.len());
        for (i, p) in points.iter().enumerate() {
            if p.id as usize != i {
                return Err(IndexError::InvalidParameter(format!(
                    "point ids must be dense and ordered: expected {i}, got {}",
                    p.id
                )));
            }
            if p.coords.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    left: dimension,
                    right: p.coords.len(),
                });
            }
        }
        let adjacency = vec![Adjacency::new(); points.len()];
        Ok(Self {
            points,
            adjacency,
            dimension,
            entry_point: None,
            label_medoids: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Shared coordinate dimensionality (0 for an empty graph).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn point(&self, id: u32) -> &Point {
        &self.points[id as usize]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn neighbors(&self, id: u32) -> &[u32] {
        &self.adjacency[id as usize]
    }

    pub fn out_degree(&self, id: u32) -> usize {
        self.adjacency[id as usize].len()
    }

    /// Replace a node's out-neighbor list.
    pub fn set_neighbors(&mut self, id: u32, neighbors: impl IntoIterator<Item = u32>) {
        let list: Adjacency = neighbors.into_iter().collect();
        debug_assert!(!list.contains(&id), "self-loop on node {id}");
        self.adjacency[id as usize] = list;
    }

    /// Append one out-edge, rejecting self-loops and duplicates.
    ///
    /// Returns whether the edge was actually added. May push the node one
    /// past its degree bound; callers re-prune immediately when it does.
    pub fn add_neighbor(&mut self, id: u32, neighbor: u32) -> bool {
        if id == neighbor {
            return false;
        }
        let list = &mut self.adjacency[id as usize];
        if list.contains(&neighbor) {
            return false;
        }
        list.push(neighbor);
        true
    }

    /// Global entry point (the corpus medoid), when a build has set one.
    pub fn entry_point(&self) -> Option<u32> {
        self.entry_point
    }

    pub(crate) fn set_entry_point(&mut self, id: u32) {
        self.entry_point = Some(id);
    }

    /// Per-label entry points, populated by the filtered and stitched builds.
    pub fn label_medoids(&self) -> &HashMap<Label, u32> {
        &self.label_medoids
    }

    pub(crate) fn set_label_medoids(&mut self, medoids: HashMap<Label, u32>) {
        self.label_medoids = medoids;
    }

    /// Entry points appropriate for a query with the given filter.
    ///
    /// Filtered queries start from the medoids of the requested labels;
    /// unfiltered queries start from the global medoid, falling back to the
    /// full medoid table when the graph was built without one.
    pub fn entry_points_for(&self, filter: Option<&LabelSet>) -> Vec<u32> {
        if let Some(f) = filter {
            if !self.label_medoids.is_empty() {
                let mut entries: Vec<u32> = f
                    .labels()
                    .iter()
                    .filter_map(|l| self.label_medoids.get(l).copied())
                    .collect();
                entries.sort_unstable();
                entries.dedup();
                return entries;
            }
        }
        if let Some(e) = self.entry_point {
            return vec![e];
        }
        let mut entries: Vec<u32> = self.label_medoids.values().copied().collect();
        entries.sort_unstable();
        entries.dedup();
        entries
    }

    /// Distance between two stored points.
    pub(crate) fn distance_between(&self, a: u32, b: u32) -> f32 {
        distance::l2(&self.points[a as usize].coords, &self.points[b as usize].coords)
    }

    /// Query the graph for the `k` nearest neighbors of `query`.
    ///
    /// Convenience wrapper over [`search::beam_search`] using the stored
    /// entry points; read-only, safe to call from many threads at once.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        l: usize,
        filter: Option<&LabelSet>,
    ) -> Result<Vec<(u32, f32)>> {
        let entries = self.entry_points_for(filter);
        let outcome = search::beam_search(self, &entries, query, k, l, filter)?;
        Ok(outcome.result)
    }

    /// Check the post-build edge invariants: no self-loops, no duplicate
    /// edges, out-degree within `max_degree`.
    pub fn check_invariants(&self, max_degree: usize) -> Result<()> {
        for (id, list) in self.adjacency.iter().enumerate() {
            if list.len() > max_degree {
                return Err(IndexError::InvalidParameter(format!(
                    "node {id} has degree {} above bound {max_degree}",
                    list.len()
                )));
            }
            let mut seen: Vec<u32> = list.to_vec();
            seen.sort_unstable();
            seen.dedup();
            if seen.len() != list.len() {
                return Err(IndexError::InvalidParameter(format!(
                    "node {id} has duplicate edges"
                )));
            }
            if list.contains(&(id as u32)) {
                return Err(IndexError::InvalidParameter(format!(
                    "node {id} has a self-loop"
                )));
            }
        }
        Ok(())
    }
}
