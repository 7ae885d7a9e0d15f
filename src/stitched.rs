//! Stitched Vamana construction.
//!
//! Partitions the corpus by label, builds an independent plain Vamana
//! sub-graph per shard (shards touch disjoint node state, so they run in
//! parallel), merges the shard edges back into the global arena, and
//! finishes with one label-filtered re-prune per point that bounds the
//! merged degree at `r_stitched`.
//!
//! The final pass computes every new neighbor list against the merged
//! snapshot in parallel and applies them afterwards; each point's list is
//! written exactly once, and reading the pre-pass snapshot is fine — the
//! index is approximate, not linearizable.

use crate::error::{IndexError, Result};
use crate::graph::{Graph, Label, Point};
use crate::medoid::approximate_medoid;
use crate::prune::select_neighbors;
use crate::vamana::{VamanaBuilder, VamanaParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Build parameters for the stitched Vamana graph.
#[derive(Clone, Debug)]
pub struct StitchedVamanaParams {
    /// Search list size for the per-shard builds.
    pub l_small: usize,
    /// Degree bound for the per-shard builds; clamped per shard to
    /// `shard_size - 1` so small shards stay buildable.
    pub r_small: usize,
    /// Degree bound after the final merged re-prune.
    pub r_stitched: usize,
    /// Diversity pruning factor, at least 1.0.
    pub alpha: f32,
    /// Cluster count for the medoid estimates.
    pub clusters: usize,
    /// Seed for the build RNG; `None` draws one from entropy. Shard seeds
    /// derive from it, so a fixed seed reproduces the whole build.
    pub seed: Option<u64>,
}

impl Default for StitchedVamanaParams {
    fn default() -> Self {
        Self {
            l_small: 100,
            r_small: 32,
            r_stitched: 64,
            alpha: 1.2,
            clusters: 8,
            seed: None,
        }
    }
}

/// Builder for the label-sharded stitched Vamana graph.
pub struct StitchedVamanaBuilder {
    params: StitchedVamanaParams,
}

impl StitchedVamanaBuilder {
    pub fn new(params: StitchedVamanaParams) -> Self {
        Self { params }
    }

    /// Build the graph over `points`.
    ///
    /// This variant assumes one label per point; a multi-label point is
    /// sharded by its first label (its full label set still governs the
    /// final re-prune). Unlabeled points belong to no shard and stay
    /// edgeless.
    pub fn build(&self, points: Vec<Point>) -> Result<Graph> {
        let mut graph = Graph::new(points)?;
        if graph.is_empty() {
            return Ok(graph);
        }

        let seed = self.params.seed.unwrap_or_else(|| rand::rng().random());

        // Deterministic shard order via BTreeMap.
        let mut shards: BTreeMap<Label, Vec<u32>> = BTreeMap::new();
        for p in graph.points() {
            match p.labels().labels().first() {
                Some(&label) => shards.entry(label).or_default().push(p.id()),
                None => tracing::warn!(point = p.id(), "unlabeled point joins no shard"),
            }
        }
        let shards: Vec<(Label, Vec<u32>)> = shards.into_iter().collect();
        tracing::debug!(points = graph.len(), shards = shards.len(), "stitched build started");

        // Per-shard plain builds; shards are node-disjoint.
        let built: Vec<(Label, Vec<u32>, Graph)> = shards
            .into_par_iter()
            .map(|(label, ids)| {
                let shard_points: Vec<Point> = ids
                    .iter()
                    .enumerate()
                    .map(|(local, &gid)| {
                        let p = graph.point(gid);
                        Point::with_labels(local as u32, p.coords().to_vec(), p.labels().clone())
                    })
                    .collect();
                let params = VamanaParams {
                    max_degree: self.params.r_small.min(ids.len().saturating_sub(1)).max(1),
                    beam_width: self.params.l_small,
                    alpha: self.params.alpha,
                    clusters: self.params.clusters,
                    seed: Some(seed ^ u64::from(label)),
                };
                let sub = VamanaBuilder::new(params).build(shard_points)?;
                Ok((label, ids, sub))
            })
            .collect::<Result<_>>()?;

        // Merge shard edges back under global ids; each shard's entry point
        // becomes that label's medoid.
        let mut label_medoids: HashMap<Label, u32> = HashMap::with_capacity(built.len());
        for (label, ids, sub) in built {
            for (local, &gid) in ids.iter().enumerate() {
                let mapped: Vec<u32> = sub
                    .neighbors(local as u32)
                    .iter()
                    .map(|&nb| ids[nb as usize])
                    .collect();
                graph.set_neighbors(gid, mapped);
            }
            if let Some(e) = sub.entry_point() {
                label_medoids.insert(label, ids[e as usize]);
            }
        }
        graph.set_label_medoids(label_medoids);

        let mut rng = StdRng::seed_from_u64(seed);
        let s = approximate_medoid(&graph, self.params.clusters, &mut rng)?;
        graph.set_entry_point(s);

        // Final bounded re-prune: compute in parallel against the merged
        // snapshot, then apply.
        let new_lists: Vec<Vec<u32>> = (0..graph.len() as u32)
            .into_par_iter()
            .map(|id| {
                let labels = graph.point(id).labels();
                select_neighbors(
                    &graph,
                    id,
                    graph.neighbors(id),
                    self.params.alpha,
                    self.params.r_stitched,
                    Some(labels),
                )
            })
            .collect::<Result<_>>()?;
        for (id, list) in new_lists.into_iter().enumerate() {
            graph.set_neighbors(id as u32, list);
        }

        if self.params.r_stitched >= graph.len() {
            tracing::debug!(
                r_stitched = self.params.r_stitched,
                "stitched degree bound exceeds corpus size, merged degrees bind first"
            );
        }
        Ok(graph)
    }
}
