//! Filtered Vamana construction.
//!
//! Attribute-aware variant of the plain build: per-point entry comes from
//! the per-label medoid table instead of one global medoid, and both the
//! traversal and the pruning are restricted to the point's own labels, so
//! every surviving edge connects label-sharing points. There is no
//! random-initialization phase — random edges would almost always violate
//! the label constraint — so construction starts from an empty edge set.
//!
//! The search runs with `k = 0`: only the exploration set feeds the
//! pruner, the ranked result is irrelevant during construction.

use crate::error::{IndexError, Result};
use crate::graph::{Graph, Point};
use crate::medoid::per_label_medoids;
use crate::prune::robust_prune;
use crate::search::beam_search;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Build parameters for the filtered Vamana graph.
#[derive(Clone, Debug)]
pub struct FilteredVamanaParams {
    /// Degree bound R.
    pub max_degree: usize,
    /// Search list size L during construction.
    pub beam_width: usize,
    /// Diversity pruning factor, at least 1.0.
    pub alpha: f32,
    /// Per-label sample budget for the medoid table.
    pub tau: usize,
    /// Seed for the build RNG; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for FilteredVamanaParams {
    fn default() -> Self {
        Self {
            max_degree: 32,
            beam_width: 100,
            alpha: 1.2,
            tau: 10,
            seed: None,
        }
    }
}

/// Builder for the attribute-filtered Vamana graph.
pub struct FilteredVamanaBuilder {
    params: FilteredVamanaParams,
}

impl FilteredVamanaBuilder {
    pub fn new(params: FilteredVamanaParams) -> Self {
        Self { params }
    }

    /// Build the graph over `points`. The returned graph carries the
    /// per-label medoid table for query-time entry. Unlabeled points end
    /// up edgeless: no label, no admissible neighborhood.
    pub fn build(&self, points: Vec<Point>) -> Result<Graph> {
        let mut graph = Graph::new(points)?;
        let n = graph.len();
        if n == 0 {
            return Ok(graph);
        }
        let r = self.params.max_degree;
        if n > 1 && r >= n {
            return Err(IndexError::DegreeExceedsCorpus {
                degree: r,
                corpus: n,
            });
        }

        let seed = self.params.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);

        let medoids = per_label_medoids(&graph, self.params.tau, &mut rng)?;
        graph.set_label_medoids(medoids);
        tracing::debug!(
            points = n,
            labels = graph.label_medoids().len(),
            "filtered vamana build started"
        );

        let mut order: Vec<u32> = (0..n as u32).collect();
        order.shuffle(&mut rng);

        for &p in &order {
            let labels = graph.point(p).labels().clone();
            let entries: Vec<u32> = labels
                .labels()
                .iter()
                .filter_map(|l| graph.label_medoids().get(l).copied())
                .collect();

            let outcome = beam_search(
                &graph,
                &entries,
                graph.point(p).coords(),
                0,
                self.params.beam_width,
                Some(&labels),
            )?;
            robust_prune(
                &mut graph,
                p,
                &outcome.visited,
                self.params.alpha,
                r,
                Some(&labels),
            )?;

            let new_edges: Vec<u32> = graph.neighbors(p).to_vec();
            for q in new_edges {
                if graph.add_neighbor(q, p) && graph.out_degree(q) > r {
                    let q_labels = graph.point(q).labels().clone();
                    let pool = graph.neighbors(q).to_vec();
                    robust_prune(&mut graph, q, &pool, self.params.alpha, r, Some(&q_labels))?;
                }
            }
        }
        Ok(graph)
    }
}
