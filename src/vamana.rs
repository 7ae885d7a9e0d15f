//! Plain Vamana graph construction.
//!
//! Builds a navigable proximity graph in three steps: seed every node with
//! random out-edges, estimate a medoid entry point, then visit the corpus
//! in a random permutation — greedy-search toward each point, robust-prune
//! its candidates, and mirror the surviving edges back with an immediate
//! re-prune whenever a reverse edge pushes a neighbor past the degree
//! bound.
//!
//! The per-point loop mutates a second node's edge list (the reverse
//! edge), so it is strictly sequential; parallelism belongs at the shard
//! level, see [`crate::stitched`].
//!
//! # References
//!
//! - Subramanya et al. (2019): "DiskANN: Fast Accurate Billion-point
//!   Nearest Neighbor Search on a Single Node"

use crate::error::{IndexError, Result};
use crate::graph::{Graph, Point};
use crate::medoid::approximate_medoid;
use crate::prune::robust_prune;
use crate::search::beam_search;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Build parameters for the plain Vamana graph.
#[derive(Clone, Debug)]
pub struct VamanaParams {
    /// Degree bound R. For a well-connected random initialization keep it
    /// above `log2(n)`; the build only enforces `R < n`.
    pub max_degree: usize,
    /// Search list size L during construction.
    pub beam_width: usize,
    /// Diversity pruning factor, at least 1.0.
    pub alpha: f32,
    /// Cluster count for the medoid estimate.
    pub clusters: usize,
    /// Seed for the build RNG; `None` draws one from entropy. A fixed seed
    /// makes the whole build reproducible.
    pub seed: Option<u64>,
}

impl Default for VamanaParams {
    fn default() -> Self {
        Self {
            max_degree: 32,
            beam_width: 100,
            alpha: 1.2,
            clusters: 8,
            seed: None,
        }
    }
}

/// Builder for the plain (unfiltered) Vamana graph.
pub struct VamanaBuilder {
    params: VamanaParams,
}

impl VamanaBuilder {
    pub fn new(params: VamanaParams) -> Self {
        Self { params }
    }

    /// Build the graph over `points`.
    ///
    /// An empty corpus yields an empty graph and a single point a lone
    /// node; otherwise `max_degree >= n` is
    /// [`IndexError::DegreeExceedsCorpus`].
    pub fn build(&self, points: Vec<Point>) -> Result<Graph> {
        let mut graph = Graph::new(points)?;
        let seed = self.params.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_into(&mut graph, &mut rng)?;
        Ok(graph)
    }

    /// Run the construction over an already-wrapped point set. Shared with
    /// the stitched build, which calls it once per shard.
    pub(crate) fn build_into(&self, graph: &mut Graph, rng: &mut StdRng) -> Result<()> {
        let n = graph.len();
        if n == 0 {
            return Ok(());
        }
        if n == 1 {
            // Nothing to connect; the lone point is its own entry.
            graph.set_entry_point(0);
            return Ok(());
        }
        let r = self.params.max_degree;
        if r >= n {
            return Err(IndexError::DegreeExceedsCorpus {
                degree: r,
                corpus: n,
            });
        }

        self.initialize_random_edges(graph, rng);

        let s = approximate_medoid(graph, self.params.clusters, rng)?;
        graph.set_entry_point(s);
        tracing::debug!(entry = s, points = n, "vamana build started");

        let mut order: Vec<u32> = (0..n as u32).collect();
        order.shuffle(rng);

        for &p in &order {
            let outcome =
                beam_search(graph, &[s], graph.point(p).coords(), 1, self.params.beam_width, None)?;
            robust_prune(graph, p, &outcome.visited, self.params.alpha, r, None)?;

            let new_edges: Vec<u32> = graph.neighbors(p).to_vec();
            for q in new_edges {
                if graph.add_neighbor(q, p) && graph.out_degree(q) > r {
                    let pool = graph.neighbors(q).to_vec();
                    robust_prune(graph, q, &pool, self.params.alpha, r, None)?;
                }
            }
        }
        Ok(())
    }

    /// Give every node `R` distinct random non-self out-neighbors.
    fn initialize_random_edges(&self, graph: &mut Graph, rng: &mut StdRng) {
        let n = graph.len();
        let r = self.params.max_degree;
        for id in 0..n as u32 {
            let mut targets: HashSet<u32> = HashSet::with_capacity(r);
            while targets.len() < r {
                let t = rng.random_range(0..n) as u32;
                if t != id {
                    targets.insert(t);
                }
            }
            graph.set_neighbors(id, targets);
        }
    }
}
