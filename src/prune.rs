//! Diversity-aware neighbor selection (RobustPrune / FilteredRobustPrune).
//!
//! Given a candidate pool, keep at most `r` neighbors that are close to the
//! node *and* spread across directions: once the closest pool member is
//! selected, every remaining candidate it dominates — one reachable from
//! the selection more cheaply than from the node itself, scaled by `alpha`
//! — is discarded. `alpha = 1.0` prunes hardest; larger values keep more
//! long-range edges.
//!
//! [`select_neighbors`] is the pure computation; [`robust_prune`] applies
//! it to the node's adjacency in place. The split exists so the stitched
//! build can run the computation for every node in parallel against an
//! immutable snapshot and apply the results afterwards.

use crate::distance::l2;
use crate::error::{IndexError, Result};
use crate::graph::{Graph, LabelSet};
use crate::search::Candidate;
use std::collections::HashSet;

/// Compute the pruned neighbor list for `node` without mutating the graph.
///
/// The pool is `candidates` plus the node's current out-neighbors, minus
/// the node itself and any duplicates; with a `filter`, pool members
/// sharing no label with it are dropped up front. Ties break by id, so the
/// selection is deterministic. Re-running on an already-pruned list returns
/// it unchanged.
pub fn select_neighbors(
    graph: &Graph,
    node: u32,
    candidates: &[u32],
    alpha: f32,
    r: usize,
    filter: Option<&LabelSet>,
) -> Result<Vec<u32>> {
    if !(alpha >= 1.0) {
        return Err(IndexError::InvalidParameter(format!(
            "diversity factor alpha {alpha} must be at least 1.0"
        )));
    }
    if r == 0 {
        return Err(IndexError::InvalidParameter(
            "degree bound R must be at least 1".into(),
        ));
    }

    let mut seen: HashSet<u32> = HashSet::new();
    let mut pool: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for &c in candidates.iter().chain(graph.neighbors(node).iter()) {
        if c == node || !seen.insert(c) {
            continue;
        }
        if let Some(f) = filter {
            if !f.intersects(graph.point(c).labels()) {
                continue;
            }
        }
        pool.push(Candidate {
            distance: graph.distance_between(node, c),
            id: c,
        });
    }
    pool.sort_unstable();

    let mut selected: Vec<u32> = Vec::with_capacity(r.min(pool.len()));
    while !pool.is_empty() && selected.len() < r {
        let closest = pool.remove(0);
        selected.push(closest.id);
        let closest_coords = graph.point(closest.id).coords();
        // Dominance rule: drop x when alpha * d(closest, x) <= d(node, x).
        pool.retain(|x| alpha * l2(closest_coords, graph.point(x.id).coords()) > x.distance);
    }
    Ok(selected)
}

/// Prune `node`'s out-neighbors in place. See [`select_neighbors`].
pub fn robust_prune(
    graph: &mut Graph,
    node: u32,
    candidates: &[u32],
    alpha: f32,
    r: usize,
    filter: Option<&LabelSet>,
) -> Result<()> {
    let selected = select_neighbors(graph, node, candidates, alpha, r, filter)?;
    graph.set_neighbors(node, selected);
    Ok(())
}
