//! Bounded-beam greedy traversal (GreedySearch / FilteredGreedySearch).
//!
//! The traversal keeps a working set `C` of at most `l` candidates, a
//! visited set `V`, and a per-call distance cache. Each step visits the
//! closest unvisited member of `C`, admits that node's out-neighbors (those
//! passing the label filter), and shrinks `C` back to the `l` closest. The
//! closest-unvisited lookup goes through a binary heap with lazy
//! invalidation, never a linear scan, so a step costs `O(log |C|)` plus the
//! neighbor expansion.
//!
//! Both outputs matter: `result` is the ranked top-k for serving, while
//! `visited` is the full exploration set the builders feed into
//! [`crate::prune`].

use crate::distance::l2;
use crate::error::{IndexError, Result};
use crate::graph::{Graph, LabelSet};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

/// A node paired with its cached distance to the current query, ordered by
/// (distance, id) so every tie-break in the crate is deterministic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub distance: f32,
    pub id: u32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Output of [`beam_search`].
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The `k` closest nodes found, ascending by distance (ties by id).
    /// Fewer than `k` entries when the traversal saw fewer nodes.
    pub result: Vec<(u32, f32)>,
    /// Every node the traversal visited, in ascending id order. This is the
    /// candidate pool construction consumes; it is independent of `k`.
    pub visited: Vec<u32>,
}

impl SearchOutcome {
    fn empty() -> Self {
        Self {
            result: Vec::new(),
            visited: Vec::new(),
        }
    }
}

/// Bounded best-first search from `entry_points` toward `query`.
///
/// `l >= 1` bounds the working set; `k` bounds the ranked result (`k == 0`
/// yields an empty `result` but still a full `visited` set). With a
/// `filter`, only nodes sharing at least one label with it are ever
/// admitted. An empty entry set, or one with no member passing the filter,
/// returns an empty outcome rather than an error.
///
/// Never mutates the graph; concurrent searches over a built graph are safe.
pub fn beam_search(
    graph: &Graph,
    entry_points: &[u32],
    query: &[f32],
    k: usize,
    l: usize,
    filter: Option<&LabelSet>,
) -> Result<SearchOutcome> {
    if l == 0 {
        return Err(IndexError::InvalidParameter(
            "search list size L must be at least 1".into(),
        ));
    }
    if graph.is_empty() || entry_points.is_empty() {
        return Ok(SearchOutcome::empty());
    }
    if query.len() != graph.dimension() {
        return Err(IndexError::DimensionMismatch {
            left: graph.dimension(),
            right: query.len(),
        });
    }

    let admits =
        |id: u32| filter.is_none_or(|f| f.intersects(graph.point(id).labels()));

    // Per-traversal distance cache; dropped with the call.
    let mut cache: HashMap<u32, f32> = HashMap::new();
    // Working set C, ordered by (distance, id); `members` mirrors its ids.
    let mut working: BTreeSet<Candidate> = BTreeSet::new();
    let mut members: HashSet<u32> = HashSet::new();
    let mut visited: HashSet<u32> = HashSet::new();
    // Closest-unvisited lookup; stale entries are skipped lazily.
    let mut frontier: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();

    for &e in entry_points {
        if (e as usize) >= graph.len() || !admits(e) || members.contains(&e) {
            continue;
        }
        let d = *cache
            .entry(e)
            .or_insert_with(|| l2(query, graph.point(e).coords()));
        let cand = Candidate { distance: d, id: e };
        members.insert(e);
        working.insert(cand);
        frontier.push(Reverse(cand));
    }
    if working.is_empty() {
        tracing::debug!("no entry point admitted by the label filter");
        return Ok(SearchOutcome::empty());
    }

    while let Some(Reverse(cand)) = frontier.pop() {
        // Stale heap entry: evicted from C, or already visited.
        if !members.contains(&cand.id) || !visited.insert(cand.id) {
            continue;
        }
        for &nb in graph.neighbors(cand.id) {
            if members.contains(&nb) || visited.contains(&nb) || !admits(nb) {
                continue;
            }
            let d = *cache
                .entry(nb)
                .or_insert_with(|| l2(query, graph.point(nb).coords()));
            let next = Candidate { distance: d, id: nb };
            members.insert(nb);
            working.insert(next);
            frontier.push(Reverse(next));
        }
        // Shrink C to the l closest; boundary ties resolved by id.
        while working.len() > l {
            if let Some(worst) = working.pop_last() {
                members.remove(&worst.id);
            }
        }
    }

    // Result: k closest members of C ∪ V.
    let mut pool: Vec<Candidate> = working.iter().copied().collect();
    for &id in &visited {
        if !members.contains(&id) {
            pool.push(Candidate {
                distance: cache[&id],
                id,
            });
        }
    }
    pool.sort_unstable();
    pool.truncate(k);

    let mut visited_ids: Vec<u32> = visited.into_iter().collect();
    visited_ids.sort_unstable();

    Ok(SearchOutcome {
        result: pool.into_iter().map(|c| (c.id, c.distance)).collect(),
        visited: visited_ids,
    })
}
