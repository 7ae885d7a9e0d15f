//! Entry-point estimation: a k-means approximate medoid for the whole
//! corpus, and a per-label medoid table for filtered traversal.
//!
//! The exact medoid is quadratic in the corpus size, so the global estimate
//! clusters first and only scans the largest cluster. The per-label table
//! samples `tau` points per label and spreads entry-point duty with a
//! running usage counter, so hub points do not serve every label.

use crate::distance::l2;
use crate::error::{IndexError, Result};
use crate::graph::{Graph, Label};
use rand::seq::{index, IteratorRandom};
use rand::Rng;
use std::collections::{BTreeSet, HashMap};

const MAX_ITERATIONS: usize = 20;
const CONVERGENCE_EPS: f32 = 1e-4;

/// Approximate geometric medoid of the whole point set.
///
/// Runs bounded-iteration k-means (random initial centroids drawn from the
/// points, reassign / recompute until convergence or the iteration cap),
/// then returns the member of the largest cluster nearest that cluster's
/// centroid. `k_clusters` is clamped to the corpus size.
pub fn approximate_medoid<R: Rng + ?Sized>(
    graph: &Graph,
    k_clusters: usize,
    rng: &mut R,
) -> Result<u32> {
    if graph.is_empty() {
        return Err(IndexError::EmptyInput(
            "medoid estimation needs at least one point",
        ));
    }
    if k_clusters == 0 {
        return Err(IndexError::InvalidParameter(
            "cluster count k must be at least 1".into(),
        ));
    }

    let n = graph.len();
    let k = k_clusters.min(n);

    // Initial centroids: k distinct points.
    let mut centroids: Vec<Vec<f32>> = index::sample(rng, n, k)
        .into_iter()
        .map(|i| graph.point(i as u32).coords().to_vec())
        .collect();

    let mut assignments: Vec<usize> = vec![0; n];
    for _ in 0..MAX_ITERATIONS {
        for (i, slot) in assignments.iter_mut().enumerate() {
            let coords = graph.point(i as u32).coords();
            let mut best = 0;
            let mut best_dist = l2(coords, &centroids[0]);
            for (c, centroid) in centroids.iter().enumerate().skip(1) {
                let d = l2(coords, centroid);
                if d < best_dist {
                    best_dist = d;
                    best = c;
                }
            }
            *slot = best;
        }

        let mut converged = true;
        for (c, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<u32> = assignments
                .iter()
                .enumerate()
                .filter(|&(_, &a)| a == c)
                .map(|(i, _)| i as u32)
                .collect();
            if members.is_empty() {
                continue;
            }
            let new_centroid = mean_of(graph, &members);
            if l2(centroid, &new_centroid) > CONVERGENCE_EPS {
                converged = false;
            }
            *centroid = new_centroid;
        }
        if converged {
            break;
        }
    }

    // Largest cluster, ties to the lowest cluster index.
    let mut counts = vec![0usize; k];
    for &a in &assignments {
        counts[a] += 1;
    }
    let largest = counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map(|(c, _)| c)
        .unwrap_or(0);

    let members: Vec<u32> = assignments
        .iter()
        .enumerate()
        .filter(|&(_, &a)| a == largest)
        .map(|(i, _)| i as u32)
        .collect();
    let centroid = mean_of(graph, &members);

    // Member nearest the centroid; ascending scan keeps ties on the
    // smallest id.
    let mut best = members[0];
    let mut best_dist = l2(graph.point(best).coords(), &centroid);
    for &m in &members[1..] {
        let d = l2(graph.point(m).coords(), &centroid);
        if d < best_dist {
            best_dist = d;
            best = m;
        }
    }
    Ok(best)
}

fn mean_of(graph: &Graph, members: &[u32]) -> Vec<f32> {
    let mut mean = vec![0.0f32; graph.dimension()];
    for &m in members {
        for (slot, &x) in mean.iter_mut().zip(graph.point(m).coords()) {
            *slot += x;
        }
    }
    for slot in &mut mean {
        *slot /= members.len() as f32;
    }
    mean
}

/// One entry point per distinct label.
///
/// For each label, samples up to `tau` matching points uniformly (all of
/// them when fewer) and picks the sample with the fewest prior selections,
/// incrementing its usage counter. Labels that match no point are skipped
/// with a warning.
pub fn per_label_medoids<R: Rng + ?Sized>(
    graph: &Graph,
    tau: usize,
    rng: &mut R,
) -> Result<HashMap<Label, u32>> {
    if tau == 0 {
        return Err(IndexError::InvalidParameter(
            "sample budget tau must be at least 1".into(),
        ));
    }

    let labels: BTreeSet<Label> = graph
        .points()
        .iter()
        .flat_map(|p| p.labels().labels().iter().copied())
        .collect();

    let mut usage: Vec<u32> = vec![0; graph.len()];
    let mut medoids: HashMap<Label, u32> = HashMap::with_capacity(labels.len());

    for label in labels {
        let matching: Vec<u32> = graph
            .points()
            .iter()
            .filter(|p| p.labels().contains(label))
            .map(|p| p.id())
            .collect();
        if matching.is_empty() {
            tracing::warn!(label, "no points carry label, skipping its medoid");
            continue;
        }
        let sample: Vec<u32> = if matching.len() <= tau {
            matching
        } else {
            matching.into_iter().choose_multiple(rng, tau)
        };
        if let Some(pick) = sample.into_iter().min_by_key(|&id| (usage[id as usize], id)) {
            usage[pick as usize] += 1;
            medoids.insert(label, pick);
        }
    }
    Ok(medoids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LabelSet, Point};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_input_is_an_error() {
        let g = Graph::new(Vec::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            approximate_medoid(&g, 4, &mut rng),
            Err(IndexError::EmptyInput(_))
        ));
    }

    #[test]
    fn zero_clusters_is_an_error() {
        let g = Graph::new(vec![Point::new(0, vec![0.0])]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            approximate_medoid(&g, 0, &mut rng),
            Err(IndexError::InvalidParameter(_))
        ));
    }

    #[test]
    fn single_point_is_its_own_medoid() {
        let g = Graph::new(vec![Point::new(0, vec![3.0, 4.0])]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(approximate_medoid(&g, 8, &mut rng).unwrap(), 0);
    }

    #[test]
    fn dense_cluster_dominates_an_outlier() {
        // Nine points packed near the origin, one far away: the medoid must
        // come from the packed cluster.
        let mut points: Vec<Point> = (0..9)
            .map(|i| Point::new(i, vec![(i as f32) * 0.01, 0.0]))
            .collect();
        points.push(Point::new(9, vec![100.0, 100.0]));
        let g = Graph::new(points).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let m = approximate_medoid(&g, 2, &mut rng).unwrap();
        assert!(m < 9, "medoid {m} should come from the dense cluster");
    }

    #[test]
    fn per_label_table_covers_every_label() {
        let points = vec![
            Point::with_labels(0, vec![0.0], LabelSet::singleton(1)),
            Point::with_labels(1, vec![1.0], LabelSet::singleton(2)),
            Point::with_labels(2, vec![2.0], LabelSet::new([1, 2])),
        ];
        let g = Graph::new(points).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let medoids = per_label_medoids(&g, 10, &mut rng).unwrap();
        assert_eq!(medoids.len(), 2);
        assert!(g.point(medoids[&1]).labels().contains(1));
        assert!(g.point(medoids[&2]).labels().contains(2));
    }

    #[test]
    fn usage_counter_spreads_entry_duty() {
        // One point carries every label; a second carries two of them. The
        // usage counter must not hand all three labels to the same point.
        let points = vec![
            Point::with_labels(0, vec![0.0], LabelSet::new([1, 2, 3])),
            Point::with_labels(1, vec![1.0], LabelSet::new([2, 3])),
        ];
        let g = Graph::new(points).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let medoids = per_label_medoids(&g, 10, &mut rng).unwrap();
        assert_eq!(medoids[&1], 0);
        assert_eq!(medoids[&2], 1);
        assert_eq!(medoids[&3], 0);
    }

    #[test]
    fn zero_tau_is_an_error() {
        let g = Graph::new(vec![Point::new(0, vec![0.0])]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(per_label_medoids(&g, 0, &mut rng).is_err());
    }
}
