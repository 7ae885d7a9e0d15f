//! Integration tests for the label-aware builds over the public API.
//!
//! Exercises the filtered and stitched constructions on the same corpus and
//! checks the invariants they share: label-respecting edges, per-label entry
//! points, and bounded degrees after stitching.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stitchann::{
    FilteredVamanaBuilder, FilteredVamanaParams, LabelSet, Point, StitchedVamanaBuilder,
    StitchedVamanaParams,
};

/// One Gaussian-ish blob per label, `per_label` points each.
fn labeled_corpus(labels: &[u32], per_label: usize, dim: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(labels.len() * per_label);
    for &label in labels {
        let center: Vec<f32> = (0..dim).map(|_| rng.random_range(-100.0..100.0)).collect();
        for _ in 0..per_label {
            let coords = center
                .iter()
                .map(|&c| c + rng.random_range(-1.0..1.0))
                .collect();
            let id = points.len() as u32;
            points.push(Point::with_labels(id, coords, LabelSet::singleton(label)));
        }
    }
    points
}

// =============================================================================
// Filtered build
// =============================================================================

#[test]
fn filtered_build_keeps_edges_inside_labels() {
    let points = labeled_corpus(&[1, 2, 3], 40, 3, 31);
    let params = FilteredVamanaParams {
        max_degree: 8,
        beam_width: 32,
        alpha: 1.2,
        tau: 8,
        seed: Some(31),
    };
    let graph = FilteredVamanaBuilder::new(params).build(points).unwrap();
    graph.check_invariants(8).unwrap();
    for p in graph.points() {
        for &nb in graph.neighbors(p.id()) {
            assert!(
                p.labels().intersects(graph.point(nb).labels()),
                "edge {} -> {nb} crosses labels",
                p.id()
            );
        }
    }
    assert_eq!(graph.label_medoids().len(), 3);
}

#[test]
fn filtered_queries_return_only_matching_points() {
    let points = labeled_corpus(&[1, 2], 50, 2, 13);
    let params = FilteredVamanaParams {
        max_degree: 8,
        beam_width: 32,
        tau: 8,
        seed: Some(13),
        ..Default::default()
    };
    let graph = FilteredVamanaBuilder::new(params).build(points.clone()).unwrap();
    for target in [1u32, 2u32] {
        let filter = LabelSet::singleton(target);
        let probe = points
            .iter()
            .find(|p| p.labels().contains(target))
            .unwrap();
        let hits = graph.search(probe.coords(), 5, 32, Some(&filter)).unwrap();
        assert!(!hits.is_empty());
        for (id, _) in hits {
            assert!(graph.point(id).labels().contains(target));
        }
    }
}

#[test]
fn query_for_absent_label_is_empty_not_an_error() {
    let points = labeled_corpus(&[1], 20, 2, 3);
    let params = FilteredVamanaParams {
        max_degree: 4,
        beam_width: 16,
        tau: 4,
        seed: Some(3),
        ..Default::default()
    };
    let graph = FilteredVamanaBuilder::new(params).build(points).unwrap();
    let filter = LabelSet::singleton(99);
    let hits = graph.search(&[0.0, 0.0], 5, 16, Some(&filter)).unwrap();
    assert!(hits.is_empty());
}

// =============================================================================
// Stitched build
// =============================================================================

#[test]
fn stitched_build_bounds_degrees_and_respects_shards() {
    let points = labeled_corpus(&[1, 2, 3, 4], 30, 3, 47);
    let params = StitchedVamanaParams {
        l_small: 24,
        r_small: 8,
        r_stitched: 10,
        alpha: 1.2,
        clusters: 2,
        seed: Some(47),
    };
    let graph = StitchedVamanaBuilder::new(params).build(points).unwrap();
    graph.check_invariants(10).unwrap();
    for p in graph.points() {
        for &nb in graph.neighbors(p.id()) {
            assert!(p.labels().intersects(graph.point(nb).labels()));
        }
    }
    assert_eq!(graph.label_medoids().len(), 4);
    assert!(graph.entry_point().is_some());
}

#[test]
fn stitched_filtered_queries_match_the_requested_label() {
    let points = labeled_corpus(&[5, 6], 40, 2, 9);
    let params = StitchedVamanaParams {
        l_small: 24,
        r_small: 6,
        r_stitched: 8,
        seed: Some(9),
        ..Default::default()
    };
    let graph = StitchedVamanaBuilder::new(params).build(points.clone()).unwrap();
    let filter = LabelSet::singleton(6);
    let probe = points.iter().find(|p| p.labels().contains(6)).unwrap();
    let hits = graph.search(probe.coords(), 5, 24, Some(&filter)).unwrap();
    assert!(!hits.is_empty());
    for (id, _) in hits {
        assert!(graph.point(id).labels().contains(6));
    }
}

#[test]
fn filtered_and_stitched_agree_on_label_reachability() {
    // Both variants must answer a within-label probe with same-label points
    // near the probe, whatever their internal edge sets look like.
    let points = labeled_corpus(&[1, 2, 3], 30, 2, 77);
    let filtered = FilteredVamanaBuilder::new(FilteredVamanaParams {
        max_degree: 6,
        beam_width: 24,
        tau: 6,
        seed: Some(77),
        ..Default::default()
    })
    .build(points.clone())
    .unwrap();
    let stitched = StitchedVamanaBuilder::new(StitchedVamanaParams {
        l_small: 24,
        r_small: 6,
        r_stitched: 8,
        seed: Some(77),
        ..Default::default()
    })
    .build(points.clone())
    .unwrap();

    for p in points.iter().step_by(11) {
        let filter = p.labels().clone();
        let a = filtered.search(p.coords(), 1, 24, Some(&filter)).unwrap();
        let b = stitched.search(p.coords(), 1, 24, Some(&filter)).unwrap();
        assert_eq!(a.first().map(|&(id, _)| id), Some(p.id()));
        assert_eq!(b.first().map(|&(id, _)| id), Some(p.id()));
    }
}
