//! stitchann: in-memory Vamana-family approximate nearest neighbor graphs.
//!
//! Batch-builds a navigable proximity graph over a fixed point set and
//! answers k-nearest-neighbor queries with bounded-beam greedy traversal.
//! Three build variants share the same primitives:
//!
//! - [`VamanaBuilder`]: the plain Vamana construction — random edge
//!   initialization, medoid entry point, per-point greedy search plus
//!   diversity pruning with mirrored reverse edges.
//! - [`FilteredVamanaBuilder`]: attribute-aware variant; entry points come
//!   from a per-label medoid table and every traversal and prune is
//!   restricted to the point's labels.
//! - [`StitchedVamanaBuilder`]: partitions by label, builds each shard
//!   independently (in parallel), merges, and re-prunes the merged degrees.
//!
//! The index is approximate by construction and entirely in memory; there
//! is no dynamic insert/delete after a build and no persistence format.
//! Parsing vectors, ground-truth generation, and serving layers are caller
//! concerns — the crate's query surface is [`Graph::search`] and
//! [`search::beam_search`].
//!
//! # Example
//!
//! ```
//! use stitchann::{Point, VamanaBuilder, VamanaParams};
//!
//! let points: Vec<Point> = (0..64)
//!     .map(|i| Point::new(i, vec![i as f32, (i % 7) as f32]))
//!     .collect();
//!
//! let params = VamanaParams {
//!     max_degree: 8,
//!     beam_width: 32,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! let graph = VamanaBuilder::new(params).build(points)?;
//! let hits = graph.search(&[10.2, 3.1], 5, 32, None)?;
//! assert_eq!(hits.len(), 5);
//! # Ok::<(), stitchann::IndexError>(())
//! ```
//!
//! # References
//!
//! - Subramanya et al. (2019): "DiskANN: Fast Accurate Billion-point
//!   Nearest Neighbor Search on a Single Node"
//! - Gollapudi et al. (2023): "Filtered-DiskANN: Graph Algorithms for
//!   Approximate Nearest Neighbor Search with Filters"

pub mod distance;
pub mod error;
pub mod filtered;
pub mod graph;
pub mod medoid;
pub mod prune;
pub mod search;
pub mod stitched;
pub mod vamana;

pub use error::{IndexError, Result};
pub use filtered::{FilteredVamanaBuilder, FilteredVamanaParams};
pub use graph::{Graph, Label, LabelSet, Point};
pub use search::{beam_search, SearchOutcome};
pub use stitched::{StitchedVamanaBuilder, StitchedVamanaParams};
pub use vamana::{VamanaBuilder, VamanaParams};
