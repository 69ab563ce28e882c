//! A dynamic point quadtree.
//!
//! Points are inserted one by one (or in bulk) and the tree grows its square
//! extent by doubling whenever a point falls outside of it. Points with exactly
//! equal coordinates are chained on a single leaf instead of splitting the tree.
//!
//! ```
//! use rs_canopy::spatial::quadtree::point_quadtree::Quadtree;
//!
//! let mut tree: Quadtree = Quadtree::new();
//! tree.add_point(0.0, 0.0)?.add_point(0.9, 0.9)?;
//!
//! let root = tree.build_node_representation().unwrap();
//! assert_eq!(root.size, 2);
//! assert_eq!(root.height, 1);
//! # Ok::<(), rs_canopy::error::QuadtreeError>(())
//! ```

pub mod error;
pub mod spatial;

pub use error::{QuadtreeError, Result};
