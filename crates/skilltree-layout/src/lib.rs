//! Skill Tree Layout
//!
//! Deterministic hierarchical (layered) layout for directed prerequisite
//! graphs, ranked top to bottom.
//!
//! # Pipeline
//!
//! 1. **Rank**: longest path from the sources, so every skill sits below all
//!    of its prerequisites
//! 2. **Virtual vertices**: edges spanning several ranks are split so the
//!    ordering step sees them on every rank they cross
//! 3. **Order**: barycenter sweeps reduce edge crossings within each rank
//! 4. **Position**: rectangles are placed on horizontal bands, children
//!    pulled under their parents, then the drawing is translated so its
//!    bounding box starts at the origin
//!
//! The native anchor is the rectangle center. [`Layout::positions`] holds
//! top-left corners, which is what a canvas expects.
//!
//! ```
//! use skilltree_layout::{layout, LayoutConfig, Size};
//!
//! let sizes = [Size::new(120.0, 40.0), Size::new(120.0, 40.0)];
//! let result = layout(&sizes, &[(0, 1)], &LayoutConfig::default());
//! assert!(result.positions[0].y < result.positions[1].y);
//! ```

mod geometry;
mod layered;
mod order;
mod position;
mod rank;

pub use geometry::{Point, Size};
pub use layered::{layout, Layout, LayoutConfig};
pub use order::{barycenter, minimize_crossings, total_crossings, LayerAdjacency};
pub use rank::{longest_path_ranks, topological_order};
