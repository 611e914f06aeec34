//! wfa_rs
//!
//! Layout of annotations on waterfall charts: connector arrows between two
//! categories and total bars spliced into the category axis, placed so that
//! they do not overlap the bars, their labels or each other. Pairs with the
//! `wfa` CLI.
//!
//! ### Features
//! - Total rows computed as inclusive prefix sums over all series
//! - Arrow validation (unresolved, self-loop, duplicate) and greedy collision avoidance
//! - Two-phase text measurement before any geometry reads label sizes
//! - Horizontal and transposed charts, inverted axes
//! - SVG output through plotters
//!
//! ### Example
//! ```no_run
//! use wfa_rs::{ArrowConfig, ChartConfig, Series, TotalConfig};
//!
//! let cfg = ChartConfig {
//!     series: vec![Series::from_pairs("net", [("Q1", 120.0), ("Q2", -30.0), ("Q3", 45.0)])],
//!     arrows: vec![ArrowConfig::new("Q1", "Q3")],
//!     totals: vec![TotalConfig::new("Q3")],
//!     ..ChartConfig::default()
//! };
//! wfa_rs::viz::render_waterfall(&cfg, "waterfall.svg", 1000, 600)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod annotations;
pub mod arrows;
pub mod chart;
pub mod error;
pub mod geometry;
pub mod label;
pub mod measure;
pub mod models;
pub mod scene;
pub mod storage;
pub mod style;
pub mod totals;
pub mod viz;

pub use annotations::{Annotations, AnnotationsConfig};
pub use arrows::controller::{ArrowsController, Invalidation};
pub use arrows::{Arrow, ArrowConfig, ArrowId, DrawSettings, InvalidReason, LayoutOptions, Validity};
pub use chart::{ChartLayout, Orientation, StaticChart};
pub use error::LayoutError;
pub use geometry::{Point2D, Rect, Size};
pub use models::{CategoryKey, DataRow, Series};
pub use scene::{Scene, Surface};
pub use storage::ChartConfig;
pub use totals::{Total, TotalConfig, TotalId};
