//! # Contour Analysis Library
//!
//! Contours traced from binary images, kept in a per-trace arena with
//! sibling/child links, plus the queries commonly run on them.
//!
//! ## Core Features
//!
//! - **Contour value type**: ordered points, derived bounding rect, color tag, reserved slots
//! - **Hierarchy arena**: next/prev/parent/child traversal by index
//! - **Geometry queries**: point-in-polygon (tri-state and numeric), signed distance
//! - **Approximation**: Douglas-Peucker or Visvalingam-Whyatt, optionally over a whole hierarchy
//! - **Shape matching**: Hu-moment comparison (I1, I2, I3)
//! - **Pluggable backend**: everything numeric goes through [`VisionBackend`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contour::{find_contours, ApproxOptions, Point, TraceOptions};
//!
//! let image = image::open("mask.png")?.to_luma8();
//! let contours = find_contours(&image, &TraceOptions::default())?;
//!
//! if let Some(head) = contours.head() {
//!     println!("rect: {:?}", head.rect());
//!     println!("inside: {:?}", head.contains_point(Point::new(10, 10)));
//!     let poly = head.approx_poly(&ApproxOptions::default())?;
//!     println!("approximated to {} points", poly.head().map(|c| c.len()).unwrap_or(0));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod algorithms;
pub mod analysis;
pub mod backend;
pub mod config;
pub mod contour;
pub mod error;
pub mod hierarchy;
pub mod io;
pub mod pipeline;
pub mod render;
pub mod trace;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use analysis::ContourAnalyzer;
pub use backend::ImageprocBackend;
pub use config::{ApproxMethod, ApproxOptions, ChainApprox, MatchMethod, RetrievalMode, TraceOptions};
pub use contour::Contour;
pub use error::{ContourError, Result};
pub use hierarchy::{ContourRef, Hierarchy, Links, NodeId};
pub use pipeline::{TracePipeline, builder::TracePipelineBuilder};
pub use render::{draw_contour, draw_contours};
pub use trace::{find_contours, find_contours_with};
pub use traits::*;
pub use types::{Point, Rect};
