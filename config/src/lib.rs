//! # Config Crate
//!
//! Centralized configuration constants for the parametric box generator.
//! Every tolerance, tessellation default and hinge/text tuning value used by
//! the kernel is defined here so the builders stay free of magic numbers.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{GEOMETRY_EPSILON, TEXT_PIXELS_PER_MM};
//!
//! // Breakpoints closer than GEOMETRY_EPSILON are merged
//! let a: f64 = 10.0;
//! let b: f64 = 10.0004;
//! assert!((a - b).abs() < GEOMETRY_EPSILON);
//!
//! // A 80 mm wide lid rasterizes to 160 pixel columns
//! let columns = (80.0 * TEXT_PIXELS_PER_MM).ceil() as u32;
//! assert_eq!(columns, 160);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Millimetres**: Every length is expressed in millimetres
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;
