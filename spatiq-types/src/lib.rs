//! # spatiq-types
//!
//! Core bounds and coordinate frame types for the Spatiq query engine.
//!
//! This crate provides the fundamental extents that spatiotemporal
//! intervals are built from:
//!
//! - **Axis extents**: `Bounds1D`, a closed-open extent on one axis
//! - **Spatiotemporal extents**: `Bounds3D`, a temporal extent plus a
//!   spatial box in the relative unit frame
//! - **Coordinate frames**: `Frame`, for converting between relative and
//!   absolute pixel coordinates
//!
//! All types are serializable with Serde, and the spatial box converts to
//! the `geo` crate's `Rect` for geometric computations.
//!
//! ## Examples
//!
//! ```rust
//! use spatiq_types::{Bounds1D, Bounds3D};
//!
//! let a = Bounds3D::from_temporal(0.0, 10.0).unwrap();
//! let b = Bounds3D::from_temporal(5.0, 15.0).unwrap();
//! assert_eq!(a.span(&b).t, Bounds1D::new(0.0, 15.0).unwrap());
//! ```

pub mod bounds;
pub mod error;
pub mod frame;

pub use bounds::{Bounds1D, Bounds3D};
pub use error::BoundsError;
pub use frame::{AbsoluteBox, Frame};
