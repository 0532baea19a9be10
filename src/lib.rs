//! Compositional spatiotemporal interval queries over labeled time spans.
//!
//! ```rust
//! use spatiq::{Interval, IntervalSet, predicates};
//!
//! let people = IntervalSet::new(vec![
//!     Interval::from_temporal(0.0, 12.0, "person")?,
//!     Interval::from_temporal(30.0, 45.0, "person")?,
//! ]);
//! let cars = IntervalSet::new(vec![Interval::from_temporal(10.0, 20.0, "car")?]);
//!
//! let encounters = people.join(
//!     &cars,
//!     predicates::t_overlaps(),
//!     |a, b| a.span_with(b, |p, q| (*p, *q)),
//!     0.0,
//! );
//! assert_eq!(encounters.len(), 1);
//! # Ok::<(), spatiq::SpatiqError>(())
//! ```

pub mod error;
pub mod interval;
pub mod mapping;
pub mod pattern;
pub mod predicates;
pub mod runtime;
pub mod set;

#[cfg(feature = "snapshot")]
pub mod snapshot;

pub use error::{Result, SpatiqError};
pub use interval::Interval;
pub use mapping::{IntervalSetMapping, disjoint_combine, union_combine};
pub use pattern::{Pattern, PatternSolution};
pub use runtime::{FailedChunk, RunOutcome, Runtime, RuntimeConfig};
pub use set::IntervalSet;

pub use spatiq_types::{AbsoluteBox, Bounds1D, Bounds3D, BoundsError, Frame};

#[cfg(feature = "snapshot")]
pub use snapshot::{read_snapshot, write_snapshot};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Interval, IntervalSet, IntervalSetMapping, Result, SpatiqError};

    pub use crate::{Bounds1D, Bounds3D, Frame};

    pub use crate::predicates;

    pub use crate::{Pattern, Runtime, RuntimeConfig};

    pub use crate::{disjoint_combine, union_combine};
}
