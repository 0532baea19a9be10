use serde::{Deserialize, Serialize};

use crate::bounds::{Bounds1D, Bounds3D};
use crate::error::BoundsError;

/// An absolute pixel-space box with its temporal extent in seconds.
///
/// Produced by projecting a relative [`Bounds3D`] onto a concrete
/// [`Frame`]; the temporal extent passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteBox {
    pub t1: f64,
    pub t2: f64,
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

/// Concrete media dimensions used to convert between the relative unit
/// frame and absolute pixel coordinates.
///
/// # Examples
///
/// ```
/// use spatiq_types::{Bounds3D, Frame};
///
/// let frame = Frame::new(1920, 1080).unwrap();
/// let bounds = Bounds3D::from_coords(0.0, 1.0, 0.25, 0.75, 0.0, 0.5).unwrap();
///
/// let abs = frame.to_absolute(&bounds);
/// assert_eq!(abs.x1, 480.0);
/// assert_eq!(abs.x2, 1440.0);
/// assert_eq!(abs.y2, 540.0);
///
/// let back = frame.to_relative(&abs).unwrap();
/// assert_eq!(back, bounds);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
}

impl Frame {
    /// Create a frame, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, BoundsError> {
        if width == 0 || height == 0 {
            return Err(BoundsError::EmptyFrame { width, height });
        }
        Ok(Self { width, height })
    }

    /// Project relative bounds onto this frame's pixel space.
    pub fn to_absolute(&self, bounds: &Bounds3D) -> AbsoluteBox {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        AbsoluteBox {
            t1: bounds.t.start,
            t2: bounds.t.end,
            x1: bounds.x.start * w,
            x2: bounds.x.end * w,
            y1: bounds.y.start * h,
            y2: bounds.y.end * h,
        }
    }

    /// Convert an absolute pixel box back into relative bounds.
    pub fn to_relative(&self, abs: &AbsoluteBox) -> Result<Bounds3D, BoundsError> {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        Ok(Bounds3D {
            t: Bounds1D::new(abs.t1, abs.t2)?,
            x: Bounds1D::new(abs.x1 / w, abs.x2 / w)?,
            y: Bounds1D::new(abs.y1 / h, abs.y2 / h)?,
        })
    }
}
