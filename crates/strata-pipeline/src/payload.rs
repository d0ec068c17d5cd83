//! The [`MaskPayload`] value flowing through mask pipelines.
//!
//! Boolean and scalar chains share one graph, so cross-kind nodes
//! (thresholding, distance fields, masked arithmetic) can depend on
//! each other directly. Kind accessors are checked: a wrong-kind
//! upstream surfaces as [`MaskError::KindMismatch`] from the consuming
//! node rather than a panic.

use strata_core::MaskError;
use strata_mask::{BitMask, ScalarMask};

use crate::node::NodeValue;

/// A mask of either cell kind, produced by one pipeline node.
#[derive(Clone, Debug)]
pub enum MaskPayload {
    /// A boolean presence mask.
    Bit(BitMask),
    /// A scalar field mask.
    Scalar(ScalarMask),
}

impl MaskPayload {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Bit(_) => "bit",
            Self::Scalar(_) => "scalar",
        }
    }

    /// Borrow the boolean mask.
    ///
    /// # Errors
    ///
    /// [`MaskError::KindMismatch`] if this payload holds a scalar mask.
    pub fn as_bit(&self) -> Result<&BitMask, MaskError> {
        match self {
            Self::Bit(mask) => Ok(mask),
            other => Err(MaskError::KindMismatch {
                expected: "bit",
                found: other.kind_name(),
            }),
        }
    }

    /// Borrow the scalar mask.
    ///
    /// # Errors
    ///
    /// [`MaskError::KindMismatch`] if this payload holds a boolean mask.
    pub fn as_scalar(&self) -> Result<&ScalarMask, MaskError> {
        match self {
            Self::Scalar(mask) => Ok(mask),
            other => Err(MaskError::KindMismatch {
                expected: "scalar",
                found: other.kind_name(),
            }),
        }
    }

    /// Take the boolean mask by value.
    ///
    /// # Errors
    ///
    /// [`MaskError::KindMismatch`] if this payload holds a scalar mask.
    pub fn into_bit(self) -> Result<BitMask, MaskError> {
        match self {
            Self::Bit(mask) => Ok(mask),
            other => Err(MaskError::KindMismatch {
                expected: "bit",
                found: other.kind_name(),
            }),
        }
    }

    /// Take the scalar mask by value.
    ///
    /// # Errors
    ///
    /// [`MaskError::KindMismatch`] if this payload holds a boolean mask.
    pub fn into_scalar(self) -> Result<ScalarMask, MaskError> {
        match self {
            Self::Scalar(mask) => Ok(mask),
            other => Err(MaskError::KindMismatch {
                expected: "scalar",
                found: other.kind_name(),
            }),
        }
    }
}

impl NodeValue for MaskPayload {
    fn size(&self) -> u32 {
        match self {
            Self::Bit(mask) => mask.size(),
            Self::Scalar(mask) => mask.size(),
        }
    }
}
