//! Core types for the Strata terrain-mask engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the [`Element`] trait bounding grid cell types, the shared error
//! vocabulary ([`MaskError`], [`PipelineError`]), and the
//! [`PipelineObserver`] capability trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod error;
pub mod observer;

pub use element::Element;
pub use error::{MaskError, PipelineError};
pub use observer::{NoopObserver, PipelineObserver};
