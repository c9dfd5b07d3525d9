//! Image data capabilities.
//!
//! This module provides the [`ImageProbe`] trait, the single seam through
//! which the rest of the crate learns image sizes, and [`HeaderProbe`], the
//! built-in implementation backed by the `image` crate.
//!
//! ## Adding New Probes
//!
//! ```rust,ignore
//! use yolat::data::{Dimensions, ImageProbe, ProbeError};
//!
//! pub struct SidecarProbe;
//!
//! impl ImageProbe for SidecarProbe {
//!     fn id(&self) -> &'static str { "sidecar" }
//!     fn dimensions(&self, data: &[u8]) -> Result<Dimensions, ProbeError> { /* ... */ }
//! }
//! ```

mod probe;

pub use probe::{Dimensions, HeaderProbe, ImageProbe, ProbeError};
