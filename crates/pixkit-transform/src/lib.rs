//! pixkit-transform - Geometry operations for pixkit
//!
//! This crate provides:
//!
//! - In-place horizontal and vertical mirroring ([`flip`])
//! - Scaling with fit, fill, pad, stretch, crop, tile and carve policies
//!   ([`scale`])
//! - Content-aware resizing behind the [`SeamCarver`] trait ([`carve`])

pub mod carve;
mod error;
pub mod flip;
pub mod scale;

pub use carve::{CarveOptions, EnergyCarver, SeamCarver, carve};
pub use error::{TransformError, TransformResult};
pub use flip::{FlipMode, flip};
pub use scale::{Rect, ScaleMode, ScaleOptions, ScalePlan, plan, scale, scale_with_carver};
