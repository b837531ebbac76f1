//! pixkit - Raster image toolkit
//!
//! pixkit works on images held either as palette indices or as packed
//! ARGB with a 7-bit alpha (0 opaque, 127 transparent).
//!
//! # Overview
//!
//! - Color space math and CSS color strings ([`color`])
//! - Channel extraction, merging and alpha masks ([`color::compositor`])
//! - Levels, gamma, tone curve and hue correction ([`color::correct`])
//! - BMP and ICO encoding ([`io`])
//! - Flip, scale and seam carving ([`transform`])
//!
//! # Example
//!
//! ```
//! use pixkit::{Pix, io, transform};
//!
//! let pix = Pix::new_truecolor(100, 50).unwrap();
//! let opts = transform::ScaleOptions::default();
//! let icon = transform::scale(&pix, 32, 32, transform::ScaleMode::Pad, &opts).unwrap();
//! assert_eq!((icon.width(), icon.height()), (32, 32));
//!
//! let bytes = io::encode_ico(&[icon]).unwrap();
//! assert_eq!(&bytes[..4], &[0, 0, 1, 0]);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use pixkit_core::*;

// ARGB helpers, renamed so the color crate can take the `color` name
pub use pixkit_core::color as argb;

// Re-export domain crates as modules to avoid name conflicts
pub use pixkit_color as color;
pub use pixkit_io as io;
pub use pixkit_transform as transform;
