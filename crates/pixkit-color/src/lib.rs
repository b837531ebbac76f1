//! pixkit Color - Color math, channels and color correction
//!
//! This crate provides the color-level operations of the toolkit:
//!
//! - **Color space conversion** ([`colorspace`]): RGB <-> HSV, HSL, CMYK
//! - **Color strings** ([`css`]): CSS3 color parsing, SVG color names,
//!   color fetch and allocation against an image
//! - **Splines** ([`spline`]): natural cubic splines for tone curves
//! - **Channel sampling** ([`channel`]): read any image as a gray plane
//! - **Compositing** ([`compositor`]): channel extraction and merging,
//!   alpha masks
//! - **Histograms** ([`histogram`]): normalized per-channel histograms
//! - **Correction** ([`correct`]): levels, gamma, tone curves, negation
//!   and hue rotation
//! - **Web-safe palette** ([`websafe`]): 216-color conversion with optional
//!   dithering

pub mod channel;
pub mod colorspace;
pub mod compositor;
pub mod correct;
pub mod css;
pub mod error;
pub mod histogram;
pub mod spline;
mod svg;
pub mod websafe;

// Re-export core types
pub use pixkit_core;

// Re-export error types
pub use error::{ColorError, ColorResult};

// Re-export color space types and functions
pub use colorspace::{
    Cmyk, ColorSpace, ColorSpaceFlags, Hsl, Hsv, cmyk_to_rgb, convert, hsl_to_rgb, hsv_to_rgb,
    rgb_to_cmyk, rgb_to_hsl, rgb_to_hsv,
};

// Re-export color string handling
pub use css::{
    ColorSpec, CssColor, color_allocate_cmyk, color_allocate_css, color_allocate_hsl,
    color_allocate_hsv, fetch_color, parse_css_color, parse_css_color_or_default, svg_color,
};

pub use channel::Channel;
pub use compositor::{MaskMode, MaskOptions, MergeOptions, alpha_mask, extract, merge};
pub use correct::{
    ChannelCorrectionParams, ChannelPipeline, ColorCorrectionParams, CorrectOutcome, HueRotation,
    color_correct, simulate, simulate_f32,
};
pub use histogram::histogram;
pub use spline::Spline;
pub use websafe::{to_websafe, websafe_palette};
