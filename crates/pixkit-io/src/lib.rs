//! pixkit-io - Image encoders
//!
//! This crate serializes pixkit images into Windows bitmap formats:
//!
//! - BMP (1, 4, 8, 24 and 32 bits per pixel, optional V5 header)
//! - ICO (one or more BMP entries with 1-bit transparency masks)
//!
//! Encoders build the whole file in memory and return it as a byte
//! vector; the `*_to` variants hand the finished buffer to a writer.
//!
//! # Examples
//!
//! ```
//! use pixkit_core::Pix;
//! use pixkit_io::{encode_ico, write_bmp};
//!
//! let pix = Pix::new_truecolor(16, 16).unwrap();
//! let bmp = write_bmp(&pix).unwrap();
//! assert_eq!(&bmp[..2], b"BM");
//!
//! let ico = encode_ico(&[pix]).unwrap();
//! assert_eq!(ico[4], 1);
//! ```

pub mod bmp;
pub mod error;
pub mod ico;

pub use bmp::{BmpFormat, encode_bmp, encode_bmp_to, write_bmp};
pub use error::{IoError, IoResult};
pub use ico::{encode_ico, encode_ico_to};
