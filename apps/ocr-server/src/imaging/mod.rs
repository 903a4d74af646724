//! Image decoding and normalization
//!
//! Every page, whether uploaded directly or rasterized from a PDF, goes
//! through [`normalize`] before recognition so the recognizer sees bounded,
//! single-representation bitmaps.

mod normalize;

pub use normalize::{decode, normalize, ColorMode, ImagingError, NormalizeOptions};
