//! PDF rasterization
//!
//! PDFs are never read for their text layer: every page is rendered to a
//! bitmap and recognized like any other image.

mod raster;

pub use raster::{MuPdfRasterizer, RasterError, RasterOptions, Rasterizer};
