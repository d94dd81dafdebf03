//! Raster side of clipping: alpha masks from pixel polygons and the image operations
//! that apply them.

mod format;
mod mask;
mod operation;
#[cfg(any(test, feature = "test"))]
mod test;

pub use format::*;
pub use mask::ClipMask;
pub use operation::*;
#[cfg(any(test, feature = "test"))]
pub use test::*;
