//! Coordinate types shared by the normalizer, the geometry kernel and the renderers.

mod geo_bbox;
mod lat_lng;
mod pixel_point;
mod tile_coord;

pub use geo_bbox::*;
pub use lat_lng::*;
pub use pixel_point::*;
pub use tile_coord::*;
