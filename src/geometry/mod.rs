mod bounding_box;
mod frustum;
mod grid;

pub use bounding_box::BoundingBox;
pub use frustum::Frustum;
pub use grid::Grid;
