pub mod error;
pub mod geometry;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod reconstruction;
pub mod skeleton;
pub mod spatial;

pub use error::{Result, VascError};
