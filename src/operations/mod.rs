pub mod meshing;
pub mod sampling;
pub mod skeleton;
