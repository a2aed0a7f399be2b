mod build_skeleton;
mod deduplicate;
mod space_filling_tree;

pub use build_skeleton::{BuildSkeleton, SkeletonParams};
pub use deduplicate::{DeduplicatePoints, DEFAULT_DEDUP_DECIMALS};
pub use space_filling_tree::SpaceFillingTree;
