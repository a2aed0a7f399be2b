mod cone_sampler;
mod fork_filter;
mod priority_heap;
mod sample_elimination;

pub use cone_sampler::{ConeSurfaceSampler, SurfacePoint};
pub use fork_filter::{FilterForkPoints, DEFAULT_QUERY_EPS, DEFAULT_RADIUS_MARGIN};
pub use priority_heap::MaxHeap;
pub use sample_elimination::{SampleElimination, DEFAULT_HEAP_DECIMALS};
