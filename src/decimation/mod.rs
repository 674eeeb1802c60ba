pub mod lttb;
pub mod samplers;

pub use lttb::lttb_indices;
pub use samplers::{
    average, find_extrema_indices, max, min, nearest, pick_first, pick_max, pick_middle,
    pick_min, pick_nearest, sum, Sampler,
};
