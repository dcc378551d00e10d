pub mod capacity_fitter;
pub mod daily_allocator;
