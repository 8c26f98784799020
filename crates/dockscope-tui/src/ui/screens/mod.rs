mod log_grid;

pub use log_grid::LogGridScreen;
