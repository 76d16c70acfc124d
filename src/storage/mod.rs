pub mod dataset;
pub mod report;

pub use dataset::{load_points, load_points_file, load_queries_file, DatasetError, LoadReport};
pub use report::{write_batch, write_json, write_skyline};
