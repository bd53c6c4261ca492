pub mod series;
pub mod summary;
