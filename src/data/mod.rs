pub mod load;
pub mod measure;
pub mod record;
