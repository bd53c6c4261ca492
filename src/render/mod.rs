pub mod raster;
pub mod renderer;
pub mod scene;
pub mod svg;
