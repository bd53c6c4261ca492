pub mod linear;
pub mod manager;
pub mod ordinal;
