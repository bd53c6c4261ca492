pub mod bus;
pub mod selection;
