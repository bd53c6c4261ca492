pub mod ease;
pub(crate) mod tween;
