pub mod choreographer;
pub mod layout;
pub mod plan;
