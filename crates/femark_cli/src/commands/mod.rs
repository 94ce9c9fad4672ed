pub mod render;
pub mod which;
