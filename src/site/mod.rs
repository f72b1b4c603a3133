mod index;
mod render;

pub use index::*;
pub use render::*;
