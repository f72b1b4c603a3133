mod flatten;
mod graph;
mod identity;
mod refs;
mod types;

pub use flatten::*;
pub use graph::*;
pub use identity::*;
pub use refs::*;
pub use types::*;
