mod parse;
mod scan;

pub use parse::*;
pub use scan::*;
