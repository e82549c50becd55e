pub mod listfile;
pub mod table;

pub use listfile::*;
pub use table::*;
