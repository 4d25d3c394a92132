pub mod file;
pub mod range;

pub use file::resolve_file;
pub use range::resolve_range;
