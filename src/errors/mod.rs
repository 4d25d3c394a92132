pub mod types;

pub use types::OllascanError;
