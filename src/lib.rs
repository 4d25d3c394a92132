pub mod cli;
pub mod errors;
pub mod export;
pub mod models;
pub mod resolver;
pub mod scanner;
