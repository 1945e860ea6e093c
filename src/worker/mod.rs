pub mod handlers;
pub mod operations;
pub mod processor;
