pub mod completions;
pub mod config;
pub mod headers;
pub mod render;
