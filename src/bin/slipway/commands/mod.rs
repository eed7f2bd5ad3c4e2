//! Command implementations

pub mod build;
pub mod completions;
pub mod publish;
pub mod render;
