pub mod aggregate;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extension;
pub mod files;
pub mod git;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod walker;
