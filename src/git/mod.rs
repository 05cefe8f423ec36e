mod diff;
mod repo;
mod tree;

pub use repo::{Branch, CommitMeta, GitRepo};
