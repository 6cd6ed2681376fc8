//! Merge composition: configuration fragments and archives.

pub mod archive;
pub mod config;

pub use archive::merge_archives;
pub use config::merge_config_fragments;
