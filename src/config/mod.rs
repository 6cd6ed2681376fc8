//! Rule table configuration
//!
//! Conflict and override rules are ordinary data, not code: a TOML file can
//! replace the built-in tables without touching the program.

pub mod loader;

pub use loader::load_rules;
