//! Configuration management
//!
//! This module handles the settings a node starts with: its listen address,
//! its identifier and the peers it knows about.

pub mod settings;

pub use settings::{generate_node_id, Config};
