//! Shared utilities for the Convoy workspace.

pub mod logger;
pub mod time;
