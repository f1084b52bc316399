//! # lineup-core
//!
//! Match-day lineup lifecycle for the coach portal.
//! Provides validated draft submission, a `Draft -> Locked` state machine,
//! and a time-triggered sweep that locks lineups around kickoff.

pub mod directory;
#[path = "directory_in_memory.rs"]
pub mod directory_in_memory;
pub mod error;
pub mod infrastructure;
#[path = "infrastructure_in_memory.rs"]
pub mod infrastructure_in_memory;
#[cfg(feature = "sqlite")]
#[path = "infrastructure_sqlite.rs"]
pub mod infrastructure_sqlite;
pub mod locks;
pub mod manager;
pub mod sweeper;
pub mod types;
pub mod window;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod sweeper_test;
