//! Datasource CLI - inspect how a configuration resolves into a pool.
//!
//! The CLI never constructs a pool. It prints the descriptor, driver class and
//! layered properties a host would hand to its pool factory.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
