//! dbsync CLI - Command-line interface for the dbsync merge engine.
//!
//! This crate provides the `dbsync` tool for diffing schema snapshots,
//! merging database snapshots into model files, and validating schemas.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
