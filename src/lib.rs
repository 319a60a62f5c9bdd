//! Tillsync synchronization server library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod api;
pub mod cache;
pub mod config;
pub mod session;
pub mod state;
pub mod ws;
