//! Console API Demo Library
//!
//! One process, two surfaces: an HTTP API and an interactive console menu.
//! Both share the same state and call into the same building blocks.
//!
//! # Modules
//!
//! - `native`: C-ABI squaring routine
//! - `buffer`: Process-wide mutable byte buffer
//! - `reconstruct`: Chunked file reconstruction with progress reporting
//! - `routes`: HTTP handlers
//! - `console`: Blocking menu loop

pub mod buffer;
pub mod config;
pub mod console;
pub mod error;
pub mod native;
pub mod reconstruct;
pub mod routes;
pub mod state;
