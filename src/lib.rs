//! Marketplace buyer/seller chat with simulated counterparts and calls.

pub mod common;
pub mod config;
pub mod engine;
pub mod error;
pub mod repl;
pub mod storage;
pub mod ui;

pub use engine::{ChatHandle, ChatState, EngineHandles, spawn_engine};
pub use error::{ChatError, Result};
