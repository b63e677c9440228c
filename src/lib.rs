//! TabSort: keeps the video watch tabs of one browser window ordered by remaining playback time.
//!
//! This library crate exposes all modules for use by the host binary and integration tests.

pub mod app;
pub mod event_handler;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
