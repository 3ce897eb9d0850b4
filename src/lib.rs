// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod limit_monitor;
pub mod logging;
pub mod runtime;
pub mod session_clock;
pub mod tracker;
pub mod ui;
pub mod user;

/// One tick per wall-clock second
pub const TICK_RATE_MS: u64 = 1000;
