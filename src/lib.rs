// Library surface for the binary and for headless/integration tests.
// Terminal drawing stays in the binary.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod language;
pub mod logging;
pub mod metrics;
pub mod runtime;
pub mod score_log;
pub mod session;
pub mod time_series;
