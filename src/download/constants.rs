//! Constants for the download module (timeouts).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout: longest gap between reads (5 minutes).
pub const READ_TIMEOUT_SECS: u64 = 300;
