//! Centralized timeout and retry defaults
//!
//! All values can be overridden via configuration.

use std::time::Duration;

/// Defaults for backend invocation
pub mod backend {
    use super::*;

    /// Per-call deadline for one answer generation (2 minutes)
    pub const CALL_SECS: u64 = 120;

    /// TCP connect timeout for backend HTTP clients
    pub const CONNECT_SECS: u64 = 10;

    /// Get call timeout as Duration
    pub fn call_timeout() -> Duration {
        Duration::from_secs(CALL_SECS)
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_SECS)
    }
}

/// Defaults for the retry loop
pub mod retry {
    /// Attempts per item, including the first
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base backoff; attempt `n` sleeps `BASE_DELAY_SECS * 2^n`
    pub const BASE_DELAY_SECS: u64 = 5;
}

/// Defaults for remote dataset providers
pub mod hub {
    use super::*;

    /// Deadline for one datasets-server request
    pub const REQUEST_SECS: u64 = 30;

    /// Get request timeout as Duration
    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_SECS)
    }
}
