//! Retry support for flaky backend calls

mod backoff;

pub use backoff::RetryPolicy;
