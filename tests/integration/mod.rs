//! Integration tests for the healthcheck server
//!
//! Each test starts its own in-process server on 127.0.0.1 with an
//! ephemeral port and drives it over HTTP.
//!
//! Run with: cargo test --test integration

mod helpers;

mod access_control;
mod backends;
mod healthcheck_endpoint;
mod pause_control;
