//! healthcheck - pluggable health checks served over HTTP.
//!
//! A configurable list of probes (database, cache, scheduler, Solr, mail
//! delivery, SAML metadata, ...) is run on request and rendered as HTML or
//! JSON. Any non-paused failing probe turns the response into a 503.
//!
//! # Architecture
//!
//! | Layer | Module |
//! |-------|--------|
//! | HTTP host, secret and IP gate, pause endpoints | [`server`] |
//! | Configuration checks and rendering | [`healthcheck`] |
//! | Sequential or concurrent probe execution | [`runner`] |
//! | Probe variants and their backends | [`probe`] |
//! | Renderers | [`output`] |
//! | Persistent pause flags | [`pause`] |
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck::{Config, Healthcheck, Server};
//! use healthcheck::registry::{OutputRegistry, ProbeRegistry};
//!
//! let config = Config::from_env()?;
//! let engine = Healthcheck::new(
//!     &config,
//!     ProbeRegistry::with_defaults(),
//!     OutputRegistry::with_defaults(),
//!     pause_store,
//!     backends,
//! );
//! Server::new(config.server.clone(), engine).bind_and_run().await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty outside a checkout
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod error;
pub mod healthcheck;
pub mod logging;
pub mod output;
pub mod pause;
pub mod probe;
pub mod registry;
pub mod result;
pub mod runner;
pub mod server;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::healthcheck::Healthcheck;
pub use crate::server::Server;
