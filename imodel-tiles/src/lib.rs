//! imodel-tiles - Mesh export acquisition for iModel 3D Tiles viewers
//!
//! This library obtains a 3D Tiles tileset for an iModel from the Mesh Export
//! service: it looks for an existing export, requests and polls a new one when
//! needed, and resolves the `tileset.json` URL that a tile viewer consumes.
//!
//! # Modules
//!
//! - [`config`] - configuration file, environment overrides, resolved settings
//! - [`http`] - HTTP client abstraction (reqwest in production, mocks in tests)
//! - [`auth`] - access tokens and the token source seam
//! - [`export`] - the export acquisition protocol and tileset URL resolution
//! - [`viewer`] - the viewer adapter seam and a headless tileset viewer
//! - [`logging`] - tracing subscriber setup

pub mod auth;
pub mod config;
pub mod export;
pub mod http;
pub mod logging;
pub mod viewer;

/// Version of the imodel-tiles library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
