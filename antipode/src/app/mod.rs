//! Application bootstrap.
//!
//! This module provides `AntipodeApp`, which wires two viewers together in the
//! right order:
//!
//! 1. Center viewer A on the initial point and viewer B on its antipode
//! 2. Apply the initial imagery style and place the initial markers
//! 3. Attach the synchronizer (only now, so setup itself is never mirrored)
//! 4. Hand the markers to the selection router
//!
//! # Architecture
//!
//! ```text
//! viewer events ──► ViewSynchronizer ──┐
//!                                      ├──► antipode transform ──► other viewer
//! search results ─► SelectionRouter ───┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use antipode::app::{AntipodeApp, AppConfig};
//! use antipode::viewer::{HeadlessViewer, MapViewer};
//!
//! let config = AppConfig::default();
//! let a = Arc::new(HeadlessViewer::new("A", config.zoom));
//! let b = Arc::new(HeadlessViewer::new("B", config.zoom));
//! let app = AntipodeApp::start(config, a.clone(), b.clone()).unwrap();
//!
//! a.drag_by(0.5, 0.5);
//! assert_eq!(b.fit_count(), 1);
//! # drop(app);
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::AntipodeApp;
pub use config::{AppConfig, DEFAULT_FIT_PADDING, DEFAULT_ZOOM, INITIAL_COORDINATES};
pub use error::AppError;
