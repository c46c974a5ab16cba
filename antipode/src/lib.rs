//! Antipode - two linked map views of opposite points on Earth
//!
//! This library keeps two map viewers showing antipodal regions. Moving one
//! viewer moves the other to the region diametrically opposite, and picking
//! a search result on either side places markers on both.
//!
//! - [`coord`]: the antipode transform for points and viewports
//! - [`viewer`]: the map viewer interface and a headless implementation
//! - [`sync`]: two-way viewport and style synchronization with echo suppression
//! - [`selection`]: routing of search results to both viewers
//! - [`app`]: startup wiring
//! - [`config`] and [`logging`]: the INI configuration file and `tracing` setup

pub mod app;
pub mod config;
pub mod coord;
pub mod logging;
pub mod selection;
pub mod sync;
pub mod viewer;
