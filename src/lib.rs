//! shelbyx - Shelby storage dashboard
//!
//! Browse, preview and upload the blobs an account stores on the Shelby
//! network.
//!
//! ## Architecture
//!
//! shelbyx is built to work in two modes:
//! - **Native**: Terminal UI using crossterm and ratatui
//! - **Web**: DOM UI driven through JSON snapshots (`ui_snapshot`)
//!
//! Both front ends wrap the same headless [`App`]: it owns the catalog,
//! paging, modal and upload state and queues [`app::Effect`]s that
//! [`effects::EffectRunner`] executes on the platform runtime.
//!
//! ## Usage
//!
//! For native builds:
//! ```bash
//! cargo build --features native
//! ```
//!
//! For web builds:
//! ```bash
//! cargo build --target wasm32-unknown-unknown --no-default-features --features dom-web
//! ```

// Core modules (available on all platforms)
pub mod config;
pub mod types;
pub mod util_text;

// Theme system (available on all platforms)
pub mod theme;

// Catalog, paging and preview logic
pub mod catalog;
pub mod paginate;
pub mod preview;

// Preview modal and upload orchestration
pub mod modal;
pub mod upload;

// Storage network client
pub mod client;

pub mod app;
pub mod effects;
pub mod ui;

// Deep link router (available on all platforms)
pub mod router;

// UI snapshot types for DOM-based rendering (all platforms)
pub mod ui_snapshot;

// Blob list poller
pub mod source_poll;

// Platform abstraction layer
pub mod platform;

// Network utilities (429 backoff for native builds)
#[cfg(feature = "native")]
pub mod net;

// WASM-specific JavaScript bridge (wallet, window.open)
pub mod webshim;

// Re-export commonly used types
pub use app::{App, Effect, InputMode};
pub use config::Config;
pub use types::{AppEvent, AsyncOp, BlobRecord};
