//! EGMS - Batch retrieval of European Ground Motion Service tiles
//!
//! This library fetches per-tile displacement archives from the EGMS archive
//! API, pulls the CSV payload out of each archive, and packages a batch of
//! payloads into a single deliverable.
//!
//! # Pipeline
//!
//! ```text
//! BatchPlan ──► TileAddress ──► RequestIdentity ──► TileFetcher
//!                                                       │
//!                                                       ▼
//! OutputArchive ◄── aggregate ◄── BatchResult ◄── extract_payload
//! ```

pub mod address;
pub mod aggregate;
pub mod batch;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod identity;
pub mod logging;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
