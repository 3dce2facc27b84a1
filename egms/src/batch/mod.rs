//! Batch fetching of EGMS tiles.
//!
//! This module drives a whole run, including:
//! - Task enumeration and output naming (`plan`)
//! - Request pacing (`limiter`)
//! - Per-task outcomes and summary counts (`outcome`)
//! - Sequential execution with failure isolation (`orchestrator`)
//!
//! # Architecture
//!
//! ```text
//! BatchOrchestrator
//!         │
//!         ├── BatchPlan ──────► TileAddress (in task order)
//!         │
//!         ├── RateLimiter (trait)
//!         │       ├── FixedIntervalLimiter
//!         │       └── Unlimited
//!         │
//!         ├── TileFetcher ────► extract_payload
//!         │
//!         └── BatchResult (ordered FetchOutcomes)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use egms::address::{Channel, YearRange};
//! use egms::batch::{BatchOrchestrator, GridBatch};
//! use egms::fetch::{ReqwestClient, TileFetcher};
//! use egms::identity::ArchiveEndpoint;
//!
//! let plan = GridBatch::region(10..=11, 25..=26, &Channel::ALL, YearRange::default())?.into();
//! let orchestrator = BatchOrchestrator::new(
//!     TileFetcher::new(ReqwestClient::new()?),
//!     ArchiveEndpoint::default(),
//!     Duration::from_secs(1),
//! );
//!
//! let result = orchestrator.run_plan(&plan, |done, total, label| {
//!     println!("{}/{} {}", done, total, label);
//! });
//! println!("{}", result.summary());
//! ```

mod limiter;
mod orchestrator;
mod outcome;
mod plan;

pub use limiter::{FixedIntervalLimiter, RateLimiter, Unlimited, DEFAULT_PACING_DELAY};
pub use orchestrator::BatchOrchestrator;
pub use outcome::{BatchResult, BatchSummary, FailureReason, FetchOutcome};
pub use plan::{BatchPlan, GridBatch, OrbitBatch, PlanError};
