//! # Prometheus Allotment
//!
//! A crash-safe, idempotent allotment engine for the Prometheus AI Platform.
//!
//! This library hands out one-shot resources from a finite shared pool: each
//! registered requester receives exactly one slot, at most once, even under
//! concurrent claims, and the engine survives process restarts without
//! losing or duplicating pool state. Completed assignments are reported
//! asynchronously to an external sheet endpoint with at-least-once delivery.
//!
//! ## Core Problem Solved
//!
//! One-shot giveaways have different failure modes than typical request
//! handling:
//!
//! - **At-most-once matters**: handing the same requester two slots, or two
//!   requesters the same exclusive payload, is not recoverable after the fact
//! - **Restarts are routine**: the process must come back with exactly the
//!   pool and ledger it had, reconstructed from append-only logs
//! - **Reporting is decoupled**: the external sheet can be down for minutes
//!   without blocking or failing a single claim
//!
//! ## Key Features
//!
//! - **Durable pool state**: every consume and refill is appended to a state
//!   log before memory changes; startup replays the log back to the last
//!   refill marker
//! - **Idempotent ledger**: an append-only assignment log keyed by requester;
//!   a repeated claim replays the original payload byte for byte
//! - **Atomic check-then-allocate**: one engine lock covers the ledger
//!   lookup, the pool draw and the ledger append, so concurrent claims for
//!   the same requester cannot double-allocate
//! - **Batched reporting**: a background scheduler drains the pending
//!   backlog on a fixed interval and restores it whenever the sink fails
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use prometheus_allotment::builders::build_engine;
//! use prometheus_allotment::config::Settings;
//! use prometheus_allotment::core::{Claim, Coordinator};
//! use prometheus_allotment::sync::{SheetSink, SyncScheduler};
//!
//! let settings = Settings::from_env()?;
//! let (registry, engine) = build_engine(&settings)?;
//!
//! let sink = Arc::new(SheetSink::new(settings.report_url.clone()));
//! sink.preflight().await?;
//!
//! let mut scheduler = SyncScheduler::new(engine.clone(), sink, settings.sync_interval());
//! scheduler.start();
//!
//! let coordinator = Coordinator::new(registry, engine);
//! let outcome = coordinator.allot(actor_id, &claim, chrono::Utc::now())?;
//! ```
//!
//! The interactive front-end, process bootstrap and the reporting endpoint
//! itself live outside this crate; the coordinator is the single entry
//! point the front-end calls.

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core allotment domain: pool, ledger, coordinator, errors.
pub mod core;
/// Configuration models and environment loading.
pub mod config;
/// Builders to assemble the engine from configuration.
pub mod builders;
/// Durable file adapters for rosters and append-only logs.
pub mod infra;
/// Background synchronization to the reporting sink.
pub mod sync;
/// Shared utilities.
pub mod util;
