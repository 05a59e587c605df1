//! Reconciliation core for syncing a show scheduler with a calendar.
//!
//! This crate is pure computation over in-memory snapshots:
//! - `hash` fingerprints events by identity and by observable state
//! - `diff` compares two event sets and plans create/update/delete actions
//! - `shadow` keeps recurring calendar entries from double-booking with
//!   their date-bounded overrides
//!
//! Reading the scheduler, talking to the calendar provider and applying the
//! plan all happen outside this crate.

pub mod config;
pub mod date_range;
pub mod diff;
pub mod environment;
pub mod error;
pub mod event;
pub mod hash;
pub mod manifest;
pub mod pipeline;
pub mod schema;
pub mod shadow;

pub use config::{ReconcilePolicy, ShadowPrecedence};
pub use date_range::{DateSpan, SpanRelation};
pub use diff::{ActionKind, Plan, ReconciliationAction, reconcile};
pub use environment::SchedulerEnvironment;
pub use error::{SyncError, SyncResult};
pub use event::*;
pub use hash::{Digest, identity_hash, state_hash, verify_event};
pub use manifest::{DraftSnapshot, EventSet, Snapshot};
pub use pipeline::plan_pass;
pub use schema::{Controller, SCHEMA_VERSION};
pub use shadow::resolve_overrides;
