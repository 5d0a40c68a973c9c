//! asg-reaper
//!
//! Finds Auto Scaling groups created by a Spinnaker-style delivery pipeline
//! and retires the ones that have been superseded by a newer version of the
//! same service, once they have aged past a safety window.
//!
//! The crate is organized around two core components plus plumbing:
//!
//! - **discovery**: drains the paginated group listing and parses raw group
//!   names into structured cluster records, grouped per service.
//! - **policy**: decides, per service, which superseded clusters are old
//!   enough to terminate, and applies those decisions.
//! - **provider**: capability traits for the AWS Auto Scaling API, with the
//!   real SDK client and an in-memory fake for tests.
//! - **runner**: one full pass (discover, evaluate, apply, report) and the
//!   optional interval worker.
//! - **routes**: the HTTP trigger surface for scheduled runs.

pub mod config;
pub mod discovery;
pub mod observability;
pub mod policy;
pub mod provider;
pub mod routes;
pub mod runner;

use std::sync::Arc;

use crate::{
    config::ReaperConfig,
    provider::{GroupLister, GroupTerminator},
};

/// Shared state for the HTTP trigger surface.
///
/// The provider is held behind the capability traits so tests can swap in
/// the in-memory fake.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ReaperConfig>,
    pub lister: Arc<dyn GroupLister>,
    pub terminator: Arc<dyn GroupTerminator>,
}
