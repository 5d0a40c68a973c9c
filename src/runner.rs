//! One reaper pass: discover, evaluate, apply, report.
//!
//! Applications are processed one at a time; a discovery failure aborts the
//! pass and propagates, while termination failures are recorded and the pass
//! continues. `now` is captured once per pass so every record is judged
//! against the same instant.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    config::ReaperConfig,
    discovery,
    policy::{self, RetirementDecision, RetirementReason},
    provider::{GroupLister, GroupTerminator, ProviderResult},
};

/// Structured outcome of one pass over a single application.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    /// Services that had at least one qualifying cluster.
    pub services_checked: u64,
    /// Non-baseline clusters kept (too new or recent enough).
    pub kept: u64,
    /// Clusters terminated (or that would be, in dry run).
    pub terminated: u64,
    /// Terminations that failed.
    pub failed: u64,
}

impl RunSummary {
    pub fn has_terminations(&self) -> bool {
        self.terminated > 0
    }

    fn count(&mut self, decision: &RetirementDecision) {
        match decision.reason {
            RetirementReason::KeptTooNew | RetirementReason::KeptRecentEnough => self.kept += 1,
            RetirementReason::Terminated => self.terminated += 1,
            RetirementReason::TerminateFailed => self.failed += 1,
        }
    }

    fn absorb(&mut self, other: &RunSummary) {
        self.services_checked += other.services_checked;
        self.kept += other.kept;
        self.terminated += other.terminated;
        self.failed += other.failed;
    }
}

/// Outcome of one pass across all configured applications.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PassSummary {
    pub applications_processed: u64,
    #[serde(flatten)]
    pub totals: RunSummary,
}

impl PassSummary {
    pub fn has_terminations(&self) -> bool {
        self.totals.has_terminations()
    }
}

/// Run one pass over a single application.
///
/// Returns the individual decisions (reasons already final, terminations
/// applied) together with the summary counts.
pub async fn run_application(
    application: &str,
    config: &ReaperConfig,
    now: DateTime<Utc>,
    lister: &dyn GroupLister,
    terminator: &dyn GroupTerminator,
) -> ProviderResult<(Vec<RetirementDecision>, RunSummary)> {
    tracing::info!(application, "Checking application");

    let groups = discovery::discover(application, lister).await?;
    let mut decisions = policy::evaluate(&groups, config.max_cluster_age_hours, now);
    policy::apply(&mut decisions, terminator, config.dry_run).await;

    let mut summary = RunSummary {
        services_checked: groups.len() as u64,
        ..Default::default()
    };
    for decision in &decisions {
        summary.count(decision);
        tracing::info!(
            application,
            service = %decision.record.service_name,
            name = %decision.record.name,
            version = decision.record.version,
            baseline_version = decision.baseline_version,
            age_hours = decision.age_hours,
            reason = %decision.reason,
            dry_run = config.dry_run,
            "Cluster decision"
        );
    }

    tracing::info!(
        application,
        services_checked = summary.services_checked,
        kept = summary.kept,
        terminated = summary.terminated,
        failed = summary.failed,
        dry_run = config.dry_run,
        "Finished processing application"
    );

    Ok((decisions, summary))
}

/// Run one pass across every configured application.
///
/// The first discovery failure aborts the pass; applications already
/// processed keep their effects, and the next invocation re-reads current
/// state.
pub async fn run_all(
    config: &ReaperConfig,
    lister: &dyn GroupLister,
    terminator: &dyn GroupTerminator,
) -> ProviderResult<PassSummary> {
    let now = Utc::now();
    let mut pass = PassSummary::default();

    for application in &config.applications {
        let (_, summary) = run_application(application, config, now, lister, terminator).await?;
        pass.totals.absorb(&summary);
        pass.applications_processed += 1;
    }

    Ok(pass)
}

/// Starts the interval worker as a background task.
///
/// Runs a full pass at the configured interval, indefinitely, until the task
/// is cancelled. A failed pass is logged and retried at the next tick.
pub async fn start_reaper_worker(
    config: Arc<ReaperConfig>,
    lister: Arc<dyn GroupLister>,
    terminator: Arc<dyn GroupTerminator>,
) {
    let Some(interval_hours) = config.interval_hours else {
        tracing::info!("Interval worker disabled by configuration");
        return;
    };

    let dry_run_msg = if config.dry_run { " (DRY RUN)" } else { "" };

    tracing::info!(
        interval_hours,
        max_cluster_age_hours = config.max_cluster_age_hours,
        applications = ?config.applications,
        dry_run = config.dry_run,
        "Starting reaper worker{}",
        dry_run_msg
    );

    let interval = std::time::Duration::from_secs(interval_hours * 3600);

    loop {
        match run_all(&config, lister.as_ref(), terminator.as_ref()).await {
            Ok(pass) => {
                if pass.has_terminations() {
                    tracing::info!(
                        applications = pass.applications_processed,
                        terminated = pass.totals.terminated,
                        failed = pass.totals.failed,
                        dry_run = config.dry_run,
                        "Reaper pass complete{}",
                        dry_run_msg
                    );
                } else {
                    tracing::debug!("Reaper pass complete, nothing to retire");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Error running reaper pass");
            }
        }

        tokio::time::sleep(interval).await;
    }
}
