//! Retirement policy engine.
//!
//! Per service, the highest-version cluster is the baseline and is never a
//! termination candidate. Every other cluster is retired once it is both
//! strictly superseded and strictly older than the safety window. Decisions
//! are computed up front from the discovery snapshot; applying one decision
//! never changes the evaluation of another.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{
    discovery::{ClusterRecord, ServiceGroups},
    provider::GroupTerminator,
};

/// Why a non-baseline cluster was kept or retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetirementReason {
    /// Version is not strictly below the baseline (an unexpected tie).
    KeptTooNew,
    /// Superseded, but not yet past the safety window.
    KeptRecentEnough,
    /// Superseded and aged out; termination requested (or would be, in dry
    /// run).
    Terminated,
    /// Termination was requested but the deletion call failed.
    TerminateFailed,
}

impl RetirementReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetirementReason::KeptTooNew => "kept-too-new",
            RetirementReason::KeptRecentEnough => "kept-recent-enough",
            RetirementReason::Terminated => "terminated",
            RetirementReason::TerminateFailed => "terminate-failed",
        }
    }
}

impl fmt::Display for RetirementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluated non-baseline cluster.
#[derive(Debug, Clone, Serialize)]
pub struct RetirementDecision {
    pub record: ClusterRecord,
    /// Version of the baseline this record was judged against.
    pub baseline_version: u64,
    /// Age at evaluation time, truncated to whole hours (reporting only;
    /// eligibility is computed on the full duration).
    pub age_hours: i64,
    pub reason: RetirementReason,
}

impl RetirementDecision {
    pub fn terminated(&self) -> bool {
        self.reason == RetirementReason::Terminated
    }
}

/// Evaluate every non-baseline cluster against the termination rule.
///
/// Services with fewer than two records produce no decisions. `now` is
/// captured once by the caller so sibling records across services are judged
/// against the same instant.
pub fn evaluate(
    groups: &ServiceGroups,
    max_age_hours: i64,
    now: DateTime<Utc>,
) -> Vec<RetirementDecision> {
    let max_age = Duration::hours(max_age_hours);
    let mut decisions = Vec::new();

    for records in groups.values() {
        let Some((baseline, rest)) = records.split_first() else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }

        for record in rest {
            let age = now.signed_duration_since(record.created_at);
            // Both inequalities are strict: a cluster exactly at the age
            // threshold is kept.
            let reason = if record.version >= baseline.version {
                RetirementReason::KeptTooNew
            } else if age > max_age {
                RetirementReason::Terminated
            } else {
                RetirementReason::KeptRecentEnough
            };

            decisions.push(RetirementDecision {
                record: record.clone(),
                baseline_version: baseline.version,
                age_hours: age.num_hours(),
                reason,
            });
        }
    }

    decisions
}

/// Apply every terminate decision through the deletion capability.
///
/// Terminations are independent: a failed deletion downgrades that decision
/// to [`RetirementReason::TerminateFailed`] and processing continues. In dry
/// run the terminator is never invoked and decisions are left untouched.
pub async fn apply(
    decisions: &mut [RetirementDecision],
    terminator: &dyn GroupTerminator,
    dry_run: bool,
) {
    for decision in decisions.iter_mut().filter(|d| d.terminated()) {
        if dry_run {
            tracing::info!(
                name = %decision.record.name,
                version = decision.record.version,
                "DRY RUN: Would terminate cluster"
            );
            continue;
        }

        match terminator.force_delete(&decision.record.name).await {
            Ok(()) => {
                tracing::info!(
                    name = %decision.record.name,
                    version = decision.record.version,
                    baseline_version = decision.baseline_version,
                    age_hours = decision.age_hours,
                    "Terminated cluster"
                );
            }
            Err(e) => {
                tracing::error!(
                    name = %decision.record.name,
                    error = %e,
                    "Failed to terminate cluster"
                );
                decision.reason = RetirementReason::TerminateFailed;
            }
        }
    }
}
