//! Conformance report.

use std::fmt;

use alloy_primitives::U256;
use serde::Serialize;
use tokencheck_domain::{Call, CallOutcome};

use crate::Actor;

/// Source of the outcome a candidate is measured against.
pub const MODEL: &str = "model";

/// One executed step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Step id.
    pub step: String,
    /// Issuing actor.
    pub actor: Actor,
    /// The call.
    pub call: Call,
    /// Outcome predicted by the shadow model.
    pub expected: CallOutcome,
    /// Outcome reported by the candidate.
    pub observed: CallOutcome,
}

/// Everything one candidate did during a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateTrace {
    /// Candidate id.
    pub candidate: String,
    /// Steps in execution order.
    pub records: Vec<StepRecord>,
}

impl CandidateTrace {
    /// An empty trace.
    pub fn new(candidate: impl Into<String>) -> Self {
        Self { candidate: candidate.into(), records: Vec::new() }
    }

    /// The record for `step`, if it ran.
    pub fn get(&self, step: &str) -> Option<&StepRecord> {
        self.records.iter().find(|record| record.step == step)
    }
}

/// A candidate disagreed with its shadow model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpectationViolation {
    /// Step id.
    pub step: String,
    /// Candidate id.
    pub candidate: String,
    /// What the model predicted.
    pub expected: CallOutcome,
    /// What the candidate did.
    pub observed: CallOutcome,
}

impl fmt::Display for ExpectationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} on {}: expected {}, observed {}",
            self.step, self.candidate, self.expected, self.observed
        )
    }
}

/// A candidate's balances stopped adding up to its total supply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SupplyViolation {
    /// Step after which the check ran.
    pub step: String,
    /// Candidate id.
    pub candidate: String,
    /// Reported total supply, if the read succeeded.
    pub total_supply: Option<U256>,
    /// Sum of the watched balances, if every read succeeded without overflow.
    pub balance_sum: Option<U256>,
}

impl fmt::Display for SupplyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |value: Option<U256>| value.map_or_else(|| "unreadable".to_string(), |v| v.to_string());
        write!(
            f,
            "step {} on {}: total supply {}, balances sum to {}",
            self.step,
            self.candidate,
            show(self.total_supply),
            show(self.balance_sum)
        )
    }
}

/// Part of an outcome that differs between two observations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    /// Success flag.
    Success,
    /// Returned value.
    ReturnValue,
    /// Emitted events.
    Events,
    /// Revert kind.
    RevertKind,
}

impl Aspect {
    /// The aspects in which `left` and `right` differ.
    pub fn diff(left: &CallOutcome, right: &CallOutcome) -> Vec<Self> {
        let mut aspects = Vec::new();
        if left.success != right.success {
            aspects.push(Self::Success);
        }
        if left.return_value != right.return_value {
            aspects.push(Self::ReturnValue);
        }
        if left.events != right.events {
            aspects.push(Self::Events);
        }
        if left.reverted_with != right.reverted_with {
            aspects.push(Self::RevertKind);
        }
        aspects
    }
}

/// A candidate disagreed with the baseline candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Step id.
    pub step: String,
    /// Candidate id.
    pub candidate: String,
    /// Baseline candidate id.
    pub baseline: String,
    /// What the baseline did.
    pub baseline_outcome: CallOutcome,
    /// What the candidate did.
    pub observed: CallOutcome,
    /// Which parts differ.
    pub aspects: Vec<Aspect>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} on {}: {} observed {}, {} observed {} ({:?})",
            self.step,
            self.candidate,
            self.baseline,
            self.baseline_outcome,
            self.candidate,
            self.observed,
            self.aspects
        )
    }
}

/// A difference covered by the allow-list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToleratedDivergence {
    /// Step id.
    pub step: String,
    /// Candidate id.
    pub candidate: String,
    /// `model` or the baseline candidate id.
    pub against: String,
    /// Allow-list reason.
    pub reason: String,
    /// Outcome the candidate was measured against.
    pub expected: CallOutcome,
    /// What the candidate did.
    pub observed: CallOutcome,
}

/// Result of one conformance run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    /// Candidate ids in run order; the first is the baseline.
    pub candidates: Vec<String>,
    /// Candidate versus shadow model failures.
    pub violations: Vec<ExpectationViolation>,
    /// Supply invariant failures.
    pub supply_violations: Vec<SupplyViolation>,
    /// Candidate versus baseline failures.
    pub mismatches: Vec<Mismatch>,
    /// Allow-listed differences.
    pub tolerated: Vec<ToleratedDivergence>,
    /// Per-candidate traces.
    pub traces: Vec<CandidateTrace>,
}

impl ConformanceReport {
    /// The baseline candidate id.
    pub fn baseline(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }

    /// Whether every candidate conformed.
    pub fn is_conformant(&self) -> bool {
        self.failure_count() == 0
    }

    /// Total number of failures.
    pub fn failure_count(&self) -> usize {
        self.violations.len() + self.supply_violations.len() + self.mismatches.len()
    }

    /// The trace of `candidate`.
    pub fn trace(&self, candidate: &str) -> Option<&CandidateTrace> {
        self.traces.iter().find(|trace| trace.candidate == candidate)
    }

    /// Render the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps = self.traces.first().map_or(0, |trace| trace.records.len());
        writeln!(
            f,
            "{} candidates, {} steps, baseline {}",
            self.candidates.len(),
            steps,
            self.baseline().unwrap_or("-")
        )?;
        for violation in &self.violations {
            writeln!(f, "  FAIL expectation {violation}")?;
        }
        for violation in &self.supply_violations {
            writeln!(f, "  FAIL supply {violation}")?;
        }
        for mismatch in &self.mismatches {
            writeln!(f, "  FAIL mismatch {mismatch}")?;
        }
        for tolerated in &self.tolerated {
            writeln!(
                f,
                "  allowed step {} on {} vs {}: {}",
                tolerated.step, tolerated.candidate, tolerated.against, tolerated.reason
            )?;
        }
        if self.is_conformant() {
            write!(f, "conformant")
        } else {
            write!(f, "{} failures", self.failure_count())
        }
    }
}

#[cfg(test)]
mod tests {
    use tokencheck_domain::{ReturnValue, RevertKind};

    use super::*;

    fn mismatch() -> Mismatch {
        let baseline_outcome = CallOutcome::reverted(RevertKind::ZeroAddressRecipient);
        let observed = CallOutcome::read(ReturnValue::Bool(true));
        Mismatch {
            step: "transfer-to-zero-address".to_string(),
            candidate: "minimal".to_string(),
            baseline: "reference".to_string(),
            aspects: Aspect::diff(&baseline_outcome, &observed),
            baseline_outcome,
            observed,
        }
    }

    #[test]
    fn aspect_diff_lists_every_difference() {
        let m = mismatch();
        assert_eq!(m.aspects, vec![Aspect::Success, Aspect::ReturnValue, Aspect::RevertKind]);
        assert!(Aspect::diff(&m.observed, &m.observed).is_empty());
    }

    #[test]
    fn mismatch_display_names_both_observations() {
        let rendered = mismatch().to_string();
        assert!(rendered.contains("transfer-to-zero-address"));
        assert!(rendered.contains("minimal"));
        assert!(rendered.contains("reverted with ZeroAddressRecipient"));
        assert!(rendered.contains("ok -> true"));
    }

    #[test]
    fn supply_violation_display() {
        let violation = SupplyViolation {
            step: "burn-holder-balance".to_string(),
            candidate: "slot".to_string(),
            total_supply: Some(U256::from(5u64)),
            balance_sum: None,
        };
        assert_eq!(
            violation.to_string(),
            "step burn-holder-balance on slot: total supply 5, balances sum to unreadable"
        );
    }

    #[test]
    fn empty_report_is_conformant() {
        let report = ConformanceReport::default();
        assert!(report.is_conformant());
        assert_eq!(report.baseline(), None);
        assert!(report.to_string().ends_with("conformant"));
    }

    #[test]
    fn mismatch_makes_report_fail() {
        let report = ConformanceReport {
            candidates: vec!["reference".to_string(), "minimal".to_string()],
            mismatches: vec![mismatch()],
            ..Default::default()
        };
        assert!(!report.is_conformant());
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.baseline(), Some("reference"));
        let json = report.to_json().expect("serialize");
        assert!(json.contains("\"aspects\""));
        assert!(json.contains("\"return_value\""));
    }
}
