//! Cross-candidate equivalence checking.

use tracing::{debug, warn};

use crate::{Aspect, CandidateTrace, DivergenceAllowList, Mismatch, ToleratedDivergence};

/// Result of comparing traces against the baseline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comparison {
    /// Differences not covered by the allow-list.
    pub mismatches: Vec<Mismatch>,
    /// Differences covered by the allow-list.
    pub tolerated: Vec<ToleratedDivergence>,
}

/// Compares candidate traces step by step.
#[derive(Debug, Clone, Copy)]
pub struct EquivalenceChecker<'a> {
    allowlist: &'a DivergenceAllowList,
}

impl<'a> EquivalenceChecker<'a> {
    /// Create a checker honouring `allowlist`.
    pub const fn new(allowlist: &'a DivergenceAllowList) -> Self {
        Self { allowlist }
    }

    /// Compare every trace after the first with the first.
    pub fn check(&self, traces: &[CandidateTrace]) -> Comparison {
        let mut comparison = Comparison::default();
        let Some((baseline, rest)) = traces.split_first() else {
            return comparison;
        };
        for candidate in rest {
            self.compare_into(baseline, candidate, &mut comparison);
        }
        comparison
    }

    /// Compare one candidate trace with the baseline trace.
    ///
    /// A difference is tolerated when the allow-list covers the step for either candidate.
    pub fn compare(&self, baseline: &CandidateTrace, candidate: &CandidateTrace) -> Comparison {
        let mut comparison = Comparison::default();
        self.compare_into(baseline, candidate, &mut comparison);
        comparison
    }

    fn compare_into(
        &self,
        baseline: &CandidateTrace,
        candidate: &CandidateTrace,
        comparison: &mut Comparison,
    ) {
        for expected in &baseline.records {
            let Some(observed) = candidate.get(&expected.step) else {
                warn!(candidate = %candidate.candidate, step = %expected.step, "step missing from trace");
                continue;
            };
            let aspects = Aspect::diff(&expected.observed, &observed.observed);
            if aspects.is_empty() {
                continue;
            }

            let entry = self
                .allowlist
                .allows(&expected.step, &candidate.candidate)
                .or_else(|| self.allowlist.allows(&expected.step, &baseline.candidate));
            if let Some(entry) = entry {
                debug!(
                    candidate = %candidate.candidate,
                    baseline = %baseline.candidate,
                    step = %expected.step,
                    "tolerated divergence from baseline"
                );
                comparison.tolerated.push(ToleratedDivergence {
                    step: expected.step.clone(),
                    candidate: candidate.candidate.clone(),
                    against: baseline.candidate.clone(),
                    reason: entry.reason.clone(),
                    expected: expected.observed.clone(),
                    observed: observed.observed.clone(),
                });
            } else {
                warn!(
                    candidate = %candidate.candidate,
                    baseline = %baseline.candidate,
                    step = %expected.step,
                    ?aspects,
                    "candidate diverged from baseline"
                );
                comparison.mismatches.push(Mismatch {
                    step: expected.step.clone(),
                    candidate: candidate.candidate.clone(),
                    baseline: baseline.candidate.clone(),
                    baseline_outcome: expected.observed.clone(),
                    observed: observed.observed.clone(),
                    aspects,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};
    use rstest::rstest;
    use tokencheck_domain::{Call, CallOutcome, ReturnValue, RevertKind, TokenEvent};

    use super::*;
    use crate::{Actor, StepRecord};

    fn record(step: &str, observed: CallOutcome) -> StepRecord {
        StepRecord {
            step: step.to_string(),
            actor: Actor::Deployer,
            call: Call::TotalSupply,
            expected: observed.clone(),
            observed,
        }
    }

    fn trace(candidate: &str, outcomes: &[(&str, CallOutcome)]) -> CandidateTrace {
        CandidateTrace {
            candidate: candidate.to_string(),
            records: outcomes.iter().map(|(step, outcome)| record(step, outcome.clone())).collect(),
        }
    }

    fn uint(value: u64) -> CallOutcome {
        CallOutcome::read(ReturnValue::Uint(U256::from(value)))
    }

    fn transfer_event(emitter: u8) -> CallOutcome {
        let event = TokenEvent::transfer(
            Address::repeat_byte(emitter),
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            U256::from(1u64),
        );
        CallOutcome::returned(ReturnValue::Bool(true), vec![event])
    }

    #[rstest]
    #[case(uint(1), uint(2), vec![Aspect::ReturnValue])]
    #[case(transfer_event(0xAA), transfer_event(0xBB), vec![Aspect::Events])]
    #[case(
        CallOutcome::reverted(RevertKind::Expired),
        CallOutcome::reverted(RevertKind::InvalidSignature),
        vec![Aspect::RevertKind]
    )]
    #[case(
        CallOutcome::reverted(RevertKind::ZeroAddressRecipient),
        transfer_event(0xAA),
        vec![Aspect::Success, Aspect::ReturnValue, Aspect::Events, Aspect::RevertKind]
    )]
    fn detects_each_aspect(
        #[case] baseline: CallOutcome,
        #[case] observed: CallOutcome,
        #[case] aspects: Vec<Aspect>,
    ) {
        let allowlist = DivergenceAllowList::empty();
        let checker = EquivalenceChecker::new(&allowlist);
        let comparison = checker.compare(
            &trace("reference", &[("step", baseline.clone())]),
            &trace("slot", &[("step", observed.clone())]),
        );
        assert_eq!(
            comparison.mismatches,
            vec![Mismatch {
                step: "step".to_string(),
                candidate: "slot".to_string(),
                baseline: "reference".to_string(),
                baseline_outcome: baseline,
                observed,
                aspects,
            }]
        );
        assert!(comparison.tolerated.is_empty());
    }

    #[test]
    fn identical_traces_agree() {
        let allowlist = DivergenceAllowList::empty();
        let outcomes = [("read-name", uint(1)), ("transfer-one-token", transfer_event(0xAA))];
        let comparison = EquivalenceChecker::new(&allowlist)
            .check(&[trace("reference", &outcomes), trace("minimal", &outcomes), trace("slot", &outcomes)]);
        assert_eq!(comparison, Comparison::default());
    }

    #[test]
    fn allowlisted_candidate_is_tolerated() {
        let allowlist = DivergenceAllowList::empty().with("transfer-to-zero-address", "minimal", "no guard");
        let comparison = EquivalenceChecker::new(&allowlist).check(&[
            trace("reference", &[("transfer-to-zero-address", CallOutcome::reverted(RevertKind::ZeroAddressRecipient))]),
            trace("minimal", &[("transfer-to-zero-address", transfer_event(0xAA))]),
        ]);
        assert!(comparison.mismatches.is_empty());
        assert_eq!(comparison.tolerated.len(), 1);
        assert_eq!(comparison.tolerated[0].against, "reference");
        assert_eq!(comparison.tolerated[0].reason, "no guard");
    }

    #[test]
    fn allowlisted_baseline_covers_other_candidates() {
        let allowlist = DivergenceAllowList::empty().with("transfer-to-zero-address", "minimal", "no guard");
        let comparison = EquivalenceChecker::new(&allowlist).check(&[
            trace("minimal", &[("transfer-to-zero-address", transfer_event(0xAA))]),
            trace("slot", &[("transfer-to-zero-address", CallOutcome::reverted(RevertKind::ZeroAddressRecipient))]),
        ]);
        assert!(comparison.mismatches.is_empty());
        assert_eq!(comparison.tolerated[0].candidate, "slot");
    }

    #[test]
    fn allowlist_is_step_scoped() {
        let allowlist = DivergenceAllowList::empty().with("transfer-to-zero-address", "minimal", "no guard");
        let comparison = EquivalenceChecker::new(&allowlist).check(&[
            trace("reference", &[("read-supply-after-burn", uint(1))]),
            trace("minimal", &[("read-supply-after-burn", uint(2))]),
        ]);
        assert_eq!(comparison.mismatches.len(), 1);
    }

    #[test]
    fn single_trace_has_nothing_to_compare() {
        let allowlist = DivergenceAllowList::empty();
        let comparison = EquivalenceChecker::new(&allowlist).check(&[trace("reference", &[("s", uint(1))])]);
        assert_eq!(comparison, Comparison::default());
    }
}
