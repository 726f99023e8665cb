//! Runs a scenario against one candidate and its shadow model.

use alloy_primitives::{Address, U256};
use tokencheck_adapter::TokenAdapter;
use tokencheck_domain::CallContext;
use tokencheck_model::{InvariantViolation, LedgerModel};
use tracing::{debug, info, trace, warn};

use crate::{
    CandidateTrace, DivergenceAllowList, ExpectationViolation, MODEL, Scenario, ScenarioEvent,
    ScenarioEvents, Step, StepRecord, SupplyViolation, ToleratedDivergence,
};

/// What one candidate produced over a scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateRun {
    /// Per-step records.
    pub trace: CandidateTrace,
    /// Steps where the candidate disagreed with the model.
    pub violations: Vec<ExpectationViolation>,
    /// Steps after which the supply invariant failed, on the candidate or on its shadow model.
    pub supply_violations: Vec<SupplyViolation>,
    /// Allow-listed disagreements with the model.
    pub tolerated: Vec<ToleratedDivergence>,
}

/// Drives candidates through a scenario.
#[derive(Debug)]
pub struct Driver<'a> {
    scenario: &'a Scenario,
    allowlist: &'a DivergenceAllowList,
    events: ScenarioEvents,
}

impl<'a> Driver<'a> {
    /// Create a driver publishing progress to `events`.
    pub const fn new(
        scenario: &'a Scenario,
        allowlist: &'a DivergenceAllowList,
        events: ScenarioEvents,
    ) -> Self {
        Self { scenario, allowlist, events }
    }

    /// Run every step on `adapter`, predicting each outcome with `model`.
    ///
    /// `model` must be freshly built from the same deployment as `adapter`.
    pub fn run(&self, adapter: &mut dyn TokenAdapter, mut model: LedgerModel) -> CandidateRun {
        let candidate = adapter.id().to_string();
        info!(%candidate, address = %adapter.address(), steps = self.scenario.len(), "running scenario");

        let mut run = CandidateRun {
            trace: CandidateTrace::new(candidate.clone()),
            violations: Vec::new(),
            supply_violations: Vec::new(),
            tolerated: Vec::new(),
        };

        for step in self.scenario.steps() {
            let ctx = self.scenario.context(step.actor);
            let expected = model.execute(&ctx, &step.call);
            let observed = adapter.dispatch(&ctx, &step.call);
            let matched = expected == observed;
            trace!(%candidate, step = %step.id, call = %step.call, %observed, "step executed");

            if !matched {
                if let Some(entry) = self.allowlist.allows(&step.id, &candidate) {
                    debug!(%candidate, step = %step.id, reason = %entry.reason, "tolerated divergence from model");
                    run.tolerated.push(ToleratedDivergence {
                        step: step.id.clone(),
                        candidate: candidate.clone(),
                        against: MODEL.to_string(),
                        reason: entry.reason.clone(),
                        expected: expected.clone(),
                        observed: observed.clone(),
                    });
                    self.resync(adapter, &mut model, &ctx);
                } else {
                    warn!(%candidate, step = %step.id, %expected, %observed, "candidate diverged from model");
                    run.violations.push(ExpectationViolation {
                        step: step.id.clone(),
                        candidate: candidate.clone(),
                        expected: expected.clone(),
                        observed: observed.clone(),
                    });
                }
            }

            if step.call.is_mutating() {
                if let Some(violation) = self.check_supply(adapter, &ctx, step) {
                    warn!(%candidate, step = %step.id, "supply invariant violated");
                    run.supply_violations.push(violation);
                }
                if let Err(err) = model.check_invariants() {
                    warn!(%candidate, step = %step.id, error = %err, "shadow model invariant violated");
                    run.supply_violations.push(model_violation(step, &model, &err));
                }
            }

            self.events.publish(ScenarioEvent::StepCompleted {
                candidate: candidate.clone(),
                step: step.id.clone(),
                outcome: observed.clone(),
                matched,
            });
            run.trace.records.push(StepRecord {
                step: step.id.clone(),
                actor: step.actor,
                call: step.call.clone(),
                expected,
                observed,
            });
        }

        info!(
            %candidate,
            violations = run.violations.len(),
            supply_violations = run.supply_violations.len(),
            tolerated = run.tolerated.len(),
            "scenario finished"
        );
        self.events.publish(ScenarioEvent::CandidateFinished {
            candidate,
            steps: run.trace.records.len(),
            violations: run.violations.len() + run.supply_violations.len(),
        });
        run
    }

    fn check_supply(
        &self,
        adapter: &mut dyn TokenAdapter,
        ctx: &CallContext,
        step: &Step,
    ) -> Option<SupplyViolation> {
        let total_supply = adapter.total_supply(ctx).uint();
        let balance_sum = self.read_balances(adapter, ctx).and_then(|balances| {
            balances.iter().try_fold(U256::ZERO, |sum, (_, balance)| sum.checked_add(*balance))
        });
        match (total_supply, balance_sum) {
            (Some(supply), Some(sum)) if supply == sum => None,
            _ => Some(SupplyViolation {
                step: step.id.clone(),
                candidate: adapter.id().to_string(),
                total_supply,
                balance_sum,
            }),
        }
    }

    // Overwrite the model's balances and supply with what the candidate reports.
    fn resync(&self, adapter: &mut dyn TokenAdapter, model: &mut LedgerModel, ctx: &CallContext) {
        let (Some(balances), Some(supply)) =
            (self.read_balances(adapter, ctx), adapter.total_supply(ctx).uint())
        else {
            warn!(candidate = %adapter.id(), "could not read candidate state to resync model");
            return;
        };
        debug!(candidate = %adapter.id(), %supply, "resynced shadow model");
        model.reconcile(&balances, supply);
    }

    fn read_balances(
        &self,
        adapter: &mut dyn TokenAdapter,
        ctx: &CallContext,
    ) -> Option<Vec<(Address, U256)>> {
        self.scenario
            .accounts()
            .watched()
            .into_iter()
            .map(|account| adapter.balance_of(ctx, account).uint().map(|balance| (account, balance)))
            .collect()
    }
}

// The shadow model only drifts when a resync copied inconsistent candidate state into it.
fn model_violation(step: &Step, model: &LedgerModel, err: &InvariantViolation) -> SupplyViolation {
    let (total_supply, balance_sum) = match *err {
        InvariantViolation::SupplyMismatch { sum, supply } => (Some(supply), Some(sum)),
        InvariantViolation::BalanceSumOverflow => (Some(model.total_supply()), None),
    };
    SupplyViolation { step: step.id.clone(), candidate: MODEL.to_string(), total_supply, balance_sum }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use tokencheck_adapter::{CandidateRegistry, MINIMAL, REFERENCE};
    use tokencheck_domain::{Deployment, tokens};
    use tokencheck_signer::PermitSigner;

    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn setup() -> (Deployment, Scenario) {
        let signer = PermitSigner::from_bytes(&B256::with_last_byte(1)).expect("valid key");
        let deployment = Deployment::from_owner(signer.address(), "abc", "ABC", 1, tokens(1000));
        let scenario = Scenario::canonical(
            &deployment,
            &signer,
            Address::repeat_byte(0xB0),
            Address::repeat_byte(0xC0),
            NOW,
        )
        .expect("scenario");
        (deployment, scenario)
    }

    fn run(id: &str, allowlist: &DivergenceAllowList) -> CandidateRun {
        let (deployment, scenario) = setup();
        let mut adapter = CandidateRegistry::with_defaults().build(id, &deployment).expect("build");
        let driver = Driver::new(&scenario, allowlist, ScenarioEvents::new());
        driver.run(adapter.as_mut(), LedgerModel::new(&deployment))
    }

    #[test]
    fn reference_matches_model_everywhere() {
        let run = run(REFERENCE, &DivergenceAllowList::empty());
        assert!(run.violations.is_empty(), "{:?}", run.violations);
        assert!(run.supply_violations.is_empty());
        assert!(run.tolerated.is_empty());
        assert!(run.trace.records.iter().all(|record| record.expected == record.observed));
    }

    #[test]
    fn minimal_without_allowlist_violates_zero_address_steps() {
        let run = run(MINIMAL, &DivergenceAllowList::empty());
        let steps: Vec<_> = run.violations.iter().map(|v| v.step.as_str()).collect();
        assert!(steps.contains(&"transfer-to-zero-address"));
        assert!(steps.contains(&"mint-to-zero-address"));
        // zero address counts toward the sum, so supply still balances
        assert!(run.supply_violations.is_empty());
    }

    #[test]
    fn minimal_with_builtin_allowlist_resyncs_model() {
        let allowlist = DivergenceAllowList::builtin().expect("builtin");
        let run = run(MINIMAL, &allowlist);
        assert!(run.violations.is_empty(), "{:?}", run.violations);
        let tolerated: Vec<_> = run.tolerated.iter().map(|t| t.step.as_str()).collect();
        assert_eq!(tolerated, vec!["transfer-to-zero-address", "mint-to-zero-address"]);
        let supply = run.trace.get("read-supply-after-mint").expect("record");
        assert_eq!(supply.observed.uint(), Some(tokens(1002)));
        assert_eq!(supply.expected, supply.observed);
    }

    #[test]
    fn drifted_model_is_reported_against_model() {
        let (deployment, scenario) = setup();
        let mut model = LedgerModel::new(&deployment);
        model.reconcile(&[], tokens(1000) + U256::from(1u64));
        let err = model.check_invariants().unwrap_err();

        let step = scenario.step("mint-one-token").expect("step");
        let violation = model_violation(step, &model, &err);
        assert_eq!(violation.step, "mint-one-token");
        assert_eq!(violation.candidate, MODEL);
        assert_eq!(violation.total_supply, Some(tokens(1000) + U256::from(1u64)));
        assert_eq!(violation.balance_sum, Some(tokens(1000)));
    }

    #[test]
    fn publishes_progress() {
        let (deployment, scenario) = setup();
        let events = ScenarioEvents::new();
        let mut receiver = events.subscribe();
        let mut adapter = CandidateRegistry::with_defaults().build(REFERENCE, &deployment).expect("build");
        let allowlist = DivergenceAllowList::empty();
        Driver::new(&scenario, &allowlist, events).run(adapter.as_mut(), LedgerModel::new(&deployment));

        let first = receiver.try_next().expect("channel open").expect("event");
        assert!(matches!(first, ScenarioEvent::StepCompleted { ref step, matched: true, .. } if step == "read-name"));
        let mut last = first;
        while let Ok(Some(event)) = receiver.try_next() {
            last = event;
        }
        assert_eq!(
            last,
            ScenarioEvent::CandidateFinished {
                candidate: REFERENCE.to_string(),
                steps: scenario.len(),
                violations: 0,
            }
        );
    }
}
