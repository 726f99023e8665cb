//! End-to-end conformance runs over the built-in candidates.

use alloy_primitives::{Address, U256};
use tokencheck_adapter::{
    AdapterError, CandidateRegistry, MINIMAL, REFERENCE, ReferenceAdapter, SLOT, TokenAdapter,
};
use tokencheck_config::HarnessConfig;
use tokencheck_domain::{CallContext, CallOutcome, Deployment, PermitCall, ReturnValue, tokens};
use tokencheck_harness::{Aspect, DivergenceAllowList, Harness, MODEL, ScenarioEvent};

/// Defects injected into the reference token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    /// `approve` reports no `Approval` event.
    SilentApprovals,
    /// `totalSupply` reports one wei too many once a mint has succeeded.
    InflatedSupply,
    /// `totalSupply` returns a boolean instead of an integer.
    UndecodableSupply,
}

impl Fault {
    const fn id(self) -> &'static str {
        match self {
            Self::SilentApprovals => "silent-approvals",
            Self::InflatedSupply => "inflated-supply",
            Self::UndecodableSupply => "undecodable-supply",
        }
    }

    fn registry(self) -> CandidateRegistry {
        let mut registry = CandidateRegistry::with_defaults();
        registry
            .register(self.id(), move |deployment: &Deployment| -> Result<Box<dyn TokenAdapter>, AdapterError> {
                let inner = ReferenceAdapter::deploy(self.id(), deployment)?;
                Ok(Box::new(Faulty { inner, fault: self, minted: false }))
            })
            .expect("register");
        registry
    }

    fn config(self) -> HarnessConfig {
        HarnessConfig {
            candidates: vec![REFERENCE.to_string(), self.id().to_string()],
            ..Default::default()
        }
    }
}

#[derive(Debug)]
struct Faulty {
    inner: ReferenceAdapter,
    fault: Fault,
    minted: bool,
}

impl TokenAdapter for Faulty {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn address(&self) -> Address {
        self.inner.address()
    }

    fn transfer(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome {
        self.inner.transfer(ctx, to, amount)
    }

    fn approve(&mut self, ctx: &CallContext, spender: Address, amount: U256) -> CallOutcome {
        let mut outcome = self.inner.approve(ctx, spender, amount);
        if self.fault == Fault::SilentApprovals {
            outcome.events.clear();
        }
        outcome
    }

    fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: U256,
    ) -> CallOutcome {
        self.inner.transfer_from(ctx, from, to, amount)
    }

    fn permit(&mut self, ctx: &CallContext, permit: &PermitCall) -> CallOutcome {
        self.inner.permit(ctx, permit)
    }

    fn mint(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome {
        let outcome = self.inner.mint(ctx, to, amount);
        self.minted |= outcome.success;
        outcome
    }

    fn burn(&mut self, ctx: &CallContext, amount: U256) -> CallOutcome {
        self.inner.burn(ctx, amount)
    }

    fn balance_of(&mut self, ctx: &CallContext, account: Address) -> CallOutcome {
        self.inner.balance_of(ctx, account)
    }

    fn allowance(&mut self, ctx: &CallContext, owner: Address, spender: Address) -> CallOutcome {
        self.inner.allowance(ctx, owner, spender)
    }

    fn total_supply(&mut self, ctx: &CallContext) -> CallOutcome {
        let outcome = self.inner.total_supply(ctx);
        match (self.fault, outcome.uint()) {
            (Fault::InflatedSupply, Some(supply)) if self.minted => {
                CallOutcome::read(ReturnValue::Uint(supply + U256::from(1u64)))
            }
            (Fault::UndecodableSupply, _) => CallOutcome::read(ReturnValue::Bool(true)),
            _ => outcome,
        }
    }

    fn name(&mut self, ctx: &CallContext) -> CallOutcome {
        self.inner.name(ctx)
    }

    fn symbol(&mut self, ctx: &CallContext) -> CallOutcome {
        self.inner.symbol(ctx)
    }

    fn decimals(&mut self, ctx: &CallContext) -> CallOutcome {
        self.inner.decimals(ctx)
    }

    fn domain_separator(&mut self, ctx: &CallContext) -> CallOutcome {
        self.inner.domain_separator(ctx)
    }

    fn nonces(&mut self, ctx: &CallContext, owner: Address) -> CallOutcome {
        self.inner.nonces(ctx, owner)
    }
}

#[test]
fn builtin_candidates_conform() {
    let harness = Harness::new(HarnessConfig::default(), CandidateRegistry::with_defaults());
    let report = harness.run().expect("run");

    assert!(report.is_conformant(), "{report}");
    assert_eq!(report.candidates, vec![REFERENCE, MINIMAL, SLOT]);
    assert_eq!(report.baseline(), Some(REFERENCE));
    assert_eq!(report.traces.len(), 3);

    // minimal is tolerated against the model at the two guard steps and against the baseline
    // at every step touched by the extra zero-address supply.
    assert!(report.tolerated.iter().all(|t| t.candidate == MINIMAL));
    let against_model: Vec<_> =
        report.tolerated.iter().filter(|t| t.against == MODEL).map(|t| t.step.as_str()).collect();
    assert_eq!(against_model, vec!["transfer-to-zero-address", "mint-to-zero-address"]);
    let against_baseline: Vec<_> = report
        .tolerated
        .iter()
        .filter(|t| t.against == REFERENCE)
        .map(|t| t.step.as_str())
        .collect();
    assert_eq!(
        against_baseline,
        vec![
            "transfer-to-zero-address",
            "mint-to-zero-address",
            "read-supply-after-mint",
            "read-supply-after-burn",
            "probe-total-supply",
        ]
    );
}

#[test]
fn guarded_candidates_need_no_allowlist() {
    let config = HarnessConfig {
        candidates: vec![REFERENCE.to_string(), SLOT.to_string()],
        ..Default::default()
    };
    let report = Harness::new(config, CandidateRegistry::with_defaults())
        .with_allowlist(DivergenceAllowList::empty())
        .run()
        .expect("run");
    assert!(report.is_conformant(), "{report}");
    assert!(report.tolerated.is_empty());
}

#[test]
fn canonical_trace_values() {
    let report = Harness::new(HarnessConfig::default(), CandidateRegistry::with_defaults())
        .run()
        .expect("run");
    let trace = report.trace(SLOT).expect("slot trace");
    let value = |step: &str| trace.get(step).and_then(|record| record.observed.uint());

    assert_eq!(value("read-initial-supply"), Some(tokens(1000)));
    assert_eq!(value("read-holder-balance-after-transfer"), Some(tokens(1)));
    assert_eq!(value("read-holder-balance-after-transfer-from"), Some(U256::ZERO));
    assert_eq!(value("read-supply-after-mint"), Some(tokens(1001)));
    assert_eq!(value("read-supply-after-burn"), Some(tokens(1000)));
    assert_eq!(value("read-nonce-before-permit"), Some(U256::ZERO));
    assert_eq!(value("read-nonce-after-permit"), Some(U256::from(1u64)));
    assert_eq!(value("read-nonce-after-rejected-permits"), Some(U256::from(1u64)));
    assert_eq!(value("read-allowance-after-permit"), Some(tokens(1)));
    assert_eq!(value("read-unlimited-allowance"), Some(U256::MAX));

    for failing in [
        "transfer-exceeding-balance",
        "transfer-from-without-allowance",
        "transfer-to-zero-address",
        "mint-to-zero-address",
        "mint-overflow",
        "mint-unauthorized",
        "burn-exceeding-balance",
        "permit-expired",
        "permit-replay",
        "permit-wrong-spender",
    ] {
        assert!(!trace.get(failing).expect("record").observed.success, "{failing} should revert");
    }
}

#[test]
fn missing_approval_events_are_reported() {
    let fault = Fault::SilentApprovals;
    let report = Harness::new(fault.config(), fault.registry()).run().expect("run");

    assert!(!report.is_conformant());

    let violation = report
        .violations
        .iter()
        .find(|v| v.step == "approve-deployer")
        .expect("expectation violation at approve-deployer");
    assert_eq!(violation.candidate, fault.id());
    assert_eq!(violation.expected.events.len(), 1);
    assert!(violation.observed.events.is_empty());

    let mismatch = report
        .mismatches
        .iter()
        .find(|m| m.step == "approve-deployer")
        .expect("mismatch at approve-deployer");
    assert_eq!(mismatch.candidate, fault.id());
    assert_eq!(mismatch.baseline, REFERENCE);
    assert_eq!(mismatch.aspects, vec![Aspect::Events]);
    assert_eq!(mismatch.baseline_outcome.events.len(), 1);
    assert!(mismatch.observed.events.is_empty());

    let failing: Vec<_> = report.mismatches.iter().map(|m| m.step.as_str()).collect();
    assert_eq!(failing, vec!["approve-deployer", "approve-unlimited"]);
    assert!(report.supply_violations.is_empty());

    let rendered = report.to_string();
    assert!(rendered.contains("approve-deployer"));
    assert!(rendered.contains(fault.id()));
    assert!(rendered.contains("Approval("));
}

#[test]
fn inflated_supply_breaks_supply_invariant() {
    let fault = Fault::InflatedSupply;
    let report = Harness::new(fault.config(), fault.registry()).run().expect("run");

    assert!(!report.is_conformant());
    assert!(report.supply_violations.iter().all(|v| v.candidate == fault.id()));

    let first = report.supply_violations.first().expect("supply violation");
    assert_eq!(first.step, "mint-one-token");
    assert_eq!(first.total_supply, Some(tokens(1001) + U256::from(1u64)));
    assert_eq!(first.balance_sum, Some(tokens(1001)));

    // every later state change is checked again
    assert!(report.supply_violations.iter().any(|v| v.step == "burn-holder-balance"));
    assert!(report.to_string().contains("mint-one-token"));
}

#[test]
fn undecodable_supply_is_a_supply_violation() {
    let fault = Fault::UndecodableSupply;
    let report = Harness::new(fault.config(), fault.registry()).run().expect("run");

    assert!(!report.is_conformant());
    let first = report.supply_violations.first().expect("supply violation");
    assert_eq!(first.step, "transfer-one-token");
    assert_eq!(first.candidate, fault.id());
    assert_eq!(first.total_supply, None);
    assert_eq!(first.balance_sum, Some(tokens(1000)));
    assert!(report.to_string().contains("total supply unreadable"));
}

#[test]
fn drifted_shadow_model_is_reported() {
    // Tolerating the inflated read copies the extra wei into the shadow model.
    let fault = Fault::InflatedSupply;
    let allowlist =
        DivergenceAllowList::empty().with("read-supply-after-mint", fault.id(), "extra wei");
    let report = Harness::new(fault.config(), fault.registry())
        .with_allowlist(allowlist)
        .run()
        .expect("run");

    assert!(!report.is_conformant());
    let drifted = report
        .supply_violations
        .iter()
        .find(|v| v.candidate == MODEL)
        .expect("model supply violation");
    assert_eq!(drifted.step, "burn-exceeding-balance");
    assert_eq!(drifted.total_supply, Some(tokens(1001) + U256::from(1u64)));
    assert_eq!(drifted.balance_sum, Some(tokens(1001)));
}

#[test]
fn minimal_without_allowlist_fails_at_zero_address_steps() {
    let config = HarnessConfig {
        candidates: vec![REFERENCE.to_string(), MINIMAL.to_string()],
        ..Default::default()
    };
    let report = Harness::new(config, CandidateRegistry::with_defaults())
        .with_allowlist(DivergenceAllowList::empty())
        .run()
        .expect("run");
    assert!(!report.is_conformant());
    let steps: Vec<_> = report.violations.iter().map(|v| v.step.as_str()).collect();
    assert!(steps.starts_with(&["transfer-to-zero-address", "mint-to-zero-address"]));
    assert!(report.mismatches.iter().all(|m| m.candidate == MINIMAL));
}

#[test]
fn report_serializes_to_json() {
    let report = Harness::new(HarnessConfig::default(), CandidateRegistry::with_defaults())
        .run()
        .expect("run");
    let json: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("serialize")).expect("valid json");
    assert_eq!(json["candidates"][0], REFERENCE);
    assert_eq!(json["traces"][0]["records"][0]["step"], "read-name");
    assert_eq!(json["traces"][0]["records"][0]["observed"]["return_value"]["value"], "abc");
}

#[test]
fn progress_events_cover_every_step() {
    let config = HarnessConfig { candidates: vec![SLOT.to_string()], ..Default::default() };
    let harness = Harness::new(config, CandidateRegistry::with_defaults());
    let mut receiver = harness.subscribe();
    let report = harness.run().expect("run");
    let steps = report.traces[0].records.len();

    let mut completed = 0;
    let mut finished = None;
    while let Ok(Some(event)) = receiver.try_next() {
        match event {
            ScenarioEvent::StepCompleted { matched, .. } => {
                assert!(matched);
                completed += 1;
            }
            ScenarioEvent::CandidateFinished { candidate, steps, violations } => {
                finished = Some((candidate, steps, violations));
            }
        }
    }
    assert_eq!(completed, steps);
    assert_eq!(finished, Some((SLOT.to_string(), steps, 0)));
}
