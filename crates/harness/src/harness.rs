//! End-to-end conformance runs.

use alloy_primitives::B256;
use futures::channel::mpsc::UnboundedReceiver;
use tokencheck_adapter::{AdapterError, CandidateRegistry};
use tokencheck_config::HarnessConfig;
use tokencheck_model::LedgerModel;
use tokencheck_signer::PermitSigner;
use tracing::info;

use crate::{
    ConformanceReport, DivergenceAllowList, Driver, EquivalenceChecker, HarnessError, Scenario,
    ScenarioEvent, ScenarioEvents,
};

/// Runs the canonical scenario over a set of candidates and checks them.
#[derive(Debug)]
pub struct Harness {
    config: HarnessConfig,
    registry: CandidateRegistry,
    allowlist: Option<DivergenceAllowList>,
    events: ScenarioEvents,
}

impl Harness {
    /// Create a harness for the candidates in `registry`.
    pub fn new(config: HarnessConfig, registry: CandidateRegistry) -> Self {
        Self { config, registry, allowlist: None, events: ScenarioEvents::new() }
    }

    /// Use `allowlist` instead of the configured or built-in one.
    #[must_use]
    pub fn with_allowlist(mut self, allowlist: DivergenceAllowList) -> Self {
        self.allowlist = Some(allowlist);
        self
    }

    /// Subscribe to progress events of subsequent runs.
    pub fn subscribe(&self) -> UnboundedReceiver<ScenarioEvent> {
        self.events.subscribe()
    }

    /// The configuration this harness runs with.
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Candidate ids selected by the configuration, in registration order.
    pub fn selected(&self) -> Result<Vec<String>, HarnessError> {
        if let Some(unknown) = self.config.candidates.iter().find(|id| !self.registry.contains(id)) {
            return Err(AdapterError::UnknownCandidate(unknown.clone()).into());
        }
        let selected: Vec<String> = self
            .registry
            .ids()
            .filter(|id| {
                self.config.candidates.is_empty() || self.config.candidates.iter().any(|c| c == *id)
            })
            .map(str::to_string)
            .collect();
        if selected.is_empty() {
            return Err(HarnessError::NoCandidates);
        }
        Ok(selected)
    }

    /// The allow-list in effect.
    pub fn allowlist(&self) -> Result<DivergenceAllowList, HarnessError> {
        match (&self.allowlist, &self.config.allowlist) {
            (Some(allowlist), _) => Ok(allowlist.clone()),
            (None, Some(path)) => DivergenceAllowList::load(path),
            (None, None) => DivergenceAllowList::builtin(),
        }
    }

    /// Build the canonical scenario for the configured actors.
    pub fn scenario(&self) -> Result<Scenario, HarnessError> {
        let deployer = signer("deployer", &self.config.deployer_key)?;
        let holder = signer("holder", &self.config.holder_key)?.address();
        let outsider = signer("outsider", &self.config.outsider_key)?.address();
        let deployment = self.config.deployment(deployer.address());
        Scenario::canonical(&deployment, &deployer, holder, outsider, self.config.timestamp)
            .map_err(|source| HarnessError::InvalidKey { actor: "deployer", source })
    }

    /// Deploy every selected candidate, run the scenario and compare the traces.
    pub fn run(&self) -> Result<ConformanceReport, HarnessError> {
        self.config.validate()?;
        let candidates = self.selected()?;
        let allowlist = self.allowlist()?;
        let scenario = self.scenario()?;
        let deployment = self.config.deployment(scenario.accounts().deployer);
        info!(
            candidates = ?candidates,
            steps = scenario.len(),
            ledger = %deployment.address,
            chain_id = deployment.chain_id,
            "starting conformance run"
        );

        let driver = Driver::new(&scenario, &allowlist, self.events.clone());
        let mut report = ConformanceReport { candidates: candidates.clone(), ..Default::default() };
        for id in &candidates {
            let mut adapter = self.registry.build(id, &deployment)?;
            let run = driver.run(adapter.as_mut(), LedgerModel::new(&deployment));
            report.violations.extend(run.violations);
            report.supply_violations.extend(run.supply_violations);
            report.tolerated.extend(run.tolerated);
            report.traces.push(run.trace);
        }

        let comparison = EquivalenceChecker::new(&allowlist).check(&report.traces);
        report.mismatches = comparison.mismatches;
        report.tolerated.extend(comparison.tolerated);

        info!(
            conformant = report.is_conformant(),
            failures = report.failure_count(),
            tolerated = report.tolerated.len(),
            "conformance run finished"
        );
        Ok(report)
    }
}

fn signer(actor: &'static str, key: &B256) -> Result<PermitSigner, HarnessError> {
    PermitSigner::from_bytes(key).map_err(|source| HarnessError::InvalidKey { actor, source })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use tokencheck_adapter::{MINIMAL, REFERENCE, SLOT};
    use tokencheck_config::ConfigError;

    use super::*;

    #[test]
    fn selects_every_candidate_by_default() {
        let harness = Harness::new(HarnessConfig::default(), CandidateRegistry::with_defaults());
        assert_eq!(harness.selected().expect("selected"), vec![REFERENCE, MINIMAL, SLOT]);
    }

    #[test]
    fn selection_keeps_registration_order() {
        let config = HarnessConfig {
            candidates: vec![SLOT.to_string(), REFERENCE.to_string()],
            ..Default::default()
        };
        let harness = Harness::new(config, CandidateRegistry::with_defaults());
        assert_eq!(harness.selected().expect("selected"), vec![REFERENCE, SLOT]);
    }

    #[test]
    fn unknown_candidate_is_rejected() {
        let config = HarnessConfig { candidates: vec!["vyper".to_string()], ..Default::default() };
        let err = Harness::new(config, CandidateRegistry::with_defaults()).run().unwrap_err();
        assert!(matches!(err, HarnessError::Adapter(AdapterError::UnknownCandidate(ref id)) if id == "vyper"));
    }

    #[test]
    fn empty_registry_is_rejected() {
        let err = Harness::new(HarnessConfig::default(), CandidateRegistry::new()).run().unwrap_err();
        assert!(matches!(err, HarnessError::NoCandidates));
    }

    #[test]
    fn zero_key_is_rejected() {
        let config = HarnessConfig { holder_key: B256::ZERO, ..Default::default() };
        let err = Harness::new(config, CandidateRegistry::with_defaults()).run().unwrap_err();
        assert!(matches!(err, HarnessError::InvalidKey { actor: "holder", .. }));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let config = HarnessConfig {
            holder_key: tokencheck_config::DEFAULT_DEPLOYER_KEY,
            ..Default::default()
        };
        let err = Harness::new(config, CandidateRegistry::with_defaults()).run().unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }

    #[test]
    fn zero_timestamp_is_rejected_before_running() {
        let config = HarnessConfig { timestamp: 0, ..Default::default() };
        let err = Harness::new(config, CandidateRegistry::with_defaults()).run().unwrap_err();
        assert!(matches!(err, HarnessError::Config(ConfigError::ZeroTimestamp)));
    }

    #[test]
    fn empty_initial_supply_is_rejected_before_running() {
        let config = HarnessConfig {
            initial_supply: 0,
            candidates: vec![REFERENCE.to_string()],
            ..Default::default()
        };
        let err = Harness::new(config, CandidateRegistry::with_defaults()).run().unwrap_err();
        assert!(matches!(err, HarnessError::Config(ConfigError::EmptyInitialSupply)));
    }

    #[test]
    fn explicit_allowlist_wins() {
        let harness = Harness::new(HarnessConfig::default(), CandidateRegistry::with_defaults())
            .with_allowlist(DivergenceAllowList::empty());
        assert!(harness.allowlist().expect("allowlist").is_empty());
    }

    #[test]
    fn default_actor_addresses() {
        let harness = Harness::new(HarnessConfig::default(), CandidateRegistry::with_defaults());
        let scenario = harness.scenario().expect("scenario");
        let accounts = scenario.accounts();
        assert_eq!(accounts.deployer, address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert_eq!(accounts.holder, address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"));
        assert_eq!(accounts.outsider, address!("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"));
    }
}
