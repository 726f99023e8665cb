//! Scenario driver and equivalence checker for candidate token ledgers.
#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/tokencheck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod allowlist;
pub use allowlist::{BUILTIN_DIVERGENCES, Divergence, DivergenceAllowList};

mod checker;
pub use checker::{Comparison, EquivalenceChecker};

mod driver;
pub use driver::{CandidateRun, Driver};

mod error;
pub use error::HarnessError;

mod harness;
pub use harness::Harness;

mod progress;
pub use progress::{ScenarioEvent, ScenarioEvents};

mod report;
pub use report::{
    Aspect, CandidateTrace, ConformanceReport, ExpectationViolation, MODEL, Mismatch, StepRecord,
    SupplyViolation, ToleratedDivergence,
};

mod scenario;
pub use scenario::{Accounts, Actor, OVERFLOW_MINT, Scenario, Step};
