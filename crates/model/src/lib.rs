//! Reference ledger model used as the conformance oracle.
#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/tokencheck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
pub use error::{InvariantViolation, LedgerError};

mod execute;

mod ledger;
pub use ledger::LedgerModel;
