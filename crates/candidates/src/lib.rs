//! Candidate token implementations exercised by the conformance harness.
#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/tokencheck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod env;
pub use env::Env;
pub(crate) use env::Journaled;

mod precompile;
pub use precompile::ecrecover;

pub mod minimal;
pub mod reference;
pub mod slot;
