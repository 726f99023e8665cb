//! Adapters translating candidate token implementations into a common interface.
#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/tokencheck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
pub use error::AdapterError;

mod minimal;
pub use minimal::MinimalAdapter;

mod reference;
pub use reference::ReferenceAdapter;

mod registry;
pub use registry::{AdapterFactory, CandidateRegistry, MINIMAL, REFERENCE, SLOT};

mod slot;
pub use slot::SlotAdapter;

mod traits;
pub use traits::TokenAdapter;
