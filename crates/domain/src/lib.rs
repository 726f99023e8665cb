//! Core domain types shared across tokencheck crates.
#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/tokencheck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod call;
pub use call::{Call, CallContext, PermitCall};

mod deployment;
pub use deployment::Deployment;

mod event;
pub use event::{APPROVAL_EVENT_SIGNATURE, EventKind, TRANSFER_EVENT_SIGNATURE, TokenEvent};

mod outcome;
pub use outcome::{CallOutcome, ReturnValue};

mod revert;
pub use revert::RevertKind;

mod signature;
pub use signature::Signature;

mod units;
pub use units::{DECIMALS, ONE_TOKEN, tokens};
