//! EIP-712 typed-data hashing and permit signing.
#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/tokencheck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod domain;
pub use domain::{DOMAIN_TYPEHASH, Eip712Domain, PERMIT_VERSION};

mod encoding;
pub use encoding::{address_word, uint_word};

mod envelope;
pub use envelope::{ENVELOPE_PREFIX, envelope_hash, envelope_preimage};

mod error;
pub use error::SignerError;

mod key;
pub use key::{PermitSigner, address_from_verifying_key};

mod permit;
pub use permit::{PERMIT_STRUCT_LEN, PERMIT_TYPEHASH, PermitMessage};

mod recover;
pub use recover::recover_signer;
