//! Divergence allow-list.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::HarnessError;

/// The allow-list shipped with the harness.
pub const BUILTIN_DIVERGENCES: &str = include_str!("../divergences.toml");

/// One accepted difference: `candidate` may disagree at `step`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    /// Scenario step id.
    pub step: String,
    /// Candidate id.
    pub candidate: String,
    /// Why the difference is accepted.
    pub reason: String,
}

/// Set of `(step, candidate)` pairs allowed to diverge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceAllowList {
    #[serde(default, rename = "divergence")]
    entries: Vec<Divergence>,
}

impl DivergenceAllowList {
    /// An allow-list that tolerates nothing.
    pub const fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// The allow-list in `divergences.toml`.
    pub fn builtin() -> Result<Self, HarnessError> {
        Self::from_toml(BUILTIN_DIVERGENCES)
    }

    /// Parse an allow-list from TOML `[[divergence]]` tables.
    pub fn from_toml(contents: &str) -> Result<Self, HarnessError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read an allow-list file.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| HarnessError::AllowListRead { path: path.to_path_buf(), source })?;
        Self::from_toml(&contents)
    }

    /// Add an entry.
    #[must_use]
    pub fn with(
        mut self,
        step: impl Into<String>,
        candidate: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.entries.push(Divergence {
            step: step.into(),
            candidate: candidate.into(),
            reason: reason.into(),
        });
        self
    }

    /// The entry allowing `candidate` to diverge at `step`, if any.
    pub fn allows(&self, step: &str, candidate: &str) -> Option<&Divergence> {
        self.entries.iter().find(|entry| entry.step == step && entry.candidate == candidate)
    }

    /// All entries.
    pub fn entries(&self) -> &[Divergence] {
        &self.entries
    }

    /// Number of entries.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list tolerates nothing.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("transfer-to-zero-address", "minimal", true)]
    #[case("mint-to-zero-address", "minimal", true)]
    #[case("transfer-to-zero-address", "reference", false)]
    #[case("transfer-to-zero-address", "slot", false)]
    #[case("permit", "minimal", false)]
    fn builtin_entries(#[case] step: &str, #[case] candidate: &str, #[case] allowed: bool) {
        let list = DivergenceAllowList::builtin().expect("builtin list parses");
        assert_eq!(list.allows(step, candidate).is_some(), allowed);
    }

    #[test]
    fn builtin_entries_have_reasons() {
        let list = DivergenceAllowList::builtin().expect("builtin list parses");
        assert!(!list.is_empty());
        assert!(list.entries().iter().all(|entry| !entry.reason.is_empty()));
    }

    #[test]
    fn empty_document_is_empty_list() {
        let list = DivergenceAllowList::from_toml("").expect("parse");
        assert_eq!(list, DivergenceAllowList::empty());
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = DivergenceAllowList::from_toml("[[divergence]]\nstep = \"permit\"\n").unwrap_err();
        assert!(matches!(err, HarnessError::AllowListParse(_)));
    }

    #[test]
    fn builder_and_toml_agree() {
        let built = DivergenceAllowList::empty().with("permit", "slot", "different nonce handling");
        let serialized = toml::to_string(&built).expect("serialize");
        assert!(serialized.contains("[[divergence]]"));
        assert_eq!(DivergenceAllowList::from_toml(&serialized).expect("parse"), built);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "[[divergence]]\nstep = \"burn-holder-balance\"\ncandidate = \"slot\"\nreason = \"test\""
        )
        .expect("write");
        let list = DivergenceAllowList::load(file.path()).expect("load");
        assert_eq!(list.len(), 1);
        assert_eq!(list.allows("burn-holder-balance", "slot").map(|d| d.reason.as_str()), Some("test"));
    }

    #[test]
    fn load_missing_file() {
        let err = DivergenceAllowList::load(Path::new("/nonexistent/divergences.toml")).unwrap_err();
        assert!(matches!(err, HarnessError::AllowListRead { .. }));
    }
}
