use serde::{Deserialize, Serialize};
use std::fmt;

/// `owner/name` repository identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a `full_name` such as `querydsl/querydsl`.
    ///
    /// Returns `None` unless there is exactly one `/` with non-empty parts on
    /// both sides.
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, name) = full_name.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Issue / pull request number. GitHub shares the numbering between both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrNumber(pub u64);

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PrNumber {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

/// Commit SHA of a pull request head. The commit status target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(String);

impl Sha {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 7 characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Sha {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn repo_id_parses_full_name() {
        let repo = RepoId::parse("querydsl/querydsl").unwrap();
        assert_eq!(repo.owner(), "querydsl");
        assert_eq!(repo.name(), "querydsl");
        assert_eq!(repo.full_name(), "querydsl/querydsl");
    }

    #[rstest]
    #[case("")]
    #[case("querydsl")]
    #[case("/querydsl")]
    #[case("querydsl/")]
    #[case("a/b/c")]
    fn repo_id_rejects_malformed_full_names(#[case] input: &str) {
        assert_eq!(RepoId::parse(input), None);
    }

    #[test]
    fn sha_short_handles_short_input() {
        assert_eq!(Sha::from("abc").short(), "abc");
        assert_eq!(Sha::from("0123456789abcdef").short(), "0123456");
    }

    #[test]
    fn pr_number_displays_with_hash() {
        assert_eq!(PrNumber(42).to_string(), "#42");
    }
}
