//! Semantic version comparison for version criteria
//!
//! Parsing follows SemVer 2.0.0 strictly (delegated to the `semver` crate).
//! Precedence ignores build metadata, and so does equality.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed `major.minor.patch[-prerelease][+build]` version
#[derive(Debug, Clone)]
pub struct SemanticVersion(::semver::Version);

impl SemanticVersion {
    /// Parse a version, failing on any deviation from the grammar
    pub fn parse(text: &str) -> Result<Self, ::semver::Error> {
        ::semver::Version::parse(text).map(Self)
    }

    /// Parse a version, returning `None` instead of an error
    pub fn parse_quietly(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    pub fn prerelease(&self) -> Option<&str> {
        (!self.0.pre.is_empty()).then(|| self.0.pre.as_str())
    }

    pub fn build_metadata(&self) -> Option<&str> {
        (!self.0.build.is_empty()).then(|| self.0.build.as_str())
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // `semver::Prerelease` already orders an empty prerelease after any
        // non-empty one and compares identifiers per SemVer precedence.
        (self.0.major, self.0.minor, self.0.patch)
            .cmp(&(other.0.major, other.0.minor, other.0.patch))
            .then_with(|| self.0.pre.cmp(&other.0.pre))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl FromStr for SemanticVersion {
    type Err = ::semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
