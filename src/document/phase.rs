//! Workflow phase identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the six sequential stages of the guided workflow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Define,
    Assign,
    Extract,
    Organize,
    Integrate,
    Optimize,
}

impl Phase {
    pub const ALL: [Self; 6] = [
        Self::Define,
        Self::Assign,
        Self::Extract,
        Self::Organize,
        Self::Integrate,
        Self::Optimize,
    ];

    /// Zero-based position in the workflow.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The phase after this one, if any.
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The phase before this one, if any.
    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Define => "define",
            Self::Assign => "assign",
            Self::Extract => "extract",
            Self::Organize => "organize",
            Self::Integrate => "integrate",
            Self::Optimize => "optimize",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown phase: {s}"))
    }
}

/// Transient sub-states valid only while inside [`Phase::Extract`].
///
/// They have no predicates of their own and are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractStage {
    /// Breaking responsibilities down into sub-activities.
    Brainstorm,
    /// Choosing how each sub-activity will be captured.
    RawCapture,
    /// Writing the definition of done for each registry row.
    Standards,
}

impl ExtractStage {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Brainstorm => Some(Self::RawCapture),
            Self::RawCapture => Some(Self::Standards),
            Self::Standards => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        assert_eq!(Phase::Define.next(), Some(Phase::Assign));
        assert_eq!(Phase::Optimize.next(), None);
        assert_eq!(Phase::Define.previous(), None);
        assert_eq!(Phase::Optimize.previous(), Some(Phase::Integrate));
        assert!(Phase::Extract < Phase::Integrate);
    }

    #[test]
    fn test_phase_parsing() {
        assert_eq!("Organize".parse::<Phase>().unwrap(), Phase::Organize);
        assert!("brainstorm".parse::<Phase>().is_err());
    }

    #[test]
    fn test_extract_stages() {
        assert_eq!(ExtractStage::Brainstorm.next(), Some(ExtractStage::RawCapture));
        assert_eq!(ExtractStage::Standards.next(), None);
    }
}
