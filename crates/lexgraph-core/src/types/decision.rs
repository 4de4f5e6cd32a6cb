//! Verdicts exchanged with the decision-maker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse compliance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Allowed")]
    Allowed,
    #[serde(rename = "Not Allowed")]
    NotAllowed,
    #[serde(rename = "Conditional")]
    Conditional,
    #[serde(rename = "Is a Crime")]
    IsACrime,
    #[serde(rename = "Not a Crime")]
    NotACrime,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Verdict {
    /// Convert to string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "Allowed",
            Self::NotAllowed => "Not Allowed",
            Self::Conditional => "Conditional",
            Self::IsACrime => "Is a Crime",
            Self::NotACrime => "Not a Crime",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risk level attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// A verdict with its supporting explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub decision: Verdict,
    pub reason: String,
    pub risk_level: RiskLevel,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence_score: f32,
    #[serde(default)]
    pub suggested_changes: Vec<String>,
    #[serde(default)]
    pub alternative_actions: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

impl Decision {
    /// A best-effort verdict for when no real evaluation could be made.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            decision: Verdict::Unknown,
            reason: reason.into(),
            risk_level: RiskLevel::Medium,
            confidence_score: 0.0,
            suggested_changes: Vec::new(),
            alternative_actions: Vec::new(),
            references: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_serde_uses_display_names() {
        assert_eq!(serde_json::to_string(&Verdict::NotACrime).unwrap(), "\"Not a Crime\"");
        let parsed: Verdict = serde_json::from_str("\"Not Allowed\"").unwrap();
        assert_eq!(parsed, Verdict::NotAllowed);
    }

    #[test]
    fn test_decision_parses_contract_shape() {
        let decision: Decision = serde_json::from_str(
            r#"{
                "decision": "Conditional",
                "reason": "Section 4.1 requires DPO approval",
                "risk_level": "High",
                "confidence_score": 0.85,
                "references": ["Policy Section 4.1"]
            }"#,
        )
        .unwrap();
        assert_eq!(decision.decision, Verdict::Conditional);
        assert_eq!(decision.risk_level, RiskLevel::High);
        assert!(decision.suggested_changes.is_empty());
        assert_eq!(decision.references.len(), 1);
    }

    #[test]
    fn test_degraded_decision() {
        let decision = Decision::degraded("inference unavailable");
        assert_eq!(decision.decision, Verdict::Unknown);
        assert_eq!(decision.confidence_score, 0.0);
    }
}
