//! Shared data types for duplicate detection.
//!
//! JSON field names follow the CRM wire format (camelCase).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque record identifier. The record store hands out either integer or
/// string keys depending on the resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateId {
    Int(i64),
    Text(String),
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateId::Int(id) => write!(f, "{}", id),
            CandidateId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for CandidateId {
    fn from(id: i64) -> Self {
        CandidateId::Int(id)
    }
}

impl From<i32> for CandidateId {
    fn from(id: i32) -> Self {
        CandidateId::Int(i64::from(id))
    }
}

impl From<&str> for CandidateId {
    fn from(id: &str) -> Self {
        CandidateId::Text(id.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(id: String) -> Self {
        CandidateId::Text(id)
    }
}

impl std::str::FromStr for CandidateId {
    type Err = std::convert::Infallible;

    /// Integers parse as `Int`, anything else is kept as `Text`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(id) => CandidateId::Int(id),
            Err(_) => CandidateId::Text(s.to_string()),
        })
    }
}

/// A stored record eligible for name comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedCandidate {
    pub id: CandidateId,
    /// Compared display name. Empty names never match.
    pub name: String,
    /// Pipeline stage, passed through for display.
    #[serde(default)]
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_organization_name: Option<String>,
}

impl NamedCandidate {
    pub fn new(id: impl Into<CandidateId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stage: String::new(),
            customer_organization_name: None,
            principal_organization_name: None,
        }
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    pub fn with_organizations(
        mut self,
        customer: Option<String>,
        principal: Option<String>,
    ) -> Self {
        self.customer_organization_name = customer;
        self.principal_organization_name = principal;
        self
    }

    /// Whether the name has any content after trimming
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// A candidate whose name is within the threshold of the proposed name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    #[serde(flatten)]
    pub candidate: NamedCandidate,
    /// Edit distance to the proposed name; always greater than zero.
    pub distance: usize,
}

/// Outcome of a similarity check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityCheckResult {
    pub has_similar: bool,
    pub matches: Vec<SimilarityMatch>,
}

impl SimilarityCheckResult {
    /// The "nothing to warn about" result
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn from_matches(matches: Vec<SimilarityMatch>) -> Self {
        Self {
            has_similar: !matches.is_empty(),
            matches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_id_untagged_json() {
        let int: CandidateId = serde_json::from_str("42").unwrap();
        let text: CandidateId = serde_json::from_str("\"opp-7\"").unwrap();

        assert_eq!(int, CandidateId::Int(42));
        assert_eq!(text, CandidateId::Text("opp-7".to_string()));
        assert_eq!(int.to_string(), "42");
        assert_eq!(text.to_string(), "opp-7");
    }

    #[test]
    fn test_candidate_id_from_str() {
        assert_eq!("17".parse::<CandidateId>().unwrap(), CandidateId::Int(17));
        assert_eq!(
            "opp-current".parse::<CandidateId>().unwrap(),
            CandidateId::from("opp-current")
        );
    }

    #[test]
    fn test_match_serializes_flat_camel_case() {
        let m = SimilarityMatch {
            candidate: NamedCandidate::new(1, "ABC Corp - Widget Deal")
                .with_stage("new_lead")
                .with_organizations(Some("ABC Corp".to_string()), None),
            distance: 1,
        };
        let result = SimilarityCheckResult::from_matches(vec![m]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["hasSimilar"], true);
        assert_eq!(json["matches"][0]["id"], 1);
        assert_eq!(json["matches"][0]["distance"], 1);
        assert_eq!(json["matches"][0]["customerOrganizationName"], "ABC Corp");
        assert!(json["matches"][0].get("principalOrganizationName").is_none());
    }

    #[test]
    fn test_candidate_defaults_on_missing_fields() {
        let c: NamedCandidate =
            serde_json::from_str(r#"{"id": "x", "name": "  "}"#).unwrap();
        assert_eq!(c.stage, "");
        assert!(!c.has_name());
    }
}
