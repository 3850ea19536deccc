//! Exact-duplicate guard
//!
//! Unlike the advisory name check, this is a hard gate: an opportunity may
//! not be saved when another live opportunity already pairs the same
//! principal organization, customer organization and product.
//!
//! Lookup:
//! 1. Live opportunities for (principal, customer), newest first
//! 2. Drop the record being edited (`exclude_id`)
//! 3. For each remaining opportunity, in order, ask whether it carries the
//!    product; the first hit is the duplicate
//!
//! Lookup failures propagate. Failing open here would let a real duplicate
//! through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DedupError, ExistingOpportunity, Result, SourceError, ValidationErrors};
use crate::types::CandidateId;

/// Form field the duplicate error is attached to
pub const DUPLICATE_FIELD: &str = "product_id";

/// Maximum opportunities considered per principal/customer pair
pub const PAIR_LOOKUP_LIMIT: usize = 100;

/// An opportunity as returned by a pair lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunitySummary {
    pub id: CandidateId,
    pub name: String,
    pub stage: String,
}

impl From<OpportunitySummary> for ExistingOpportunity {
    fn from(o: OpportunitySummary) -> Self {
        ExistingOpportunity {
            id: o.id,
            name: o.name,
            stage: o.stage,
        }
    }
}

/// The combination that must be unique among live opportunities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactDuplicateParams {
    pub principal_id: CandidateId,
    pub customer_id: CandidateId,
    pub product_id: CandidateId,
    /// Opportunity being updated, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_id: Option<CandidateId>,
}

/// Record-store queries the guard needs.
#[async_trait]
pub trait OpportunityLookup: Send + Sync {
    /// Live (not soft-deleted) opportunities for a principal/customer pair,
    /// newest first, at most [`PAIR_LOOKUP_LIMIT`]
    async fn opportunities_for_pair(
        &self,
        principal_id: &CandidateId,
        customer_id: &CandidateId,
    ) -> std::result::Result<Vec<OpportunitySummary>, SourceError>;

    /// Whether a live opportunity-product link exists
    async fn has_product(
        &self,
        opportunity_id: &CandidateId,
        product_id: &CandidateId,
    ) -> std::result::Result<bool, SourceError>;
}

/// Reject `params` if it duplicates an existing opportunity.
pub async fn check_exact_duplicate<L>(lookup: &L, params: &ExactDuplicateParams) -> Result<()>
where
    L: OpportunityLookup + ?Sized,
{
    let candidates: Vec<OpportunitySummary> = lookup
        .opportunities_for_pair(&params.principal_id, &params.customer_id)
        .await?
        .into_iter()
        .filter(|o| params.exclude_id.as_ref() != Some(&o.id))
        .collect();

    if candidates.is_empty() {
        debug!(
            principal_id = %params.principal_id,
            customer_id = %params.customer_id,
            "No opportunities for principal/customer pair"
        );
        return Ok(());
    }

    for candidate in candidates {
        if lookup.has_product(&candidate.id, &params.product_id).await? {
            info!(
                existing_id = %candidate.id,
                product_id = %params.product_id,
                "Exact duplicate opportunity rejected"
            );
            return Err(DedupError::DuplicateOpportunity {
                existing: candidate.into(),
            });
        }
    }

    Ok(())
}

/// Same as [`check_exact_duplicate`], with a duplicate reported as a
/// field-keyed [`ValidationErrors`] on `product_id`. Other errors pass through.
pub async fn validate_no_duplicate<L>(lookup: &L, params: &ExactDuplicateParams) -> Result<()>
where
    L: OpportunityLookup + ?Sized,
{
    match check_exact_duplicate(lookup, params).await {
        Err(e @ DedupError::DuplicateOpportunity { .. }) => Err(DedupError::Validation(
            ValidationErrors::for_field(DUPLICATE_FIELD, e.to_string()),
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory lookup that records product queries
    #[derive(Default)]
    struct MockLookup {
        opportunities: Vec<OpportunitySummary>,
        products: HashSet<(CandidateId, CandidateId)>,
        product_queries: Mutex<Vec<CandidateId>>,
        fail: bool,
    }

    impl MockLookup {
        fn with_opportunity(mut self, id: &str, name: &str, stage: &str) -> Self {
            self.opportunities.push(OpportunitySummary {
                id: CandidateId::from(id),
                name: name.to_string(),
                stage: stage.to_string(),
            });
            self
        }

        fn with_product(mut self, opportunity_id: &str, product_id: &str) -> Self {
            self.products
                .insert((CandidateId::from(opportunity_id), CandidateId::from(product_id)));
            self
        }

        fn product_queries(&self) -> Vec<CandidateId> {
            self.product_queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OpportunityLookup for MockLookup {
        async fn opportunities_for_pair(
            &self,
            _principal_id: &CandidateId,
            _customer_id: &CandidateId,
        ) -> std::result::Result<Vec<OpportunitySummary>, SourceError> {
            if self.fail {
                return Err(SourceError::QueryFailed("timeout".to_string()));
            }
            Ok(self.opportunities.clone())
        }

        async fn has_product(
            &self,
            opportunity_id: &CandidateId,
            product_id: &CandidateId,
        ) -> std::result::Result<bool, SourceError> {
            self.product_queries
                .lock()
                .unwrap()
                .push(opportunity_id.clone());
            Ok(self
                .products
                .contains(&(opportunity_id.clone(), product_id.clone())))
        }
    }

    fn params(product: &str) -> ExactDuplicateParams {
        ExactDuplicateParams {
            principal_id: CandidateId::from("principal-1"),
            customer_id: CandidateId::from("customer-1"),
            product_id: CandidateId::from(product),
            exclude_id: None,
        }
    }

    #[tokio::test]
    async fn test_no_opportunities_is_ok() {
        let lookup = MockLookup::default();
        assert!(check_exact_duplicate(&lookup, &params("product-1")).await.is_ok());
        assert!(lookup.product_queries().is_empty());
    }

    #[tokio::test]
    async fn test_same_pair_different_product_is_ok() {
        let lookup = MockLookup::default()
            .with_opportunity("opp-existing", "Existing Opportunity", "new_lead")
            .with_product("opp-existing", "product-1");

        let result = check_exact_duplicate(&lookup, &params("product-different")).await;

        assert!(result.is_ok());
        assert_eq!(lookup.product_queries(), vec![CandidateId::from("opp-existing")]);
    }

    #[tokio::test]
    async fn test_exact_duplicate_is_rejected() {
        let lookup = MockLookup::default()
            .with_opportunity("opp-existing", "Existing Deal", "demo_scheduled")
            .with_product("opp-existing", "product-1");

        let err = check_exact_duplicate(&lookup, &params("product-1"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "DUPLICATE_OPPORTUNITY");
        assert!(err.to_string().starts_with("Duplicate opportunity detected"));
        match err {
            DedupError::DuplicateOpportunity { existing } => {
                assert_eq!(
                    existing,
                    ExistingOpportunity {
                        id: CandidateId::from("opp-existing"),
                        name: "Existing Deal".to_string(),
                        stage: "demo_scheduled".to_string(),
                    }
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_excluded_opportunity_is_not_queried() {
        let lookup = MockLookup::default()
            .with_opportunity("opp-current", "Current Opportunity", "new_lead")
            .with_product("opp-current", "product-1");

        let mut p = params("product-1");
        p.exclude_id = Some(CandidateId::from("opp-current"));

        assert!(check_exact_duplicate(&lookup, &p).await.is_ok());
        assert!(lookup.product_queries().is_empty());
    }

    #[tokio::test]
    async fn test_exclusion_still_finds_other_duplicates() {
        let lookup = MockLookup::default()
            .with_opportunity("opp-current", "Current Opportunity", "new_lead")
            .with_opportunity("opp-other", "Other Opportunity", "closed_won")
            .with_product("opp-other", "product-1");

        let mut p = params("product-1");
        p.exclude_id = Some(CandidateId::from("opp-current"));

        let err = check_exact_duplicate(&lookup, &p).await.unwrap_err();
        assert!(err.to_string().contains("\"Other Opportunity\""));
    }

    #[tokio::test]
    async fn test_checks_candidates_in_order_until_hit() {
        let lookup = MockLookup::default()
            .with_opportunity("opp-1", "Opportunity 1", "new_lead")
            .with_opportunity("opp-2", "Opportunity 2", "feedback_logged")
            .with_opportunity("opp-3", "Opportunity 3", "new_lead")
            .with_product("opp-2", "product-1")
            .with_product("opp-3", "product-1");

        let err = check_exact_duplicate(&lookup, &params("product-1"))
            .await
            .unwrap_err();

        assert!(err
            .to_string()
            .contains("Existing opportunity: \"Opportunity 2\""));
        assert_eq!(
            lookup.product_queries(),
            vec![CandidateId::from("opp-1"), CandidateId::from("opp-2")]
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let lookup = MockLookup {
            fail: true,
            ..Default::default()
        };

        let err = check_exact_duplicate(&lookup, &params("product-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DedupError::Lookup(_)));
    }

    #[tokio::test]
    async fn test_validate_no_duplicate_field_error() {
        let lookup = MockLookup::default()
            .with_opportunity("opp-existing", "Existing Deal", "new_lead")
            .with_product("opp-existing", "product-1");

        assert!(validate_no_duplicate(&MockLookup::default(), &params("product-1"))
            .await
            .is_ok());

        match validate_no_duplicate(&lookup, &params("product-1")).await {
            Err(DedupError::Validation(v)) => {
                assert_eq!(v.message, "Validation failed");
                assert!(v.body.errors[DUPLICATE_FIELD]
                    .contains("Duplicate opportunity detected"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
