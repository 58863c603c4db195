use domain::value_objects::{
    plans::{PlanTier, downgrade_target_of},
    usage::{DowngradeImpact, UsageSummary, calculate_downgrade_impact},
};
use thiserror::Error;

use crate::usecases::usage::UsageError;

#[derive(Debug, Error)]
pub enum DowngradeError {
    /// The requested target is equal or higher in capability order.
    #[error("target tier is not a downgrade")]
    NotADowngrade,
    /// Already at the floor tier; there is nothing below to move to.
    #[error("already on the lowest tier")]
    NoDowngradeTarget,
    /// Resources would be stranded over-limit; the caller must surface the
    /// impact and retry with explicit confirmation.
    #[error("downgrade would leave resources over their new limits")]
    ConfirmationRequired(DowngradeImpact),
    #[error("no active subscription to downgrade")]
    SubscriptionNotFound,
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Checkout(#[from] crate::usecases::subscriptions::SubscriptionError),
}

impl DowngradeError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            DowngradeError::NotADowngrade | DowngradeError::NoDowngradeTarget => {
                StatusCode::BAD_REQUEST
            }
            DowngradeError::ConfirmationRequired(_) => StatusCode::CONFLICT,
            DowngradeError::SubscriptionNotFound => StatusCode::NOT_FOUND,
            DowngradeError::Usage(err) => err.status_code(),
            DowngradeError::Checkout(err) => err.status_code(),
        }
    }
}

/// Picks the downgrade target: an explicit request must be strictly lower
/// than the current tier; an omitted one means "one tier down", which is a
/// terminal condition at the floor.
pub fn resolve_downgrade_target(
    current: PlanTier,
    requested: Option<PlanTier>,
) -> Result<PlanTier, DowngradeError> {
    match requested {
        Some(target) if target >= current => Err(DowngradeError::NotADowngrade),
        Some(target) => Ok(target),
        None => downgrade_target_of(current).ok_or(DowngradeError::NoDowngradeTarget),
    }
}

/// Guard plus pure calculator: the guard runs first so contract violations
/// never reach the calculation.
pub fn check_downgrade_impact(
    usage: &UsageSummary,
    requested: Option<PlanTier>,
) -> Result<DowngradeImpact, DowngradeError> {
    let target = resolve_downgrade_target(usage.tier, requested)?;
    Ok(calculate_downgrade_impact(usage, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::value_objects::usage::ResourceCounts;

    fn summary(tier: PlanTier, snippets: i64) -> UsageSummary {
        UsageSummary::from_counts(
            tier,
            ResourceCounts {
                snippets,
                ..Default::default()
            },
        )
    }

    #[test]
    fn equal_tier_is_rejected_before_the_calculator() {
        let usage = summary(PlanTier::Started, 10);

        let err = check_downgrade_impact(&usage, Some(PlanTier::Started)).unwrap_err();
        assert!(matches!(err, DowngradeError::NotADowngrade));
    }

    #[test]
    fn higher_tier_is_rejected_as_not_a_downgrade() {
        let usage = summary(PlanTier::Started, 10);

        let err = check_downgrade_impact(&usage, Some(PlanTier::Pro)).unwrap_err();
        assert!(matches!(err, DowngradeError::NotADowngrade));
    }

    #[test]
    fn floor_tier_has_no_downgrade_target() {
        let usage = summary(PlanTier::Free, 0);

        let err = check_downgrade_impact(&usage, None).unwrap_err();
        assert!(matches!(err, DowngradeError::NoDowngradeTarget));
    }

    #[test]
    fn omitted_target_means_one_tier_down() {
        let usage = summary(PlanTier::Pro, 10);

        let impact = check_downgrade_impact(&usage, None).unwrap();
        assert_eq!(impact.target_tier, PlanTier::Started);
    }

    #[test]
    fn explicit_two_tier_downgrade_is_allowed() {
        let usage = summary(PlanTier::Pro, 60);

        let impact = check_downgrade_impact(&usage, Some(PlanTier::Free)).unwrap();
        assert_eq!(impact.target_tier, PlanTier::Free);
        assert_eq!(impact.snippets.over_limit, 60);
        assert!(impact.has_any_impact);
    }
}
