use domain::value_objects::{
    plans::{Ceiling, PlanTier, ResourceKind, is_limit_reached, plan_config, upgrade_target_of},
    usage::UsageSummary,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("{kind} limit reached ({current}/{max})")]
    LimitReached {
        kind: ResourceKind,
        current: i64,
        max: i64,
        upgrade_to: Option<PlanTier>,
    },
    #[error(transparent)]
    Usage(#[from] crate::usecases::usage::UsageError),
}

impl AdmissionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AdmissionError::LimitReached { .. } => StatusCode::FORBIDDEN,
            AdmissionError::Usage(err) => err.status_code(),
        }
    }

    /// Actionable client message: names the blocking resource and the tier
    /// that would lift the ceiling.
    pub fn user_message(&self) -> String {
        match self {
            AdmissionError::LimitReached {
                kind,
                current,
                max,
                upgrade_to: Some(tier),
            } => format!(
                "You have reached your {} limit ({}/{}). Upgrade to {} for more.",
                kind,
                current,
                max,
                plan_config(*tier).display_name
            ),
            AdmissionError::LimitReached {
                kind, current, max, ..
            } => format!("You have reached your {} limit ({}/{}).", kind, current, max),
            AdmissionError::Usage(err) => err.to_string(),
        }
    }
}

/// Admission check run before every counted write. The summary must come
/// through the cached usage path so mutation bursts stay cheap.
pub fn ensure_capacity(usage: &UsageSummary, kind: ResourceKind) -> Result<(), AdmissionError> {
    let resource = usage.usage_for(kind);

    if !is_limit_reached(resource.current, resource.max) {
        return Ok(());
    }

    // Unlimited ceilings never report as reached.
    let Ceiling::Finite(max) = resource.max else {
        return Ok(());
    };

    Err(AdmissionError::LimitReached {
        kind,
        current: resource.current,
        max,
        upgrade_to: upgrade_target_of(usage.tier),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::value_objects::usage::ResourceCounts;

    #[test]
    fn free_tier_denies_the_first_snippet() {
        let usage = UsageSummary::from_counts(PlanTier::Free, ResourceCounts::default());

        let err = ensure_capacity(&usage, ResourceKind::Snippets).unwrap_err();
        match err {
            AdmissionError::LimitReached {
                kind,
                current,
                max,
                upgrade_to,
            } => {
                assert_eq!(kind, ResourceKind::Snippets);
                assert_eq!(current, 0);
                assert_eq!(max, 0);
                assert_eq!(upgrade_to, Some(PlanTier::Started));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn started_tier_admits_below_the_ceiling() {
        let usage = UsageSummary::from_counts(
            PlanTier::Started,
            ResourceCounts {
                snippets: 49,
                ..Default::default()
            },
        );

        assert!(ensure_capacity(&usage, ResourceKind::Snippets).is_ok());
    }

    #[test]
    fn started_tier_denies_at_the_ceiling() {
        let usage = UsageSummary::from_counts(
            PlanTier::Started,
            ResourceCounts {
                snippets: 50,
                ..Default::default()
            },
        );

        assert!(ensure_capacity(&usage, ResourceKind::Snippets).is_err());
    }

    #[test]
    fn pro_tier_is_never_denied() {
        let usage = UsageSummary::from_counts(
            PlanTier::Pro,
            ResourceCounts {
                snippets: 1_000_000,
                video_exports: 1_000_000,
                ..Default::default()
            },
        );

        for kind in ResourceKind::ALL {
            assert!(ensure_capacity(&usage, kind).is_ok());
        }
    }

    #[test]
    fn denial_message_names_resource_and_upgrade_tier() {
        let usage = UsageSummary::from_counts(
            PlanTier::Started,
            ResourceCounts {
                public_shares: 25,
                ..Default::default()
            },
        );

        let err = ensure_capacity(&usage, ResourceKind::PublicShares).unwrap_err();
        let message = err.user_message();
        assert!(message.contains("public_shares"));
        assert!(message.contains("Pro"));
    }
}
