use std::cmp::Ordering;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Subscription tier, ordered by capability. The derived `Ord` follows
/// declaration order, so `Free < Started < Pro`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Started,
    Pro,
}

impl Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tier = match self {
            PlanTier::Free => "free",
            PlanTier::Started => "started",
            PlanTier::Pro => "pro",
        };
        write!(f, "{}", tier)
    }
}

impl PlanTier {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "free" => Some(PlanTier::Free),
            "started" => Some(PlanTier::Started),
            "pro" => Some(PlanTier::Pro),
            _ => None,
        }
    }
}

/// Resource ceiling. `Unlimited` is a distinct variant rather than a numeric
/// sentinel so arithmetic on "no ceiling" is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceiling {
    Finite(i64),
    Unlimited,
}

impl Ord for Ceiling {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Ceiling::Unlimited, Ceiling::Unlimited) => Ordering::Equal,
            (Ceiling::Unlimited, Ceiling::Finite(_)) => Ordering::Greater,
            (Ceiling::Finite(_), Ceiling::Unlimited) => Ordering::Less,
            (Ceiling::Finite(a), Ceiling::Finite(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Ceiling {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Ceiling {
    /// `Finite(n)` serializes as `n`, `Unlimited` as `null`.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Ceiling::Finite(limit) => serializer.serialize_some(limit),
            Ceiling::Unlimited => serializer.serialize_none(),
        }
    }
}

/// The five counted resource kinds tracked by the usage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Snippets,
    Animations,
    Folders,
    VideoExports,
    PublicShares,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Snippets,
        ResourceKind::Animations,
        ResourceKind::Folders,
        ResourceKind::VideoExports,
        ResourceKind::PublicShares,
    ];
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            ResourceKind::Snippets => "snippets",
            ResourceKind::Animations => "animations",
            ResourceKind::Folders => "folders",
            ResourceKind::VideoExports => "video_exports",
            ResourceKind::PublicShares => "public_shares",
        };
        write!(f, "{}", kind)
    }
}

/// Static pricing metadata. Environment-specific Stripe price ids live in
/// config, keyed by (tier, interval); only the advertised amounts are static.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanPricing {
    pub monthly_minor: i64,
    pub yearly_minor: i64,
}

/// Ceilings and feature flags attached to a tier.
///
/// Invariant: for every resource, ceilings are monotonically non-decreasing
/// in tier order, with `Unlimited` above any finite value.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlanConfig {
    pub tier: PlanTier,
    pub display_name: &'static str,
    pub description: &'static str,
    pub max_snippets: Ceiling,
    pub max_animations: Ceiling,
    pub max_folders: Ceiling,
    pub max_slides_per_animation: Ceiling,
    pub max_video_exports: Ceiling,
    pub max_public_shares: Ceiling,
    pub remove_watermark: bool,
    pub pricing: Option<PlanPricing>,
}

impl PlanConfig {
    pub fn ceiling_for(&self, kind: ResourceKind) -> Ceiling {
        match kind {
            ResourceKind::Snippets => self.max_snippets,
            ResourceKind::Animations => self.max_animations,
            ResourceKind::Folders => self.max_folders,
            ResourceKind::VideoExports => self.max_video_exports,
            ResourceKind::PublicShares => self.max_public_shares,
        }
    }
}

const FREE_PLAN: PlanConfig = PlanConfig {
    tier: PlanTier::Free,
    display_name: "Free",
    description: "Edit and preview in the browser; saving requires a plan.",
    max_snippets: Ceiling::Finite(0),
    max_animations: Ceiling::Finite(0),
    max_folders: Ceiling::Finite(0),
    max_slides_per_animation: Ceiling::Finite(0),
    max_video_exports: Ceiling::Finite(0),
    max_public_shares: Ceiling::Finite(0),
    remove_watermark: false,
    pricing: None,
};

const STARTED_PLAN: PlanConfig = PlanConfig {
    tier: PlanTier::Started,
    display_name: "Started",
    description: "Save snippets and animations, share links, export videos.",
    max_snippets: Ceiling::Finite(50),
    max_animations: Ceiling::Finite(10),
    max_folders: Ceiling::Finite(10),
    max_slides_per_animation: Ceiling::Finite(10),
    max_video_exports: Ceiling::Finite(10),
    max_public_shares: Ceiling::Finite(25),
    remove_watermark: false,
    pricing: Some(PlanPricing {
        monthly_minor: 500,
        yearly_minor: 4800,
    }),
};

const PRO_PLAN: PlanConfig = PlanConfig {
    tier: PlanTier::Pro,
    display_name: "Pro",
    description: "Everything unlimited, watermark-free exports.",
    max_snippets: Ceiling::Unlimited,
    max_animations: Ceiling::Unlimited,
    max_folders: Ceiling::Unlimited,
    max_slides_per_animation: Ceiling::Unlimited,
    max_video_exports: Ceiling::Unlimited,
    max_public_shares: Ceiling::Unlimited,
    remove_watermark: true,
    pricing: Some(PlanPricing {
        monthly_minor: 1200,
        yearly_minor: 11520,
    }),
};

pub const ALL_TIERS: [PlanTier; 3] = [PlanTier::Free, PlanTier::Started, PlanTier::Pro];

pub const fn plan_config(tier: PlanTier) -> &'static PlanConfig {
    match tier {
        PlanTier::Free => &FREE_PLAN,
        PlanTier::Started => &STARTED_PLAN,
        PlanTier::Pro => &PRO_PLAN,
    }
}

pub const fn upgrade_target_of(tier: PlanTier) -> Option<PlanTier> {
    match tier {
        PlanTier::Free => Some(PlanTier::Started),
        PlanTier::Started => Some(PlanTier::Pro),
        PlanTier::Pro => None,
    }
}

pub const fn downgrade_target_of(tier: PlanTier) -> Option<PlanTier> {
    match tier {
        PlanTier::Free => None,
        PlanTier::Started => Some(PlanTier::Free),
        PlanTier::Pro => Some(PlanTier::Started),
    }
}

pub fn is_limit_reached(current: i64, max: Ceiling) -> bool {
    match max {
        Ceiling::Unlimited => false,
        Ceiling::Finite(limit) => current >= limit,
    }
}

/// Rounded integer percentage of the ceiling consumed, clamped to 0..=100.
/// An unlimited or zero ceiling reads as 0%.
pub fn usage_percentage(current: i64, max: Ceiling) -> u8 {
    match max {
        Ceiling::Unlimited => 0,
        Ceiling::Finite(limit) if limit <= 0 => 0,
        Ceiling::Finite(limit) => {
            let current = current.max(0);
            let percent = (current as f64 / limit as f64 * 100.0).round() as i64;
            percent.clamp(0, 100) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceilings_are_monotonic_across_tiers() {
        for window in ALL_TIERS.windows(2) {
            let (lower, higher) = (plan_config(window[0]), plan_config(window[1]));
            for kind in ResourceKind::ALL {
                assert!(
                    lower.ceiling_for(kind) <= higher.ceiling_for(kind),
                    "{} ceiling of {} is stricter than {}",
                    kind,
                    higher.tier,
                    lower.tier
                );
            }
            assert!(lower.max_slides_per_animation <= higher.max_slides_per_animation);
        }
    }

    #[test]
    fn unlimited_is_greater_than_any_finite_ceiling() {
        assert!(Ceiling::Unlimited > Ceiling::Finite(i64::MAX));
        assert!(Ceiling::Finite(0) < Ceiling::Unlimited);
        assert_eq!(Ceiling::Unlimited, Ceiling::Unlimited);
    }

    #[test]
    fn limit_is_never_reached_under_unlimited() {
        assert!(!is_limit_reached(0, Ceiling::Unlimited));
        assert!(!is_limit_reached(i64::MAX, Ceiling::Unlimited));
    }

    #[test]
    fn limit_is_reached_at_finite_ceiling() {
        assert!(!is_limit_reached(49, Ceiling::Finite(50)));
        assert!(is_limit_reached(50, Ceiling::Finite(50)));
        assert!(is_limit_reached(51, Ceiling::Finite(50)));
        assert!(is_limit_reached(0, Ceiling::Finite(0)));
    }

    #[test]
    fn usage_percentage_stays_within_bounds() {
        assert_eq!(usage_percentage(0, Ceiling::Finite(10)), 0);
        assert_eq!(usage_percentage(5, Ceiling::Finite(10)), 50);
        assert_eq!(usage_percentage(7, Ceiling::Finite(9)), 78);
        assert_eq!(usage_percentage(20, Ceiling::Finite(10)), 100);
        assert_eq!(usage_percentage(-3, Ceiling::Finite(10)), 0);
    }

    #[test]
    fn usage_percentage_is_zero_for_unlimited_or_zero_ceiling() {
        assert_eq!(usage_percentage(1_000_000, Ceiling::Unlimited), 0);
        assert_eq!(usage_percentage(45, Ceiling::Finite(0)), 0);
    }

    #[test]
    fn usage_percentage_is_idempotent() {
        let first = usage_percentage(33, Ceiling::Finite(40));
        let second = usage_percentage(33, Ceiling::Finite(40));
        assert_eq!(first, second);
    }

    #[test]
    fn adjacent_tier_targets_chain_to_the_boundaries() {
        assert_eq!(upgrade_target_of(PlanTier::Free), Some(PlanTier::Started));
        assert_eq!(upgrade_target_of(PlanTier::Started), Some(PlanTier::Pro));
        assert_eq!(upgrade_target_of(PlanTier::Pro), None);

        assert_eq!(downgrade_target_of(PlanTier::Pro), Some(PlanTier::Started));
        assert_eq!(downgrade_target_of(PlanTier::Started), Some(PlanTier::Free));
        assert_eq!(downgrade_target_of(PlanTier::Free), None);
    }

    #[test]
    fn tier_parses_from_stored_text() {
        for tier in ALL_TIERS {
            assert_eq!(PlanTier::from_str(&tier.to_string()), Some(tier));
        }
        assert_eq!(PlanTier::from_str("enterprise"), None);
    }

    #[test]
    fn started_snippet_ceiling_matches_published_plan() {
        assert_eq!(
            plan_config(PlanTier::Started).max_snippets,
            Ceiling::Finite(50)
        );
        assert_eq!(plan_config(PlanTier::Free).max_snippets, Ceiling::Finite(0));
        assert!(plan_config(PlanTier::Pro).remove_watermark);
    }
}
