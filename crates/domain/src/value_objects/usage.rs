use serde::Serialize;

use crate::value_objects::plans::{Ceiling, PlanTier, ResourceKind, plan_config, usage_percentage};

/// Raw per-user counts as returned by the backing store in one batched call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub snippets: i64,
    pub animations: i64,
    pub folders: i64,
    pub video_exports: i64,
    pub public_shares: i64,
}

impl ResourceCounts {
    pub fn get(&self, kind: ResourceKind) -> i64 {
        match kind {
            ResourceKind::Snippets => self.snippets,
            ResourceKind::Animations => self.animations,
            ResourceKind::Folders => self.folders,
            ResourceKind::VideoExports => self.video_exports,
            ResourceKind::PublicShares => self.public_shares,
        }
    }
}

/// One resource paired with its ceiling under the active tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceUsage {
    pub current: i64,
    pub max: Ceiling,
}

/// Per-user snapshot of counts against the active tier's ceilings.
///
/// Computed on demand and cached seconds-scale; never persisted. Always
/// reconstructable from the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub tier: PlanTier,
    pub snippets: ResourceUsage,
    pub animations: ResourceUsage,
    pub folders: ResourceUsage,
    pub video_exports: ResourceUsage,
    pub public_shares: ResourceUsage,
}

impl UsageSummary {
    /// Pairs raw counts with the ceilings of the given tier.
    pub fn from_counts(tier: PlanTier, counts: ResourceCounts) -> Self {
        let config = plan_config(tier);
        let pair = |kind: ResourceKind| ResourceUsage {
            current: counts.get(kind),
            max: config.ceiling_for(kind),
        };

        Self {
            tier,
            snippets: pair(ResourceKind::Snippets),
            animations: pair(ResourceKind::Animations),
            folders: pair(ResourceKind::Folders),
            video_exports: pair(ResourceKind::VideoExports),
            public_shares: pair(ResourceKind::PublicShares),
        }
    }

    pub fn usage_for(&self, kind: ResourceKind) -> ResourceUsage {
        match kind {
            ResourceKind::Snippets => self.snippets,
            ResourceKind::Animations => self.animations,
            ResourceKind::Folders => self.folders,
            ResourceKind::VideoExports => self.video_exports,
            ResourceKind::PublicShares => self.public_shares,
        }
    }
}

/// One resource's overage under a prospective lower tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceImpact {
    pub current: i64,
    pub new_max: Ceiling,
    pub over_limit: i64,
    pub will_be_over_limit: bool,
}

/// What moving to `target_tier` would strand over-limit. Ephemeral; derived
/// synchronously from a snapshot and discarded after use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DowngradeImpact {
    pub target_tier: PlanTier,
    pub snippets: ResourceImpact,
    pub animations: ResourceImpact,
    pub folders: ResourceImpact,
    pub video_exports: ResourceImpact,
    pub public_shares: ResourceImpact,
    pub has_any_impact: bool,
}

impl DowngradeImpact {
    pub fn impact_for(&self, kind: ResourceKind) -> ResourceImpact {
        match kind {
            ResourceKind::Snippets => self.snippets,
            ResourceKind::Animations => self.animations,
            ResourceKind::Folders => self.folders,
            ResourceKind::VideoExports => self.video_exports,
            ResourceKind::PublicShares => self.public_shares,
        }
    }
}

/// Pure calculation of the overage a tier change would cause. Validating
/// that `target_tier` is actually a downgrade is the caller's contract.
pub fn calculate_downgrade_impact(usage: &UsageSummary, target_tier: PlanTier) -> DowngradeImpact {
    let target = plan_config(target_tier);
    let impact = |kind: ResourceKind| {
        let current = usage.usage_for(kind).current;
        let new_max = target.ceiling_for(kind);
        let over_limit = match new_max {
            Ceiling::Unlimited => 0,
            Ceiling::Finite(limit) => (current - limit).max(0),
        };

        ResourceImpact {
            current,
            new_max,
            over_limit,
            will_be_over_limit: over_limit > 0,
        }
    };

    let snippets = impact(ResourceKind::Snippets);
    let animations = impact(ResourceKind::Animations);
    let folders = impact(ResourceKind::Folders);
    let video_exports = impact(ResourceKind::VideoExports);
    let public_shares = impact(ResourceKind::PublicShares);
    let has_any_impact = [
        snippets,
        animations,
        folders,
        video_exports,
        public_shares,
    ]
    .iter()
    .any(|impact| impact.will_be_over_limit);

    DowngradeImpact {
        target_tier,
        snippets,
        animations,
        folders,
        video_exports,
        public_shares,
        has_any_impact,
    }
}

/// One row of the account-page usage meter.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceUsageDto {
    pub kind: ResourceKind,
    pub current: i64,
    pub max: Ceiling,
    pub percent_used: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageSummaryDto {
    pub tier: PlanTier,
    pub resources: Vec<ResourceUsageDto>,
}

impl From<UsageSummary> for UsageSummaryDto {
    fn from(value: UsageSummary) -> Self {
        let resources = ResourceKind::ALL
            .into_iter()
            .map(|kind| {
                let usage = value.usage_for(kind);
                ResourceUsageDto {
                    kind,
                    current: usage.current,
                    max: usage.max,
                    percent_used: usage_percentage(usage.current, usage.max),
                }
            })
            .collect();

        Self {
            tier: value.tier,
            resources,
        }
    }
}
