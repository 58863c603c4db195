pub mod admission;
pub mod animations;
pub mod downgrade;
pub mod folders;
pub mod plan_resolver;
pub mod shares;
pub mod snippets;
pub mod subscriptions;
pub mod usage;
pub mod usage_cache;
pub mod video_exports;
