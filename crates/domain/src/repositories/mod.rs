pub mod animations;
pub mod app_users;
pub mod folders;
pub mod payment_provider_customers;
pub mod shares;
pub mod snippets;
pub mod subscriptions;
pub mod usage_counts;
pub mod video_exports;
