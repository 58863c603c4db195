pub mod billing_intervals;
pub mod subscription_statuses;
