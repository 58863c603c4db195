pub mod animations;
pub mod folders;
pub mod shares;
pub mod snippets;
pub mod subscriptions;
pub mod usage;
pub mod video_exports;

use infra::{
    payments::stripe_client::StripeClient,
    postgres::repositories::{
        animations::AnimationPostgres, app_users::AppUserPostgres, folders::FolderPostgres,
        payment_provider_customers::PaymentProviderCustomerPostgres, shares::SharePostgres,
        snippets::SnippetPostgres, subscriptions::SubscriptionPostgres,
        usage_counts::UsageCountsPostgres, video_exports::VideoExportPostgres,
    },
};

use crate::usecases::{
    animations::AnimationUseCase, folders::FolderUseCase, shares::ShareUseCase,
    snippets::SnippetUseCase, subscriptions::SubscriptionUseCase, usage::UsageUseCase,
    video_exports::VideoExportUseCase,
};

pub type PgUsageUseCase = UsageUseCase<UsageCountsPostgres, AppUserPostgres, SubscriptionPostgres>;
pub type PgSnippetUseCase =
    SnippetUseCase<SnippetPostgres, UsageCountsPostgres, AppUserPostgres, SubscriptionPostgres>;
pub type PgFolderUseCase =
    FolderUseCase<FolderPostgres, UsageCountsPostgres, AppUserPostgres, SubscriptionPostgres>;
pub type PgAnimationUseCase =
    AnimationUseCase<AnimationPostgres, UsageCountsPostgres, AppUserPostgres, SubscriptionPostgres>;
pub type PgVideoExportUseCase = VideoExportUseCase<
    VideoExportPostgres,
    AnimationPostgres,
    UsageCountsPostgres,
    AppUserPostgres,
    SubscriptionPostgres,
>;
pub type PgShareUseCase = ShareUseCase<
    SharePostgres,
    SnippetPostgres,
    UsageCountsPostgres,
    AppUserPostgres,
    SubscriptionPostgres,
>;
pub type PgSubscriptionUseCase = SubscriptionUseCase<
    UsageCountsPostgres,
    AppUserPostgres,
    SubscriptionPostgres,
    PaymentProviderCustomerPostgres,
    StripeClient,
>;
