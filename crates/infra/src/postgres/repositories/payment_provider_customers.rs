use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPool;
use domain::{
    entities::payment_provider_customers::InsertPaymentProviderCustomerEntity,
    repositories::payment_provider_customers::PaymentProviderCustomerRepository,
    schema::payment_provider_customers,
};

pub struct PaymentProviderCustomerPostgres {
    db_pool: Arc<PgPool>,
}

impl PaymentProviderCustomerPostgres {
    pub fn new(db_pool: Arc<PgPool>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentProviderCustomerRepository for PaymentProviderCustomerPostgres {
    async fn find_customer_ref(&self, user_id: Uuid, provider: &str) -> Result<Option<String>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let customer_ref = payment_provider_customers::table
            .filter(payment_provider_customers::user_id.eq(user_id))
            .filter(payment_provider_customers::provider.eq(provider))
            .select(payment_provider_customers::customer_ref)
            .first::<String>(&mut conn)
            .optional()?;

        Ok(customer_ref)
    }

    async fn upsert_customer_ref(
        &self,
        user_id: Uuid,
        provider: &str,
        customer_ref: &str,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(payment_provider_customers::table)
            .values(&InsertPaymentProviderCustomerEntity {
                user_id,
                provider: provider.to_string(),
                customer_ref: customer_ref.to_string(),
            })
            .on_conflict((
                payment_provider_customers::user_id,
                payment_provider_customers::provider,
            ))
            .do_update()
            .set(payment_provider_customers::customer_ref.eq(customer_ref))
            .execute(&mut conn)?;

        Ok(())
    }
}
