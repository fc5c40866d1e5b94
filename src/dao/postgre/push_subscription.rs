use super::{QueryResult, Transaction};
use crate::{
    dao::SubscriptionStore,
    model::{NewPushSubscription, PushSubscription, Table},
};
use sqlx::error::Error;

impl Table<PushSubscription> {
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_>,
        subscription: &NewPushSubscription,
    ) -> Result<QueryResult, Error> {
        sqlx::query(
            r#"
            INSERT INTO "push_subscription" ("user_id", "endpoint", "p256dh", "auth")
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(&subscription.user_id)
        .bind(&subscription.endpoint)
        .bind(&subscription.p256dh)
        .bind(&subscription.auth)
        .execute(&mut **tx)
        .await
    }

    pub async fn get_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PushSubscription>, Error> {
        sqlx::query_as(
            r#"
            SELECT
                "id", "user_id", "endpoint", "p256dh", "auth", "created_at"
            FROM "push_subscription"
            WHERE
                "user_id" = $1
            ORDER BY "created_at" DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_latest_endpoint(
        &self,
        user_id: &str,
    ) -> Result<Option<String>, Error> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT
                "endpoint"
            FROM "push_subscription"
            WHERE
                "user_id" = $1
            ORDER BY "created_at" DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .persistent(true)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(endpoint,)| endpoint))
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<QueryResult, Error> {
        sqlx::query(
            r#"
            DELETE FROM "push_subscription" WHERE "id" = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
    }

    pub async fn delete_all_by_user(
        &self,
        user_id: &str,
    ) -> Result<QueryResult, Error> {
        sqlx::query(
            r#"
            DELETE FROM "push_subscription" WHERE "user_id" = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
    }

    pub async fn replace_for_user(
        &self,
        subscription: &NewPushSubscription,
    ) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        // Same-user writers queue here until the holder commits, so the
        // DELETE below always sees the previous writer's row.
        sqlx::query(
            r#"
            SELECT pg_advisory_xact_lock(hashtext($1))
            "#,
        )
        .bind(&subscription.user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM "push_subscription" WHERE "user_id" = $1
            "#,
        )
        .bind(&subscription.user_id)
        .execute(&mut *tx)
        .await?;

        self.insert(&mut tx, subscription).await?;

        tx.commit().await
    }
}

impl SubscriptionStore for Table<PushSubscription> {
    async fn latest_endpoint(
        &self,
        user_id: &str,
    ) -> Result<Option<String>, Error> {
        self.get_latest_endpoint(user_id).await
    }

    async fn replace(
        &self,
        subscription: NewPushSubscription,
    ) -> Result<(), Error> {
        self.replace_for_user(&subscription).await
    }

    async fn delete_by_user(&self, user_id: &str) -> Result<u64, Error> {
        let result = self.delete_all_by_user(user_id).await?;
        Ok(result.rows_affected())
    }
}
