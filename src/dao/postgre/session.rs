use crate::model::{Session, Table};
use sqlx::error::Error;

impl Table<Session> {
    pub async fn get_active(
        &self,
        token_hash: &str,
    ) -> Result<Option<Session>, Error> {
        sqlx::query_as(
            r#"
            SELECT
                "id", "user_id", "token_hash", "expires_at"
            FROM "session"
            WHERE
                "token_hash" = $1
            AND
                "expires_at" > now()
            "#,
        )
        .bind(token_hash)
        .persistent(true)
        .fetch_optional(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        auth::hash_token,
        configuration::tests::{database_state, insert_session, insert_user},
    };
    use chrono::Duration;

    #[tokio::test]
    async fn only_unexpired_sessions_resolve() {
        let Some(state) = database_state().await else {
            return;
        };
        let pool = state.database.get_pool();
        let live_user = insert_user(pool, "live").await;
        let stale_user = insert_user(pool, "stale").await;

        let live = insert_session(pool, &live_user, Duration::hours(1)).await;
        let stale =
            insert_session(pool, &stale_user, Duration::hours(-1)).await;

        let session = state
            .database
            .session
            .get_active(&hash_token(&live))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.user_id, live_user);

        let expired = state
            .database
            .session
            .get_active(&hash_token(&stale))
            .await
            .unwrap();
        assert!(expired.is_none());
    }
}
