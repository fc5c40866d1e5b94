//! Push subscription lifecycle bound to an authenticated user.

use url::Url;

use crate::{
    auth::AuthenticatedUser,
    dao::SubscriptionStore,
    error::Error,
    model::NewPushSubscription,
    push::validate_subscription_keys,
    types::SubscriptionData,
};

pub const CHECK_FAILED: &str = "Failed to check subscription";
pub const SUBSCRIBE_FAILED: &str = "Failed to subscribe";
pub const UNSUBSCRIBE_FAILED: &str = "Failed to unsubscribe";

pub async fn check<S: SubscriptionStore>(
    store: &S,
    user: &AuthenticatedUser,
) -> Result<Option<String>, Error> {
    store
        .latest_endpoint(&user.user_id)
        .await
        .map_err(|e| Error::storage(CHECK_FAILED, e))
}

pub async fn subscribe<S: SubscriptionStore>(
    store: &S,
    user: &AuthenticatedUser,
    data: SubscriptionData,
) -> Result<(), Error> {
    validate_endpoint(&data.endpoint)?;
    validate_subscription_keys(&data.keys.p256dh, &data.keys.auth)?;

    let subscription = NewPushSubscription {
        user_id: user.user_id.to_owned(),
        endpoint: data.endpoint,
        p256dh: data.keys.p256dh,
        auth: data.keys.auth,
    };

    store
        .replace(subscription)
        .await
        .map_err(|e| Error::storage(SUBSCRIBE_FAILED, e))?;

    tracing::info!("Push subscription stored for user {}", user.user_id);

    Ok(())
}

pub async fn unsubscribe<S: SubscriptionStore>(
    store: &S,
    user: &AuthenticatedUser,
) -> Result<(), Error> {
    let removed = store
        .delete_by_user(&user.user_id)
        .await
        .map_err(|e| Error::storage(UNSUBSCRIBE_FAILED, e))?;

    tracing::info!(
        "Removed {} push subscription(s) for user {}",
        removed,
        user.user_id
    );

    Ok(())
}

/// Push services are reached over https; plain http only for local testing.
fn validate_endpoint(endpoint: &str) -> Result<(), Error> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::InvalidSubscription(format!("endpoint: {}", e)))?;

    let local = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));
    match url.scheme() {
        "https" => Ok(()),
        "http" if local => Ok(()),
        scheme => Err(Error::InvalidSubscription(format!(
            "endpoint scheme {} is not supported",
            scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubscriptionKeys;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
    use std::{future::Future, sync::Mutex};

    /// In-memory stand-in for the Postgres table.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<NewPushSubscription>>,
        failing: bool,
    }

    impl MemoryStore {
        fn failing() -> Self {
            MemoryStore {
                failing: true,
                ..Default::default()
            }
        }

        fn count(&self, user_id: &str) -> usize {
            let rows = self.rows.lock().unwrap();
            rows.iter().filter(|row| row.user_id == user_id).count()
        }

        fn fail(&self) -> Result<(), sqlx::Error> {
            if self.failing {
                return Err(sqlx::Error::PoolTimedOut);
            }
            Ok(())
        }
    }

    impl SubscriptionStore for MemoryStore {
        fn latest_endpoint(
            &self,
            user_id: &str,
        ) -> impl Future<Output = Result<Option<String>, sqlx::Error>> + Send
        {
            let result = self.fail().map(|_| {
                let rows = self.rows.lock().unwrap();
                rows.iter()
                    .rev()
                    .find(|row| row.user_id == user_id)
                    .map(|row| row.endpoint.to_owned())
            });
            async move { result }
        }

        fn replace(
            &self,
            subscription: NewPushSubscription,
        ) -> impl Future<Output = Result<(), sqlx::Error>> + Send {
            let result = self.fail().map(|_| {
                let mut rows = self.rows.lock().unwrap();
                rows.retain(|row| row.user_id != subscription.user_id);
                rows.push(subscription);
            });
            async move { result }
        }

        fn delete_by_user(
            &self,
            user_id: &str,
        ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send {
            let result = self.fail().map(|_| {
                let mut rows = self.rows.lock().unwrap();
                let before = rows.len();
                rows.retain(|row| row.user_id != user_id);
                (before - rows.len()) as u64
            });
            async move { result }
        }
    }

    fn user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: id.to_owned(),
        }
    }

    fn row(user_id: &str, endpoint: &str, p256dh: &str, auth: &str) -> NewPushSubscription {
        NewPushSubscription {
            user_id: user_id.to_owned(),
            endpoint: endpoint.to_owned(),
            p256dh: p256dh.to_owned(),
            auth: auth.to_owned(),
        }
    }

    fn browser_subscription(endpoint: &str) -> SubscriptionData {
        let mut point = vec![0x04u8];
        point.extend_from_slice(&[9u8; 64]);
        SubscriptionData {
            endpoint: endpoint.to_owned(),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: BASE64_URL.encode(point),
                auth: BASE64_URL.encode([3u8; 16]),
            },
        }
    }

    #[tokio::test]
    async fn check_without_rows_is_none() {
        let store = MemoryStore::default();
        assert_eq!(check(&store, &user("u1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn check_returns_the_users_endpoint() {
        let store = MemoryStore::default();
        store
            .rows
            .lock()
            .unwrap()
            .push(row("u2", "https://push.example/other", "k2", "a2"));
        store
            .rows
            .lock()
            .unwrap()
            .push(row("u1", "https://push.example/abc", "k1", "a1"));

        assert_eq!(
            check(&store, &user("u1")).await.unwrap(),
            Some(String::from("https://push.example/abc"))
        );
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let store = MemoryStore::default();
        store
            .rows
            .lock()
            .unwrap()
            .push(row("u1", "https://push.example/abc", "k1", "a1"));

        unsubscribe(&store, &user("u1")).await.unwrap();
        unsubscribe(&store, &user("u1")).await.unwrap();
        assert_eq!(store.count("u1"), 0);
    }

    #[tokio::test]
    async fn unsubscribe_leaves_other_users_alone() {
        let store = MemoryStore::default();
        store
            .rows
            .lock()
            .unwrap()
            .push(row("u2", "https://push.example/other", "k2", "a2"));

        unsubscribe(&store, &user("u1")).await.unwrap();
        assert_eq!(store.count("u2"), 1);
    }

    #[tokio::test]
    async fn check_then_unsubscribe_then_check() {
        let store = MemoryStore::default();
        store
            .rows
            .lock()
            .unwrap()
            .push(row("U", "https://push.example/abc", "k1", "a1"));
        let u = user("U");

        assert_eq!(
            check(&store, &u).await.unwrap(),
            Some(String::from("https://push.example/abc"))
        );
        unsubscribe(&store, &u).await.unwrap();
        assert_eq!(check(&store, &u).await.unwrap(), None);
    }

    #[tokio::test]
    async fn subscribe_replaces_previous_rows() {
        let store = MemoryStore::default();
        let u = user("u1");

        subscribe(&store, &u, browser_subscription("https://push.example/old"))
            .await
            .unwrap();
        subscribe(&store, &u, browser_subscription("https://push.example/new"))
            .await
            .unwrap();

        assert_eq!(store.count("u1"), 1);
        assert_eq!(
            check(&store, &u).await.unwrap(),
            Some(String::from("https://push.example/new"))
        );
    }

    #[tokio::test]
    async fn subscribe_rejects_bad_input_before_storage() {
        let store = MemoryStore::failing();
        let u = user("u1");

        let plain = subscribe(&store, &u, browser_subscription("http://push.example/abc")).await;
        assert!(matches!(plain, Err(Error::InvalidSubscription(_))));

        let mut bad_keys = browser_subscription("https://push.example/abc");
        bad_keys.keys.auth = String::from("short");
        let keys = subscribe(&store, &u, bad_keys).await;
        assert!(matches!(keys, Err(Error::InvalidSubscriptionKey(_))));
    }

    #[tokio::test]
    async fn local_http_endpoint_is_accepted() {
        let store = MemoryStore::default();
        subscribe(&store, &user("u1"), browser_subscription("http://localhost:8080/push"))
            .await
            .unwrap();
        assert_eq!(store.count("u1"), 1);
    }

    #[tokio::test]
    async fn storage_failures_carry_generic_messages() {
        let store = MemoryStore::failing();
        let u = user("u1");

        let checked = check(&store, &u).await;
        assert!(matches!(checked, Err(Error::StorageFailure(CHECK_FAILED))));

        let removed = unsubscribe(&store, &u).await;
        assert!(matches!(removed, Err(Error::StorageFailure(UNSUBSCRIBE_FAILED))));

        let stored = subscribe(&store, &u, browser_subscription("https://push.example/abc")).await;
        assert!(matches!(stored, Err(Error::StorageFailure(SUBSCRIBE_FAILED))));
    }
}
