use std::future::Future;

use sqlx::error::Error;

use crate::model::NewPushSubscription;

mod postgre;

pub use postgre::{PoolOption, PoolType, QueryResult, Transaction};

/// Storage seam of the subscription lifecycle.
///
/// Implemented by `Table<PushSubscription>` for Postgres.
pub trait SubscriptionStore {
    /// Endpoint of the user's most recent subscription.
    fn latest_endpoint(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<String>, Error>> + Send;

    /// Drops every subscription of the user and stores `subscription` instead.
    fn replace(
        &self,
        subscription: NewPushSubscription,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Deletes every subscription of the user, returning the number removed.
    fn delete_by_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<u64, Error>> + Send;
}
