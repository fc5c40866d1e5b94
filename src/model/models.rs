//! Database entity models
//!
//! One struct per table the service reads or writes.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

// =============================================================================
// PUSH SUBSCRIPTIONS
// =============================================================================

/// Stored Web Push subscription of a user.
///
/// `p256dh` and `auth` are kept exactly as the browser sent them (base64url).
#[derive(Debug, Clone, FromRow)]
pub struct PushSubscription {
    pub id: String,
    pub user_id: String,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: DateTime<Utc>,
}

/// Row to insert; `id` and `created_at` are assigned by the database.
#[derive(Debug, Clone)]
pub struct NewPushSubscription {
    pub user_id: String,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

// =============================================================================
// SESSIONS
// =============================================================================

/// Session issued by the authentication provider. Read-only here.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
