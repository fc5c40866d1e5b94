//! Push notification types
//!
//! Types for push notification handling, subscription, and message formatting.

use serde::{Deserialize, Serialize};
use std::{fmt, io, str::FromStr};

// =============================================================================
// Push Message Types
// =============================================================================

#[derive(Debug, Clone)]
pub struct PushHeader {
    pub ttl: i64,
    pub urgency: Option<Urgency>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PushData {
    pub r#type: String,
    pub body: String,
}

impl fmt::Display for PushData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, r#"{{"type": "{}", "data": {}}}"#, self.r#type, self.body)
    }
}

/// Subscriber side of a push request: where to send and whom to encrypt for.
#[derive(Debug, Clone)]
pub struct PushTarget {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

// =============================================================================
// Urgency Enum
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Urgency::VeryLow => write!(f, "very-low"),
            Urgency::Low => write!(f, "low"),
            Urgency::Normal => write!(f, "normal"),
            Urgency::High => write!(f, "high"),
        }
    }
}

impl FromStr for Urgency {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<Urgency, Self::Err> {
        match value {
            "very-low" => Ok(Urgency::VeryLow),
            "low" => Ok(Urgency::Low),
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            _ => Err(io::Error::other("Urgency not supported")),
        }
    }
}

// =============================================================================
// Push Types Enum
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PUSH_TYPES {
    Announcement,
    SurfAlert,
    Demerit,
    Unsupported,
}

impl fmt::Display for PUSH_TYPES {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PUSH_TYPES::Announcement => write!(f, "Announcement"),
            PUSH_TYPES::SurfAlert => write!(f, "SurfAlert"),
            PUSH_TYPES::Demerit => write!(f, "Demerit"),
            PUSH_TYPES::Unsupported => write!(f, "Unsupported"),
        }
    }
}

impl FromStr for PUSH_TYPES {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<PUSH_TYPES, Self::Err> {
        match value {
            "Announcement" => Ok(PUSH_TYPES::Announcement),
            "SurfAlert" => Ok(PUSH_TYPES::SurfAlert),
            "Demerit" => Ok(PUSH_TYPES::Demerit),
            "Unsupported" => Ok(PUSH_TYPES::Unsupported),
            _ => Err(io::Error::other("PUSH_TYPES not supported")),
        }
    }
}

// =============================================================================
// Subscription Types
// =============================================================================

/// Body of `PushSubscription.toJSON()` as sent by the browser.
#[derive(Debug, Deserialize)]
pub struct SubscriptionData {
    pub endpoint: String,
    #[serde(alias = "expirationTime")]
    pub expiration_time: Option<i64>,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

// =============================================================================
// JWT Claims
// =============================================================================

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String,
    pub sub: String,
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_data_renders_json_envelope() {
        let data = PushData {
            r#type: PUSH_TYPES::SurfAlert.to_string(),
            body: String::from(r#"{"spot": "Ocean Beach"}"#),
        };
        let value: serde_json::Value =
            serde_json::from_str(&data.to_string()).unwrap();
        assert_eq!(value["type"], "SurfAlert");
        assert_eq!(value["data"]["spot"], "Ocean Beach");
    }

    #[test]
    fn urgency_uses_header_tokens() {
        for urgency in
            [Urgency::VeryLow, Urgency::Low, Urgency::Normal, Urgency::High]
        {
            let parsed: Urgency = urgency.to_string().parse().unwrap();
            assert_eq!(parsed, urgency);
        }
        assert!("urgent".parse::<Urgency>().is_err());
    }

    #[test]
    fn subscription_accepts_browser_field_names() {
        let data: SubscriptionData = serde_json::from_str(
            r#"{
                "endpoint": "https://push.example/abc",
                "expirationTime": null,
                "keys": {"p256dh": "k1", "auth": "a1"}
            }"#,
        )
        .unwrap();
        assert_eq!(data.endpoint, "https://push.example/abc");
        assert_eq!(data.expiration_time, None);
        assert_eq!(data.keys.p256dh, "k1");
        assert_eq!(data.keys.auth, "a1");
    }
}
