//! Web Push request construction.
//!
//! Payloads are encrypted for the subscriber with RFC 8291 (`aes128gcm`) and
//! the request is authorized with a VAPID JWT (RFC 8292). Sending is left to
//! `provider::HTTP`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use chrono::Utc;
use reqwest::{
    header::{
        HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_ENCODING,
        CONTENT_TYPE,
    },
    Url,
};

use crate::{
    error::Error,
    types::{Claims, PushHeader, PushTarget},
    vapid::VapidKeys,
};

/// Push services reject VAPID tokens that live longer than 24 hours.
pub const VAPID_TOKEN_LIFETIME: i64 = 12 * 60 * 60;

const P256DH_LENGTH: usize = 65;
const AUTH_LENGTH: usize = 16;
const MAX_TOPIC_LENGTH: usize = 32;

#[derive(Debug)]
pub struct PushRequest {
    pub endpoint: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub fn build_request(
    target: &PushTarget,
    payload: &[u8],
    vapid: &VapidKeys,
    contact: &str,
    push_header: &PushHeader,
) -> Result<PushRequest, Error> {
    let endpoint = Url::parse(&target.endpoint)?;
    if endpoint.host().is_none() {
        return Err(Error::InvalidOption {
            option: String::from("host"),
        });
    }

    if push_header.ttl < 0 {
        return Err(Error::InvalidOption {
            option: String::from("ttl"),
        });
    }

    let claims = Claims {
        aud: endpoint.origin().ascii_serialization(),
        sub: contact_uri(contact),
        exp: Utc::now().timestamp() + VAPID_TOKEN_LIFETIME,
    };
    let token = vapid.sign(&claims)?;

    let p256dh = decode_key(&target.p256dh, P256DH_LENGTH, "p256dh")?;
    let auth = decode_key(&target.auth, AUTH_LENGTH, "auth")?;
    let body = ece::encrypt(&p256dh, &auth, payload)?;

    let mut headers = HeaderMap::new();
    let authorization =
        format!("vapid t={}, k={}", token, vapid.public_key());
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);
    headers.insert(CONTENT_ENCODING, HeaderValue::from_static("aes128gcm"));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        HeaderName::from_static("ttl"),
        HeaderValue::from_str(&push_header.ttl.to_string())?,
    );

    if let Some(urgency) = push_header.urgency {
        headers.insert(
            HeaderName::from_static("urgency"),
            HeaderValue::from_str(&urgency.to_string())?,
        );
    }

    if let Some(topic) = &push_header.topic {
        if !is_valid_topic(topic) {
            return Err(Error::InvalidOption {
                option: String::from("topic"),
            });
        }
        headers.insert(
            HeaderName::from_static("topic"),
            HeaderValue::from_str(topic)?,
        );
    }

    Ok(PushRequest {
        endpoint,
        headers,
        body,
    })
}

fn contact_uri(contact: &str) -> String {
    if contact.starts_with("mailto:") || contact.starts_with("https:") {
        contact.to_owned()
    } else {
        format!("mailto:{}", contact)
    }
}

/// Decodes a subscription key, tolerating the padded form some browsers emit.
pub fn decode_key(value: &str, length: usize, name: &str) -> Result<Vec<u8>, Error> {
    let bytes = BASE64_URL
        .decode(value.trim().trim_end_matches('='))
        .map_err(|e| Error::InvalidSubscriptionKey(format!("{}: {}", name, e)))?;

    if bytes.len() != length {
        return Err(Error::InvalidSubscriptionKey(format!(
            "{}: expected {} bytes, got {}",
            name,
            length,
            bytes.len()
        )));
    }

    Ok(bytes)
}

/// RFC 8030 topics are at most 32 characters of the base64url alphabet.
fn is_valid_topic(topic: &str) -> bool {
    !topic.is_empty()
        && topic.len() <= MAX_TOPIC_LENGTH
        && topic
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub fn validate_subscription_keys(p256dh: &str, auth: &str) -> Result<(), Error> {
    decode_key(p256dh, P256DH_LENGTH, "p256dh")?;
    decode_key(auth, AUTH_LENGTH, "auth")?;
    Ok(())
}
