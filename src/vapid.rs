//! VAPID key provider (RFC 8292).
//!
//! The keypair is loaded once at startup and lives inside `Config` for the
//! rest of the process. The private key is a PKCS#8 PEM encoded P-256 key,
//! the public key is the base64url encoded uncompressed SEC1 point that
//! browsers expect as `applicationServerKey`.

use std::{fmt, fs};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::{error::Error, types::Claims};

const PUBLIC_KEY_LENGTH: usize = 65;

#[derive(Clone)]
pub struct VapidKeys {
    public_key: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for VapidKeys {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("VapidKeys")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl VapidKeys {
    pub fn load(private_key_path: &str, public_key_path: &str) -> Result<Self, Error> {
        let private_key = fs::read(private_key_path).map_err(|e| {
            Error::ConfigurationError(format!(
                "VAPID private key {}: {}",
                private_key_path, e
            ))
        })?;
        let public_key = fs::read_to_string(public_key_path).map_err(|e| {
            Error::ConfigurationError(format!(
                "VAPID public key {}: {}",
                public_key_path, e
            ))
        })?;

        Self::from_pem(&private_key, &public_key)
    }

    /// Builds the keypair and checks that both halves belong together.
    pub fn from_pem(private_key_pem: &[u8], public_key_b64: &str) -> Result<Self, Error> {
        let public_key = public_key_b64.trim().to_owned();
        if public_key.is_empty() {
            return Err(Error::ConfigurationError(String::from(
                "VAPID public key is empty",
            )));
        }

        let point = BASE64_URL.decode(&public_key).map_err(|e| {
            Error::ConfigurationError(format!("VAPID public key: {}", e))
        })?;
        if point.len() != PUBLIC_KEY_LENGTH || point[0] != 0x04 {
            return Err(Error::ConfigurationError(String::from(
                "VAPID public key must be a 65-byte uncompressed P-256 point",
            )));
        }

        let encoding_key = EncodingKey::from_ec_pem(private_key_pem).map_err(|e| {
            Error::ConfigurationError(format!("VAPID private key: {}", e))
        })?;
        let decoding_key = DecodingKey::from_ec_components(
            &BASE64_URL.encode(&point[1..33]),
            &BASE64_URL.encode(&point[33..]),
        )?;

        let keys = VapidKeys {
            public_key,
            encoding_key,
            decoding_key,
        };
        keys.check_pair()?;

        Ok(keys)
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, Error> {
        let token = encode(&Header::new(Algorithm::ES256), claims, &self.encoding_key)?;
        Ok(token)
    }

    pub fn verify(&self, token: &str, audience: &str) -> Result<Claims, Error> {
        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_audience(&[audience]);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    fn check_pair(&self) -> Result<(), Error> {
        let audience = "https://vapid.invalid";
        let sample = Claims {
            aud: String::from(audience),
            sub: String::from("mailto:keycheck@vapid.invalid"),
            exp: chrono::Utc::now().timestamp() + 60,
        };
        let token = self.sign(&sample)?;

        self.verify(&token, audience).map_err(|_| {
            Error::ConfigurationError(String::from(
                "VAPID public key does not match the private key",
            ))
        })?;

        Ok(())
    }
}
