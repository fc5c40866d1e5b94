use reqwest::Client;
use std::time::Duration;

use crate::{configuration::Config, error::Error, push::PushRequest};

const USER_AGENT: &str = concat!("gnar-push/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct HTTP {
    pub http: Client,
}

impl HTTP {
    pub fn new(config: &Config) -> Result<HTTP, Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(HTTP { http })
    }

    /// Posts a prepared push request and returns the push service status.
    pub async fn post_push(&self, request: PushRequest) -> Result<u16, Error> {
        let PushRequest {
            endpoint,
            headers,
            body,
        } = request;

        let response = self
            .http
            .post(endpoint)
            .headers(headers)
            .body(body)
            .send()
            .await?;
        let status = response.status().as_u16();

        Ok(status)
    }
}
