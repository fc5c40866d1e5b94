use std::str::FromStr;

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::send_push::{send, DeliveryReport},
    types::{PushData, PUSH_TYPES},
};
use actix_web::{get, web, HttpResponse, Result};
use serde::{Deserialize, Serialize};

#[get("/test-push")]
pub async fn index(
    state: web::Data<AppState<State>>,
    data: web::Query<Query>,
) -> Result<HttpResponse, Error> {
    let auth = data.auth.as_deref().ok_or_else(|| Error::InvalidOption {
        option: String::from("auth"),
    })?;

    if auth != state.config.auth {
        return Ok(HttpResponse::Ok().json(Response {
            result: false,
            report: None,
        }));
    };

    let push_type =
        PUSH_TYPES::from_str(&data.r#type).map_err(|_| Error::InvalidOption {
            option: format!("type {}", data.r#type),
        })?;

    let push_data = match push_type {
        PUSH_TYPES::Announcement => announcement(),
        PUSH_TYPES::SurfAlert => surf_alert(),
        PUSH_TYPES::Demerit => demerit(),
        PUSH_TYPES::Unsupported => unsupported(),
    };

    let report =
        send(state.get_ref().clone(), data.user.to_owned(), push_data).await?;

    Ok(HttpResponse::Ok().json(Response {
        result: true,
        report: Some(report),
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DeliveryReport>,
}

#[derive(Debug, Deserialize)]
pub struct Query {
    auth: Option<String>,
    r#type: String,
    user: String,
}

pub fn announcement() -> PushData {
    PushData {
        r#type: PUSH_TYPES::Announcement.to_string(),
        body: String::from(
            r#"{"title": "Crew meeting", "body": "Dawn patrol debrief at the shack, 7am."}"#,
        ),
    }
}

pub fn surf_alert() -> PushData {
    PushData {
        r#type: PUSH_TYPES::SurfAlert.to_string(),
        body: format!(
            r#"{{"spot": "Ocean Beach", "height_ft": {}, "period_s": {}}}"#,
            6, 14
        ),
    }
}

pub fn demerit() -> PushData {
    PushData {
        r#type: PUSH_TYPES::Demerit.to_string(),
        body: format!(
            r#"{{"rule": "Charter 3: no drop-ins", "points": {}}}"#,
            1
        ),
    }
}

pub fn unsupported() -> PushData {
    PushData {
        r#type: PUSH_TYPES::Unsupported.to_string(),
        body: String::from("{}"),
    }
}
