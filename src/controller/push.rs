//! Push subscription endpoints
//!
//! Check, create and delete the caller's subscription, and expose the VAPID
//! public key browsers need to subscribe.

use actix_web::{get, post, web, Responder};
use serde::{Deserialize, Serialize};

use crate::{
    auth::AuthenticatedUser,
    configuration::{AppState, State},
    error::Error,
    handler::subscription,
    types::SubscriptionData,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub endpoint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VapidKeyResponse {
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[get("/push/subscription")]
pub async fn subscription_check(
    state: web::Data<AppState<State>>,
    user: AuthenticatedUser,
) -> Result<impl Responder, Error> {
    let endpoint =
        subscription::check(&state.database.push_subscription, &user).await?;

    Ok(web::Json(SubscriptionResponse { endpoint }))
}

#[post("/push/subscribe")]
pub async fn subscribe(
    state: web::Data<AppState<State>>,
    user: AuthenticatedUser,
    data: web::Json<SubscriptionData>,
) -> Result<impl Responder, Error> {
    subscription::subscribe(
        &state.database.push_subscription,
        &user,
        data.into_inner(),
    )
    .await?;

    Ok(web::Json(SuccessResponse { success: true }))
}

#[post("/push/unsubscribe")]
pub async fn unsubscribe(
    state: web::Data<AppState<State>>,
    user: AuthenticatedUser,
) -> Result<impl Responder, Error> {
    subscription::unsubscribe(&state.database.push_subscription, &user).await?;

    Ok(web::Json(SuccessResponse { success: true }))
}

#[get("/push/vapid-key")]
pub async fn vapid_key(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    Ok(web::Json(VapidKeyResponse {
        public_key: state.config.vapid.public_key().to_owned(),
    }))
}
