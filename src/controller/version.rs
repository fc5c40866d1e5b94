use actix_web::{get, web, Responder};
use serde::Serialize;

use crate::error::Error;

#[get("/version")]
pub async fn index() -> Result<impl Responder, Error> {
    Ok(web::Json(Response {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub name: &'static str,
    pub version: &'static str,
}
