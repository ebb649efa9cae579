pub mod health;
pub mod profile;
pub mod swagger;

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

use crate::utils::AppError;

/// JSON extractor config: malformed bodies answer 400 with a `msg`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, req| {
            log::warn!("⚠️ {} {} - invalid JSON body: {}", req.method(), req.path(), err);
            AppError::InvalidRequest(format!("Invalid JSON body: {}", err)).into()
        })
}

/// Form body of a write route.
///
/// A request without a JSON body (no payload, or another content type) reads
/// as an empty form, so the route answers with its field errors. A JSON body
/// goes through `web::Json` and `json_config`.
pub struct JsonBody<T>(pub T);

impl<T> JsonBody<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

fn carries_json(req: &HttpRequest) -> bool {
    let content_type = req.content_type();
    let is_json = content_type == "application/json" || content_type.ends_with("+json");

    let empty = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);

    is_json && !empty
}

impl<T> FromRequest for JsonBody<T>
where
    T: DeserializeOwned + Default + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if !carries_json(req) {
            log::debug!("{} {} - no JSON body, reading as empty form", req.method(), req.path());
            return Box::pin(async { Ok(JsonBody(T::default())) });
        }

        let json = web::Json::<T>::from_request(req, payload);
        Box::pin(async move { json.await.map(|body| JsonBody(body.into_inner())) })
    }
}
