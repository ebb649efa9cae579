use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

pub use crate::services::auth_service::Claims;
use crate::services::auth_service;
use crate::utils::AppError;

/// Legacy header still sent by older front-ends
const TOKEN_HEADER: &str = "x-auth-token";

/// Requires a valid bearer token and exposes its `Claims` to handlers
/// through `web::ReqData<Claims>`.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(header_value) = req.headers().get("Authorization") {
        if let Ok(header_str) = header_value.to_str() {
            if let Some(token) = header_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    req.headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match extract_token(&req) {
            Some(token) => token,
            None => {
                log::warn!("🔒 {} {} - missing token", req.method(), req.path());
                let res = req.error_response(AppError::Unauthorized("No token, authorization denied".to_string()));
                return Box::pin(async move { Ok(res.map_into_right_body()) });
            }
        };

        let claims = match auth_service::verify_token(&token) {
            Ok(claims) if claims.user_id().is_ok() => claims,
            Ok(claims) => {
                log::warn!("🔒 Token subject is not a user id: {}", claims.sub);
                let res = req.error_response(AppError::Unauthorized("Token is not valid".to_string()));
                return Box::pin(async move { Ok(res.map_into_right_body()) });
            }
            Err(e) => {
                log::warn!("🔒 {} {} - {}", req.method(), req.path(), e);
                let res = req.error_response(AppError::Unauthorized("Token is not valid".to_string()));
                return Box::pin(async move { Ok(res.map_into_right_body()) });
            }
        };

        req.extensions_mut().insert(claims);

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
