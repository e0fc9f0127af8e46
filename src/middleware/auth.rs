use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use uuid::Uuid;

/// User ID extracted from the bearer token, inserted into request extensions.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Bearer-token authentication for the whole conversation surface. Validates
/// the HS256 signature locally; identity management itself lives elsewhere.
pub struct JwtAuth {
    decoding_key: Rc<DecodingKey>,
}

impl JwtAuth {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: Rc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthService {
            service: Rc::new(service),
            decoding_key: self.decoding_key.clone(),
        }))
    }
}

pub struct JwtAuthService<S> {
    service: Rc<S>,
    decoding_key: Rc<DecodingKey>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let decoding_key = self.decoding_key.clone();

        Box::pin(async move {
            // Health checks stay unauthenticated.
            if req.path() == "/health" {
                return service.call(req).await;
            }

            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    actix_web::error::ErrorUnauthorized("Missing Authorization header")
                })?;

            let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
                actix_web::error::ErrorUnauthorized("Invalid Authorization header format")
            })?;

            let token_data =
                decode::<Claims>(token, &decoding_key, &Validation::new(Algorithm::HS256))
                    .map_err(|e| {
                        tracing::warn!("JWT validation failed: {}", e);
                        actix_web::error::ErrorUnauthorized("Invalid token")
                    })?;

            let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| {
                actix_web::error::ErrorUnauthorized("Invalid token: malformed user id")
            })?;

            req.extensions_mut().insert(UserId(user_id));

            service.call(req).await
        })
    }
}
