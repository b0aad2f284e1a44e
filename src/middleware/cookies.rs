//! Middleware collapsing duplicate `Set-Cookie` headers on every response.

use crate::{config::CookieConfig, cookies::remove_duplicate_cookies};
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use std::{
    future::{Ready, ready},
    pin::Pin,
};

/// Cookie deduplication middleware factory
pub struct DedupCookies {
    config: CookieConfig,
}

impl DedupCookies {
    /// Create a new deduplication middleware with the given configuration
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    /// Create the middleware with configuration loaded from the environment
    pub fn from_env() -> Self {
        Self::new(CookieConfig::from_env())
    }
}

impl Default for DedupCookies {
    fn default() -> Self {
        Self::new(CookieConfig::default())
    }
}

impl<S, B> Transform<S, ServiceRequest> for DedupCookies
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = DedupCookiesMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(DedupCookiesMiddleware {
            service,
            config: self.config.clone(),
        }))
    }
}

/// The actual deduplication middleware service
pub struct DedupCookiesMiddleware<S> {
    service: S,
    config: CookieConfig,
}

impl<S, B> Service<ServiceRequest> for DedupCookiesMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = self.service.call(req);
        let config = self.config.clone();

        Box::pin(async move {
            let mut res = fut.await?;
            // Nothing is flushed until the service future resolves
            remove_duplicate_cookies(res.headers_mut(), &config);
            Ok(res)
        })
    }
}
