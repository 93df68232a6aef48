//! HTTP middleware: viewer identity extraction and request timing.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! identity in headers. This layer turns those headers into a [`Viewer`]
//! available to every handler, rejecting malformed identity early.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::HeaderMap;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::{AppError, Result as AppResult};
use crate::models::{Author, Viewer};

/// Gateway header carrying the authenticated user id.
pub const VIEWER_ID_HEADER: &str = "x-viewer-id";
/// Gateway header carrying the authenticated username.
pub const VIEWER_USERNAME_HEADER: &str = "x-viewer-username";

fn viewer_from_headers(headers: &HeaderMap) -> AppResult<Viewer> {
    let id = headers.get(VIEWER_ID_HEADER);
    let username = headers.get(VIEWER_USERNAME_HEADER);

    match (id, username) {
        (None, None) => Ok(Viewer::Anonymous),
        (Some(id), Some(username)) => {
            let id = id
                .to_str()
                .ok()
                .and_then(|s| Uuid::parse_str(s.trim()).ok())
                .ok_or_else(|| AppError::InvalidInput("malformed viewer id header".into()))?;

            let username = username
                .to_str()
                .ok()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::InvalidInput("malformed viewer username header".into())
                })?;

            Ok(Viewer::Authenticated(Author {
                id,
                username: username.to_string(),
            }))
        }
        _ => Err(AppError::InvalidInput(
            "incomplete viewer identity headers".into(),
        )),
    }
}

/// Actix middleware that resolves the viewer identity once per request and
/// stores it in the request extensions.
pub struct ViewerIdentityMiddleware;

impl<S, B> Transform<S, ServiceRequest> for ViewerIdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ViewerIdentityMiddlewareService<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ViewerIdentityMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct ViewerIdentityMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ViewerIdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let viewer = viewer_from_headers(req.headers())?;
            req.extensions_mut().insert(viewer);

            service.call(req).await
        })
    }
}

impl FromRequest for Viewer {
    type Error = Error;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(viewer) = req.extensions().get::<Viewer>() {
            return ready(Ok(viewer.clone()));
        }

        // routes mounted without the identity middleware still resolve
        ready(viewer_from_headers(req.headers()).map_err(Error::from))
    }
}

/// Logs method, path, and elapsed time for every request.
pub struct TimingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TimingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TimingMiddlewareService<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TimingMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct TimingMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TimingMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let path = req.path().to_string();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed().as_millis();
            tracing::debug!(%method, %path, %elapsed, "request completed");
            res
        })
    }
}
