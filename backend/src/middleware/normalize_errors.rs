//! App-wide failure rendering.
//!
//! Any response produced from an error is re-rendered through the
//! [`ErrorNormalizer`]: [`Failure`]s go through the classification table and
//! other framework errors through the fallback branch. The failure is logged
//! here, once, with the request path and method.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::Failure;
use crate::inbound::http::error::{ErrorNormalizer, RequestContext};

/// Error normalization middleware factory.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeErrors {
    normalizer: ErrorNormalizer,
}

impl NormalizeErrors {
    pub fn new(normalizer: ErrorNormalizer) -> Self {
        Self { normalizer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for NormalizeErrors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = NormalizeErrorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(NormalizeErrorsMiddleware {
            service,
            normalizer: self.normalizer,
        }))
    }
}

/// Service produced by [`NormalizeErrors`].
pub struct NormalizeErrorsMiddleware<S> {
    service: S,
    normalizer: ErrorNormalizer,
}

impl<S, B> Service<ServiceRequest> for NormalizeErrorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let normalizer = self.normalizer;
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            let normalized = {
                let Some(error) = res.response().error() else {
                    return Ok(res.map_into_left_body());
                };
                let request = res.request();
                let method = request.method().to_string();
                let context = RequestContext {
                    path: request.path(),
                    method: &method,
                };
                match error.as_error::<Failure>() {
                    Some(failure) => normalizer.normalize(failure, context),
                    None => normalizer.normalize_foreign(
                        error.as_response_error().status_code(),
                        &error.to_string(),
                        context,
                    ),
                }
            };
            let (request, _) = res.into_parts();
            Ok(ServiceResponse::new(request, normalized.into_response()).map_into_right_body())
        })
    }
}
