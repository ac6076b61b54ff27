//! Body validation middleware.
//!
//! Buffers the request body, validates it against the schema chosen by a
//! [`SchemaProvider`], and either rejects the request with a 400
//! [`ErrorEnvelope`] or forwards it with the body replaced by the normalized
//! payload. The payload is also stored in the request extensions for the
//! [`Normalized`](crate::inbound::http::validation::Normalized) extractor.
//!
//! Only the first issue is reported; the message is localized from the
//! request's `Accept-Language` header through the app's
//! `web::Data<Localizer>` (built-in Spanish catalog when none is registered).

use std::rc::Rc;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{self, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{
    ACCEPT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue,
};
use actix_web::{Error, HttpMessage, HttpResponse, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::Value;
use tracing::warn;

use crate::domain::validation::{Localizer, ValidationResult};
use crate::inbound::http::envelope::ErrorEnvelope;
use crate::inbound::http::validation::SchemaProvider;

/// Validation middleware factory.
///
/// # Examples
/// ```
/// use actix_web::{App, HttpResponse, web};
/// use userdesk::domain::validation::{Schema, string};
/// use userdesk::middleware::ValidateBody;
///
/// let schema = Schema::new().field("name", string().min_length(3));
/// let _app = App::new().service(
///     web::resource("/names")
///         .wrap(ValidateBody::new(schema))
///         .route(web::post().to(HttpResponse::Created)),
/// );
/// ```
pub struct ValidateBody<P> {
    provider: Arc<P>,
}

impl<P: SchemaProvider> ValidateBody<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

impl<S, B, P> Transform<S, ServiceRequest> for ValidateBody<P>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
    P: SchemaProvider,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ValidateBodyMiddleware<S, P>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ValidateBodyMiddleware {
            service: Rc::new(service),
            provider: Arc::clone(&self.provider),
        }))
    }
}

/// Service produced by [`ValidateBody`].
pub struct ValidateBodyMiddleware<S, P> {
    service: Rc<S>,
    provider: Arc<P>,
}

impl<S, B, P> Service<ServiceRequest> for ValidateBodyMiddleware<S, P>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
    P: SchemaProvider,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let provider = Arc::clone(&self.provider);
        Box::pin(async move {
            let bytes = match req.extract::<web::Bytes>().await {
                Ok(bytes) => bytes,
                Err(error) => return Ok(req.error_response(error).map_into_right_body()),
            };
            let schema = provider.resolve(req.request());
            match ValidationResult::check_bytes(&schema, &bytes) {
                ValidationResult::Success { data } => {
                    let body = web::Bytes::from(data.to_json().to_string());
                    replace_body(&mut req, body);
                    req.extensions_mut().insert(data);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                failure => {
                    let message = localized_message(&req, &failure);
                    let key = failure.body_key().unwrap_or_default().to_owned();
                    warn!(
                        path = req.path(),
                        method = %req.method(),
                        field = %key,
                        "request body failed validation"
                    );
                    let envelope = ErrorEnvelope::new(message, Value::String(key));
                    let response = HttpResponse::BadRequest().json(envelope);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

fn default_localizer() -> &'static Localizer {
    static DEFAULT: OnceLock<Localizer> = OnceLock::new();
    DEFAULT.get_or_init(Localizer::default)
}

fn localized_message(req: &ServiceRequest, failure: &ValidationResult) -> String {
    let accept_language = req
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    let localizer = req
        .app_data::<web::Data<Localizer>>()
        .map_or_else(|| default_localizer(), |data| data.get_ref());
    failure
        .message(localizer.for_accept_language(accept_language))
        .unwrap_or_default()
}

fn replace_body(req: &mut ServiceRequest, body: web::Bytes) {
    let headers = req.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(body);
    req.set_payload(dev::Payload::from(payload));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::{Locale, Schema, date, string};
    use crate::inbound::http::validation::Normalized;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpRequest, test};
    use rstest::rstest;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .field("name", string().min_length(3))
            .field("email", string().email())
            .optional_field("fecha", date())
    }

    async fn echo(body: web::Json<Value>) -> HttpResponse {
        HttpResponse::Ok().json(body.into_inner())
    }

    async fn call(
        localizer: Option<Localizer>,
        req: test::TestRequest,
    ) -> (StatusCode, Value) {
        let mut app = App::new();
        if let Some(localizer) = localizer {
            app = app.app_data(web::Data::new(localizer));
        }
        let app = test::init_service(
            app.service(
                web::resource("/echo")
                    .wrap(ValidateBody::new(schema()))
                    .route(web::post().to(echo)),
            ),
        )
        .await;
        let res = test::call_service(&app, req.uri("/echo").to_request()).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[actix_web::test]
    async fn valid_bodies_reach_the_handler_normalized() {
        let req = test::TestRequest::post().set_json(json!({
            "name": "  Ada  ",
            "email": "ada@example.com",
            "fecha": "2024-03-01",
            "role": "admin"
        }));
        let (status, body) = call(None, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "name": "Ada",
                "email": "ada@example.com",
                "fecha": "2024-03-01T00:00:00.000Z"
            })
        );
    }

    #[actix_web::test]
    async fn missing_field_is_rejected_with_its_key() {
        let req = test::TestRequest::post().set_json(json!({ "name": "Ada" }));
        let (status, body) = call(None, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "El campo es obligatorio",
                "body": "email"
            })
        );
    }

    #[rstest]
    #[case(Some("en-US,en;q=0.9"), "Must contain at least 3 characters")]
    #[case(Some("es-PE"), "Debe tener al menos 3 caracteres")]
    #[case(None, "Must contain at least 3 characters")]
    #[actix_web::test]
    async fn first_issue_is_localized(#[case] accept: Option<&str>, #[case] expected: &str) {
        let mut req = test::TestRequest::post()
            .set_json(json!({ "name": "Jo", "email": "bad", "password": "x" }));
        if let Some(accept) = accept {
            req = req.insert_header((ACCEPT_LANGUAGE, accept));
        }
        let (status, body) = call(Some(Localizer::new(Locale::En)), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["body"], json!("name"));
        assert_eq!(body["message"], json!(expected));
    }

    #[actix_web::test]
    async fn non_json_bodies_fail_as_a_whole() {
        let req = test::TestRequest::post()
            .insert_header((CONTENT_TYPE, "application/json"))
            .set_payload("not json");
        let (status, body) = call(None, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["body"], json!("object"));
    }

    #[actix_web::test]
    async fn request_dependent_schemas_are_resolved_per_request() {
        let provider = |req: &HttpRequest| {
            if req.query_string().contains("strict") {
                Schema::new().field("name", string().min_length(10))
            } else {
                Schema::new().field("name", string())
            }
        };
        let app = test::init_service(
            App::new().service(
                web::resource("/names")
                    .wrap(ValidateBody::new(provider))
                    .route(web::post().to(|Normalized(body): Normalized<Value>| async move {
                        HttpResponse::Ok().json(body)
                    })),
            ),
        )
        .await;
        let lenient = test::TestRequest::post()
            .uri("/names")
            .set_json(json!({ "name": "Ada" }))
            .to_request();
        assert_eq!(test::call_service(&app, lenient).await.status(), StatusCode::OK);
        let strict = test::TestRequest::post()
            .uri("/names?strict")
            .set_json(json!({ "name": "Ada" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, strict).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn rejections_are_logged_at_the_production_level() {
        let log = tempfile::NamedTempFile::new().expect("log file");
        let writer = log.reopen().expect("reopen log");
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(writer))
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let req = test::TestRequest::post().set_json(json!({ "name": "Ada" }));
        let (status, _) = call(None, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let contents = std::fs::read_to_string(log.path()).expect("read log");
        assert!(contents.contains("request body failed validation"));
        assert!(contents.contains("field=email"));
    }
}
