//! Default service for requests that match no route.
//!
//! API paths answer with a JSON 404, `/404` is the plain not-found page and
//! everything else is redirected there.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse};
use tracing::warn;

use crate::inbound::http::envelope::RouteNotFoundEnvelope;

/// Message returned for unknown API endpoints.
pub const ROUTE_NOT_FOUND: &str = "This endpoint is not correct";

/// Path of the plain not-found page.
pub const NOT_FOUND_PAGE: &str = "/404";

/// Answer a request no route claimed.
pub async fn unmatched_route(req: HttpRequest) -> HttpResponse {
    let path = req.path();
    warn!(path, method = %req.method(), "no route matched");
    if path == NOT_FOUND_PAGE {
        return HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body("Not Found");
    }
    if path.contains("/api") {
        return HttpResponse::NotFound().json(RouteNotFoundEnvelope {
            error: StatusCode::NOT_FOUND.as_u16(),
            success: false,
            message: ROUTE_NOT_FOUND.to_owned(),
        });
    }
    HttpResponse::Found()
        .insert_header((header::LOCATION, NOT_FOUND_PAGE))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};
    use rstest::rstest;
    use serde_json::json;

    async fn call(uri: &str) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .service(web::scope("/api").route("/users", web::get().to(HttpResponse::Ok)))
                .default_service(web::to(unmatched_route)),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await
    }

    #[rstest]
    #[case("/api/nope")]
    #[case("/api")]
    #[case("/v2/api/users")]
    #[actix_web::test]
    async fn unknown_api_paths_get_a_json_404(#[case] uri: &str) {
        let res = call(uri).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({ "error": 404, "success": false, "message": ROUTE_NOT_FOUND })
        );
    }

    #[actix_web::test]
    async fn other_paths_redirect_to_the_not_found_page() {
        let res = call("/somewhere").await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some(NOT_FOUND_PAGE)
        );
    }

    #[actix_web::test]
    async fn not_found_page_is_plain_text() {
        let res = call(NOT_FOUND_PAGE).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(res).await, web::Bytes::from_static(b"Not Found"));
    }
}
