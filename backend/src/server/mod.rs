//! Server construction and middleware wiring.
//!
//! Middleware order, outermost first: `Trace` (so every log line and error
//! response carries the trace id), then `NormalizeErrors`. Body validation
//! is attached per route.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, body::MessageBody, web};
use tracing::info;

#[cfg(debug_assertions)]
use userdesk::ApiDoc;
use userdesk::domain::UserService;
use userdesk::domain::ports::UserRepository;
use userdesk::domain::validation::Localizer;
use userdesk::inbound::http::configure;
use userdesk::inbound::http::error::ErrorNormalizer;
use userdesk::inbound::http::fallback::unmatched_route;
use userdesk::inbound::http::health::HealthState;
use userdesk::inbound::http::state::HttpState;
use userdesk::middleware::{NormalizeErrors, Trace};
use userdesk::outbound::cache::InMemoryCache;
use userdesk::outbound::memory::InMemoryUserRepository;
use userdesk::outbound::persistence::DieselUserRepository;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_http_state(config: &ServerConfig) -> HttpState {
    let users: Arc<dyn UserRepository> = match &config.db_pool {
        Some(pool) => Arc::new(DieselUserRepository::new(pool.clone())),
        None => {
            info!("no database configured; users are kept in memory");
            Arc::new(InMemoryUserRepository::default())
        }
    };
    HttpState::new(UserService::new(users, Arc::new(InMemoryCache::default())))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    localizer: web::Data<Localizer>,
    normalizer: ErrorNormalizer,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        localizer,
        normalizer,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(localizer)
        .wrap(NormalizeErrors::new(normalizer))
        .wrap(Trace)
        .configure(configure)
        .default_service(web::to(unmatched_route));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct the HTTP server and mark it ready once bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    let ServerConfig {
        bind_addr,
        run_mode,
        locale,
        db_pool: _,
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        localizer: web::Data::new(Localizer::new(locale)),
        normalizer: ErrorNormalizer::new(run_mode),
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, ?run_mode, ?locale, "listening");
    health_state.mark_ready();
    Ok(server)
}
