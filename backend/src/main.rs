//! Backend entry-point: loads settings, installs tracing and runs the server.

mod server;

use actix_web::web;
use tracing::info;

use server::{ServerConfig, create_server};
use userdesk::inbound::http::health::HealthState;
use userdesk::outbound::persistence::{DbPool, PoolConfig};
use userdesk::settings::AppSettings;
use userdesk::telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let settings = AppSettings::load_with_args(std::env::args_os()).map_err(std::io::Error::other)?;
    let run_mode = settings.run_mode();
    telemetry::init(run_mode, &settings.log_dir()).map_err(std::io::Error::other)?;

    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let locale = settings.locale().map_err(std::io::Error::other)?;
    let mut config = ServerConfig::new(bind_addr, run_mode, locale);
    if let Some(url) = settings.database_url() {
        info!("using PostgreSQL user repository");
        config = config.with_db_pool(DbPool::new(PoolConfig::new(url)));
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
