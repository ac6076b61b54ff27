//! HTTP server configuration object.

use std::net::SocketAddr;

use userdesk::domain::validation::Locale;
use userdesk::outbound::persistence::DbPool;
use userdesk::settings::RunMode;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) run_mode: RunMode,
    pub(crate) locale: Locale,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr, run_mode: RunMode, locale: Locale) -> Self {
        Self {
            bind_addr,
            run_mode,
            locale,
            db_pool: None,
        }
    }

    /// Persist users in PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
