//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain services and remain testable without I/O.

use crate::domain::UserService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: UserService,
}

impl HttpState {
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use userdesk::domain::UserService;
    /// use userdesk::inbound::http::state::HttpState;
    /// use userdesk::outbound::cache::InMemoryCache;
    /// use userdesk::outbound::memory::InMemoryUserRepository;
    ///
    /// let service = UserService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(InMemoryCache::default()),
    /// );
    /// let state = HttpState::new(service);
    /// let _users = state.users.clone();
    /// ```
    pub fn new(users: UserService) -> Self {
        Self { users }
    }
}
