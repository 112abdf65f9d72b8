use std::sync::Arc;

use versawiki_wiki::WikiContext;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Credential and page stores plus the session codec.
    pub wiki: WikiContext,
    pub config: Arc<ServerConfig>,
}
