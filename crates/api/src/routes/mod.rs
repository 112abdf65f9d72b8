pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the wiki route tree.
///
/// Route hierarchy:
///
/// ```text
/// /signup                        register and log in (POST)
/// /login                         log in (POST)
/// /logout                        log out (POST)
///
/// /_edit/                        edit the root page (GET, POST; requires auth)
/// /_edit/{*path}                 edit a page (GET, POST; requires auth)
/// /_history/                     versions of the root page
/// /_history/{*path}              versions of a page
///
/// /                              view the root page
/// /{*path}                       view a page (?version=N)
/// ```
///
/// Static routes win over the catch-all, so a page cannot live at one of
/// the reserved paths above.
pub fn wiki_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/_edit/",
            get(handlers::pages::edit_root_form).post(handlers::pages::save_root),
        )
        .route(
            "/_edit/{*path}",
            get(handlers::pages::edit_form).post(handlers::pages::save),
        )
        .route("/_history/", get(handlers::pages::history_root))
        .route("/_history/{*path}", get(handlers::pages::history))
        .route("/", get(handlers::pages::view_root))
        .route("/{*path}", get(handlers::pages::view))
}
