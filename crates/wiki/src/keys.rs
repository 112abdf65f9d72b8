//! Cache key layout.
//!
//! Users are cached twice, by name and by id. The prefixes keep an
//! all-digit username from ever sharing a key with a user id.

use versawiki_core::types::DbId;

pub fn user_by_name(username: &str) -> String {
    format!("user:name:{username}")
}

pub fn user_by_id(id: DbId) -> String {
    format!("user:id:{id}")
}

pub fn page(path: &str) -> String {
    format!("page:{path}")
}
