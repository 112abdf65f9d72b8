//! Domain core for versawiki.
//!
//! Zero I/O: error taxonomy, the session/integrity codec, salted password
//! hashing, input validation and the rules that govern a page's
//! append-only history. The store, cache and HTTP crates build on these.

pub mod error;
pub mod hashing;
pub mod history;
pub mod integrity;
pub mod password;
pub mod types;
pub mod validation;
