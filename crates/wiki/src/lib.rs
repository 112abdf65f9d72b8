//! The wiki's cache-coherent stores.
//!
//! [`CredentialStore`] and [`PageVersionStore`] read through and write
//! through a shared [`versawiki_cache::CoherentCache`] in front of the
//! durable stores. [`WikiContext`] bundles them with the session codec and is
//! what the HTTP layer holds; there is no global state.

pub mod context;
pub mod credentials;
pub mod error;
pub mod keys;
pub mod pages;

pub use context::WikiContext;
pub use credentials::CredentialStore;
pub use error::{WikiError, WikiResult};
pub use pages::{PageVersionStore, SaveOutcome};
