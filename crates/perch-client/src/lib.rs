//! Client data layer for the Perch social feed API.
//!
//! All server reads and writes are funneled through a [`cache::QueryCache`]
//! keyed by logical resource names. Mutations such as
//! [`profile::ProfileUpdater`] invalidate the cache entries they affect so
//! that subscribed consumers refetch fresh state instead of rendering a
//! pre-update snapshot.

pub mod auth;
pub mod cache;
pub mod http;
mod lock;
pub mod notify;
pub mod profile;

pub use auth::AuthSession;
pub use cache::{QueryCache, QueryKey};
pub use http::{ApiClient, ClientError};
pub use notify::{Notifier, TracingNotifier};
pub use profile::ProfileUpdater;
