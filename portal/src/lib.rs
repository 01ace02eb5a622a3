//! Native client for the email portal REST API.
//!
//! ARCHITECTURE
//! ============
//! Leaf first: `http::ApiClient` wraps every outbound call and owns the auth
//! headers and 401 handling. `session::SessionContext` derives identity from
//! storage; `branding::BrandingContext` and `navigation::NavigationGuard`
//! sit beside it. `Portal` binds them together the way the web app's
//! provider tree does, and the `api` modules are thin typed wrappers over
//! REST resources.

pub mod api;
pub mod branding;
pub mod config;
pub mod error;
pub mod http;
pub mod navigation;
pub mod poll;
pub mod portal;
pub mod session;
pub mod storage;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::ApiClient;
pub use portal::Portal;
pub use session::{Credentials, SessionContext};

#[cfg(test)]
pub(crate) mod test_support;
