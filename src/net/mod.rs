//! Network layer: transport with the refresh-and-replay interceptor, the
//! typed provider client, and the native HTTP backend.

pub mod api;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::ApiClient;
pub use error::ApiError;
pub use http::ReqwestBackend;
pub use transport::{ApiRequest, ApiResponse, HttpBackend, PendingRequest, Transport};
