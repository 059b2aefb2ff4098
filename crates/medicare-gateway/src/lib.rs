//! Medicare Gateway crate - remote chat, analysis and research calls.
//!
//! [`Gateway`] enforces the per-kind pending flags, blank-input and size
//! checks, turns raw backend responses into domain values with
//! placeholders, and reports failures through the notification channel.
//! The backend itself sits behind the [`RemoteService`] trait, with an
//! HTTP implementation and a scripted mock.

pub mod error;
pub mod gateway;
pub mod http;
pub mod mapping;
pub mod mock;
pub mod pending;
pub mod service;

pub use error::GatewayError;
pub use gateway::{Gateway, Settled, SkipReason};
pub use http::HttpService;
pub use mock::{MockService, RecordedCall};
pub use pending::{PendingFlag, PendingGuard};
pub use service::RemoteService;
