//! Client library for a time-tracking backend: timer arithmetic, the HTTP
//! gateway, a read-through query cache and the session guard.

pub mod cache;
pub mod client;
pub mod dev_backend;
pub mod domain;
pub mod dto;
pub mod elapsed;
pub mod error;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod ticker;

pub use cache::{Invalidate, QueryCache, QueryData, QueryKey};
pub use client::ApiClient;
pub use dev_backend::DevBackend;
pub use error::{Error, Result};
pub use session::{guard, FileTokenStore, MemoryTokenStore, Route, Session, SessionState, TokenStore};
pub use store::Store;
pub use ticker::ElapsedTicker;
