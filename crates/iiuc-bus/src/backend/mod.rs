//! Client for the hosted auth and table service.

mod auth;
mod client;
mod error;
mod tables;
mod types;

pub use auth::SignUpForm;
pub use client::HostedClient;
pub use error::{AuthError, BackendError};
pub use types::*;
