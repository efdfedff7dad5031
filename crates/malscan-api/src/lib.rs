//! Malscan API Library
//!
//! HTTP handlers, the scan workflow, report email delivery, and application setup.

mod api_doc;
mod handlers;
pub mod services;
pub mod setup;
pub mod utils;

pub mod error;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
