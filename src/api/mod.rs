//! REST client for the meetings tool entity endpoints

pub mod client;
mod error;
pub mod live;
pub mod meetings;
pub mod perms;
pub mod recordings;
pub mod settings;

pub use client::SiteClient;
pub use error::ClientError;
