//! NapCat OneBot HTTP API client.

mod client;
mod error;

pub use client::NapCatClient;
pub use error::NapCatError;
