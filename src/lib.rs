/// Country Explorer - country lookup, comparison and favorites service
///
/// Looks up countries through the REST Countries API, compares populations,
/// and keeps a list of favorite countries with optional hosted pictures.

pub mod api;
pub mod config;
pub mod context;
pub mod countries;
pub mod db;
pub mod error;
pub mod favorites;
pub mod media;
pub mod metrics;
pub mod server;
