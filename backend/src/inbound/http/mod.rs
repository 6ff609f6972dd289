//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod error;
pub mod favorites;
pub mod health;
pub mod projects;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;
pub mod validation;

pub use error::ApiResult;
