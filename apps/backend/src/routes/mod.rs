//! HTTP route handlers

pub mod answers;
pub mod auth;
pub mod practices;
