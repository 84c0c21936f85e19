//! HTTP API layer for arcana.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, users, posts, ratings, comments, favourites,
//!   notifications, stories, privacy policy and the admin back-office
//! - **Extractors**: authentication and pagination
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
