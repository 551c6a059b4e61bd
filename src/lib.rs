//! Media and catalog backend for a travel agency site
//!
//! Issues short-lived signatures that let clients upload images straight to
//! the media provider, uploads files with those signatures, and serves a
//! read-only catalog of accommodations, destinations and itineraries.

pub mod catalog;
pub mod cdn;
pub mod config;
pub mod error;
pub mod mime;
pub mod models;
pub mod routes;
pub mod signature;
pub mod signing;
pub mod uploader;

pub use error::{Error, Result};
