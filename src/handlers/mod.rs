//! HTTP request handlers
//!
//! This module contains the axum handlers behind every API route

pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod listings;
pub mod multipart;
pub mod posts;
pub mod profiles;
