//! Online bookstore REST backend library.
//!
//! This crate provides the API as a library so the binary, the CLI and the
//! integration tests share the same services, stores and router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
