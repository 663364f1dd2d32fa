#![doc = "The `libris` library crate."]
#![doc = ""]
#![doc = "Library back office core: the borrow lifecycle engine, notifications, bookmarks,"]
#![doc = "read projections, catalog and account management, plus the HTTP routing, authentication"]
#![doc = "and error handling that expose them. The binary (`main.rs`) wires these into a server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use crate::error::{AppError, ServiceError};
pub use crate::state::AppState;
