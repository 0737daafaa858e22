//! # MLR Common Library
//!
//! Shared code for the Music Label Registry service:
//! - Relational store: schema, stored-procedure layer and gateway
//! - Row types and the row-to-record mapper
//! - API record and payload types
//! - Configuration loading

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use db::gateway::{Gateway, StoreCode, StoreError, StoreResult};
pub use error::{Error, Result};
