//! HTTP-facing record and payload types

pub mod types;
