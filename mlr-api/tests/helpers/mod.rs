//! Shared test helpers for mlr-api integration tests

#![allow(dead_code)]

pub mod app;
