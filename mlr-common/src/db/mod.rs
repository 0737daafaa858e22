//! Relational store: connection setup, schema, stored procedures, gateway

pub mod gateway;
pub mod init;
pub mod mapper;
pub mod models;
pub mod procedures;
pub mod scripts;

pub use gateway::{Gateway, Procedure, StoreCode, StoreError, StoreResult};
pub use init::{connect, open};
