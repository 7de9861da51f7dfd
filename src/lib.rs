//! eventgate - an OData v2 gateway over IoT event collections
//!
//! Exposes the `event`, `event_rule` and `command` collections through a
//! read/write OData-style HTTP protocol, gated by basic credentials and
//! CORS policy. The protocol translation core lives in [`odata`]; transport,
//! storage and admission are thin collaborators around it.

pub mod auth;
pub mod cli;
pub mod config;
pub mod odata;
pub mod schema;
pub mod server;
pub mod storage;
