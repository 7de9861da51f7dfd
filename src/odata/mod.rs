//! OData protocol translation layer
//!
//! Maps OData v2-shaped HTTP requests against the declared entity model into
//! storage queries and mutations, and maps results back into `d`-envelope
//! JSON responses. This module performs no transport or connection work.

pub mod errors;
pub mod filter;
pub mod handler;
pub mod mutation;
pub mod query;
pub mod response;
pub mod time;

pub use errors::{GatewayError, GatewayResult};
pub use filter::{CompareOp, FilterExpr, FilterValue};
pub use handler::{parse_resource_path, ODataGateway, ResourcePath};
pub use query::{translate, OrderKey, QuerySpec};
pub use response::{collection_envelope, singleton_envelope};
