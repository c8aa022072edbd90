//! Check-protocol engine for lint and breaking-change rule providers.
//!
//! Providers declare rules in a [`Spec`] and serve them with a
//! [`ServiceHandler`]; callers reach one provider through a [`Client`] or
//! several through a [`MultiClient`].

pub mod annotation;
pub mod checktest;
pub mod checkutil;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod file;
pub mod id;
pub mod location;
pub mod options;
pub mod plugin;
pub mod request;
pub mod response;
pub mod rule;
pub mod rules;
pub mod server;
pub mod spec;
pub mod transport;
pub mod wire;
pub mod writer;

pub use annotation::Annotation;
pub use client::{CheckClient, Client, ClientOptions, MultiClient};
pub use context::CallContext;
pub use error::{CheckError, ErrorCode, Result};
pub use file::File;
pub use location::Location;
pub use options::Options;
pub use request::Request;
pub use response::Response;
pub use rule::{Category, Rule, RuleType};
pub use server::{Server, ServiceHandler};
pub use spec::{CategorySpec, RuleHandler, RuleHandlerFn, RuleSpec, Spec};
pub use transport::{CommandTransport, LocalTransport, Transport};
pub use writer::{AnnotationBuilder, ResponseCollector, ResponseWriter};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CALL_ERROR: i32 = 1;
pub const EXIT_SPEC_ERROR: i32 = 2;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
