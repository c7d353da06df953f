//! PostgREST-style REST client library.
//!
//! [`Query`] is an immutable request descriptor built by value-returning
//! methods; [`RestClient`] executes a finished descriptor against a table
//! endpoint and normalizes the response. Keeping the descriptor separate
//! from execution means a query is plain data: cloneable, inspectable, and
//! executable more than once.

pub mod client;
pub mod query;

pub use client::{RestClient, RestError};
pub use query::{Command, Query};
