//! HTTP transport implementation.
//!
//! This module provides the reqwest client and the wire types of the
//! authentication endpoints.

pub(crate) mod client;
pub(crate) mod endpoints;
