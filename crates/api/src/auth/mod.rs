//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token validation (and generation, used by tests
//!   and local tooling; the service never issues tokens over HTTP).

pub mod jwt;
