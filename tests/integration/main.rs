//! Integration tests
//!
//! `router_tests` run in-process against the router with no live services.
//! `api_tests` talk to a running server (started with the bootstrap account
//! `admin` / `admin`) and are ignored by default.

mod api_tests;
mod router_tests;
