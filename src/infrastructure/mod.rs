//! Adapters for the gateway ports: a reqwest-backed REST client for real
//! deployments and an in-memory scripted gateway for tests.

pub mod http;
pub mod scripted;
