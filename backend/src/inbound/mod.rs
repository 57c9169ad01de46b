//! Inbound adapters that translate HTTP requests into driving-port calls
//! while keeping actix-web details at the edge.

pub mod http;
