// Adapters layer: concrete implementations for external systems (courier backends, shared http client).

pub mod couriers;
pub mod http;
