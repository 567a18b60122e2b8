// Adapters layer: concrete implementations of the domain ports (http providers, sqlite store).

pub mod http;
pub mod storage;
