pub mod http;
pub mod tickets_api;
