pub mod chat;
pub mod service;
pub mod transport;
