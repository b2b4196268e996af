pub mod errors;
pub(crate) mod hashing;
pub mod models;
pub mod ports;
pub mod service;
