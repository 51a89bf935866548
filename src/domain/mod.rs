//! Domain types and the ports the application layer depends on.

pub mod account;
pub mod currency;
pub mod ports;
pub mod requests;
pub mod transaction;
