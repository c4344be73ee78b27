pub mod connection;
pub mod hub;
pub mod notifications;

pub use hub::Hub;
