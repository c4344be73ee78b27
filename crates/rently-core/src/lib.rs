pub mod conversation;
pub mod error;
pub mod inbox;
pub mod provider;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::ChatError;
