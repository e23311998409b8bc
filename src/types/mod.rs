//! Shared types for the rewards service

pub mod error;

pub use error::{Result, RewardsError};
