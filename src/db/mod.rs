//! MongoDB access
//!
//! [`mongo`] wraps the driver; [`schemas`] describes the documents this
//! service reads from the CMS collections and the airdrop documents it owns.

pub mod mongo;
pub mod schemas;

pub use mongo::{IntoIndexes, MongoClient, MongoCollection, MutMetadata};
