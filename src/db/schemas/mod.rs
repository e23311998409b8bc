//! Database schemas
//!
//! Read models for the CMS collections, plus the airdrop snapshot documents
//! written by this service.

mod activity;
mod airdrop;
mod metadata;

pub use activity::{
    AuthorCountDoc, EventDoc, UserDoc, COMMENT_COLLECTION, PAGE_COLLECTION, REVISION_COLLECTION,
    USER_COLLECTION,
};
pub use airdrop::{AirdropDoc, AIRDROP_COLLECTION};
pub use metadata::Metadata;
