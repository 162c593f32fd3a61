//! Core domain models for gitea-updater
//!
//! This module contains the fundamental types used throughout the application:
//! - Forge identities
//! - Repository descriptors supplied by the update host
//! - Canonical records returned to the host
//! - Raw responses and normalization outcomes

mod descriptor;
mod forge;
mod records;
mod response;

pub use descriptor::RepositoryDescriptor;
pub use forge::ForgeKind;
pub use records::{
    AssetMap, BranchInfo, BranchMap, ContentListing, Credentials, MetaRecord, ReleaseAsset,
    RepoTypeData, RollbackMap, TagList,
};
pub use response::{Headers, Normalized, RawResponse};
