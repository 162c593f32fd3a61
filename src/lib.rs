//! gitea-updater - Gitea backend for git-based update hosts
//!
//! This library provides the adapter an update host calls to talk to a
//! self-hosted Gitea instance:
//! - Endpoint templates resolved against a repository descriptor
//! - Forge JSON normalized into canonical records
//! - Archive download links for branches and tags
//! - Access-token resolution and request headers
//! - The update-check cycle that stores derived fields back on the host

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod forge;
pub mod options;
pub mod output;
pub mod progress;
pub mod update;
