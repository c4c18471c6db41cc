//! Distributed Read-Through Cache Library
//!
//! Core modules of a cache node. The binary (`main.rs`) wires them together.
//!
//! ## Architecture Modules
//! - **`cache`**: Byte-budgeted LRU storage and the immutable `ByteView` value.
//! - **`ring`**: Consistent hash ring assigning keys to peers with virtual replicas.
//! - **`group`**: Namespaces ("groups") implementing the read path: local cache,
//!   then owning peer, then the loader. Also the namespace registry.
//! - **`transport`**: HTTP peer pool and client (`reqwest`) and the `axum`
//!   handlers other nodes fetch from.
//! - **`config`**: Command line and environment configuration of a node.

pub mod cache;
pub mod config;
pub mod group;
pub mod ring;
pub mod transport;
