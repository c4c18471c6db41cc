//! HTTP Transport Module
//!
//! Moves cached bytes between nodes.
//!
//! ## Core Concepts
//! - **`HttpPool`**: Holds the hash ring over the configured peer URLs and picks
//!   the owner of a key. Implements `PeerPicker` for the groups of this node.
//! - **`HttpGetter`**: `reqwest` client bound to one peer. Implements `PeerGetter`.
//! - **Handlers**: `axum` routes serving peer fetches out of the local registry,
//!   plus the client-facing API and stats endpoints.

pub mod handlers;
pub mod pool;
pub mod protocol;
