//! Namespace Coordination Module
//!
//! Ties the local cache, peer routing and the loader into one read path.
//!
//! ## Read Path
//! 1. **Validate**: empty keys are rejected.
//! 2. **Local**: a hit in the group's own LRU returns immediately.
//! 3. **Peer**: on a miss, the `PeerPicker` names the owning node. Its value is
//!    returned as-is and is not cached here. Peer failures are logged and
//!    absorbed.
//! 4. **Loader**: when this node owns the key, or the peer failed, the loader
//!    computes the value and it is added to the local cache.
//!
//! ## Submodules
//! - **`group`**: The per-namespace coordinator.
//! - **`registry`**: Namespace name to group lookup.
//! - **`peers`**: Contracts implemented by the transport layer.
//! - **`stats`**: Request counters.
//! - **`error`**: Errors surfaced to callers.

pub mod error;
pub mod group;
pub mod peers;
pub mod registry;
pub mod stats;

#[cfg(test)]
mod tests;
