//! # NM-02 Work Cache
//!
//! Precomputed proof-of-work, handed out to at most one consumer per key.
//!
//! **Architecture:** Hexagonal (ports and adapters)
//!
//! ## Why
//!
//! Work takes seconds to compute. Computing it as soon as a frontier is
//! known takes it off the critical path of the next send or receive. The
//! hazard is reuse: two operations building on the same frontier with the
//! same work produce two competing blocks, and the network rejects one.
//! The cache therefore marks a key *in use* when it is consumed; every other
//! consumer misses until the holder calls `invalidate`, and a miss simply
//! means "generate your own".
//!
//! ## Operations
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `precompute(root, kind, force)` | generate and store; a fresh entry short-circuits unless forced |
//! | `peek(root, kind)` | read without marking (inspection only) |
//! | `consume(root, kind)` | atomically check in-use, check presence, mark in use |
//! | `invalidate(root, kind)` | drop entry and marker after submitting |
//! | `obtain(root, kind)` | `consume`, else generate within the per-kind deadline |
//! | `sweep_expired()` | periodic cleanup, driven by `sweep_task` |
//!
//! Keys are `(root, kind)`: the root is the frontier, or the account key for
//! an open block; the kind picks the difficulty threshold.
//!
//! ## Work sources
//!
//! | `WorkSource` | Generator |
//! |--------------|-----------|
//! | `node` | `NodeWorkGenerator` (RPC `work_generate`) |
//! | `local` | `LocalWorkGenerator` (nm-compute, rayon) |
//! | `node_with_local_fallback` | `FallbackWorkGenerator` |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    build_generator, FallbackWorkGenerator, LocalWorkGenerator, NodeWorkGenerator,
};
pub use domain::{
    CacheStatsSnapshot, ConfigError, WorkCacheConfig, WorkError, WorkKey, WorkSettings,
    WorkSource,
};
pub use ports::{SystemTimeSource, TimeSource, WorkGenerator};
pub use service::{sweep_task, ObtainedWork, WorkCache, WorkOrigin};
