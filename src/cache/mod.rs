//! Content-addressed cache for installed bundles
//!
//! An installed-dependency directory (`.bundle`) is archived, stored under
//! a key derived from the lockfile bytes, and restored later on any machine
//! with the same lockfile and architecture.
//!
//! # Cache Key
//!
//! `{prefix}_{sha1(lockfile)}_{arch}`, stored as `{key}.tar.gz`. Changing a
//! single byte of the lockfile changes the key.
//!
//! # Bundle States
//!
//! | State | Bundle dir | Marker (`.bundle/.cache`) |
//! |-------|------------|---------------------------|
//! | Missing | absent | - |
//! | PresentUncached | present | absent |
//! | PresentCached | present | present |

pub mod archive;
pub mod key;
pub mod orchestrator;
pub mod state;

pub use archive::StagingArchive;
pub use key::{host_arch, CacheKey};
pub use orchestrator::{plan, Orchestrator, Outcome, Phase, Plan};
pub use state::BundleState;
