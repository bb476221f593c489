//! Seen-set persistence and the per-run dedup session.
//!
//! The seen-set is a plain-text file with one identifier per line. A
//! [`DedupSession`] loads it as the *prior* generation, collects identifiers
//! confirmed during the run as the *current* generation, and writes exactly
//! one of two payloads when it ends:
//!
//! - committed: *current* only, so identifiers that rolled off every feed are
//!   forgotten;
//! - abandoned or dropped without finishing: *prior* ∪ *current*, so a failed
//!   run never loses knowledge of items seen before it started.

mod error;
mod session;
mod store;

pub use error::SeenError;
pub use session::{DedupSession, SessionEnd, SessionSummary};
pub use store::{FileSeenStore, SeenSet, SeenStore};
