//! Pipeline stage implementations.
//!
//! Export and persistence run in the background; the gate and the
//! committer run on the UI domain.

mod commit;
mod evaluate;
mod export;
mod persist;

pub use commit::{CommitEffects, Notification, SelectionCommitter};
pub use evaluate::{EligibilityGate, EligibilityRules, Verdict};
pub use export::{ExportStage, FinalizedVideo};
pub use persist::PersistenceStage;
