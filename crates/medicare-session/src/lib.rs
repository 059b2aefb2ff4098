//! Medicare Session crate - per-view state and the coordinator that owns it.
//!
//! [`ConversationSession`], [`AnalysisSession`] and [`SearchSession`] are
//! plain state holders. [`Coordinator`] routes user intents to them, runs
//! remote work through the gateway and camera, and applies the results.

pub mod analysis;
pub mod conversation;
pub mod coordinator;
pub mod search;
pub mod slot;

pub use analysis::{AnalysisSession, SectionView};
pub use conversation::{ConversationSession, Delivery, Entry};
pub use coordinator::{research_item, Completion, Coordinator, Dispatch, Intent, EXTRACTED_ITEM};
pub use search::SearchSession;
pub use slot::Slot;
