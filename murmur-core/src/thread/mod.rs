//! Thread Reconciliation
//!
//! View-model layer: merges REST history, live pushes and optimistic sends
//! into one ordered, de-duplicated sequence per conversation, and keeps the
//! inbox in a stable order.

mod conversation;
mod inbox;
mod view;

pub use conversation::Conversation;
pub use inbox::InboxView;
pub use view::{LiveOutcome, PendingEntry, ThreadEntry, ThreadView};
