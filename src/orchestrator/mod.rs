//! State machines driving the UI-facing surface: the plan flow and the chat
//! conversation. Each owns its state exclusively and publishes snapshots
//! through a watch channel.

mod chat;
mod plan;

pub use chat::{CHAT_APOLOGY, CHAT_GREETING, ChatOrchestrator, ChatSnapshot, SubmitOutcome};
pub use plan::{PLAN_FAILURE_MESSAGE, PlanOrchestrator, PlanSnapshot, PlanStatus, RefreshOutcome};

#[cfg(test)]
mod tests;
