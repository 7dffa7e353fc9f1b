//! The MiniAgent core loop.
//!
//! Each iteration generates a thought, turns it into exactly one validated
//! command, runs that command and records the outcome in memory:
//!
//! ```text
//! ThoughtGenerator ──▶ DecisionEngine ──▶ Dispatcher ──▶ MemoryStore
//!        ▲                  (retry / repair / give up)         │
//!        └──────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod debug;
pub mod decision;
pub mod dispatch;
pub mod loop_runner;
pub mod prompts;
pub mod thought;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::ContextBuilder;
pub use debug::DebugRecorder;
pub use decision::{Decision, DecisionEngine, DecisionSettings};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use loop_runner::{AgentLoop, IterationOutcome};
pub use thought::ThoughtGenerator;
