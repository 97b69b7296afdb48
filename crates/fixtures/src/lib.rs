//! `fixtures` crate — in-memory reference implementations of every `ports`
//! capability, used by engine tests and the CLI's local `run` command.
//!
//! Call-recording test doubles driven by a programmer-specified script
//! rather than a real backend. Nothing here is meant to survive a process
//! restart.

pub mod action;
pub mod agent;
pub mod lease;
pub mod observer;
pub mod repository;
pub mod review;

pub use action::ScriptedActionHandler;
pub use agent::ScriptedAgent;
pub use lease::InMemoryLeaseManager;
pub use observer::{NoopObserver, RecordingObserver};
pub use repository::{InMemoryRubricRepository, InMemorySnapshotRepository, InMemoryWorkflowRepository};
pub use review::{AutoApproveReviewHandler, ScriptedReviewHandler};
