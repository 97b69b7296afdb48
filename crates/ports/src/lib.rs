//! `ports` crate — capability traits the execution core treats as external
//! collaborators.
//!
//! Every capability gets the same treatment: a `Send + Sync` async trait,
//! owned by an explicit environment value threaded through calls rather
//! than any global registry.
//!
//! `NodeExecutor`/`ExecutionContext` are *not* here: they are an
//! engine-internal dispatch mechanism, not an external collaborator, so
//! they live in the `engine` crate next to the registries that populate an
//! `ExecutionContext`.

pub mod action_handler;
pub mod agent;
pub mod error;
pub mod lease_manager;
pub mod observer;
pub mod repository;
pub mod review;

pub use action_handler::{ActionHandler, ActionResult};
pub use agent::{Agent, AgentProvider};
pub use error::PortsError;
pub use lease_manager::LeaseManager;
pub use observer::Observer;
pub use repository::{RubricRepository, SnapshotRepository, WorkflowRepository};
pub use review::{ReviewDecision, ReviewHandler};
