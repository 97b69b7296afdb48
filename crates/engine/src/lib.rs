//! Execution core: node-variant executors, transition/rubric evaluation,
//! the plan and review controllers, and the top-level driver that ties them
//! together.

pub mod config;
pub mod context;
pub mod error;
pub mod json_extract;
pub mod nodes;
pub mod plan;
pub mod recovery;
pub mod registry;
pub mod review;
pub mod rubric;
pub mod template;
pub mod transition;
pub mod validate;
pub mod validate_output;
pub mod workflow_executor;

pub use config::EngineConfig;
pub use context::{CooperativeExecutor, ExecutionContext, GenericNodeHandler, NodeExecutor};
pub use error::{EngineError, RubricError, TransitionError};
pub use registry::Registry;
pub use workflow_executor::{Engine, ExecutionOutcome};
