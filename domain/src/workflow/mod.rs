//! Workflow domain module
//!
//! A workflow is a directed acyclic graph of tool invocations. Each step
//! names a tool, binds its parameters to literals, initial parameters or
//! prior step results, and lists the steps it depends on.
//!
//! ```text
//! Workflow ──compile──▶ CompiledWorkflow ──execute──▶ WorkflowResult
//!  (steps,               (validated graph,            (stepResults,
//!   templates)            parsed bindings)             failedStepId?)
//! ```
//!
//! Execution itself lives in the application layer (`WorkflowEngine`); this
//! module only holds the pure parts: entities, bindings and validation.

pub mod binding;
pub mod entities;
pub mod error;
pub mod validation;

pub use binding::{
    ParamBinding, PathSegment, Reference, ResolutionScope, ResolvedParams, StepBindings, StepPath,
    StepResults, extract_template, resolve_template_variables, resolve_variable,
};
pub use entities::{StepState, StepTransform, Workflow, WorkflowResult, WorkflowStep};
pub use error::WorkflowError;
pub use validation::{CompiledStep, CompiledWorkflow};
