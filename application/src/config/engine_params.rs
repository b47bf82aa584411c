//! Workflow engine parameters.
//!
//! [`EngineParams`] groups the knobs that control how
//! [`WorkflowEngine`](crate::use_cases::execute_workflow::WorkflowEngine)
//! schedules steps and treats bindings that resolve to nothing.

use serde::{Deserialize, Serialize};

/// What happens when a `{{...}}` reference resolves to nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedBindingPolicy {
    /// The step fails with `INVALID_PARAMETERS`
    #[default]
    Fail,
    /// The parameter is dropped and the step still runs
    Omit,
}

impl UnresolvedBindingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnresolvedBindingPolicy::Fail => "fail",
            UnresolvedBindingPolicy::Omit => "omit",
        }
    }
}

impl std::fmt::Display for UnresolvedBindingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnresolvedBindingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(UnresolvedBindingPolicy::Fail),
            "omit" => Ok(UnresolvedBindingPolicy::Omit),
            other => Err(format!("unknown unresolved binding policy '{}' (expected fail or omit)", other)),
        }
    }
}

/// Workflow execution parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineParams {
    /// Upper bound on steps running at once; 1 (the default) runs steps
    /// one by one in declaration order.
    pub max_parallel_steps: usize,
    pub unresolved_binding: UnresolvedBindingPolicy,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            max_parallel_steps: 1,
            unresolved_binding: UnresolvedBindingPolicy::Fail,
        }
    }
}

impl EngineParams {
    /// One step at a time, in declaration order
    pub fn sequential() -> Self {
        Self::default()
    }

    // ==================== Builder Methods ====================

    pub fn with_max_parallel_steps(mut self, max: usize) -> Self {
        self.max_parallel_steps = max;
        self
    }

    pub fn with_unresolved_binding(mut self, policy: UnresolvedBindingPolicy) -> Self {
        self.unresolved_binding = policy;
        self
    }

    /// Effective concurrency, never below one
    pub fn parallelism(&self) -> usize {
        self.max_parallel_steps.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = EngineParams::default();
        assert_eq!(params.max_parallel_steps, 1);
        assert_eq!(params.unresolved_binding, UnresolvedBindingPolicy::Fail);
    }

    #[test]
    fn test_parallelism_floor() {
        assert_eq!(EngineParams::default().with_max_parallel_steps(0).parallelism(), 1);
        assert_eq!(EngineParams::sequential().parallelism(), 1);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("OMIT".parse::<UnresolvedBindingPolicy>().unwrap(), UnresolvedBindingPolicy::Omit);
        assert_eq!("fail".parse::<UnresolvedBindingPolicy>().unwrap(), UnresolvedBindingPolicy::Fail);
        assert!("skip".parse::<UnresolvedBindingPolicy>().is_err());
    }
}
