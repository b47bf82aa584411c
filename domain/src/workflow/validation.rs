//! Registration-time validation of workflow definitions
//!
//! A [`Workflow`] is compiled once into a [`CompiledWorkflow`]: the step graph
//! is checked, bindings are parsed into [`StepBindings`], and the transitive
//! dependencies of each step are computed. Execution only ever sees compiled
//! workflows, so a definition that would fail structurally never starts.
//!
//! A binding that references another step's result makes that step an
//! implicit dependency, on top of the declared `depends_on` list.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::binding::StepBindings;
use super::entities::{Workflow, WorkflowStep};
use super::error::WorkflowError;

/// A step with its parsed bindings and dependency closure
#[derive(Debug, Clone)]
pub struct CompiledStep {
    /// Position in declaration order
    pub index: usize,
    pub step: WorkflowStep,
    pub bindings: StepBindings,
    /// Declared dependencies plus the steps its bindings reference
    pub dependencies: BTreeSet<String>,
    /// Every step this one transitively depends on
    pub ancestors: BTreeSet<String>,
}

impl CompiledStep {
    pub fn id(&self) -> &str {
        &self.step.id
    }

    pub fn is_ready(&self, completed: &HashSet<String>) -> bool {
        self.dependencies.iter().all(|dep| completed.contains(dep))
    }
}

/// A validated workflow ready for execution
#[derive(Debug, Clone)]
pub struct CompiledWorkflow {
    workflow: Workflow,
    steps: Vec<CompiledStep>,
}

impl CompiledWorkflow {
    pub fn compile(workflow: Workflow) -> Result<Self, WorkflowError> {
        let id = workflow.id.clone();

        if workflow.steps.is_empty() {
            return Err(WorkflowError::invalid(&id, "workflow has no steps"));
        }

        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (index, step) in workflow.steps.iter().enumerate() {
            if positions.insert(step.id.as_str(), index).is_some() {
                return Err(WorkflowError::invalid(&id, format!("duplicate step id '{}'", step.id)));
            }
        }

        for step in &workflow.steps {
            for dep in &step.depends_on {
                if dep == &step.id {
                    return Err(WorkflowError::invalid(
                        &id,
                        format!("step '{}' depends on itself", step.id),
                    ));
                }
                if !positions.contains_key(dep.as_str()) {
                    return Err(WorkflowError::invalid(
                        &id,
                        format!("step '{}' depends on unknown step '{}'", step.id, dep),
                    ));
                }
            }
        }

        let bindings: Vec<StepBindings> = workflow.steps.iter().map(|s| StepBindings::parse(&s.params)).collect();
        let dependencies: Vec<BTreeSet<String>> = workflow
            .steps
            .iter()
            .zip(&bindings)
            .map(|(step, bindings)| {
                let referenced = bindings
                    .references()
                    .into_iter()
                    .filter_map(|r| r.step_path())
                    .map(|path| path.step_id.clone())
                    .filter(|head| head != &step.id && positions.contains_key(head.as_str()));
                step.depends_on.iter().cloned().chain(referenced).collect()
            })
            .collect();

        let order = topological_order(&dependencies, &positions).map_err(|cycle| {
            let names: Vec<&str> = cycle.iter().map(|&i| workflow.steps[i].id.as_str()).collect();
            WorkflowError::invalid(&id, format!("dependency cycle among steps: {}", names.join(", ")))
        })?;

        let ancestors = ancestor_sets(&dependencies, &order, &positions);

        let steps: Vec<CompiledStep> = workflow
            .steps
            .iter()
            .zip(bindings)
            .zip(dependencies)
            .zip(ancestors)
            .enumerate()
            .map(|(index, (((step, bindings), dependencies), ancestors))| CompiledStep {
                index,
                step: step.clone(),
                bindings,
                dependencies,
                ancestors,
            })
            .collect();

        Ok(Self { workflow, steps })
    }

    pub fn id(&self) -> &str {
        &self.workflow.id
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Steps in declaration order
    pub fn steps(&self) -> &[CompiledStep] {
        &self.steps
    }

    pub fn step(&self, id: &str) -> Option<&CompiledStep> {
        self.steps.iter().find(|s| s.id() == id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn has_step(&self, id: &str) -> bool {
        self.step(id).is_some()
    }
}

/// Kahn's algorithm; on a cycle returns the indexes that could not be ordered
fn topological_order(dependencies: &[BTreeSet<String>], positions: &HashMap<&str, usize>) -> Result<Vec<usize>, Vec<usize>> {
    let count = dependencies.len();
    let mut in_degree = vec![0usize; count];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

    for (index, deps) in dependencies.iter().enumerate() {
        let deps: BTreeSet<usize> = deps.iter().filter_map(|dep| positions.get(dep.as_str()).copied()).collect();
        in_degree[index] = deps.len();
        for dep in deps {
            dependents[dep].push(index);
        }
    }

    let mut queue: VecDeque<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(count);
    while let Some(index) = queue.pop_front() {
        order.push(index);
        for &next in &dependents[index] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() == count {
        Ok(order)
    } else {
        Err((0..count).filter(|&i| in_degree[i] > 0).collect())
    }
}

fn ancestor_sets(
    dependencies: &[BTreeSet<String>],
    order: &[usize],
    positions: &HashMap<&str, usize>,
) -> Vec<BTreeSet<String>> {
    let mut ancestors: Vec<BTreeSet<String>> = vec![BTreeSet::new(); dependencies.len()];
    for &index in order {
        let mut set = BTreeSet::new();
        for dep in &dependencies[index] {
            set.insert(dep.clone());
            if let Some(&dep_index) = positions.get(dep.as_str()) {
                set.extend(ancestors[dep_index].iter().cloned());
            }
        }
        ancestors[index] = set;
    }
    ancestors
}
