//! Parameter bindings — the typed form of `{{...}}` template expressions
//!
//! Step parameters are parsed once, when a workflow is registered, into a
//! small expression tree:
//!
//! ```text
//! "{{search.data.results[0].title}}"
//!        │
//!        ▼
//! Reference { expression: "search.data.results[0].title",
//!             path: StepPath { step_id: "search",
//!                              segments: [data, results, [0], title] } }
//! ```
//!
//! Resolution order for a reference:
//!
//! 1. the whole expression as a verbatim key of the initial parameters;
//! 2. otherwise the head segment names a step whose stored result is walked
//!    segment by segment.
//!
//! Anything missing along the way resolves to `None`. A string holding a
//! template is replaced wholesale by the value of its **first** `{{...}}`
//! marker; later markers in the same string are ignored.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::tool::entities::ToolArguments;

/// Results of executed steps, keyed by step id
pub type StepResults = BTreeMap<String, Value>;

/// One navigation step inside a stored result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// `step_id` followed by field/index navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPath {
    pub step_id: String,
    pub segments: Vec<PathSegment>,
}

impl StepPath {
    /// Parse `head.field.list[0].name`; `None` when the text is not a path
    pub fn parse(expression: &str) -> Option<Self> {
        let mut parts = expression.split('.');
        let (step_id, head_indexes) = split_indexes(parts.next()?)?;
        if step_id.is_empty() {
            return None;
        }

        let mut segments: Vec<PathSegment> =
            head_indexes.into_iter().map(PathSegment::Index).collect();
        for part in parts {
            let (name, indexes) = split_indexes(part)?;
            if name.is_empty() {
                return None;
            }
            segments.push(PathSegment::Field(name.to_string()));
            segments.extend(indexes.into_iter().map(PathSegment::Index));
        }

        Some(Self {
            step_id: step_id.to_string(),
            segments,
        })
    }

    /// Walk the segments below `root`
    pub fn navigate<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |current, segment| match segment {
                PathSegment::Field(name) => current.as_object()?.get(name),
                PathSegment::Index(index) => current.as_array()?.get(*index),
            })
    }
}

/// `name[1][2]` → `("name", [1, 2])`
fn split_indexes(segment: &str) -> Option<(&str, Vec<usize>)> {
    let Some(open) = segment.find('[') else {
        return Some((segment, Vec::new()));
    };

    let name = &segment[..open];
    let mut rest = &segment[open..];
    let mut indexes = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        indexes.push(inner[..close].trim().parse().ok()?);
        rest = &inner[close + 1..];
    }
    Some((name, indexes))
}

/// What a reference is resolved against
#[derive(Debug, Clone, Copy)]
pub struct ResolutionScope<'a> {
    pub initial: &'a ToolArguments,
    pub step_results: &'a StepResults,
}

impl<'a> ResolutionScope<'a> {
    pub fn new(initial: &'a ToolArguments, step_results: &'a StepResults) -> Self {
        Self {
            initial,
            step_results,
        }
    }
}

/// A `{{...}}` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    expression: String,
    path: Option<StepPath>,
}

impl Reference {
    pub fn parse(expression: &str) -> Self {
        let expression = expression.trim();
        Self {
            expression: expression.to_string(),
            path: StepPath::parse(expression),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn step_path(&self) -> Option<&StepPath> {
        self.path.as_ref()
    }

    pub fn resolve(&self, scope: &ResolutionScope<'_>) -> Option<Value> {
        if let Some(value) = scope.initial.get(&self.expression) {
            return Some(value.clone());
        }
        let path = self.path.as_ref()?;
        let root = scope.step_results.get(&path.step_id)?;
        path.navigate(root).cloned()
    }
}

/// Inner text of the first `{{...}}` pair, if any
pub fn extract_template(text: &str) -> Option<&str> {
    let start = text.find("{{")? + 2;
    let len = text[start..].find("}}")?;
    Some(text[start..start + len].trim())
}

/// Typed parameter expression
#[derive(Debug, Clone, PartialEq)]
pub enum ParamBinding {
    Literal(Value),
    Reference(Reference),
    Object(BTreeMap<String, ParamBinding>),
}

impl ParamBinding {
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::String(text) => match extract_template(text) {
                Some(expression) => ParamBinding::Reference(Reference::parse(expression)),
                None => ParamBinding::Literal(value.clone()),
            },
            Value::Object(map) => ParamBinding::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), ParamBinding::parse(value)))
                    .collect(),
            ),
            other => ParamBinding::Literal(other.clone()),
        }
    }

    /// Every reference in this binding, depth first
    pub fn references(&self) -> Vec<&Reference> {
        match self {
            ParamBinding::Literal(_) => Vec::new(),
            ParamBinding::Reference(reference) => vec![reference],
            ParamBinding::Object(fields) => {
                fields.values().flat_map(ParamBinding::references).collect()
            }
        }
    }

    /// Resolve; unresolved expressions are pushed to `unresolved` and their
    /// keys dropped from enclosing objects.
    pub fn resolve(&self, scope: &ResolutionScope<'_>, unresolved: &mut Vec<String>) -> Option<Value> {
        match self {
            ParamBinding::Literal(value) => Some(value.clone()),
            ParamBinding::Reference(reference) => {
                let value = reference.resolve(scope);
                if value.is_none() {
                    unresolved.push(reference.expression().to_string());
                }
                value
            }
            ParamBinding::Object(fields) => {
                let mut map = serde_json::Map::new();
                for (key, binding) in fields {
                    if let Some(value) = binding.resolve(scope, unresolved) {
                        map.insert(key.clone(), value);
                    }
                }
                Some(Value::Object(map))
            }
        }
    }
}

/// Outcome of resolving a parameter map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParams {
    pub params: ToolArguments,
    /// Expressions that resolved to nothing (their keys are absent)
    pub unresolved: Vec<String>,
}

impl ResolvedParams {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Parsed parameter map of one step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepBindings(BTreeMap<String, ParamBinding>);

impl StepBindings {
    pub fn parse(params: &ToolArguments) -> Self {
        Self(
            params
                .iter()
                .map(|(key, value)| (key.clone(), ParamBinding::parse(value)))
                .collect(),
        )
    }

    pub fn references(&self) -> Vec<&Reference> {
        self.0.values().flat_map(ParamBinding::references).collect()
    }

    pub fn resolve(&self, scope: &ResolutionScope<'_>) -> ResolvedParams {
        let mut resolved = ResolvedParams::default();
        for (key, binding) in &self.0 {
            if let Some(value) = binding.resolve(scope, &mut resolved.unresolved) {
                resolved.params.insert(key.clone(), value);
            }
        }
        resolved
    }
}

/// Resolve a single path expression against initial params and step results
pub fn resolve_variable(path: &str, initial: &ToolArguments, step_results: &StepResults) -> Option<Value> {
    Reference::parse(path).resolve(&ResolutionScope::new(initial, step_results))
}

/// Resolve every template in a raw parameter map
pub fn resolve_template_variables(params: &ToolArguments, scope: &ResolutionScope<'_>) -> ResolvedParams {
    StepBindings::parse(params).resolve(scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> ToolArguments {
        value.as_object().cloned().unwrap_or_default()
    }

    fn results(value: Value) -> StepResults {
        object(value).into_iter().collect()
    }

    #[test]
    fn test_resolve_variable_nested_path() {
        let prior = results(json!({"search": {"data": {"results": [{"title": "Dune"}]}}}));
        let value = resolve_variable("search.data.results[0].title", &ToolArguments::new(), &prior);
        assert_eq!(value, Some(json!("Dune")));
    }

    #[test]
    fn test_resolve_variable_empty_array_is_undefined() {
        let prior = results(json!({"search": {"data": {"results": []}}}));
        let value = resolve_variable("search.data.results[0].title", &ToolArguments::new(), &prior);
        assert_eq!(value, None);
    }

    #[test]
    fn test_initial_param_takes_priority() {
        let initial = object(json!({"query": "Dune", "search.count": 3}));
        let prior = results(json!({"search": {"count": 10}}));

        assert_eq!(resolve_variable("query", &initial, &prior), Some(json!("Dune")));
        assert_eq!(resolve_variable("search.count", &initial, &prior), Some(json!(3)));
    }

    #[test]
    fn test_unknown_step_is_undefined() {
        assert_eq!(resolve_variable("nope.data", &ToolArguments::new(), &StepResults::new()), None);
    }

    #[test]
    fn test_traversal_through_non_object_is_undefined() {
        let prior = results(json!({"a": {"data": "text"}}));
        assert_eq!(resolve_variable("a.data.length", &ToolArguments::new(), &prior), None);
        assert_eq!(resolve_variable("a.data[0]", &ToolArguments::new(), &prior), None);
    }

    #[test]
    fn test_whole_step_result() {
        let prior = results(json!({"a": {"success": true}}));
        assert_eq!(
            resolve_variable("a", &ToolArguments::new(), &prior),
            Some(json!({"success": true}))
        );
    }

    #[test]
    fn test_step_path_parse() {
        let path = StepPath::parse("search.data.results[2].tags[0][1]").unwrap();
        assert_eq!(path.step_id, "search");
        assert_eq!(
            path.segments,
            vec![
                PathSegment::Field("data".into()),
                PathSegment::Field("results".into()),
                PathSegment::Index(2),
                PathSegment::Field("tags".into()),
                PathSegment::Index(0),
                PathSegment::Index(1),
            ]
        );

        assert!(StepPath::parse("a..b").is_none());
        assert!(StepPath::parse("a.b[x]").is_none());
        assert!(StepPath::parse("a.b[1").is_none());
        assert!(StepPath::parse("").is_none());
    }

    #[test]
    fn test_extract_template_first_marker_only() {
        assert_eq!(extract_template("{{ query }}"), Some("query"));
        assert_eq!(extract_template("Movie: {{a}} and {{b}}"), Some("a"));
        assert_eq!(extract_template("plain"), None);
        assert_eq!(extract_template("{{unclosed"), None);
    }

    #[test]
    fn test_resolve_template_variables() {
        let initial = object(json!({"query": "Dune", "year": 2021}));
        let prior = results(json!({"search": {"data": {"results": [{"id": 42}]}}}));
        let params = object(json!({
            "term": "{{query}}",
            "label": "Movie: {{query}} ({{year}})",
            "nested": {"id": "{{search.data.results[0].id}}", "fixed": true},
            "count": 3,
            "list": ["{{query}}"],
            "nothing": null
        }));

        let resolved = resolve_template_variables(&params, &ResolutionScope::new(&initial, &prior));

        assert!(resolved.is_complete());
        assert_eq!(resolved.params["term"], json!("Dune"));
        // Wholesale replacement by the first marker
        assert_eq!(resolved.params["label"], json!("Dune"));
        assert_eq!(resolved.params["nested"], json!({"id": 42, "fixed": true}));
        assert_eq!(resolved.params["count"], json!(3));
        // Arrays pass through untouched
        assert_eq!(resolved.params["list"], json!(["{{query}}"]));
        assert_eq!(resolved.params["nothing"], Value::Null);
    }

    #[test]
    fn test_unresolved_keys_are_dropped_and_reported() {
        let params = object(json!({"title": "{{missing.data.title}}", "nested": {"x": "{{gone}}"}}));
        let resolved = resolve_template_variables(
            &params,
            &ResolutionScope::new(&ToolArguments::new(), &StepResults::new()),
        );

        assert!(!resolved.is_complete());
        assert_eq!(resolved.unresolved, vec!["gone".to_string(), "missing.data.title".to_string()]);
        assert!(!resolved.params.contains_key("title"));
        assert_eq!(resolved.params["nested"], json!({}));
    }

    #[test]
    fn test_binding_references() {
        let bindings = StepBindings::parse(&object(json!({
            "a": "{{x.y}}",
            "b": {"c": "{{z}}"},
            "d": "literal"
        })));
        let expressions: Vec<&str> = bindings.references().iter().map(|r| r.expression()).collect();
        assert_eq!(expressions, vec!["x.y", "z"]);
    }
}
