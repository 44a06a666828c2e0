use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::environment::EnvironmentBinder;
use crate::project::{Request, VariableId};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("placeholder pattern"));

/// One piece of a composite templated value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Segment {
    Literal(String),
    /// Reference to an environment-domain variable, by name.
    EnvironmentRef(String),
    /// Reference to a request-scoped variable.
    RequestVariableRef(VariableId),
}

/// A string that may carry live references to environment or request
/// variables. A value with no references stays a plain literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TemplatedValue {
    Literal(String),
    Composite(Vec<Segment>),
}

impl TemplatedValue {
    /// A value that is a single request-variable reference.
    pub fn variable_ref(id: VariableId) -> Self {
        TemplatedValue::Composite(vec![Segment::RequestVariableRef(id)])
    }

    /// Collapse a segment list: zero or one all-literal segment degenerates
    /// to a plain literal.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        match segments.len() {
            0 => TemplatedValue::Literal(String::new()),
            1 => match segments.into_iter().next().unwrap() {
                Segment::Literal(text) => TemplatedValue::Literal(text),
                segment => TemplatedValue::Composite(vec![segment]),
            },
            _ => TemplatedValue::Composite(segments),
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            TemplatedValue::Literal(text) => Some(text),
            TemplatedValue::Composite(_) => None,
        }
    }

    /// Evaluate to a plain string by substituting the current values of all
    /// referenced variables. Used for informational URL decomposition only.
    pub fn evaluated(&self, request: &Request, env: &EnvironmentBinder<'_>) -> String {
        match self {
            TemplatedValue::Literal(text) => text.clone(),
            TemplatedValue::Composite(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(text) => out.push_str(text),
                        Segment::EnvironmentRef(name) => {
                            out.push_str(env.value(name).unwrap_or_default())
                        }
                        Segment::RequestVariableRef(id) => {
                            if let Some(variable) =
                                request.variables.iter().find(|v| v.id == *id)
                            {
                                out.push_str(&variable.value);
                            }
                        }
                    }
                }
                out
            }
        }
    }
}

/// Appends a literal span, merging into a preceding literal segment so a
/// literal run is always a single segment.
fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Literal(existing)) = segments.last_mut() {
        existing.push_str(text);
        return;
    }
    segments.push(Segment::Literal(text.to_string()));
}

/// Scan `raw` for `{identifier}` placeholders and bind each one: known
/// environment variables win over request-scoped variables; identifiers
/// matching neither are dropped with a warning. Referencing an environment
/// variable also seeds its current value with `default_value` when empty.
pub fn resolve(
    raw: &str,
    request: &Request,
    env: &mut EnvironmentBinder<'_>,
    default_value: &str,
) -> TemplatedValue {
    let mut segments = Vec::new();
    let mut index = 0;

    for captures in PLACEHOLDER.captures_iter(raw) {
        let matched = captures.get(0).expect("whole match");
        let name = &captures[1];

        if matched.start() > index {
            push_literal(&mut segments, &raw[index..matched.start()]);
        }

        if env.has_variable(name) {
            env.set_value(name, default_value, true);
            segments.push(Segment::EnvironmentRef(name.to_string()));
        } else if let Some(variable) = request.variable_by_name(name) {
            segments.push(Segment::RequestVariableRef(variable.id));
        } else {
            log::warn!("dropping unresolved placeholder `{{{name}}}` in `{raw}`");
        }

        index = matched.end();
    }

    if index < raw.len() {
        push_literal(&mut segments, &raw[index..]);
    }

    TemplatedValue::from_segments(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{EnvironmentDomain, Request};

    fn domain() -> EnvironmentDomain {
        EnvironmentDomain {
            name: "Test API".to_string(),
            variables: Vec::new(),
            environments: Vec::new(),
        }
    }

    #[test]
    fn plain_string_stays_literal() {
        let mut domain = domain();
        let mut env = EnvironmentBinder::new(&mut domain);
        let request = Request::new("r".to_string(), "GET", String::new());

        let value = resolve("https://api.test/pets", &request, &mut env, "");
        assert_eq!(
            value,
            TemplatedValue::Literal("https://api.test/pets".to_string())
        );
    }

    #[test]
    fn unknown_placeholder_is_dropped_and_literals_merge() {
        let mut domain = domain();
        let mut env = EnvironmentBinder::new(&mut domain);
        let request = Request::new("r".to_string(), "GET", String::new());

        let value = resolve("a{nope}b", &request, &mut env, "");
        assert_eq!(value, TemplatedValue::Literal("ab".to_string()));
    }

    #[test]
    fn request_variable_reference() {
        let mut domain = domain();
        let mut env = EnvironmentBinder::new(&mut domain);
        let mut request = Request::new("r".to_string(), "GET", String::new());
        let id = request.add_variable("petId", "7".to_string(), String::new());

        let value = resolve("/pets/{petId}", &request, &mut env, "");
        assert_eq!(
            value,
            TemplatedValue::Composite(vec![
                Segment::Literal("/pets/".to_string()),
                Segment::RequestVariableRef(id),
            ])
        );
    }

    #[test]
    fn environment_wins_over_request_scope() {
        let mut domain = domain();
        domain.ensure_variable("petId");
        let mut env = EnvironmentBinder::new(&mut domain);
        let mut request = Request::new("r".to_string(), "GET", String::new());
        request.add_variable("petId", "7".to_string(), String::new());

        let value = resolve("/pets/{petId}", &request, &mut env, "");
        assert_eq!(
            value,
            TemplatedValue::Composite(vec![
                Segment::Literal("/pets/".to_string()),
                Segment::EnvironmentRef("petId".to_string()),
            ])
        );
    }
}
