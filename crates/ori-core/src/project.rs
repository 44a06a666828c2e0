use indexmap::IndexMap;
use serde::Serialize;

use crate::template::TemplatedValue;

/// Identifier of a request-scoped variable, unique within its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VariableId(pub u32);

/// A request-scoped variable. `schema` carries the formatted
/// JSON-Schema-compatible constraint subset, or the empty string when the
/// source schema declared none.
#[derive(Debug, Clone, Serialize)]
pub struct RequestVariable {
    pub id: VariableId,
    pub name: String,
    pub value: String,
    pub description: String,
    pub required: bool,
    pub schema: String,
}

/// The body of a generated request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Body {
    Raw(String),
    Json(serde_json::Value),
    UrlEncoded(IndexMap<String, String>),
    Multipart(IndexMap<String, String>),
}

/// Basic-auth credential pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// OAuth2 credential block. Client fields are left empty for the user to
/// fill in; the endpoint URLs and scope come from the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OAuth2 {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_uri: Option<String>,
    pub access_token_uri: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub state: Option<String>,
    pub token: Option<String>,
    pub token_prefix: Option<String>,
    pub grant_type: String,
}

/// A generated HTTP request template.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub name: String,
    pub method: String,
    pub url: TemplatedValue,
    pub description: String,
    pub headers: Vec<(String, TemplatedValue)>,
    pub url_params: Vec<(String, TemplatedValue)>,
    pub body: Option<Body>,
    pub basic_auth: Option<BasicAuth>,
    pub oauth2: Option<OAuth2>,
    pub variables: Vec<RequestVariable>,
}

impl Request {
    pub fn new(name: String, method: &str, description: String) -> Self {
        Self {
            name,
            method: method.to_string(),
            url: TemplatedValue::Literal(String::new()),
            description,
            headers: Vec::new(),
            url_params: Vec::new(),
            body: None,
            basic_auth: None,
            oauth2: None,
            variables: Vec::new(),
        }
    }

    /// Register a request-scoped variable and return its handle.
    pub fn add_variable(&mut self, name: &str, value: String, description: String) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(RequestVariable {
            id,
            name: name.to_string(),
            value,
            description,
            required: true,
            schema: String::new(),
        });
        id
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&RequestVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn variable_mut(&mut self, id: VariableId) -> &mut RequestVariable {
        &mut self.variables[id.0 as usize]
    }

    pub fn header(&self, name: &str) -> Option<&TemplatedValue> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Insert or replace a header.
    pub fn set_header(&mut self, name: &str, value: TemplatedValue) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn url_param(&self, name: &str) -> Option<&TemplatedValue> {
        self.url_params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn add_url_param(&mut self, name: &str, value: TemplatedValue) {
        self.url_params.push((name.to_string(), value));
    }
}

/// A named bucket of generated requests.
#[derive(Debug, Clone, Serialize)]
pub struct RequestGroup {
    pub name: String,
    pub requests: Vec<Request>,
}

/// A named environment holding current variable values.
#[derive(Debug, Clone, Serialize)]
pub struct Environment {
    pub name: String,
    pub values: IndexMap<String, String>,
}

/// A document-scoped namespace of variables with per-environment values.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentDomain {
    pub name: String,
    pub variables: Vec<String>,
    pub environments: Vec<Environment>,
}

impl EnvironmentDomain {
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// Create the variable if it does not exist yet. Variables are never
    /// deleted within a conversion run.
    pub fn ensure_variable(&mut self, name: &str) {
        if !self.has_variable(name) {
            self.variables.push(name.to_string());
        }
    }

    pub fn environment_mut(&mut self, name: &str) -> &mut Environment {
        if let Some(index) = self.environments.iter().position(|e| e.name == name) {
            &mut self.environments[index]
        } else {
            self.environments.push(Environment {
                name: name.to_string(),
                values: IndexMap::new(),
            });
            self.environments.last_mut().unwrap()
        }
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }
}

/// The conversion output: request groups and environment domains produced
/// from one or more documents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Project {
    pub groups: Vec<RequestGroup>,
    pub environments: Vec<EnvironmentDomain>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or lazily create a request group.
    pub fn group_mut(&mut self, name: &str) -> &mut RequestGroup {
        if let Some(index) = self.groups.iter().position(|g| g.name == name) {
            &mut self.groups[index]
        } else {
            self.groups.push(RequestGroup {
                name: name.to_string(),
                requests: Vec::new(),
            });
            self.groups.last_mut().unwrap()
        }
    }

    pub fn group(&self, name: &str) -> Option<&RequestGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Get or lazily create an environment domain.
    pub fn domain_mut(&mut self, name: &str) -> &mut EnvironmentDomain {
        if let Some(index) = self.environments.iter().position(|d| d.name == name) {
            &mut self.environments[index]
        } else {
            self.environments.push(EnvironmentDomain {
                name: name.to_string(),
                variables: Vec::new(),
                environments: Vec::new(),
            });
            self.environments.last_mut().unwrap()
        }
    }

    pub fn domain(&self, name: &str) -> Option<&EnvironmentDomain> {
        self.environments.iter().find(|d| d.name == name)
    }
}
