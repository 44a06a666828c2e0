use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::ConvertError;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::server::{Server, ServerVariable};
use crate::parse::spec::OpenApiSpec;

static URL_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]+)://([^:/]+)(?::([0-9]*))?((?:/.*)?)$").expect("url pattern")
});

/// A resolved base URL, before template binding. `server_variables` is the
/// variable table of the chosen server, exposed for information only.
#[derive(Debug, Clone)]
pub struct BaseUrl {
    pub url: String,
    pub server_variables: IndexMap<String, ServerVariable>,
}

/// Pick the server for an operation and join its URL with the path key.
/// Precedence: operation servers, then path-item servers, then document
/// servers, then the configured fallback host.
pub fn resolve_base_url(
    operation: &Operation,
    path_item: &PathItem,
    spec: &OpenApiSpec,
    path: &str,
    fallback: Option<&str>,
) -> Result<BaseUrl, ConvertError> {
    let server = operation
        .servers
        .first()
        .or_else(|| path_item.servers.first())
        .or_else(|| spec.servers.first());

    let (url, server_variables) = match server {
        Some(server) => (
            substitute_server_variables(server),
            server.variables.clone(),
        ),
        None => match fallback {
            Some(host) => (host.to_string(), IndexMap::new()),
            None => {
                return Err(ConvertError::NoServer {
                    path: path.to_string(),
                });
            }
        },
    };

    let joined = format!("{}{}", strip_trailing_slash(&url), path);
    Ok(BaseUrl {
        url: squeeze_double_slashes(&joined),
        server_variables,
    })
}

/// Replace every `{name}` in the server URL with the variable's declared
/// default, or the bare variable name when no default exists. These are
/// always literal substitutions, never live references.
fn substitute_server_variables(server: &Server) -> String {
    let mut url = server.url.clone();
    for (name, variable) in &server.variables {
        let value = variable.default.as_deref().unwrap_or(name);
        url = url.replace(&format!("{{{name}}}"), value);
    }
    url
}

fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Collapse repeated slashes in everything after the scheme separator.
fn squeeze_double_slashes(url: &str) -> String {
    let (head, tail) = match url.find("://") {
        Some(index) => url.split_at(index + 3),
        None => ("", url),
    };
    let mut tail = tail.to_string();
    while tail.contains("//") {
        tail = tail.replace("//", "/");
    }
    format!("{head}{tail}")
}

/// Informational decomposition of an evaluated URL. Never fails: a string
/// the pattern cannot split leaves `hostname` and `port` unset and the
/// pathname at `/`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUrl {
    pub hostname: Option<String>,
    pub port: Option<String>,
    pub pathname: String,
}

impl ParsedUrl {
    pub fn parse(url: &str) -> Self {
        let Some(captures) = URL_PARTS.captures(url) else {
            return Self {
                hostname: None,
                port: None,
                pathname: "/".to_string(),
            };
        };

        let scheme = captures.get(1).map(|m| m.as_str()).unwrap_or("http");
        let hostname = captures
            .get(2)
            .map(|host| add_trailing_slash(&format!("{}://{}", scheme, host.as_str())));
        let port = captures
            .get(3)
            .map(|m| m.as_str())
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let pathname = captures
            .get(4)
            .map(|m| m.as_str())
            .filter(|p| !p.is_empty())
            .map(|p| add_trailing_slash(p).replace("//", "/"))
            .unwrap_or_else(|| "/".to_string());

        Self {
            hostname,
            port,
            pathname,
        }
    }
}

fn add_trailing_slash(value: &str) -> String {
    if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    }
}
