use heck::ToSnakeCase;
use serde_json::Value;

use crate::error::ConvertError;
use crate::parse::operation::Operation;
use crate::parse::security::{OAuthFlows, SecurityScheme, SecuritySchemeType};
use crate::parse::spec::OpenApiSpec;
use crate::project::{BasicAuth, OAuth2, Request};

use super::BASIC_CREDENTIALS_SUMMARY;

const KNOWN_FLOWS: [&str; 4] = [
    "implicit",
    "password",
    "clientCredentials",
    "authorizationCode",
];

/// Bind the operation's security requirements. Bearer and API-key schemes
/// are deliberate no-ops here: their credentials travel as headers, query
/// entries, or cookies and are attached during parameter binding.
pub fn bind_auth(
    spec: &OpenApiSpec,
    request: &mut Request,
    operation: &Operation,
    path: &str,
) -> Result<(), ConvertError> {
    let Some(requirements) = &operation.security else {
        return Ok(());
    };

    for requirement in requirements {
        for scheme_name in requirement.keys() {
            let Some(scheme) = spec
                .components
                .as_ref()
                .and_then(|c| c.security_schemes.get(scheme_name))
            else {
                continue;
            };
            bind_scheme(spec, request, scheme_name, scheme, path)?;
        }
    }
    Ok(())
}

fn bind_scheme(
    spec: &OpenApiSpec,
    request: &mut Request,
    scheme_name: &str,
    scheme: &SecurityScheme,
    path: &str,
) -> Result<(), ConvertError> {
    match scheme.scheme_type {
        SecuritySchemeType::Http => match scheme.scheme.as_deref() {
            Some("basic") => {
                request.basic_auth = Some(basic_credentials(spec, scheme_name));
                Ok(())
            }
            Some("bearer") => Ok(()),
            _ => Err(unsupported(scheme_name, path)),
        },
        SecuritySchemeType::ApiKey => Ok(()),
        SecuritySchemeType::OAuth2 => {
            if let Some(flows) = &scheme.flows {
                request.oauth2 = first_flow_credentials(flows);
            }
            Ok(())
        }
        SecuritySchemeType::OpenIdConnect => {
            // Known gap: nothing to populate for discovery-based schemes.
            log::warn!("openIdConnect scheme `{scheme_name}` on {path} is not bound");
            Ok(())
        }
        SecuritySchemeType::MutualTls | SecuritySchemeType::Unknown => {
            Err(unsupported(scheme_name, path))
        }
    }
}

fn unsupported(scheme_name: &str, path: &str) -> ConvertError {
    ConvertError::UnsupportedSecurityScheme {
        scheme: scheme_name.to_string(),
        path: path.to_string(),
    }
}

/// Look up a reusable example named after the scheme whose summary marks it
/// as basic credentials; lacking one, both fields stay empty.
fn basic_credentials(spec: &OpenApiSpec, scheme_name: &str) -> BasicAuth {
    let example = spec
        .components
        .as_ref()
        .and_then(|c| c.examples.get(scheme_name))
        .filter(|example| example.summary.as_deref() == Some(BASIC_CREDENTIALS_SUMMARY));

    if let Some(Value::Object(credentials)) = example.and_then(|e| e.value.as_ref()) {
        if let (Some(username), Some(password)) = (
            credentials.get("username").and_then(Value::as_str),
            credentials.get("password").and_then(Value::as_str),
        ) {
            return BasicAuth {
                username: username.to_string(),
                password: password.to_string(),
            };
        }
    }
    BasicAuth {
        username: String::new(),
        password: String::new(),
    }
}

/// Populate credentials from the first declared flow. Client id, secret,
/// and redirect are left for the user to fill in.
fn first_flow_credentials(flows: &OAuthFlows) -> Option<OAuth2> {
    let (grant, flow) = flows
        .iter()
        .find(|(name, _)| KNOWN_FLOWS.contains(&name.as_str()))?;

    Some(OAuth2 {
        client_id: String::new(),
        client_secret: String::new(),
        authorization_uri: flow.authorization_url.clone(),
        access_token_uri: flow.token_url.clone(),
        redirect_uri: String::new(),
        scope: flow
            .scopes
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        state: None,
        token: None,
        token_prefix: None,
        grant_type: grant.to_snake_case(),
    })
}
