pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod refs;
pub mod request_body;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;

use crate::error::DocumentError;
use spec::OpenApiSpec;

/// Parse an OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, DocumentError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, DocumentError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI document from text with a declared media type.
/// `application/json` is parsed strictly as JSON; everything else as YAML.
pub fn from_text(input: &str, media_type: &str) -> Result<OpenApiSpec, DocumentError> {
    if media_type.eq_ignore_ascii_case("application/json") {
        from_json(input)
    } else {
        from_yaml(input)
    }
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), DocumentError> {
    if !spec.openapi.starts_with("3.") {
        return Err(DocumentError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}
