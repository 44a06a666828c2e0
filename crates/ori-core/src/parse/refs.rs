use std::collections::HashSet;

use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::schema::{Schema, SchemaOrRef};
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// Parse a pointer like `#/components/schemas/Foo` and extract the name,
/// checking that it points into the expected component section.
pub fn component_name<'a>(
    ref_path: &'a str,
    expected_section: &str,
) -> Result<&'a str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}

/// Look up a schema pointer in the document's reusable schemas.
pub fn schema<'a>(spec: &'a OpenApiSpec, ref_path: &str) -> Result<&'a SchemaOrRef, ResolveError> {
    let name = component_name(ref_path, "schemas")?;
    spec.components
        .as_ref()
        .and_then(|c| c.schemas.get(name))
        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
}

/// Look up a parameter pointer in the document's reusable parameters.
pub fn parameter<'a>(spec: &'a OpenApiSpec, ref_path: &str) -> Result<&'a Parameter, ResolveError> {
    let name = component_name(ref_path, "parameters")?;
    spec.components
        .as_ref()
        .and_then(|c| c.parameters.get(name))
        .and_then(|p| match p {
            ParameterOrRef::Parameter(param) => Some(param),
            ParameterOrRef::Ref { .. } => None,
        })
        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
}

/// Look up a request body pointer in the document's reusable request bodies.
pub fn request_body<'a>(
    spec: &'a OpenApiSpec,
    ref_path: &str,
) -> Result<&'a RequestBody, ResolveError> {
    let name = component_name(ref_path, "requestBodies")?;
    spec.components
        .as_ref()
        .and_then(|c| c.request_bodies.get(name))
        .and_then(|rb| match rb {
            RequestBodyOrRef::RequestBody(body) => Some(body),
            RequestBodyOrRef::Ref { .. } => None,
        })
        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
}

/// Follow a chain of schema references down to a concrete schema.
pub fn deref_schema<'a>(
    spec: &'a OpenApiSpec,
    node: &'a SchemaOrRef,
) -> Result<&'a Schema, ResolveError> {
    let mut seen = HashSet::new();
    let mut current = node;
    loop {
        match current {
            SchemaOrRef::Schema(inner) => return Ok(inner),
            SchemaOrRef::Ref { ref_path } => {
                if !seen.insert(ref_path.clone()) {
                    return Err(ResolveError::CircularRef(ref_path.clone()));
                }
                current = schema(spec, ref_path)?;
            }
        }
    }
}
