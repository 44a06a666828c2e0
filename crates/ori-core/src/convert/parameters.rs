use serde_json::Value;

use crate::error::ConvertError;
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::refs;
use crate::parse::schema::Schema;
use crate::parse::spec::OpenApiSpec;
use crate::project::{Request, VariableId};
use crate::template::TemplatedValue;

use super::{NON_REQUIRED_SUMMARY, value_to_string};

/// Bind a sequence of parameters onto the request, dispatching on each
/// parameter's location. Deprecated parameters never produce output.
pub fn bind_parameters<'a, I>(
    spec: &OpenApiSpec,
    request: &mut Request,
    parameters: I,
) -> Result<(), ConvertError>
where
    I: IntoIterator<Item = &'a ParameterOrRef>,
{
    for parameter in parameters {
        let parameter = match parameter {
            ParameterOrRef::Parameter(inner) => inner,
            ParameterOrRef::Ref { ref_path } => refs::parameter(spec, ref_path)?,
        };
        if parameter.deprecated.unwrap_or(false) {
            continue;
        }

        match parameter.location {
            ParameterLocation::Query => bind_query(spec, request, parameter)?,
            ParameterLocation::Path => bind_path(spec, request, parameter)?,
            ParameterLocation::Header => bind_header(spec, request, parameter)?,
            ParameterLocation::Cookie => bind_cookie(spec, request, parameter)?,
        }
    }
    Ok(())
}

fn bind_query(
    spec: &OpenApiSpec,
    request: &mut Request,
    parameter: &Parameter,
) -> Result<(), ConvertError> {
    let value = example_first_value(spec, parameter)?;
    let id = register_variable(spec, request, parameter, value)?;

    // First writer wins.
    if request.url_param(&parameter.name).is_none() {
        request.add_url_param(&parameter.name, TemplatedValue::variable_ref(id));
    }
    Ok(())
}

fn bind_path(
    spec: &OpenApiSpec,
    request: &mut Request,
    parameter: &Parameter,
) -> Result<(), ConvertError> {
    // Path parameters prefer the schema default over an example, the
    // reverse of every other location.
    let schema = resolved_schema(spec, parameter)?;
    let value = schema
        .and_then(|s| s.default_value.as_ref())
        .map(value_to_string)
        .or_else(|| example_value(parameter).as_ref().map(value_to_string))
        .unwrap_or_default();
    let id = register_variable(spec, request, parameter, value)?;

    // The document format cannot mark a path parameter optional, so an
    // example carrying the marker summary stands in for that.
    if let Some(Value::Object(marker)) = &parameter.example {
        if marker.get("summary").and_then(Value::as_str) == Some(NON_REQUIRED_SUMMARY)
            && marker.get("value") == Some(&Value::Bool(true))
        {
            request.variable_mut(id).required = false;
        }
    }
    Ok(())
}

fn bind_header(
    spec: &OpenApiSpec,
    request: &mut Request,
    parameter: &Parameter,
) -> Result<(), ConvertError> {
    let value = example_first_value(spec, parameter)?;
    let id = register_variable(spec, request, parameter, value)?;

    if request.header(&parameter.name).is_none() {
        request.set_header(&parameter.name, TemplatedValue::variable_ref(id));
    }
    Ok(())
}

/// Cookies accumulate onto the `cookie` header as literal `name=value; `
/// pairs; they are never overwritten by later writers.
fn bind_cookie(
    spec: &OpenApiSpec,
    request: &mut Request,
    parameter: &Parameter,
) -> Result<(), ConvertError> {
    let value = example_first_value(spec, parameter)?;

    let existing = match request.header("cookie") {
        Some(TemplatedValue::Literal(text)) => text.clone(),
        _ => String::new(),
    };
    let cookies = format!("{existing}{}={value}; ", parameter.name);
    request.set_header("cookie", TemplatedValue::Literal(cookies));
    Ok(())
}

/// Register the request-scoped variable backing a parameter, attaching the
/// schema's constraint subset when the schema declares a type.
fn register_variable(
    spec: &OpenApiSpec,
    request: &mut Request,
    parameter: &Parameter,
    value: String,
) -> Result<VariableId, ConvertError> {
    let id = request.add_variable(
        &parameter.name,
        value,
        parameter.description.clone().unwrap_or_default(),
    );
    if let Some(schema) = resolved_schema(spec, parameter)? {
        if schema.schema_type.is_some() {
            request.variable_mut(id).schema = schema_metadata(schema);
        }
    }
    Ok(id)
}

/// Value precedence for query, header, and cookie parameters: explicit
/// example, then the first entry of the examples map, then the schema
/// default.
fn example_first_value(spec: &OpenApiSpec, parameter: &Parameter) -> Result<String, ConvertError> {
    if let Some(value) = example_value(parameter) {
        return Ok(value_to_string(&value));
    }
    let schema = resolved_schema(spec, parameter)?;
    Ok(schema
        .and_then(|s| s.default_value.as_ref())
        .map(value_to_string)
        .unwrap_or_default())
}

/// The parameter's example value. A `summary`-carrying object is an
/// example-object wrapper; its inner `value` is the payload.
fn example_value(parameter: &Parameter) -> Option<Value> {
    if let Some(example) = &parameter.example {
        if let Value::Object(map) = example {
            if map.contains_key("summary") {
                return map.get("value").cloned();
            }
        }
        return Some(example.clone());
    }
    parameter
        .examples
        .values()
        .next()
        .and_then(|example| example.value.clone())
}

fn resolved_schema<'a>(
    spec: &'a OpenApiSpec,
    parameter: &'a Parameter,
) -> Result<Option<&'a Schema>, ConvertError> {
    match &parameter.schema {
        Some(node) => Ok(Some(refs::deref_schema(spec, node)?)),
        None => Ok(None),
    }
}

/// Serialize the JSON-Schema-compatible constraint subset as formatted
/// text. An empty subset is the empty string, not `{}`.
fn schema_metadata(schema: &Schema) -> String {
    let mut meta = serde_json::Map::new();

    if let Some(title) = &schema.title {
        meta.insert("title".to_string(), Value::from(title.clone()));
    }
    if let Some(multiple_of) = schema.multiple_of {
        meta.insert("multipleOf".to_string(), Value::from(multiple_of));
    }
    if let Some(maximum) = schema.maximum {
        meta.insert("maximum".to_string(), Value::from(maximum));
    }
    if let Some(exclusive_maximum) = schema.exclusive_maximum {
        meta.insert("exclusiveMaximum".to_string(), Value::from(exclusive_maximum));
    }
    if let Some(minimum) = schema.minimum {
        meta.insert("minimum".to_string(), Value::from(minimum));
    }
    if let Some(exclusive_minimum) = schema.exclusive_minimum {
        meta.insert("exclusiveMinimum".to_string(), Value::from(exclusive_minimum));
    }
    if let Some(max_length) = schema.max_length {
        meta.insert("maxLength".to_string(), Value::from(max_length));
    }
    if let Some(min_length) = schema.min_length {
        meta.insert("minLength".to_string(), Value::from(min_length));
    }
    if let Some(pattern) = &schema.pattern {
        meta.insert("pattern".to_string(), Value::from(pattern.clone()));
    }
    if let Some(max_items) = schema.max_items {
        meta.insert("maxItems".to_string(), Value::from(max_items));
    }
    if let Some(min_items) = schema.min_items {
        meta.insert("minItems".to_string(), Value::from(min_items));
    }
    if let Some(unique_items) = schema.unique_items {
        meta.insert("uniqueItems".to_string(), Value::from(unique_items));
    }
    if let Some(max_properties) = schema.max_properties {
        meta.insert("maxProperties".to_string(), Value::from(max_properties));
    }
    if let Some(min_properties) = schema.min_properties {
        meta.insert("minProperties".to_string(), Value::from(min_properties));
    }
    if !schema.required.is_empty() {
        meta.insert(
            "required".to_string(),
            Value::from(schema.required.clone()),
        );
    }
    if let Some(values) = &schema.enum_values {
        meta.insert("enum".to_string(), Value::from(values.clone()));
    }

    if meta.is_empty() {
        String::new()
    } else {
        serde_json::to_string_pretty(&Value::Object(meta)).unwrap_or_default()
    }
}
