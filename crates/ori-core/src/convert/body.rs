use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ConvertError;
use crate::instantiate::{InstantiateOptions, Instantiator};
use crate::parse::media_type::MediaType;
use crate::parse::operation::Operation;
use crate::parse::refs;
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::spec::OpenApiSpec;
use crate::project::{Body, Request};
use crate::template::TemplatedValue;

use super::value_to_string;

/// Bind the operation's request body. Every media type is considered in
/// document order and the last one that yields a value wins; the
/// `Content-Type` header tracks the winning media type unless parameter
/// binding already set one.
pub fn bind_body(
    spec: &OpenApiSpec,
    request: &mut Request,
    operation: &Operation,
) -> Result<(), ConvertError> {
    let Some(body_or_ref) = &operation.request_body else {
        return Ok(());
    };
    let body = match body_or_ref {
        RequestBodyOrRef::RequestBody(inner) => inner,
        RequestBodyOrRef::Ref { ref_path } => refs::request_body(spec, ref_path)?,
    };

    let content_type_preset = request.header("content-type").is_some();
    let mut bound_media: Option<String> = None;

    for (media_name, media) in &body.content {
        let value = match media_example_value(media) {
            Some(value) => Some(value),
            None => instantiated_schema_value(spec, media)?,
        };
        let Some(value) = value else {
            continue;
        };
        if let Some(body) = body_for(media_name, value) {
            request.body = Some(body);
            bound_media = Some(media_name.clone());
        }
    }

    if let Some(media_name) = bound_media {
        if !content_type_preset {
            request.set_header("Content-Type", TemplatedValue::Literal(media_name));
        }
    }
    Ok(())
}

/// The media type's example payload: an explicit example object's `value`,
/// else the first entry of the examples map.
fn media_example_value(media: &MediaType) -> Option<Value> {
    if let Some(Value::Object(example)) = &media.example {
        if let Some(value) = example.get("value") {
            return Some(value.clone());
        }
    }
    media
        .examples
        .values()
        .next()
        .and_then(|example| example.value.clone())
}

/// No example anywhere: synthesize a value from the media type's schema.
fn instantiated_schema_value(
    spec: &OpenApiSpec,
    media: &MediaType,
) -> Result<Option<Value>, ConvertError> {
    let Some(schema) = &media.schema else {
        return Ok(None);
    };
    let mut instantiator = Instantiator::new(spec);
    Ok(instantiator.instantiate(schema, &InstantiateOptions::default())?)
}

fn body_for(content_type: &str, value: Value) -> Option<Body> {
    match content_type.to_ascii_lowercase().as_str() {
        "application/json" => Some(json_body(value)),
        "application/x-www-form-urlencoded" => match form_fields(&value) {
            Some(fields) => Some(Body::UrlEncoded(fields)),
            None => {
                log::warn!("cannot coerce {content_type} body value to a key/value form");
                None
            }
        },
        "multipart/form-data" => match form_fields(&value) {
            Some(fields) => Some(Body::Multipart(fields)),
            None => {
                log::warn!("cannot coerce {content_type} body value to a key/value form");
                None
            }
        },
        _ => Some(Body::Raw(value_to_string(&value))),
    }
}

/// A string value is parsed as JSON; a string that fails to parse is kept,
/// wrapped under a `value` key. Structured values pass through.
fn json_body(value: Value) -> Body {
    match value {
        Value::String(raw) => match serde_json::from_str(&raw) {
            Ok(parsed) => Body::Json(parsed),
            Err(_) => Body::Json(serde_json::json!({ "value": raw })),
        },
        other => Body::Json(other),
    }
}

/// Coerce a form body value to a flat key→value map. Accepts an array of
/// `{key, value}` pairs or a plain object.
fn form_fields(value: &Value) -> Option<IndexMap<String, String>> {
    match value {
        Value::Array(entries) => {
            let mut fields = IndexMap::new();
            for entry in entries {
                let Value::Object(pair) = entry else {
                    continue;
                };
                let (Some(key), Some(value)) = (
                    pair.get("key").and_then(Value::as_str),
                    pair.get("value"),
                ) else {
                    continue;
                };
                fields.insert(key.to_string(), value_to_string(value));
            }
            Some(fields)
        }
        Value::Object(map) => Some(
            map.iter()
                .map(|(key, value)| (key.clone(), value_to_string(value)))
                .collect(),
        ),
        _ => None,
    }
}
