use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::parse::refs;
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};
use crate::parse::spec::OpenApiSpec;

/// Options for example-value instantiation.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantiateOptions {
    /// Restrict object traversal to properties named in the schema's
    /// `required` list.
    pub required_properties_only: bool,
}

/// Synthesizes one plausible example value for a schema node. This is not a
/// validator; it picks the first matching construction rule and recurses
/// depth-first.
///
/// Reference resolution tracks the pointers currently being expanded, so a
/// cyclic chain fails fast instead of recursing forever.
pub struct Instantiator<'a> {
    spec: &'a OpenApiSpec,
    resolving: HashSet<String>,
}

impl<'a> Instantiator<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            spec,
            resolving: HashSet::new(),
        }
    }

    /// Produce an example value for `node`, or `None` when the node yields
    /// nothing (malformed or empty-enum schemas omit their key).
    pub fn instantiate(
        &mut self,
        node: &SchemaOrRef,
        options: &InstantiateOptions,
    ) -> Result<Option<Value>, ResolveError> {
        match node {
            SchemaOrRef::Ref { ref_path } => {
                if self.resolving.contains(ref_path) {
                    return Err(ResolveError::CircularRef(ref_path.clone()));
                }
                self.resolving.insert(ref_path.clone());
                let target = refs::schema(self.spec, ref_path)?.clone();
                let value = self.instantiate(&target, options);
                self.resolving.remove(ref_path);
                value
            }
            SchemaOrRef::Schema(schema) => self.visit(schema, options),
        }
    }

    fn visit(
        &mut self,
        schema: &Schema,
        options: &InstantiateOptions,
    ) -> Result<Option<Value>, ResolveError> {
        if !schema.all_of.is_empty() {
            return self.merge_all_of(schema, options);
        }

        match schema.primary_type() {
            Some(SchemaType::Object) if !schema.properties.is_empty() => {
                let mut object = Map::new();
                for (name, property) in &schema.properties {
                    if !should_visit(name, schema, options) {
                        continue;
                    }
                    if let Some(value) = self.instantiate(property, options)? {
                        object.insert(name.clone(), value);
                    }
                }
                Ok(Some(Value::Object(object)))
            }
            Some(SchemaType::Array) => {
                let count = schema.min_items.unwrap_or(0);
                let mut items = Vec::new();
                if let Some(element) = &schema.items {
                    for _ in 0..count {
                        if let Some(value) = self.instantiate(element, options)? {
                            items.push(value);
                        }
                    }
                }
                Ok(Some(Value::Array(items)))
            }
            _ => {
                if let Some(values) = &schema.enum_values {
                    if let Some(default) = &schema.default_value {
                        return Ok(Some(default.clone()));
                    }
                    return Ok(values.first().cloned());
                }
                Ok(primitive_value(schema))
            }
        }
    }

    /// Instantiate every `allOf` member into the same target: object
    /// members merge keys, scalar members overwrite what came before.
    fn merge_all_of(
        &mut self,
        schema: &Schema,
        options: &InstantiateOptions,
    ) -> Result<Option<Value>, ResolveError> {
        let mut merged: Option<Value> = None;
        for member in &schema.all_of {
            let Some(next) = self.instantiate(member, options)? else {
                continue;
            };
            merged = Some(match (merged, next) {
                (Some(Value::Object(mut accumulated)), Value::Object(incoming)) => {
                    for (key, value) in incoming {
                        accumulated.insert(key, value);
                    }
                    Value::Object(accumulated)
                }
                (_, incoming) => incoming,
            });
        }
        Ok(merged)
    }
}

fn should_visit(property: &str, schema: &Schema, options: &InstantiateOptions) -> bool {
    !options.required_properties_only || schema.required.iter().any(|r| r == property)
}

/// An explicit example wins; otherwise the type's zero value. A node with
/// no usable type yields nothing.
fn primitive_value(schema: &Schema) -> Option<Value> {
    let ty = schema.primary_type()?;
    if let Some(example) = &schema.example {
        return Some(example.clone());
    }
    Some(match ty {
        SchemaType::String => Value::String(String::new()),
        SchemaType::Number | SchemaType::Integer => Value::from(0),
        SchemaType::Boolean => Value::Bool(false),
        SchemaType::Null => Value::Null,
        SchemaType::Object => Value::Object(Map::new()),
        SchemaType::Array => Value::Array(Vec::new()),
    })
}
