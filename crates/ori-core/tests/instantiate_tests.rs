use serde_json::{Value, json};

use ori_core::error::ResolveError;
use ori_core::instantiate::{InstantiateOptions, Instantiator};
use ori_core::parse;
use ori_core::parse::schema::SchemaOrRef;
use ori_core::parse::spec::OpenApiSpec;

fn empty_spec() -> OpenApiSpec {
    parse::from_yaml("openapi: 3.0.0\ninfo:\n  title: T\n  version: \"1\"\npaths: {}\n").unwrap()
}

fn schema(yaml: &str) -> SchemaOrRef {
    serde_yaml_ng::from_str(yaml).expect("schema yaml")
}

fn instantiate(node: &SchemaOrRef) -> Option<Value> {
    let spec = empty_spec();
    Instantiator::new(&spec)
        .instantiate(node, &InstantiateOptions::default())
        .unwrap()
}

#[test]
fn primitive_prefers_example_over_zero_value() {
    let node = schema("type: string\nexample: abc\n");
    assert_eq!(instantiate(&node), Some(json!("abc")));

    let node = schema("type: string\n");
    assert_eq!(instantiate(&node), Some(json!("")));
}

#[test]
fn zero_values_per_type() {
    assert_eq!(instantiate(&schema("type: integer\n")), Some(json!(0)));
    assert_eq!(instantiate(&schema("type: number\n")), Some(json!(0)));
    assert_eq!(instantiate(&schema("type: boolean\n")), Some(json!(false)));
    assert_eq!(instantiate(&schema("type: \"null\"\n")), Some(Value::Null));
    assert_eq!(instantiate(&schema("type: object\n")), Some(json!({})));
}

#[test]
fn malformed_node_yields_nothing() {
    assert_eq!(instantiate(&schema("description: no type here\n")), None);
}

#[test]
fn object_traversal_builds_properties() {
    let node = schema(
        r#"
type: object
properties:
  name:
    type: string
    example: Bella
  age:
    type: integer
"#,
    );
    assert_eq!(instantiate(&node), Some(json!({"name": "Bella", "age": 0})));
}

#[test]
fn required_properties_only_restricts_key_set() {
    let node = schema(
        r#"
type: object
required:
  - name
  - tag
properties:
  name:
    type: string
  age:
    type: integer
  tag:
    type: string
"#,
    );
    let spec = empty_spec();
    let value = Instantiator::new(&spec)
        .instantiate(
            &node,
            &InstantiateOptions {
                required_properties_only: true,
            },
        )
        .unwrap()
        .unwrap();

    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["name", "tag"]);
}

#[test]
fn array_length_follows_min_items() {
    let node = schema(
        r#"
type: array
minItems: 3
items:
  type: string
  example: x
"#,
    );
    assert_eq!(instantiate(&node), Some(json!(["x", "x", "x"])));

    let node = schema("type: array\nitems:\n  type: string\n");
    assert_eq!(instantiate(&node), Some(json!([])));
}

#[test]
fn enum_prefers_default_then_first_value() {
    let node = schema("enum: [red, green]\ndefault: green\n");
    assert_eq!(instantiate(&node), Some(json!("green")));

    let node = schema("enum: [red, green]\n");
    assert_eq!(instantiate(&node), Some(json!("red")));

    let node = schema("enum: []\n");
    assert_eq!(instantiate(&node), None);
}

#[test]
fn all_of_merges_object_members() {
    let node = schema(
        r#"
allOf:
  - type: object
    properties:
      id:
        type: integer
  - type: object
    properties:
      name:
        type: string
        example: left
      id:
        type: integer
        example: 9
"#,
    );
    assert_eq!(instantiate(&node), Some(json!({"id": 9, "name": "left"})));
}

#[test]
fn first_of_multiple_types_wins() {
    let node = schema("type: [string, integer]\n");
    assert_eq!(instantiate(&node), Some(json!("")));
}

#[test]
fn resolves_component_references() {
    let spec = parse::from_yaml(
        r#"
openapi: 3.0.0
info:
  title: Refs
  version: "1"
paths: {}
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
          example: Bella
"#,
    )
    .unwrap();

    let node = schema("$ref: \"#/components/schemas/Pet\"\n");
    let value = Instantiator::new(&spec)
        .instantiate(&node, &InstantiateOptions::default())
        .unwrap();
    assert_eq!(value, Some(json!({"name": "Bella"})));
}

#[test]
fn dangling_reference_is_an_error() {
    let spec = empty_spec();
    let node = schema("$ref: \"#/components/schemas/Missing\"\n");
    let result = Instantiator::new(&spec).instantiate(&node, &InstantiateOptions::default());
    assert!(matches!(result, Err(ResolveError::RefTargetNotFound(_))));
}

#[test]
fn cyclic_reference_chain_fails_fast() {
    let spec = parse::from_yaml(
        r##"
openapi: 3.0.0
info:
  title: Cycle
  version: "1"
paths: {}
components:
  schemas:
    Node:
      type: object
      properties:
        peer:
          $ref: "#/components/schemas/Peer"
    Peer:
      type: object
      properties:
        back:
          $ref: "#/components/schemas/Node"
"##,
    )
    .unwrap();

    let node = schema("$ref: \"#/components/schemas/Node\"\n");
    let result = Instantiator::new(&spec).instantiate(&node, &InstantiateOptions::default());
    assert!(matches!(result, Err(ResolveError::CircularRef(_))));
}

#[test]
fn diamond_references_are_not_cycles() {
    let spec = parse::from_yaml(
        r##"
openapi: 3.0.0
info:
  title: Diamond
  version: "1"
paths: {}
components:
  schemas:
    Leaf:
      type: string
      example: leaf
    Branch:
      type: object
      properties:
        left:
          $ref: "#/components/schemas/Leaf"
        right:
          $ref: "#/components/schemas/Leaf"
"##,
    )
    .unwrap();

    let node = schema("$ref: \"#/components/schemas/Branch\"\n");
    let value = Instantiator::new(&spec)
        .instantiate(&node, &InstantiateOptions::default())
        .unwrap();
    assert_eq!(value, Some(json!({"left": "leaf", "right": "leaf"})));
}
