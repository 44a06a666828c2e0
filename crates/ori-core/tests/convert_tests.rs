use ori_core::convert::{ConvertOptions, Converter};
use ori_core::environment::EnvironmentBinder;
use ori_core::error::ConvertError;
use ori_core::parse;
use ori_core::project::{Body, Project, Request};
use ori_core::template::{self, Segment, TemplatedValue};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const SECURED: &str = include_str!("fixtures/secured.yaml");
const ROUNDTRIP: &str = include_str!("fixtures/roundtrip.yaml");

fn convert(yaml: &str, options: ConvertOptions) -> Result<Project, ConvertError> {
    let spec = parse::from_yaml(yaml).expect("fixture should parse");
    let mut converter = Converter::new(options);
    converter.convert(&spec)?;
    Ok(converter.into_project())
}

#[test]
fn petstore_groups_by_first_path_segment() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();

    let names: Vec<&str> = project.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Pets", "Owners", "Store"]);
    assert_eq!(project.group("Pets").unwrap().requests.len(), 2);
    assert_eq!(project.group("Owners").unwrap().requests.len(), 1);
    // The deprecated GET never produces a request.
    assert_eq!(project.group("Store").unwrap().requests.len(), 1);
}

#[test]
fn server_variables_substitute_literally() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();

    let list = &project.group("Pets").unwrap().requests[0];
    assert_eq!(list.name, "List pets");
    assert_eq!(
        list.url,
        TemplatedValue::Literal("https://eu.petstore.test/v2/pets".to_string())
    );
}

#[test]
fn unresolved_path_placeholder_is_dropped_from_url() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();

    let get_pet = &project.group("Pets").unwrap().requests[1];
    assert_eq!(
        get_pet.url,
        TemplatedValue::Literal("https://eu.petstore.test/v2/pets/".to_string())
    );
}

#[test]
fn query_parameter_binds_a_variable_reference() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();

    let list = &project.group("Pets").unwrap().requests[0];
    let limit = list.variable_by_name("limit").expect("limit variable");
    assert_eq!(limit.value, "20");
    assert_eq!(limit.description, "Page size");
    assert!(limit.required);
    assert!(limit.schema.contains("maximum"));
    assert!(!limit.schema.contains("default"));

    match list.url_param("limit") {
        Some(TemplatedValue::Composite(segments)) => {
            assert_eq!(segments, &vec![Segment::RequestVariableRef(limit.id)]);
        }
        other => panic!("expected a variable reference, got {other:?}"),
    }
}

#[test]
fn header_parameter_prefers_example_value() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();

    let list = &project.group("Pets").unwrap().requests[0];
    let trace = list.variable_by_name("X-Trace").expect("X-Trace variable");
    assert_eq!(trace.value, "abc123");
    assert!(list.header("x-trace").is_some());
}

#[test]
fn cookie_parameters_accumulate() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();

    let list = &project.group("Pets").unwrap().requests[0];
    assert_eq!(
        list.header("cookie").and_then(|v| v.as_literal()),
        Some("session=anon; debug=0; ")
    );
}

#[test]
fn path_parameter_prefers_default_and_honors_marker() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();

    let get_pet = &project.group("Pets").unwrap().requests[1];
    let pet_id = get_pet.variable_by_name("petId").expect("petId variable");
    assert_eq!(pet_id.value, "42");
    assert!(!pet_id.required);

    // Without the marker the variable stays required.
    let get_owner = &project.group("Owners").unwrap().requests[0];
    let owner_id = get_owner.variable_by_name("ownerId").unwrap();
    assert_eq!(owner_id.value, "o-1");
    assert!(owner_id.required);
}

#[test]
fn deprecated_parameters_are_skipped() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();

    let order = &project.group("Store").unwrap().requests[0];
    assert!(order.variable_by_name("idempotency-key").is_none());
    assert!(order.header("idempotency-key").is_none());
}

#[test]
fn form_body_coerces_to_key_value_pairs() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();

    let order = &project.group("Store").unwrap().requests[0];
    match &order.body {
        Some(Body::UrlEncoded(fields)) => {
            assert_eq!(fields.get("sku").map(String::as_str), Some("p-1"));
            assert_eq!(fields.get("qty").map(String::as_str), Some("2"));
        }
        other => panic!("expected url-encoded body, got {other:?}"),
    }
    assert_eq!(
        order.header("content-type").and_then(|v| v.as_literal()),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn environment_domain_is_named_after_the_document() {
    let project = convert(PETSTORE, ConvertOptions::default()).unwrap();
    assert!(project.domain("Petstore API").is_some());
    assert_eq!(project.environments.len(), 1);
}

#[test]
fn known_environment_variable_becomes_a_live_reference() {
    let mut project = Project::new();
    let domain = project.domain_mut("Doc");
    domain.ensure_variable("version");
    let mut env = EnvironmentBinder::new(domain);
    let request = Request::new("r".to_string(), "GET", String::new());

    let value = template::resolve("https://api.test/{version}/pets", &request, &mut env, "");
    assert_eq!(
        value,
        TemplatedValue::Composite(vec![
            Segment::Literal("https://api.test/".to_string()),
            Segment::EnvironmentRef("version".to_string()),
            Segment::Literal("/pets".to_string()),
        ])
    );
}

#[test]
fn basic_auth_fills_from_matching_credentials_example() {
    let project = convert(
        SECURED,
        ConvertOptions {
            skip_failed_operations: true,
            ..ConvertOptions::default()
        },
    )
    .unwrap();

    let invoices = project.group("Invoices").unwrap();
    let list = &invoices.requests[0];
    let basic = list.basic_auth.as_ref().expect("basic auth");
    assert_eq!(basic.username, "billing-bot");
    assert_eq!(basic.password, "hunter2");

    // A basic scheme with no matching example falls back to empty fields.
    let preview = &invoices.requests[2];
    let basic = preview.basic_auth.as_ref().expect("basic auth");
    assert_eq!(basic.username, "");
    assert_eq!(basic.password, "");
}

#[test]
fn oauth2_uses_first_declared_flow() {
    let project = convert(
        SECURED,
        ConvertOptions {
            skip_failed_operations: true,
            ..ConvertOptions::default()
        },
    )
    .unwrap();

    let create = &project.group("Invoices").unwrap().requests[1];
    let oauth2 = create.oauth2.as_ref().expect("oauth2 credentials");
    assert_eq!(oauth2.grant_type, "authorization_code");
    assert_eq!(oauth2.scope, "invoices:read invoices:write");
    assert_eq!(
        oauth2.authorization_uri.as_deref(),
        Some("https://billing.test/oauth/authorize")
    );
    assert_eq!(
        oauth2.access_token_uri.as_deref(),
        Some("https://billing.test/oauth/token")
    );
    assert_eq!(oauth2.client_id, "");
    assert_eq!(oauth2.client_secret, "");
}

#[test]
fn bearer_and_api_key_schemes_leave_auth_to_parameters() {
    let project = convert(
        SECURED,
        ConvertOptions {
            skip_failed_operations: true,
            ..ConvertOptions::default()
        },
    )
    .unwrap();

    let tokens = &project.group("Tokens").unwrap().requests[0];
    assert!(tokens.basic_auth.is_none());
    assert!(tokens.oauth2.is_none());
    // The credential header came from parameter binding.
    let api_key = tokens.variable_by_name("X-Api-Key").unwrap();
    assert_eq!(api_key.value, "k-123");
    assert!(tokens.header("X-Api-Key").is_some());
}

#[test]
fn unknown_scheme_type_fails_the_operation() {
    let result = convert(SECURED, ConvertOptions::default());
    assert!(matches!(
        result,
        Err(ConvertError::UnsupportedSecurityScheme { .. })
    ));
}

#[test]
fn skipping_failed_operations_keeps_the_rest() {
    let project = convert(
        SECURED,
        ConvertOptions {
            skip_failed_operations: true,
            ..ConvertOptions::default()
        },
    )
    .unwrap();

    // The export operation is dropped, its siblings survive.
    let invoices = project.group("Invoices").unwrap();
    assert_eq!(invoices.requests.len(), 3);
    assert!(invoices.requests.iter().all(|r| r.name != "Export invoices"));
    assert!(project.group("Wellknown").is_some());
}

#[test]
fn missing_server_is_an_error_unless_a_fallback_is_configured() {
    let yaml = r#"
openapi: 3.0.0
info:
  title: Serverless
  version: "1"
paths:
  /things:
    get:
      summary: List things
"#;
    let result = convert(yaml, ConvertOptions::default());
    assert!(matches!(result, Err(ConvertError::NoServer { .. })));

    let project = convert(
        yaml,
        ConvertOptions {
            fallback_server_url: Some("https://fallback.test".to_string()),
            ..ConvertOptions::default()
        },
    )
    .unwrap();
    let request = &project.group("Things").unwrap().requests[0];
    assert_eq!(
        request.url,
        TemplatedValue::Literal("https://fallback.test/things".to_string())
    );
}

#[test]
fn path_item_servers_override_document_servers() {
    let yaml = r#"
openapi: 3.0.0
info:
  title: Overrides
  version: "1"
servers:
  - url: https://document.test
paths:
  /things:
    servers:
      - url: https://path.test/
    get:
      summary: List things
"#;
    let project = convert(yaml, ConvertOptions::default()).unwrap();
    let request = &project.group("Things").unwrap().requests[0];
    assert_eq!(
        request.url,
        TemplatedValue::Literal("https://path.test/things".to_string())
    );
}

#[test]
fn roundtrip_two_paths_one_group() {
    let project = convert(ROUNDTRIP, ConvertOptions::default()).unwrap();

    assert_eq!(project.groups.len(), 1);
    let shipments = project.group("Shipments").unwrap();
    assert_eq!(shipments.requests.len(), 2);

    let list = &shipments.requests[0];
    assert_eq!(list.method, "GET");
    assert_eq!(
        list.url,
        TemplatedValue::Literal("https://api.tracking.test/shipments".to_string())
    );
    let status = list.variable_by_name("status").unwrap();
    assert_eq!(status.value, "pending");
    assert!(list.url_param("status").is_some());

    let scan = &shipments.requests[1];
    assert_eq!(scan.method, "POST");
    match &scan.body {
        Some(Body::Json(value)) => {
            assert_eq!(value, &serde_json::json!({"code": "XYZ-1", "note": ""}));
        }
        other => panic!("expected a JSON body, got {other:?}"),
    }
    assert_eq!(
        scan.header("content-type").and_then(|v| v.as_literal()),
        Some("application/json")
    );
}
