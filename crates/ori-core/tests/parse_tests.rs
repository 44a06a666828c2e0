use ori_core::parse;
use ori_core::parse::operation::HttpMethod;
use ori_core::parse::security::SecuritySchemeType;

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const SECURED: &str = include_str!("fixtures/secured.yaml");

#[test]
fn parse_petstore_yaml() {
    let spec = parse::from_yaml(PETSTORE).expect("should parse petstore");
    assert_eq!(spec.openapi, "3.0.3");
    assert_eq!(spec.info.title, "Petstore API");
    assert_eq!(spec.paths.len(), 4);

    let server = &spec.servers[0];
    assert_eq!(server.url, "https://{region}.petstore.test/v2/");
    assert_eq!(
        server.variables.get("region").and_then(|v| v.default.as_deref()),
        Some("eu")
    );
}

#[test]
fn operations_enumerate_verbs_only() {
    let yaml = r#"
openapi: 3.0.0
info:
  title: Shared fields
  version: "1"
paths:
  /things:
    summary: Path-level summary
    description: Path-level description
    servers:
      - url: https://things.test
    parameters:
      - name: q
        in: query
        schema:
          type: string
    get:
      summary: List things
    delete:
      summary: Remove things
"#;
    let spec = parse::from_yaml(yaml).unwrap();
    let item = spec.paths.get("/things").unwrap();

    let methods: Vec<HttpMethod> = item.operations().map(|(m, _)| m).collect();
    assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Delete]);
    assert_eq!(item.parameters.len(), 1);
    assert_eq!(item.servers.len(), 1);
}

#[test]
fn rejects_unsupported_version() {
    let yaml = r#"
openapi: "2.0.0"
info:
  title: Old
  version: "1"
paths: {}
"#;
    assert!(parse::from_yaml(yaml).is_err());
}

#[test]
fn from_text_dispatches_on_media_type() {
    let json = r#"{"openapi": "3.0.0", "info": {"title": "J", "version": "1"}, "paths": {}}"#;
    let spec = parse::from_text(json, "application/json").unwrap();
    assert_eq!(spec.info.title, "J");

    // Anything that is not JSON is decoded as YAML.
    let yaml = "openapi: 3.1.0\ninfo:\n  title: Y\n  version: \"1\"\npaths: {}\n";
    let spec = parse::from_text(yaml, "text/yaml").unwrap();
    assert_eq!(spec.info.title, "Y");

    assert!(parse::from_text(yaml, "application/json").is_err());
}

#[test]
fn unknown_security_scheme_type_survives_parsing() {
    let spec = parse::from_yaml(SECURED).unwrap();
    let schemes = &spec.components.as_ref().unwrap().security_schemes;

    assert_eq!(
        schemes.get("legacy").map(|s| s.scheme_type),
        Some(SecuritySchemeType::Unknown)
    );
    assert_eq!(
        schemes.get("keyAuth").map(|s| s.scheme_type),
        Some(SecuritySchemeType::ApiKey)
    );
    assert_eq!(
        schemes.get("oidc").map(|s| s.scheme_type),
        Some(SecuritySchemeType::OpenIdConnect)
    );
}

#[test]
fn oauth_flows_preserve_declaration_order() {
    let yaml = r#"
openapi: 3.0.0
info:
  title: Flows
  version: "1"
paths: {}
components:
  securitySchemes:
    oauth:
      type: oauth2
      flows:
        password:
          tokenUrl: https://auth.test/token
          scopes: {}
        implicit:
          authorizationUrl: https://auth.test/authorize
          scopes: {}
"#;
    let spec = parse::from_yaml(yaml).unwrap();
    let scheme = &spec.components.as_ref().unwrap().security_schemes["oauth"];
    let flows = scheme.flows.as_ref().unwrap();

    let order: Vec<&str> = flows.keys().map(String::as_str).collect();
    assert_eq!(order, vec!["password", "implicit"]);
}
