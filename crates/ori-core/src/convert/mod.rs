pub mod auth;
pub mod body;
pub mod parameters;

use serde_json::Value;

use crate::environment::EnvironmentBinder;
use crate::error::ConvertError;
use crate::group::{GroupedPath, grouped_units};
use crate::parse::operation::{HttpMethod, Operation, PathItem};
use crate::parse::spec::OpenApiSpec;
use crate::project::{Project, Request};
use crate::template;
use crate::url::{ParsedUrl, resolve_base_url};

/// Example summary marking a path parameter as optional, a convention
/// layered on top of the document format.
pub const NON_REQUIRED_SUMMARY: &str = "NonRequired";

/// Example summary marking a reusable example as a basic-auth credential
/// pair.
pub const BASIC_CREDENTIALS_SUMMARY: &str = "Basic credentials";

/// Options controlling one conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Host used when neither the operation, the path item, nor the
    /// document declares a server. Without it, a serverless operation is an
    /// error.
    pub fallback_server_url: Option<String>,

    /// Log and skip operations that fail to convert instead of aborting the
    /// document.
    pub skip_failed_operations: bool,
}

/// Drives one document through grouping, URL resolution, and the three
/// operation binders, appending the generated requests into the project.
///
/// All conversion state lives on the converter instance, so concurrent
/// imports stay isolated by construction.
pub struct Converter {
    project: Project,
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            project: Project::new(),
            options,
        }
    }

    /// Convert every non-deprecated operation of the document. Requests land
    /// in groups named after top-level path segments; variables land in an
    /// environment domain named after the document title.
    pub fn convert(&mut self, spec: &OpenApiSpec) -> Result<(), ConvertError> {
        for unit in grouped_units(spec.paths.keys()) {
            let Some(path_item) = spec.paths.get(&unit.path) else {
                continue;
            };
            for (method, operation) in path_item.operations() {
                if operation.deprecated.unwrap_or(false) {
                    continue;
                }
                match self.convert_operation(spec, &unit, path_item, method, operation) {
                    Ok(request) => {
                        self.project.group_mut(&unit.group).requests.push(request);
                    }
                    Err(error) if self.options.skip_failed_operations => {
                        log::warn!("skipping {method} {}: {error}", unit.path);
                    }
                    Err(error) => return Err(error),
                }
            }
        }
        Ok(())
    }

    /// Order matters: parameters are bound before auth because bearer and
    /// API-key schemes rely on headers and query entries that parameter
    /// binding creates.
    fn convert_operation(
        &mut self,
        spec: &OpenApiSpec,
        unit: &GroupedPath,
        path_item: &PathItem,
        method: HttpMethod,
        operation: &Operation,
    ) -> Result<Request, ConvertError> {
        let base = resolve_base_url(
            operation,
            path_item,
            spec,
            &unit.path,
            self.options.fallback_server_url.as_deref(),
        )?;

        let mut request = Request::new(
            request_name(operation, &unit.path),
            method.as_str(),
            operation.description.clone().unwrap_or_default(),
        );

        {
            let mut env = EnvironmentBinder::new(self.project.domain_mut(&spec.info.title));
            let url = template::resolve(&base.url, &request, &mut env, "");
            let parsed = ParsedUrl::parse(&url.evaluated(&request, &env));
            log::debug!(
                "{method} {}: host {:?}, port {:?}, pathname {}",
                unit.path,
                parsed.hostname,
                parsed.port,
                parsed.pathname
            );
            request.url = url;
        }

        parameters::bind_parameters(
            spec,
            &mut request,
            path_item.parameters.iter().chain(operation.parameters.iter()),
        )?;
        auth::bind_auth(spec, &mut request, operation, &unit.path)?;
        body::bind_body(spec, &mut request, operation)?;

        Ok(request)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }
}

fn request_name(operation: &Operation, path: &str) -> String {
    operation
        .summary
        .clone()
        .or_else(|| operation.operation_id.clone())
        .unwrap_or_else(|| path.to_string())
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
