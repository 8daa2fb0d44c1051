use crate::directives::GeneralInfo;
use crate::extractor::{path_segment_parameter, HttpMethod, ParameterLocation, RouteInfo};
use crate::schema_generator::{Schema, SchemaGenerator};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const OPENAPI_VERSION: &str = "3.0.0";
pub const DEFAULT_TITLE: &str = "Generated API";
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Assembles an [`OpenApiDocument`] route by route.
pub struct OpenApiBuilder {
    info: Info,
    servers: Vec<Server>,
    paths: BTreeMap<String, PathItem>,
    tags: BTreeSet<String>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// All operations of one path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }
}

/// A single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// path, query or header
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: BTreeMap<String, Schema>,
}

/// Complete OpenAPI document. Every map is ordered, so serializing the same
/// document twice gives identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Default for OpenApiDocument {
    fn default() -> Self {
        OpenApiBuilder::new().build(BTreeMap::new())
    }
}

fn json_content(schema: Schema) -> BTreeMap<String, MediaType> {
    BTreeMap::from([("application/json".to_string(), MediaType { schema })])
}

impl OpenApiBuilder {
    pub fn new() -> Self {
        Self {
            info: Info {
                title: DEFAULT_TITLE.to_string(),
                description: None,
                terms_of_service: None,
                contact: None,
                license: None,
                version: DEFAULT_VERSION.to_string(),
            },
            servers: Vec::new(),
            paths: BTreeMap::new(),
            tags: BTreeSet::new(),
        }
    }

    /// Applies the entry file's general API information.
    pub fn with_general_info(mut self, general: &GeneralInfo) -> Self {
        if let Some(title) = &general.title {
            self.info.title = title.clone();
        }
        if let Some(version) = &general.version {
            self.info.version = version.clone();
        }
        self.info.description = general.description.clone();
        self.info.terms_of_service = general.terms_of_service.clone();

        if general.contact_name.is_some()
            || general.contact_url.is_some()
            || general.contact_email.is_some()
        {
            self.info.contact = Some(Contact {
                name: general.contact_name.clone(),
                url: general.contact_url.clone(),
                email: general.contact_email.clone(),
            });
        }
        self.info.license = general.license_name.as_ref().map(|name| License {
            name: name.clone(),
            url: general.license_url.clone(),
        });

        if let Some(base_path) = &general.base_path {
            self.servers = vec![Server {
                url: base_path.clone(),
            }];
        }
        self
    }

    pub fn add_route(&mut self, route: &RouteInfo, schema_gen: &mut SchemaGenerator<'_>) {
        let openapi_path = Self::convert_path_format(&route.path);
        let registered = self
            .paths
            .get(&openapi_path)
            .and_then(|item| item.operation(route.method))
            .is_some();
        if registered {
            warn!(
                "{} {} is registered more than once, keeping the first registration",
                route.method.as_str(),
                openapi_path
            );
            return;
        }
        debug!("Adding route: {} {}", route.method.as_str(), openapi_path);

        let parameters: Vec<Parameter> = route
            .parameters
            .iter()
            .map(|p| Parameter {
                name: p.name.clone(),
                location: match p.location {
                    ParameterLocation::Path => "path",
                    ParameterLocation::Query => "query",
                }
                .to_string(),
                required: p.required,
                schema: schema_gen.generate_schema(&p.type_info),
            })
            .collect();

        let request_body = route.request_body.as_ref().map(|type_info| RequestBody {
            required: !type_info.is_option,
            content: json_content(schema_gen.generate_schema(type_info)),
        });

        let response = Response {
            description: "Successful response".to_string(),
            content: route
                .response_type
                .as_ref()
                .map(|type_info| json_content(schema_gen.generate_schema(type_info))),
        };

        self.tags.extend(route.docs.tags.iter().cloned());

        let operation = Operation {
            tags: route.docs.tags.clone(),
            summary: Some(
                route
                    .docs
                    .summary
                    .clone()
                    .unwrap_or_else(|| format!("{} {}", route.method.as_str(), route.path)),
            ),
            description: route.docs.description.clone(),
            operation_id: route.handler_resolved.then(|| route.handler_name.clone()),
            parameters: (!parameters.is_empty()).then_some(parameters),
            request_body,
            responses: BTreeMap::from([("200".to_string(), response)]),
            deprecated: route.docs.deprecated,
        };

        *self.paths.entry(openapi_path).or_default().slot(route.method) = Some(operation);
    }

    /// `/users/:id/*rest` and `/users/{id:\d+}` become `/users/{id}/{rest}` and `/users/{id}`.
    pub fn convert_path_format(path: &str) -> String {
        path.split('/')
            .map(|segment| match path_segment_parameter(segment) {
                Some(name) => format!("{{{}}}", name),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn build(self, schemas: BTreeMap<String, Schema>) -> OpenApiDocument {
        debug!(
            "Building OpenAPI document: {} paths, {} schemas",
            self.paths.len(),
            schemas.len()
        );

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            servers: self.servers,
            paths: self.paths,
            components: (!schemas.is_empty()).then_some(Components { schemas }),
            tags: self.tags.into_iter().map(|name| Tag { name }).collect(),
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
