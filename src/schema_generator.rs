use crate::extractor::TypeInfo;
use crate::type_resolver::{FieldDef, PrimitiveType, ResolvedType, TypeKind, TypeResolver};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Converts Rust types into OpenAPI schemas.
///
/// Structs and enums found by the [`TypeResolver`] are emitted once as
/// components and referenced by `$ref`; everything else is inlined.
pub struct SchemaGenerator<'r> {
    type_resolver: &'r TypeResolver,
    options: SchemaOptions,
    schemas: BTreeMap<String, Schema>,
    /// Shallowest depth each component was generated at
    generated_at: HashMap<String, usize>,
    /// Aliases and flattened structs being expanded
    expanding: Vec<String>,
}

/// How far model types are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaOptions {
    /// When false, every model type is documented as a plain object.
    pub resolve_models: bool,
    /// Deepest model level that is expanded; types named by a route are level 1.
    pub max_depth: Option<usize>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            resolve_models: true,
            max_depth: None,
        }
    }
}

/// OpenAPI Schema object (the subset this generator emits).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// e.g. "int32", "int64", "float", "double", "uuid", "date-time"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl Schema {
    pub fn typed(schema_type: &str, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Self::default()
        }
    }

    /// `{"type": "object"}`, used for anything that cannot be described further.
    pub fn object() -> Self {
        Self::typed("object", None)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array", None)
        }
    }

    pub fn component_ref(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Self::default()
        }
    }
}

fn primitive_schema(primitive: PrimitiveType) -> Schema {
    let (schema_type, format) = match primitive {
        PrimitiveType::String | PrimitiveType::Char => ("string", None),
        PrimitiveType::I8
        | PrimitiveType::I16
        | PrimitiveType::I32
        | PrimitiveType::U8
        | PrimitiveType::U16
        | PrimitiveType::U32 => ("integer", Some("int32")),
        PrimitiveType::I64 | PrimitiveType::I128 | PrimitiveType::U64 | PrimitiveType::U128 => {
            ("integer", Some("int64"))
        }
        PrimitiveType::F32 => ("number", Some("float")),
        PrimitiveType::F64 => ("number", Some("double")),
        PrimitiveType::Bool => ("boolean", None),
        PrimitiveType::Uuid => ("string", Some("uuid")),
        PrimitiveType::DateTime => ("string", Some("date-time")),
        PrimitiveType::Date => ("string", Some("date")),
    };
    Schema::typed(schema_type, format)
}

impl<'r> SchemaGenerator<'r> {
    pub fn new(type_resolver: &'r TypeResolver, options: SchemaOptions) -> Self {
        debug!("Initializing SchemaGenerator with {:?}", options);
        Self {
            type_resolver,
            options,
            schemas: BTreeMap::new(),
            generated_at: HashMap::new(),
            expanding: Vec::new(),
        }
    }

    /// Schema for a type named directly by a route.
    pub fn generate_schema(&mut self, type_info: &TypeInfo) -> Schema {
        self.schema_at(type_info, 1)
    }

    fn schema_at(&mut self, type_info: &TypeInfo, depth: usize) -> Schema {
        if type_info.is_option || type_info.is_vec {
            let inner = match type_info.generic_args.first() {
                Some(inner) => self.schema_at(inner, depth),
                None => Schema::object(),
            };
            return if type_info.is_vec {
                Schema::array(inner)
            } else {
                inner
            };
        }

        if let Some(primitive) = TypeResolver::primitive(&type_info.name) {
            return primitive_schema(primitive);
        }

        if matches!(type_info.name.as_str(), "HashMap" | "BTreeMap" | "IndexMap") {
            let mut schema = Schema::object();
            if let Some(value) = type_info.generic_args.get(1) {
                schema.additional_properties = Some(Box::new(self.schema_at(value, depth)));
            }
            return schema;
        }

        if !self.options.resolve_models {
            return Schema::object();
        }

        let resolver = self.type_resolver;
        let Some(resolved) = resolver.resolve_type(&type_info.name) else {
            return Schema::object();
        };

        if self.options.max_depth.is_some_and(|max| depth > max) {
            debug!("{} is below the depth limit, using object placeholder", resolved.name);
            return Schema::object();
        }

        match &resolved.kind {
            TypeKind::Alias(inner) => {
                if self.expanding.contains(&resolved.name) {
                    return Schema::object();
                }
                self.expanding.push(resolved.name.clone());
                let schema = self.schema_at(inner, depth);
                self.expanding.pop();
                schema
            }
            TypeKind::Struct(_) | TypeKind::Enum(_) => {
                self.ensure_component(resolved, depth);
                Schema::component_ref(&resolved.name)
            }
        }
    }

    fn ensure_component(&mut self, resolved: &'r ResolvedType, depth: usize) {
        if self
            .generated_at
            .get(&resolved.name)
            .is_some_and(|&generated| generated <= depth)
        {
            return;
        }
        // Registered before the fields are walked so self references end in a `$ref`.
        self.generated_at.insert(resolved.name.clone(), depth);
        debug!("Generating component schema for {} at depth {}", resolved.name, depth);

        let schema = match &resolved.kind {
            TypeKind::Struct(def) => {
                let mut properties = BTreeMap::new();
                let mut required = Vec::new();
                self.add_fields(&def.fields, depth, &mut properties, &mut required);
                Schema {
                    properties: Some(properties),
                    required: (!required.is_empty()).then_some(required),
                    ..Schema::object()
                }
            }
            TypeKind::Enum(def) => Schema {
                enum_values: Some(def.variants.clone()),
                ..Schema::typed("string", None)
            },
            TypeKind::Alias(_) => return,
        };

        self.schemas.insert(resolved.name.clone(), schema);
    }

    fn add_fields(
        &mut self,
        fields: &'r [FieldDef],
        depth: usize,
        properties: &mut BTreeMap<String, Schema>,
        required: &mut Vec<String>,
    ) {
        let resolver = self.type_resolver;

        for field in fields {
            if field.serde_attrs.skip {
                continue;
            }

            if field.serde_attrs.flatten {
                let flattened = resolver
                    .resolve_type(&field.type_info.name)
                    .filter(|_| self.options.resolve_models);
                if let Some(ResolvedType {
                    name,
                    kind: TypeKind::Struct(inner),
                }) = flattened
                {
                    if !self.expanding.contains(name) {
                        self.expanding.push(name.clone());
                        self.add_fields(&inner.fields, depth, properties, required);
                        self.expanding.pop();
                    }
                }
                continue;
            }

            let schema = self.schema_at(&field.type_info, depth + 1);
            properties.insert(field.name.clone(), schema);
            if !field.optional {
                required.push(field.name.clone());
            }
        }
    }

    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }
}
