use crate::extractor::symbols::{display_path, for_each_item, ItemPath};
use crate::extractor::TypeInfo;
use crate::parser::ParsedFile;
use log::debug;
use std::collections::HashMap;
use syn::{Attribute, Fields, Item, LitStr, Token, Visibility};

/// Index of the model types (structs, enums, aliases) declared in a project.
///
/// Definitions are indexed once up front and looked up by bare name. When
/// several modules declare the same name the first declaration in file order
/// wins; [`TypeResolver::ambiguous_types`] lists such names. Private items are
/// only indexed when `include_private` is set.
pub struct TypeResolver {
    definitions: HashMap<String, ResolvedType>,
    /// Module-qualified declarations per type name
    declared_in: HashMap<String, Vec<ItemPath>>,
}

/// A model type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    pub name: String,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A struct with named fields
    Struct(StructDef),
    /// An enum; every variant is rendered by name
    Enum(EnumDef),
    /// A newtype struct or a type alias, documented as the wrapped type
    Alias(TypeInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name as serialized (after `rename` / `rename_all`)
    pub name: String,
    pub type_info: TypeInfo,
    /// The field may be absent: `Option<T>`, `#[serde(default)]` or `skip_serializing_if`
    pub optional: bool,
    pub serde_attrs: SerdeAttributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    Bool,
    Char,
    Uuid,
    DateTime,
    Date,
}

/// The `#[serde(..)]` options that change a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeAttributes {
    pub rename: Option<String>,
    pub rename_all: Option<String>,
    pub skip: bool,
    pub flatten: bool,
    pub default: bool,
}

impl TypeResolver {
    pub fn new(parsed_files: &[ParsedFile], include_private: bool) -> Self {
        let mut resolver = Self {
            definitions: HashMap::new(),
            declared_in: HashMap::new(),
        };
        for_each_item(parsed_files, |module, item| {
            let resolved = match item {
                Item::Struct(item) if include_private || is_public(&item.vis) => {
                    Some(parse_struct(item))
                }
                Item::Enum(item) if include_private || is_public(&item.vis) => {
                    Some(parse_enum(item))
                }
                Item::Type(item) if include_private || is_public(&item.vis) => {
                    Some(ResolvedType {
                        name: item.ident.to_string(),
                        kind: TypeKind::Alias(TypeInfo::from_syn(&item.ty)),
                    })
                }
                _ => None,
            };
            if let Some(resolved) = resolved {
                resolver.insert(module, resolved);
            }
        });
        debug!("Indexed {} model types", resolver.definitions.len());
        resolver
    }

    fn insert(&mut self, module: &[String], resolved: ResolvedType) {
        let mut path = module.to_vec();
        path.push(resolved.name.clone());
        self.declared_in
            .entry(resolved.name.clone())
            .or_default()
            .push(path);
        self.definitions
            .entry(resolved.name.clone())
            .or_insert(resolved);
    }

    /// Type names declared in more than one module, with every declaration
    /// in file order. The first declaration is the one documented.
    pub fn ambiguous_types(&self) -> Vec<(String, Vec<String>)> {
        let mut ambiguous: Vec<(String, Vec<String>)> = self
            .declared_in
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(name, paths)| {
                let paths = paths.iter().map(|p| display_path(p)).collect();
                (name.clone(), paths)
            })
            .collect();
        ambiguous.sort();
        ambiguous
    }

    /// Looks up a struct, enum or alias declared in the project.
    pub fn resolve_type(&self, type_name: &str) -> Option<&ResolvedType> {
        let resolved = self.definitions.get(type_name);
        if resolved.is_none() && Self::primitive(type_name).is_none() {
            debug!("Could not resolve type: {}", type_name);
        }
        resolved
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn is_primitive(type_name: &str) -> bool {
        Self::primitive(type_name).is_some()
    }

    pub fn primitive(type_name: &str) -> Option<PrimitiveType> {
        let primitive = match type_name {
            "String" | "str" => PrimitiveType::String,
            "i8" => PrimitiveType::I8,
            "i16" => PrimitiveType::I16,
            "i32" => PrimitiveType::I32,
            "i64" | "isize" => PrimitiveType::I64,
            "i128" => PrimitiveType::I128,
            "u8" => PrimitiveType::U8,
            "u16" => PrimitiveType::U16,
            "u32" => PrimitiveType::U32,
            "u64" | "usize" => PrimitiveType::U64,
            "u128" => PrimitiveType::U128,
            "f32" => PrimitiveType::F32,
            "f64" => PrimitiveType::F64,
            "bool" => PrimitiveType::Bool,
            "char" => PrimitiveType::Char,
            "Uuid" => PrimitiveType::Uuid,
            "DateTime" | "NaiveDateTime" | "OffsetDateTime" | "SystemTime" => {
                PrimitiveType::DateTime
            }
            "NaiveDate" | "Date" => PrimitiveType::Date,
            _ => return None,
        };
        Some(primitive)
    }
}

fn is_public(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

fn parse_struct(item: &syn::ItemStruct) -> ResolvedType {
    let name = item.ident.to_string();
    let container = parse_serde_attributes(&item.attrs);

    let kind = match &item.fields {
        Fields::Named(named) => {
            let fields = named
                .named
                .iter()
                .filter_map(|field| {
                    let ident = field.ident.as_ref()?.to_string();
                    let ident = ident.trim_start_matches("r#");
                    let serde_attrs = parse_serde_attributes(&field.attrs);
                    let type_info = TypeInfo::from_syn(&field.ty);
                    let name = match (&serde_attrs.rename, &container.rename_all) {
                        (Some(rename), _) => rename.clone(),
                        (None, Some(rule)) => apply_rename_rule(ident, rule, false),
                        (None, None) => ident.to_string(),
                    };
                    Some(FieldDef {
                        name,
                        optional: type_info.is_option || serde_attrs.default || container.default,
                        type_info,
                        serde_attrs,
                    })
                })
                .collect();
            TypeKind::Struct(StructDef { fields })
        }
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
            TypeKind::Alias(TypeInfo::from_syn(&unnamed.unnamed[0].ty))
        }
        _ => TypeKind::Struct(StructDef { fields: Vec::new() }),
    };

    debug!("Indexed struct {}", name);
    ResolvedType { name, kind }
}

fn parse_enum(item: &syn::ItemEnum) -> ResolvedType {
    let name = item.ident.to_string();
    let container = parse_serde_attributes(&item.attrs);

    let variants = item
        .variants
        .iter()
        .filter_map(|variant| {
            let serde_attrs = parse_serde_attributes(&variant.attrs);
            if serde_attrs.skip {
                return None;
            }
            let ident = variant.ident.to_string();
            Some(match (serde_attrs.rename, &container.rename_all) {
                (Some(rename), _) => rename,
                (None, Some(rule)) => apply_rename_rule(&ident, rule, true),
                (None, None) => ident,
            })
        })
        .collect();

    debug!("Indexed enum {}", name);
    ResolvedType {
        name,
        kind: TypeKind::Enum(EnumDef { variants }),
    }
}

/// Reads the serde options of one item, field or variant.
///
/// Options this index does not model are skipped; a malformed attribute is
/// ignored as a whole.
fn parse_serde_attributes(attrs: &[Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                serde_attrs.rename = Some(value.value());
            } else if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                serde_attrs.rename_all = Some(value.value());
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                serde_attrs.skip = true;
            } else if meta.path.is_ident("flatten") {
                serde_attrs.flatten = true;
            } else if meta.path.is_ident("default") {
                serde_attrs.default = true;
                if meta.input.peek(Token![=]) {
                    meta.value()?.parse::<LitStr>()?;
                }
            } else if meta.path.is_ident("skip_serializing_if") {
                serde_attrs.default = true;
                meta.value()?.parse::<LitStr>()?;
            } else if meta.input.peek(Token![=]) {
                meta.value()?.parse::<syn::Expr>()?;
            } else if meta.input.peek(syn::token::Paren) {
                meta.parse_nested_meta(|nested| {
                    if nested.input.peek(Token![=]) {
                        nested.value()?.parse::<syn::Expr>()?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        });

        if let Err(err) = result {
            debug!("Ignoring unreadable serde attribute: {}", err);
        }
    }

    serde_attrs
}

/// Applies a serde `rename_all` rule to a field (snake_case) or variant (PascalCase) name.
fn apply_rename_rule(name: &str, rule: &str, is_variant: bool) -> String {
    let words: Vec<String> = if is_variant {
        split_pascal(name)
    } else {
        name.split('_')
            .filter(|w| !w.is_empty())
            .map(str::to_ascii_lowercase)
            .collect()
    };

    let capitalize = |word: &str| {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    };

    match rule {
        "lowercase" => words.concat(),
        "UPPERCASE" => words.concat().to_ascii_uppercase(),
        "PascalCase" => words.iter().map(|w| capitalize(w)).collect(),
        "camelCase" => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
            .collect(),
        "snake_case" => words.join("_"),
        "SCREAMING_SNAKE_CASE" => words.join("_").to_ascii_uppercase(),
        "kebab-case" => words.join("-"),
        "SCREAMING-KEBAB-CASE" => words.join("-").to_ascii_uppercase(),
        _ => name.to_string(),
    }
}

/// `HttpServerError` -> `["http", "server", "error"]`
fn split_pascal(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
