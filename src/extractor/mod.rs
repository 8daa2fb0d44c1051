//! Route extraction for the supported web frameworks.
//!
//! Each framework has a [`RouteExtractor`] that finds where routes are registered
//! and produces [`RawRoute`]s (path, method, handler reference). [`finish_routes`]
//! then resolves every named handler by its module path in a [`HandlerIndex`]
//! and derives parameters,
//! request body, response type and documentation from its signature and doc
//! comments.
//!
//! - **Axum**: see [`axum::AxumExtractor`]
//! - **Actix-Web**: see [`actix::ActixExtractor`]

pub mod actix;
pub mod axum;
pub mod symbols;

use crate::directives::{parse_operation_docs, OperationDocs};
use crate::parser::ParsedFile;
use crate::type_resolver::TypeResolver;
use log::debug;
use std::collections::HashSet;
use symbols::{display_path, for_each_item, ItemPath, Lookup, SymbolTable};
use syn::{
    Block, Expr, FnArg, GenericArgument, ImplItem, Item, Lit, PathArguments, ReturnType, Type,
    Visibility,
};

/// Finds the routes a project registers.
pub trait RouteExtractor {
    /// Extracts routes from all parsed files of a project at once, since routers
    /// and handlers are usually spread over several files.
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteInfo>;
}

/// One documented endpoint.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    /// Path as registered, `:param` or `{param}` style
    pub path: String,
    pub method: HttpMethod,
    /// Name of the handler function; `"closure"` or `"unknown"` when there is none
    pub handler_name: String,
    /// The handler is an inline closure
    pub is_closure: bool,
    /// A named handler was found in the project
    pub handler_resolved: bool,
    /// The handler function is declared `pub`
    pub handler_public: bool,
    /// Functions a handler path could refer to when it names more than one
    pub ambiguous_handlers: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<TypeInfo>,
    pub response_type: Option<TypeInfo>,
    pub docs: OperationDocs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Parses a routing function or attribute name such as `get` or `POST`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub type_info: TypeInfo,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
}

/// The parts of a Rust type that matter for schema generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Base type name (e.g. "String", "User", "i32"); for `Option`/`Vec` the inner name
    pub name: String,
    pub is_generic: bool,
    pub generic_args: Vec<TypeInfo>,
    pub is_option: bool,
    pub is_vec: bool,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_generic: false,
            generic_args: Vec::new(),
            is_option: false,
            is_vec: false,
        }
    }

    pub fn option(inner: TypeInfo) -> Self {
        Self {
            name: inner.name.clone(),
            is_generic: false,
            generic_args: vec![inner],
            is_option: true,
            is_vec: false,
        }
    }

    pub fn vec(inner: TypeInfo) -> Self {
        Self {
            name: inner.name.clone(),
            is_generic: false,
            generic_args: vec![inner],
            is_option: false,
            is_vec: true,
        }
    }

    /// Converts a `syn` type. References, `Box`, `Arc` and `Rc` are looked through;
    /// slices and arrays become `Vec`.
    pub fn from_syn(ty: &Type) -> Self {
        match ty {
            Type::Path(type_path) => {
                let Some(segment) = type_path.path.segments.last() else {
                    return TypeInfo::new("Unknown");
                };
                let name = segment.ident.to_string();
                let args: Vec<TypeInfo> = match &segment.arguments {
                    PathArguments::AngleBracketed(args) => args
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            GenericArgument::Type(inner) => Some(TypeInfo::from_syn(inner)),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };

                let single = |args: Vec<TypeInfo>| {
                    args.into_iter()
                        .next()
                        .unwrap_or_else(|| TypeInfo::new("Unknown"))
                };
                match (name.as_str(), args.len()) {
                    ("Option", 1) => TypeInfo::option(single(args)),
                    ("Vec" | "VecDeque" | "HashSet" | "BTreeSet", 1) => {
                        TypeInfo::vec(single(args))
                    }
                    ("Box" | "Arc" | "Rc", 1) => single(args),
                    _ => TypeInfo {
                        is_generic: !args.is_empty(),
                        generic_args: args,
                        name,
                        is_option: false,
                        is_vec: false,
                    },
                }
            }
            Type::Reference(reference) => TypeInfo::from_syn(&reference.elem),
            Type::Slice(slice) => TypeInfo::vec(TypeInfo::from_syn(&slice.elem)),
            Type::Array(array) => TypeInfo::vec(TypeInfo::from_syn(&array.elem)),
            Type::Paren(paren) => TypeInfo::from_syn(&paren.elem),
            Type::Group(group) => TypeInfo::from_syn(&group.elem),
            _ => TypeInfo::new("Unknown"),
        }
    }
}

impl Parameter {
    pub fn new(
        name: String,
        location: ParameterLocation,
        type_info: TypeInfo,
        required: bool,
    ) -> Self {
        Self {
            name,
            location,
            type_info,
            required,
        }
    }
}

impl RouteInfo {
    pub fn new(path: String, method: HttpMethod, handler_name: String) -> Self {
        Self {
            path,
            method,
            handler_name,
            is_closure: false,
            handler_resolved: false,
            handler_public: false,
            ambiguous_handlers: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            response_type: None,
            docs: OperationDocs::default(),
        }
    }
}

/// Where a path expression was written: its module and the type of the
/// enclosing `impl`, which stands in for `Self`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    pub module: ItemPath,
    pub self_ty: Option<String>,
}

impl Scope {
    pub fn new(module: ItemPath) -> Self {
        Self {
            module,
            self_ty: None,
        }
    }

    /// Identifiers of a path expression, `Self` replaced by the `impl` type.
    pub fn path_of(&self, expr: &Expr) -> Option<Vec<String>> {
        let Expr::Path(path) = expr else {
            return None;
        };
        let mut segments: Vec<String> = path
            .path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect();
        if let (Some(first), Some(self_ty)) = (segments.first_mut(), &self.self_ty) {
            if first == "Self" {
                *first = self_ty.clone();
            }
        }
        (!segments.is_empty()).then_some(segments)
    }

    /// Key of the function `name` declared in this scope.
    pub fn item_key(&self, name: &str) -> ItemPath {
        let mut key = self.module.clone();
        key.extend(self.self_ty.iter().cloned());
        key.push(name.to_string());
        key
    }
}

/// What a route was registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerRef {
    /// A function path as written, resolved from `scope`
    Named { path: Vec<String>, scope: Scope },
    Closure,
    Unknown,
}

impl HandlerRef {
    /// A handler written as `path` (`list_users`, `users::list`) inside `scope`.
    pub fn named(path: &str, scope: &Scope) -> Self {
        HandlerRef::Named {
            path: path.split("::").map(str::to_string).collect(),
            scope: scope.clone(),
        }
    }

    /// Classifies a handler expression such as `list_users`, `handlers::list_users`,
    /// `|| async { .. }` or `list_users.layer(..)`.
    pub fn from_expr(expr: &Expr, scope: &Scope) -> Self {
        match expr {
            Expr::Path(_) => match scope.path_of(expr) {
                Some(path) => HandlerRef::Named {
                    path,
                    scope: scope.clone(),
                },
                None => HandlerRef::Unknown,
            },
            Expr::Closure(_) => HandlerRef::Closure,
            Expr::MethodCall(call) => HandlerRef::from_expr(&call.receiver, scope),
            Expr::Paren(paren) => HandlerRef::from_expr(&paren.expr, scope),
            Expr::Reference(reference) => HandlerRef::from_expr(&reference.expr, scope),
            _ => HandlerRef::Unknown,
        }
    }

    /// Function name without its module path; `"closure"` or `"unknown"`.
    pub fn name(&self) -> String {
        match self {
            HandlerRef::Named { path, .. } => path.last().cloned().unwrap_or_default(),
            HandlerRef::Closure => "closure".to_string(),
            HandlerRef::Unknown => "unknown".to_string(),
        }
    }
}

/// A route before its handler has been analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRoute {
    pub path: String,
    pub method: HttpMethod,
    pub handler: HandlerRef,
}

impl RawRoute {
    pub fn new(path: impl Into<String>, method: HttpMethod, handler: HandlerRef) -> Self {
        Self {
            path: path.into(),
            method,
            handler,
        }
    }

    /// The same route mounted below `prefix`.
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self {
            path: combine_paths(prefix, &self.path),
            method: self.method,
            handler: self.handler.clone(),
        }
    }
}

/// A function of the project: its signature, doc comments and body.
pub struct HandlerDef<'ast> {
    pub sig: &'ast syn::Signature,
    pub attrs: &'ast [syn::Attribute],
    pub block: &'ast Block,
    pub is_public: bool,
    /// Scope the body is written in
    pub scope: Scope,
}

/// Every free function and inherent/trait method of a project, keyed by its
/// module path (`users::list`, `handlers::Api::create`).
pub struct HandlerIndex<'ast> {
    functions: SymbolTable<HandlerDef<'ast>>,
}

impl<'ast> HandlerIndex<'ast> {
    pub fn build(parsed_files: &'ast [ParsedFile]) -> Self {
        let mut functions = SymbolTable::default();
        for_each_item(parsed_files, |module, item| match item {
            Item::Fn(item_fn) => {
                let scope = Scope::new(module.to_vec());
                functions.insert(
                    scope.item_key(&item_fn.sig.ident.to_string()),
                    HandlerDef {
                        sig: &item_fn.sig,
                        attrs: &item_fn.attrs,
                        block: &item_fn.block,
                        is_public: matches!(item_fn.vis, Visibility::Public(_)),
                        scope,
                    },
                );
            }
            Item::Impl(item_impl) => {
                let Some(self_ty) = impl_type_name(&item_impl.self_ty) else {
                    return;
                };
                let is_trait_impl = item_impl.trait_.is_some();
                for impl_item in &item_impl.items {
                    let ImplItem::Fn(method) = impl_item else {
                        continue;
                    };
                    let scope = Scope {
                        module: module.to_vec(),
                        self_ty: Some(self_ty.clone()),
                    };
                    functions.insert(
                        scope.item_key(&method.sig.ident.to_string()),
                        HandlerDef {
                            sig: &method.sig,
                            attrs: &method.attrs,
                            block: &method.block,
                            is_public: is_trait_impl
                                || matches!(method.vis, Visibility::Public(_)),
                            scope,
                        },
                    );
                }
            }
            Item::Use(item_use) => functions.add_use(module, &item_use.tree),
            _ => {}
        });
        debug!("Indexed {} candidate handler functions", functions.len());
        Self { functions }
    }

    /// Resolves a function path written inside `scope`.
    pub fn lookup(&self, path: &[String], scope: &Scope) -> Lookup<'_, HandlerDef<'ast>> {
        self.functions.lookup(&scope.module, path)
    }

    pub fn get(&self, key: &[String]) -> Option<&HandlerDef<'ast>> {
        self.functions.get(key)
    }

    /// Function keys in declaration order.
    pub fn keys(&self) -> &[ItemPath] {
        self.functions.paths()
    }
}

/// Name of the type an `impl` block is for.
pub fn impl_type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

/// Turns raw routes into [`RouteInfo`]s, dropping exact duplicates.
pub fn finish_routes(raw_routes: Vec<RawRoute>, index: &HandlerIndex<'_>) -> Vec<RouteInfo> {
    let mut seen: HashSet<(String, HttpMethod, String)> = HashSet::new();
    let mut routes = Vec::new();

    for raw in raw_routes {
        let mut route = RouteInfo::new(raw.path.clone(), raw.method, raw.handler.name());
        route.is_closure = raw.handler == HandlerRef::Closure;
        route.parameters = path_parameters(&raw.path);

        let mut identity = route.handler_name.clone();
        if let HandlerRef::Named { path, scope } = &raw.handler {
            identity = display_path(path);
            match index.lookup(path, scope) {
                Lookup::Found(key, def) => {
                    identity = display_path(key);
                    route.handler_resolved = true;
                    route.handler_public = def.is_public;
                    apply_signature(&mut route, def.sig);
                    route.docs = parse_operation_docs(def.attrs);
                }
                Lookup::Ambiguous(keys) => {
                    route.ambiguous_handlers = keys.iter().map(|k| display_path(k)).collect();
                }
                Lookup::Missing => {}
            }
        }

        if seen.insert((raw.path, raw.method, identity)) {
            routes.push(route);
        }
    }

    routes
}

/// Joins a mount prefix and a route path with exactly one slash between them.
pub fn combine_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }

    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// Name of a path segment parameter: `:id`, `*rest`, `{id}`, `{id:\d+}` or `{*rest}`.
pub fn path_segment_parameter(segment: &str) -> Option<&str> {
    if let Some(name) = segment.strip_prefix(':').or_else(|| segment.strip_prefix('*')) {
        return (!name.is_empty()).then_some(name);
    }
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    let inner = inner.trim_start_matches('*');
    let name = inner.split(':').next().unwrap_or(inner);
    (!name.is_empty()).then_some(name)
}

/// One required `String` path parameter per parameter segment of `path`.
pub fn path_parameters(path: &str) -> Vec<Parameter> {
    path.split('/')
        .filter_map(path_segment_parameter)
        .map(|name| {
            Parameter::new(
                name.to_string(),
                ParameterLocation::Path,
                TypeInfo::new("String"),
                true,
            )
        })
        .collect()
}

/// Returns a string literal's value.
pub fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit_str) => Some(lit_str.value()),
            _ => None,
        },
        Expr::Paren(paren) => string_literal(&paren.expr),
        Expr::Group(group) => string_literal(&group.expr),
        _ => None,
    }
}

/// Last identifier of a call's function path, e.g. `get` for `web::get`.
pub fn call_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

/// Returns `(extractor, inner)` for `Json<T>`, `Path<T>`, `Query<T>` (any module prefix).
fn extractor_type(ty: &Type) -> Option<(String, &Type)> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    let name = segment.ident.to_string();
    if !matches!(name.as_str(), "Json" | "Path" | "Query") {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first()? {
            GenericArgument::Type(inner) => Some((name, inner)),
            _ => None,
        },
        _ => None,
    }
}

/// Fills parameters, request body and response type from a handler signature.
fn apply_signature(route: &mut RouteInfo, sig: &syn::Signature) {
    for input in &sig.inputs {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };
        let Some((extractor, inner)) = extractor_type(&pat_type.ty) else {
            continue;
        };
        match extractor.as_str() {
            "Json" => route.request_body = Some(TypeInfo::from_syn(inner)),
            "Path" => type_path_parameters(route, inner),
            "Query" => route.parameters.push(Parameter::new(
                "query".to_string(),
                ParameterLocation::Query,
                TypeInfo::from_syn(inner),
                false,
            )),
            _ => {}
        }
    }

    if let ReturnType::Type(_, ty) = &sig.output {
        route.response_type = response_type(ty);
    }
}

/// Types the URL parameters from a `Path<T>` extractor.
///
/// A scalar `T` types a single URL parameter and a tuple types them positionally.
/// Struct extractors leave the URL parameters as strings.
fn type_path_parameters(route: &mut RouteInfo, inner: &Type) {
    let url_params: Vec<usize> = route
        .parameters
        .iter()
        .enumerate()
        .filter(|(_, p)| p.location == ParameterLocation::Path)
        .map(|(i, _)| i)
        .collect();

    match inner {
        Type::Tuple(tuple) if tuple.elems.len() == url_params.len() => {
            for (slot, elem) in url_params.iter().zip(tuple.elems.iter()) {
                route.parameters[*slot].type_info = TypeInfo::from_syn(elem);
            }
        }
        _ if url_params.len() == 1 => {
            let type_info = TypeInfo::from_syn(inner);
            if TypeResolver::is_primitive(&type_info.name) {
                route.parameters[url_params[0]].type_info = type_info;
            }
        }
        _ => {}
    }
}

/// Response wrappers that carry no schema information.
const OPAQUE_RESPONSES: &[&str] = &[
    "HttpResponse",
    "Response",
    "StatusCode",
    "Html",
    "Redirect",
    "Responder",
    "IntoResponse",
];

/// Derives the documented response type from a handler's return type.
pub fn response_type(ty: &Type) -> Option<TypeInfo> {
    match ty {
        Type::ImplTrait(_) => None,
        Type::Tuple(tuple) => tuple.elems.iter().find_map(json_payload),
        Type::Reference(reference) => response_type(&reference.elem),
        Type::Paren(paren) => response_type(&paren.elem),
        Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            let name = segment.ident.to_string();
            if OPAQUE_RESPONSES.contains(&name.as_str()) {
                return None;
            }
            if name == "Result" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(ok)) = args.args.first() {
                        return response_type(ok);
                    }
                }
                return None;
            }
            if let Some(payload) = json_payload(ty) {
                return Some(payload);
            }
            Some(TypeInfo::from_syn(ty))
        }
        _ => None,
    }
}

fn json_payload(ty: &Type) -> Option<TypeInfo> {
    let (extractor, inner) = extractor_type(ty)?;
    (extractor == "Json").then(|| TypeInfo::from_syn(inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(code: &str) -> Type {
        syn::parse_str(code).unwrap()
    }

    #[test]
    fn test_type_info_from_syn() {
        let info = TypeInfo::from_syn(&ty("Option<Vec<User>>"));
        assert!(info.is_option);
        assert_eq!(info.name, "User");
        assert!(info.generic_args[0].is_vec);

        let info = TypeInfo::from_syn(&ty("&'static str"));
        assert_eq!(info, TypeInfo::new("str"));

        let info = TypeInfo::from_syn(&ty("Arc<models::User>"));
        assert_eq!(info, TypeInfo::new("User"));

        let info = TypeInfo::from_syn(&ty("HashMap<String, u32>"));
        assert!(info.is_generic);
        assert_eq!(info.generic_args.len(), 2);
    }

    #[test]
    fn test_combine_paths() {
        assert_eq!(combine_paths("", "/users"), "/users");
        assert_eq!(combine_paths("/api/", "/users"), "/api/users");
        assert_eq!(combine_paths("/api", "/"), "/api");
        assert_eq!(combine_paths("/", "/"), "/");
    }

    #[test]
    fn test_path_parameters_in_all_styles() {
        let names: Vec<String> = path_parameters("/a/:id/{slug}/{num:\\d+}/*rest")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["id", "slug", "num", "rest"]);
    }

    #[test]
    fn test_response_type_unwraps_json_and_result() {
        assert_eq!(
            response_type(&ty("Result<Json<Vec<User>>, AppError>")),
            Some(TypeInfo::vec(TypeInfo::new("User")))
        );
        assert_eq!(
            response_type(&ty("(StatusCode, Json<User>)")),
            Some(TypeInfo::new("User"))
        );
        assert_eq!(response_type(&ty("impl IntoResponse")), None);
        assert_eq!(response_type(&ty("HttpResponse")), None);
        assert_eq!(response_type(&ty("&'static str")), Some(TypeInfo::new("str")));
    }

    fn expr(code: &str) -> Expr {
        syn::parse_str(code).unwrap()
    }

    #[test]
    fn test_handler_ref_from_expr() {
        let scope = Scope::new(vec!["routes".to_string()]);
        let from = |code: &str| HandlerRef::from_expr(&expr(code), &scope);

        assert_eq!(
            from("handlers::list_users"),
            HandlerRef::named("handlers::list_users", &scope)
        );
        assert_eq!(from("|| async { \"ok\" }"), HandlerRef::Closure);
        assert_eq!(from("list_users.layer(auth())"), HandlerRef::named("list_users", &scope));
        assert_eq!(from("make_handler()"), HandlerRef::Unknown);
        assert_eq!(from("handlers::list_users").name(), "list_users");
    }

    #[test]
    fn test_self_paths_use_the_impl_type() {
        let scope = Scope {
            module: vec!["api".to_string()],
            self_ty: Some("Users".to_string()),
        };

        assert_eq!(
            scope.path_of(&expr("Self::list")),
            Some(vec!["Users".to_string(), "list".to_string()])
        );
        assert_eq!(scope.item_key("list"), vec!["api", "Users", "list"]);
    }

    #[test]
    fn test_finish_routes_applies_signature_and_docs() {
        let files = vec![ParsedFile::from_source(
            "handlers.rs",
            r#"
            /// Update a user.
            /// @tags users
            pub async fn update_user(
                Path(id): Path<u32>,
                Json(body): Json<UpdateUser>,
            ) -> Result<Json<User>, AppError> { todo!() }
            "#,
        )
        .unwrap()];
        let index = HandlerIndex::build(&files);
        let root = Scope::default();
        let nested = Scope::new(vec!["handlers".to_string()]);

        let routes = finish_routes(
            vec![
                RawRoute::new(
                    "/users/:id",
                    HttpMethod::Put,
                    HandlerRef::named("handlers::update_user", &root),
                ),
                RawRoute::new(
                    "/users/:id",
                    HttpMethod::Put,
                    HandlerRef::named("update_user", &nested),
                ),
            ],
            &index,
        );

        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert!(route.handler_resolved);
        assert!(route.handler_public);
        assert_eq!(route.parameters.len(), 1);
        assert_eq!(route.parameters[0].name, "id");
        assert_eq!(route.parameters[0].type_info, TypeInfo::new("u32"));
        assert_eq!(route.request_body, Some(TypeInfo::new("UpdateUser")));
        assert_eq!(route.response_type, Some(TypeInfo::new("User")));
        assert_eq!(route.docs.summary.as_deref(), Some("Update a user."));
        assert_eq!(route.docs.tags, vec!["users".to_string()]);
    }

    #[test]
    fn test_tuple_path_extractor_types_parameters_in_order() {
        let files = vec![ParsedFile::from_source(
            "h.rs",
            "async fn get_post(Path((user, post)): Path<(String, u64)>) {}",
        )
        .unwrap()];
        let index = HandlerIndex::build(&files);

        let routes = finish_routes(
            vec![RawRoute::new(
                "/users/{user}/posts/{post}",
                HttpMethod::Get,
                HandlerRef::named("get_post", &Scope::default()),
            )],
            &index,
        );

        let types: Vec<&str> = routes[0]
            .parameters
            .iter()
            .map(|p| p.type_info.name.as_str())
            .collect();
        assert_eq!(types, vec!["String", "u64"]);
        assert!(!routes[0].handler_public);
    }

    #[test]
    fn test_unresolved_and_closure_handlers() {
        let index = HandlerIndex::build(&[]);
        let routes = finish_routes(
            vec![
                RawRoute::new(
                    "/a",
                    HttpMethod::Get,
                    HandlerRef::named("missing", &Scope::default()),
                ),
                RawRoute::new("/b", HttpMethod::Get, HandlerRef::Closure),
            ],
            &index,
        );

        assert!(!routes[0].handler_resolved);
        assert_eq!(routes[0].handler_name, "missing");
        assert!(routes[0].ambiguous_handlers.is_empty());
        assert!(routes[1].is_closure);
        assert_eq!(routes[1].handler_name, "closure");
    }

    #[test]
    fn test_handlers_resolve_by_module_path() {
        let files = vec![
            ParsedFile::from_source(
                "/svc/src/users.rs",
                "pub async fn list() -> Json<Vec<User>> { todo!() }",
            )
            .unwrap(),
            ParsedFile::from_source(
                "/svc/src/orders.rs",
                "pub async fn list() -> Json<Vec<Order>> { todo!() }",
            )
            .unwrap(),
        ];
        let index = HandlerIndex::build(&files);
        let root = Scope::default();

        let routes = finish_routes(
            vec![
                RawRoute::new("/orders", HttpMethod::Get, HandlerRef::named("orders::list", &root)),
                RawRoute::new("/users", HttpMethod::Get, HandlerRef::named("users::list", &root)),
                RawRoute::new("/any", HttpMethod::Get, HandlerRef::named("list", &root)),
            ],
            &index,
        );

        let responses: Vec<(&str, Option<&str>)> = routes
            .iter()
            .map(|r| (r.path.as_str(), r.response_type.as_ref().map(|t| t.name.as_str())))
            .collect();
        assert_eq!(
            responses,
            vec![("/orders", Some("Order")), ("/users", Some("User")), ("/any", None)]
        );
        assert!(!routes[2].handler_resolved);
        assert_eq!(routes[2].ambiguous_handlers, vec!["users::list", "orders::list"]);
    }
}
