use crate::extractor::symbols::{display_path, file_module_path, ItemPath, Lookup};
use crate::extractor::{
    call_name, combine_paths, finish_routes, impl_type_name, string_literal, HandlerIndex,
    HandlerRef, HttpMethod, RawRoute, RouteExtractor, RouteInfo, Scope,
};
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::HashSet;
use syn::punctuated::Punctuated;
use syn::{visit::Visit, Attribute, Expr, ExprMethodCall, Token};

/// Actix-Web route extractor.
///
/// Handles route attribute macros (`#[get("/path")]`, `#[route("/p", method = "GET")]`),
/// services mounted under `web::scope(..)` / `web::resource(..)`, explicit
/// `.route("/p", web::get().to(handler))` registrations and
/// `.configure(config_fn)` indirection. Handlers and configuration functions
/// are matched by module path.
pub struct ActixExtractor;

impl RouteExtractor for ActixExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteInfo> {
        let mut visitor = ActixVisitor::default();
        for parsed_file in parsed_files {
            visitor.scope = Scope::new(file_module_path(&parsed_file.path));
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        let index = HandlerIndex::build(parsed_files);
        let raw_routes = visitor.raw_routes(&index);
        debug!("Actix-Web: {} raw routes", raw_routes.len());

        finish_routes(raw_routes, &index)
    }
}

struct AttributeRoute {
    handler: ItemPath,
    method: HttpMethod,
    path: String,
}

/// `.service(handler)` seen inside `owner` below `prefix`.
struct Mount {
    handler: Vec<String>,
    scope: Scope,
    prefix: String,
    owner: ItemPath,
}

/// `.configure(function)` seen inside `owner` below `prefix`.
struct Configure {
    function: Vec<String>,
    scope: Scope,
    prefix: String,
    owner: ItemPath,
}

/// `.route(..)` registration seen inside `owner`.
struct Registration {
    route: RawRoute,
    owner: ItemPath,
}

#[derive(Default)]
struct ActixVisitor {
    scope: Scope,
    current_fn: ItemPath,
    attribute_routes: Vec<AttributeRoute>,
    mounts: Vec<Mount>,
    configures: Vec<Configure>,
    registrations: Vec<Registration>,
}

/// Resolves a path written inside `scope` to a function key.
fn resolve(index: &HandlerIndex<'_>, path: &[String], scope: &Scope) -> Option<ItemPath> {
    match index.lookup(path, scope) {
        Lookup::Found(key, _) => Some(key.clone()),
        Lookup::Ambiguous(keys) => {
            let candidates: Vec<String> = keys.iter().map(|k| display_path(k)).collect();
            warn!(
                "{} is ambiguous ({}); its routes are not mounted",
                display_path(path),
                candidates.join(", ")
            );
            None
        }
        Lookup::Missing => None,
    }
}

impl ActixVisitor {
    fn record_attribute_routes(&mut self, handler: &ItemPath, attrs: &[Attribute]) {
        for attr in attrs {
            for (method, path) in parse_route_attribute(attr) {
                self.attribute_routes.push(AttributeRoute {
                    handler: handler.clone(),
                    method,
                    path,
                });
            }
        }
    }

    /// Records the routes of a function and visits its body as `key`.
    fn enter_function(&mut self, name: &str, attrs: &[Attribute]) -> ItemPath {
        let key = self.scope.item_key(name);
        self.record_attribute_routes(&key, attrs);
        std::mem::replace(&mut self.current_fn, key)
    }

    /// Registers everything a service-building chain mounts, below `outer`.
    fn register_chain(&mut self, expr: &Expr, outer: &str) {
        let prefix = chain_prefix(expr, outer);
        self.walk_chain(expr, &prefix);
    }

    fn walk_chain(&mut self, expr: &Expr, prefix: &str) {
        let Expr::MethodCall(call) = expr else {
            return;
        };
        self.walk_chain(&call.receiver, prefix);

        let args: Vec<&Expr> = call.args.iter().collect();
        match (call.method.to_string().as_str(), args.as_slice()) {
            ("service", [service]) => self.register_service(service, prefix),
            ("route", [path, route]) => {
                let path = string_literal(path);
                if let (Some(path), Some((method, handler))) = (path, self.route_target(route)) {
                    self.register_route(combine_paths(prefix, &path), method, handler);
                }
            }
            // `web::resource("/p").route(web::get().to(h))`
            ("route", [route]) => {
                if let Some((method, handler)) = self.route_target(route) {
                    self.register_route(prefix.to_string(), method, handler);
                }
            }
            ("configure", [function]) => {
                if let Some(function) = self.scope.path_of(function) {
                    self.configures.push(Configure {
                        function,
                        scope: self.scope.clone(),
                        prefix: prefix.to_string(),
                        owner: self.current_fn.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    fn register_service(&mut self, service: &Expr, prefix: &str) {
        match service {
            Expr::Path(_) => {
                if let Some(handler) = self.scope.path_of(service) {
                    self.mounts.push(Mount {
                        handler,
                        scope: self.scope.clone(),
                        prefix: prefix.to_string(),
                        owner: self.current_fn.clone(),
                    });
                }
            }
            Expr::Tuple(tuple) => {
                for elem in &tuple.elems {
                    self.register_service(elem, prefix);
                }
            }
            Expr::Paren(paren) => self.register_service(&paren.expr, prefix),
            Expr::MethodCall(_) => self.register_chain(service, prefix),
            _ => {}
        }
    }

    fn register_route(&mut self, path: String, method: HttpMethod, handler: HandlerRef) {
        self.registrations.push(Registration {
            route: RawRoute::new(path, method, handler),
            owner: self.current_fn.clone(),
        });
    }

    /// Reads `web::get().to(handler)` (guards and other builder calls in between
    /// are skipped).
    fn route_target(&self, expr: &Expr) -> Option<(HttpMethod, HandlerRef)> {
        let Expr::MethodCall(call) = expr else {
            return None;
        };
        if call.method == "to" {
            let handler = HandlerRef::from_expr(call.args.first()?, &self.scope);
            return route_method(&call.receiver).map(|method| (method, handler));
        }
        self.route_target(&call.receiver)
    }

    fn raw_routes(&self, index: &HandlerIndex<'_>) -> Vec<RawRoute> {
        let graph = ConfigureGraph {
            edges: self
                .configures
                .iter()
                .filter_map(|c| Some((resolve(index, &c.function, &c.scope)?, c)))
                .collect(),
        };
        let mounts: Vec<(ItemPath, &Mount)> = self
            .mounts
            .iter()
            .filter_map(|m| Some((resolve(index, &m.handler, &m.scope)?, m)))
            .collect();

        let mut routes = Vec::new();

        for attribute_route in &self.attribute_routes {
            let mut path = vec!["crate".to_string()];
            path.extend(attribute_route.handler.iter().cloned());
            let handler = HandlerRef::Named {
                path,
                scope: Scope::default(),
            };
            let route = RawRoute::new(
                attribute_route.path.clone(),
                attribute_route.method,
                handler,
            );
            let mounted: Vec<&Mount> = mounts
                .iter()
                .filter(|(key, _)| *key == attribute_route.handler)
                .map(|(_, mount)| *mount)
                .collect();

            if mounted.is_empty() {
                routes.push(route);
                continue;
            }
            for mount in mounted {
                for outer in graph.prefixes(&mount.owner, &mut HashSet::new()) {
                    routes.push(route.prefixed(&combine_paths(&outer, &mount.prefix)));
                }
            }
        }

        for registration in &self.registrations {
            for outer in graph.prefixes(&registration.owner, &mut HashSet::new()) {
                routes.push(registration.route.prefixed(&outer));
            }
        }

        routes
    }
}

/// `configure` calls keyed by the function they hand the service config to.
struct ConfigureGraph<'v> {
    edges: Vec<(ItemPath, &'v Configure)>,
}

impl ConfigureGraph<'_> {
    /// Prefixes under which the body of `owner` ends up being mounted.
    fn prefixes(&self, owner: &ItemPath, seen: &mut HashSet<ItemPath>) -> Vec<String> {
        if !seen.insert(owner.clone()) {
            return vec![String::new()];
        }
        let mut prefixes = Vec::new();
        for (_, configure) in self.edges.iter().filter(|(function, _)| function == owner) {
            for parent in self.prefixes(&configure.owner, seen) {
                prefixes.push(combine_paths(&parent, &configure.prefix));
            }
        }
        seen.remove(owner);
        if prefixes.is_empty() {
            prefixes.push(String::new());
        }
        prefixes
    }
}

impl<'ast> Visit<'ast> for ActixVisitor {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        if node.content.is_none() {
            return;
        }
        self.scope.module.push(node.ident.to_string());
        syn::visit::visit_item_mod(self, node);
        self.scope.module.pop();
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let outer = std::mem::replace(&mut self.scope.self_ty, impl_type_name(&node.self_ty));
        syn::visit::visit_item_impl(self, node);
        self.scope.self_ty = outer;
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        // Free functions nested in a method body do not belong to the impl.
        let self_ty = self.scope.self_ty.take();
        let outer = self.enter_function(&node.sig.ident.to_string(), &node.attrs);
        syn::visit::visit_item_fn(self, node);
        self.current_fn = outer;
        self.scope.self_ty = self_ty;
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        let outer = self.enter_function(&node.sig.ident.to_string(), &node.attrs);
        syn::visit::visit_impl_item_fn(self, node);
        self.current_fn = outer;
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        if matches!(
            node.method.to_string().as_str(),
            "service" | "route" | "configure"
        ) {
            // The whole chain is handled here; visiting its inner calls again
            // would register them a second time without their prefix.
            self.register_chain(&Expr::MethodCall(node.clone()), "");
            return;
        }
        syn::visit::visit_expr_method_call(self, node);
    }
}

/// Prefix contributed by the root of a chain: `web::scope("/s")` and
/// `web::resource("/r")` add their path, anything else (`App::new()`, `cfg`) adds nothing.
fn chain_prefix(expr: &Expr, outer: &str) -> String {
    let mut root = expr;
    while let Expr::MethodCall(call) = root {
        root = &call.receiver;
    }
    if let Expr::Call(call) = root {
        let is_mount = matches!(
            call_name(&call.func).as_deref(),
            Some("scope") | Some("resource")
        );
        if is_mount {
            if let Some(path) = call.args.first().and_then(string_literal) {
                return combine_paths(outer, &path);
            }
        }
    }
    outer.to_string()
}

fn route_method(expr: &Expr) -> Option<HttpMethod> {
    match expr {
        Expr::Call(call) => call_name(&call.func).and_then(|name| HttpMethod::from_name(&name)),
        Expr::MethodCall(call) => route_method(&call.receiver),
        _ => None,
    }
}

/// Methods and path declared by a route attribute macro.
fn parse_route_attribute(attr: &Attribute) -> Vec<(HttpMethod, String)> {
    let Some(name) = attr.path().segments.last().map(|s| s.ident.to_string()) else {
        return Vec::new();
    };
    let single_method = HttpMethod::from_name(&name);
    if single_method.is_none() && name != "route" {
        return Vec::new();
    }

    let Ok(args) = attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated) else {
        return Vec::new();
    };
    let Some(path) = args.first().and_then(string_literal) else {
        return Vec::new();
    };

    if let Some(method) = single_method {
        return vec![(method, path)];
    }

    // #[route("/p", method = "GET", method = "HEAD")]
    args.iter()
        .skip(1)
        .filter_map(|arg| match arg {
            Expr::Assign(assign) if is_method_key(&assign.left) => {
                string_literal(&assign.right).and_then(|m| HttpMethod::from_name(&m))
            }
            _ => None,
        })
        .map(|method| (method, path.clone()))
        .collect()
}

fn is_method_key(expr: &Expr) -> bool {
    matches!(expr, Expr::Path(p) if p.path.is_ident("method"))
}
