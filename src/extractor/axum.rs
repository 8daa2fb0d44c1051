use crate::extractor::symbols::{display_path, ItemPath, Lookup};
use crate::extractor::{
    call_name, finish_routes, string_literal, HandlerIndex, HandlerRef, HttpMethod, RawRoute,
    RouteExtractor, RouteInfo, Scope,
};
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use syn::{Block, Expr, ExprMethodCall, Pat, Stmt};

/// Axum route extractor.
///
/// Router building code is evaluated symbolically: every function body is read
/// as a sequence of `let` bindings and expressions, `Router` method chains are
/// followed through `route`, `nest` and `merge`, and calls to other
/// router-building functions are inlined. Calls are resolved by module path,
/// so `users::routes()` and `orders::routes()` stay apart. The routes of
/// functions that no other function builds on are the routes of the application.
pub struct AxumExtractor;

impl RouteExtractor for AxumExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteInfo> {
        let index = HandlerIndex::build(parsed_files);

        let mut evaluator = RouterEvaluator::new(&index);
        let raw_routes = evaluator.application_routes();
        debug!("Axum: {} raw routes", raw_routes.len());

        finish_routes(raw_routes, &index)
    }
}

/// Local `let` bindings of the function being evaluated.
#[derive(Default)]
struct Locals {
    bindings: Vec<Binding>,
}

struct Binding {
    name: String,
    routes: Vec<RawRoute>,
    consumed: bool,
}

impl Locals {
    /// Routes bound to `name`; marks the binding as used.
    fn take(&mut self, name: &str) -> Option<Vec<RawRoute>> {
        let binding = self.bindings.iter_mut().rev().find(|b| b.name == name)?;
        binding.consumed = true;
        Some(binding.routes.clone())
    }

    fn bind(&mut self, name: String, routes: Vec<RawRoute>) {
        self.bindings.push(Binding {
            name,
            routes,
            consumed: false,
        });
    }

    /// Routes built into a binding that nothing else used.
    fn leftovers(self) -> Vec<RawRoute> {
        self.bindings
            .into_iter()
            .filter(|b| !b.consumed)
            .flat_map(|b| b.routes)
            .collect()
    }
}

struct RouterEvaluator<'a, 'ast> {
    index: &'a HandlerIndex<'ast>,
    cache: HashMap<ItemPath, Vec<RawRoute>>,
    in_progress: HashSet<ItemPath>,
    /// Functions whose routes were inlined into another function
    referenced: HashSet<ItemPath>,
}

impl<'a, 'ast> RouterEvaluator<'a, 'ast> {
    fn new(index: &'a HandlerIndex<'ast>) -> Self {
        Self {
            index,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
            referenced: HashSet::new(),
        }
    }

    /// Evaluates every function, then returns the routes of the unreferenced ones
    /// in definition order.
    fn application_routes(&mut self) -> Vec<RawRoute> {
        let index = self.index;
        let keys = index.keys();
        for key in keys {
            self.function_routes(key);
        }

        let mut routes = Vec::new();
        for key in keys {
            if self.referenced.contains(key) {
                continue;
            }
            if let Some(found) = self.cache.get(key) {
                if !found.is_empty() {
                    debug!("Router root: {} ({} routes)", display_path(key), found.len());
                }
                routes.extend(found.iter().cloned());
            }
        }
        routes
    }

    fn function_routes(&mut self, key: &[String]) -> Vec<RawRoute> {
        if let Some(cached) = self.cache.get(key) {
            return cached.clone();
        }
        // Recursive router builders contribute nothing on the inner call.
        if !self.in_progress.insert(key.to_vec()) {
            return Vec::new();
        }
        let index = self.index;
        let routes = match index.get(key) {
            Some(def) => self.eval_block(def.block, &def.scope),
            None => Vec::new(),
        };
        self.in_progress.remove(key);
        self.cache.insert(key.to_vec(), routes.clone());
        routes
    }

    /// Routes produced by a block: its statements, tail expression and any
    /// bindings that were built but never used.
    fn eval_block(&mut self, block: &Block, scope: &Scope) -> Vec<RawRoute> {
        let mut locals = Locals::default();
        let mut routes = Vec::new();

        for stmt in &block.stmts {
            match stmt {
                Stmt::Local(local) => {
                    let Some(init) = &local.init else {
                        continue;
                    };
                    let value = self.eval_expr(&init.expr, scope, &mut locals);
                    match binding_name(&local.pat) {
                        Some(name) => locals.bind(name, value),
                        None => routes.extend(value),
                    }
                }
                Stmt::Expr(expr, _) => {
                    let value = self.eval_expr(expr, scope, &mut locals);
                    routes.extend(value);
                }
                Stmt::Item(_) | Stmt::Macro(_) => {}
            }
        }

        routes.extend(locals.leftovers());
        routes
    }

    fn eval_expr(&mut self, expr: &Expr, scope: &Scope, locals: &mut Locals) -> Vec<RawRoute> {
        match expr {
            Expr::MethodCall(call) => self.eval_method_call(call, scope, locals),
            Expr::Call(call) => {
                if let Some(callee) = self.router_function(&call.func, scope) {
                    self.referenced.insert(callee.clone());
                    return self.function_routes(&callee);
                }
                // Unknown calls such as `axum::serve(listener, app)` pass their routers through.
                call.args
                    .iter()
                    .flat_map(|arg| self.eval_expr(arg, scope, locals))
                    .collect()
            }
            Expr::Path(path) => match path.path.get_ident() {
                Some(ident) => locals.take(&ident.to_string()).unwrap_or_default(),
                None => Vec::new(),
            },
            Expr::Await(inner) => self.eval_expr(&inner.base, scope, locals),
            Expr::Try(inner) => self.eval_expr(&inner.expr, scope, locals),
            Expr::Paren(inner) => self.eval_expr(&inner.expr, scope, locals),
            Expr::Group(inner) => self.eval_expr(&inner.expr, scope, locals),
            Expr::Reference(inner) => self.eval_expr(&inner.expr, scope, locals),
            Expr::Return(ret) => match &ret.expr {
                Some(inner) => self.eval_expr(inner, scope, locals),
                None => Vec::new(),
            },
            Expr::Block(block) => self.eval_block(&block.block, scope),
            Expr::Async(block) => self.eval_block(&block.block, scope),
            Expr::Closure(closure) => self.eval_expr(&closure.body, scope, locals),
            _ => Vec::new(),
        }
    }

    /// The project function a call goes to, unless it is `Router::new`, unknown,
    /// ambiguous or still being evaluated.
    fn router_function(&self, func: &Expr, scope: &Scope) -> Option<ItemPath> {
        let path = scope.path_of(func)?;
        if path.ends_with(&["Router".to_string(), "new".to_string()]) {
            return None;
        }
        match self.index.lookup(&path, scope) {
            // A call back into a function still being evaluated is a cycle; the
            // outer function stays a candidate root.
            Lookup::Found(key, _) if !self.in_progress.contains(key) => Some(key.clone()),
            Lookup::Ambiguous(keys) => {
                let candidates: Vec<String> = keys.iter().map(|k| display_path(k)).collect();
                warn!(
                    "Call to {} is ambiguous ({}); its routes are skipped",
                    display_path(&path),
                    candidates.join(", ")
                );
                None
            }
            _ => None,
        }
    }

    fn eval_method_call(
        &mut self,
        call: &ExprMethodCall,
        scope: &Scope,
        locals: &mut Locals,
    ) -> Vec<RawRoute> {
        let mut routes = self.eval_expr(&call.receiver, scope, locals);
        let args: Vec<&Expr> = call.args.iter().collect();

        match call.method.to_string().as_str() {
            "route" if args.len() == 2 => {
                if let Some(path) = string_literal(args[0]) {
                    for (method, handler) in method_router(args[1], scope) {
                        routes.push(RawRoute::new(path.clone(), method, handler));
                    }
                }
            }
            "nest" if args.len() == 2 => {
                let nested = self.eval_expr(args[1], scope, locals);
                if let Some(prefix) = string_literal(args[0]) {
                    routes.extend(nested.iter().map(|r| r.prefixed(&prefix)));
                }
            }
            "merge" if args.len() == 1 => {
                routes.extend(self.eval_expr(args[0], scope, locals));
            }
            // layer, with_state, fallback, into_make_service, ... keep the receiver's routes
            _ => {}
        }

        routes
    }
}

/// Name bound by a simple `let` pattern (`let app = ..`, `let mut app: Router = ..`).
fn binding_name(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(ident) => Some(ident.ident.to_string()),
        Pat::Type(typed) => binding_name(&typed.pat),
        _ => None,
    }
}

/// Reads a method router such as `get(list).post(create)` or `routing::delete(remove)`.
fn method_router(expr: &Expr, scope: &Scope) -> Vec<(HttpMethod, HandlerRef)> {
    match expr {
        Expr::Call(call) => {
            let method = call_name(&call.func).and_then(|name| HttpMethod::from_name(&name));
            match (method, call.args.first()) {
                (Some(method), Some(handler)) => {
                    vec![(method, HandlerRef::from_expr(handler, scope))]
                }
                _ => Vec::new(),
            }
        }
        Expr::MethodCall(call) => {
            let mut found = method_router(&call.receiver, scope);
            if let (Some(method), Some(handler)) = (
                HttpMethod::from_name(&call.method.to_string()),
                call.args.first(),
            ) {
                found.push((method, HandlerRef::from_expr(handler, scope)));
            }
            found
        }
        Expr::Paren(paren) => method_router(&paren.expr, scope),
        _ => Vec::new(),
    }
}
