//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Tabla de rutas por método + lista de middlewares globales.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router::find(método, path limpio) → Route + params
//!                                             → middlewares efectivos
//! ```
//!
//! - Las rutas de cada método se guardan en orden de registro y gana el
//!   **primer** patrón que hace match. Si `/cats/new` se registra antes que
//!   `/cats/:id`, un request a `/cats/new` va a la ruta literal; si se
//!   registra después, nunca se alcanza.
//! - Los middlewares globales corren antes que los de la ruta, ambos en
//!   orden de registro.
//! - Montar un sub-router copia sus rutas al padre con el prefijo aplicado y
//!   sus middlewares globales antepuestos. El sub-router no sobrevive como
//!   entidad.
//!
//! El router se arma antes de arrancar el servidor; mientras sirve solo se
//! lee, así que no necesita locks.

pub mod pattern;
pub mod route;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::http::{Method, Request, Response};
use crate::middleware::{Handler, HandlerResult, Middleware};

pub use pattern::{join_mount_path, PathPattern};
pub use route::{GlobalMiddleware, Route};

/// Resultado de buscar una ruta
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// Router con registro estilo `get/post/...` y montaje de sub-routers
#[derive(Clone, Default)]
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
    middlewares: Vec<GlobalMiddleware>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una ruta con sus middlewares propios y su handler
    pub fn add_route(
        &mut self,
        method: Method,
        path: &str,
        middlewares: Vec<Arc<dyn Middleware>>,
        handler: Arc<dyn Handler>,
    ) -> &mut Self {
        self.routes
            .entry(method)
            .or_default()
            .push(Route::new(method, path, middlewares, handler));
        self
    }

    /// Igual que `add_route` pero aceptando un closure como handler
    ///
    /// # Ejemplo
    /// ```
    /// use handmade_http::router::Router;
    /// use handmade_http::http::Method;
    ///
    /// let mut router = Router::new();
    /// router.route(Method::GET, "/hello", Vec::new(), |_req, res| {
    ///     res.send("Hello World!");
    ///     Ok(())
    /// });
    /// assert_eq!(router.len(), 1);
    /// ```
    pub fn route<F>(
        &mut self,
        method: Method,
        path: &str,
        middlewares: Vec<Arc<dyn Middleware>>,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.add_route(method, path, middlewares, Arc::new(handler))
    }

    // === Atajos por método ===

    pub fn get<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::GET, path, Vec::new(), handler)
    }

    pub fn post<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::POST, path, Vec::new(), handler)
    }

    pub fn put<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::PUT, path, Vec::new(), handler)
    }

    pub fn patch<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::PATCH, path, Vec::new(), handler)
    }

    pub fn delete<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::DELETE, path, Vec::new(), handler)
    }

    pub fn options<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::OPTIONS, path, Vec::new(), handler)
    }

    // === Atajos con middlewares de ruta ===

    pub fn get_with<F>(&mut self, path: &str, middlewares: Vec<Arc<dyn Middleware>>, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::GET, path, middlewares, handler)
    }

    pub fn post_with<F>(&mut self, path: &str, middlewares: Vec<Arc<dyn Middleware>>, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::POST, path, middlewares, handler)
    }

    pub fn put_with<F>(&mut self, path: &str, middlewares: Vec<Arc<dyn Middleware>>, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::PUT, path, middlewares, handler)
    }

    pub fn patch_with<F>(&mut self, path: &str, middlewares: Vec<Arc<dyn Middleware>>, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::PATCH, path, middlewares, handler)
    }

    pub fn delete_with<F>(&mut self, path: &str, middlewares: Vec<Arc<dyn Middleware>>, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::DELETE, path, middlewares, handler)
    }

    pub fn options_with<F>(&mut self, path: &str, middlewares: Vec<Arc<dyn Middleware>>, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.route(Method::OPTIONS, path, middlewares, handler)
    }

    // === Middlewares globales ===

    /// Middleware que aplica a todas las rutas
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middlewares.push(GlobalMiddleware::new(None, middleware));
        self
    }

    /// Middleware que aplica solo si el path limpio empieza con `prefix`
    pub fn use_at(&mut self, prefix: &str, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middlewares.push(GlobalMiddleware::new(Some(prefix), middleware));
        self
    }

    /// Monta un sub-router bajo `prefix`
    ///
    /// Cada ruta del sub-router se copia al padre con el patrón
    /// `prefix + "/" + patrón` normalizado y con **todos** los middlewares
    /// globales del sub-router antepuestos a los suyos. Los filtros de
    /// prefijo de esos middlewares no se vuelven a evaluar.
    pub fn mount(&mut self, prefix: &str, sub_router: &Router) -> &mut Self {
        let sub_globals: Vec<Arc<dyn Middleware>> = sub_router
            .middlewares
            .iter()
            .map(|global| Arc::clone(global.middleware()))
            .collect();

        for method in Method::ALL {
            for route in sub_router.routes(method) {
                let path = join_mount_path(prefix, route.path());
                let mut middlewares = sub_globals.clone();
                middlewares.extend(route.middlewares().iter().cloned());
                self.add_route(method, &path, middlewares, route.handler_arc());
            }
        }
        self
    }

    // === Consultas ===

    /// Busca la primera ruta (en orden de registro) que hace match
    pub fn find(&self, method: Method, clean_path: &str) -> Option<RouteMatch<'_>> {
        self.routes(method).iter().find_map(|route| {
            route
                .pattern()
                .matches(clean_path)
                .map(|params| RouteMatch { route, params })
        })
    }

    /// Middlewares globales cuyo filtro aplica a `clean_path`, en orden
    pub fn global_middlewares_for(&self, clean_path: &str) -> Vec<Arc<dyn Middleware>> {
        self.middlewares
            .iter()
            .filter(|global| global.applies_to(clean_path))
            .map(|global| Arc::clone(global.middleware()))
            .collect()
    }

    /// Lista efectiva para un request: globales que aplican + los de la ruta
    pub fn effective_middlewares(&self, clean_path: &str, route: &Route) -> Vec<Arc<dyn Middleware>> {
        let mut chain = self.global_middlewares_for(clean_path);
        chain.extend(route.middlewares().iter().cloned());
        chain
    }

    /// Rutas registradas para un método, en orden de registro
    pub fn routes(&self, method: Method) -> &[Route] {
        self.routes.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn global_middlewares(&self) -> &[GlobalMiddleware] {
        &self.middlewares
    }

    /// Número total de rutas
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Árbol de rutas legible, agrupado por método
    ///
    /// ```text
    /// GET
    ///   /                    (0 middlewares)
    ///   /cats/:id            (1 middleware)
    /// ```
    pub fn route_tree(&self) -> String {
        let mut tree = String::new();

        for method in Method::ALL {
            let routes = self.routes(method);
            if routes.is_empty() {
                continue;
            }
            let _ = writeln!(tree, "{}", method);
            for route in routes {
                let count = route.middlewares().len();
                let _ = writeln!(
                    tree,
                    "  {:<24} ({} middleware{})",
                    route.path(),
                    count,
                    if count == 1 { "" } else { "s" }
                );
            }
        }

        if !self.middlewares.is_empty() {
            let _ = writeln!(tree, "Global middlewares");
            for global in &self.middlewares {
                let _ = writeln!(tree, "  {}", global.prefix().unwrap_or("*"));
            }
        }

        tree
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.len())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{from_fn, Pipeline};

    fn tag(name: &'static str) -> impl Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static {
        move |_req, res| {
            res.send(name);
            Ok(())
        }
    }

    fn noop() -> Arc<dyn Middleware> {
        from_fn(|req, res, next| next.run(req, res))
    }

    /// Ejecuta lo que el dispatcher ejecutaría y retorna el body
    fn dispatch(router: &Router, method: Method, path: &str) -> Option<String> {
        let found = router.find(method, path)?;
        let chain = router.effective_middlewares(path, found.route);
        let mut req = Request::new(method, path, "HTTP/1.1");
        let mut res = Response::new();
        Pipeline::new(&chain, found.route.handler())
            .execute(&mut req, &mut res)
            .unwrap();
        Some(String::from_utf8(res.body().to_vec()).unwrap())
    }

    #[test]
    fn test_router_creation() {
        let router = Router::new();
        assert!(router.is_empty());
        assert!(router.routes(Method::GET).is_empty());
    }

    #[test]
    fn test_register_verbs() {
        let mut router = Router::new();
        router
            .get("/a", tag("get"))
            .post("/a", tag("post"))
            .put("/a", tag("put"))
            .patch("/a", tag("patch"))
            .delete("/a", tag("delete"))
            .options("/a", tag("options"));

        assert_eq!(router.len(), 6);
        for method in Method::ALL {
            assert_eq!(router.routes(method).len(), 1);
        }
        assert_eq!(dispatch(&router, Method::DELETE, "/a").as_deref(), Some("delete"));
    }

    #[test]
    fn test_find_by_method() {
        let mut router = Router::new();
        router.get("/cats", tag("list"));

        assert!(router.find(Method::GET, "/cats").is_some());
        assert!(router.find(Method::POST, "/cats").is_none());
    }

    #[test]
    fn test_find_extracts_params() {
        let mut router = Router::new();
        router.get("/cats/:id", tag("one"));

        let found = router.find(Method::GET, "/cats/42").unwrap();
        assert_eq!(found.params["id"], "42");
        assert!(router.find(Method::GET, "/cats/42/extra").is_none());
    }

    #[test]
    fn test_first_registered_wins_literal_first() {
        let mut router = Router::new();
        router.get("/cats/new", tag("literal"));
        router.get("/cats/:id", tag("param"));

        assert_eq!(dispatch(&router, Method::GET, "/cats/new").as_deref(), Some("literal"));
        assert_eq!(dispatch(&router, Method::GET, "/cats/7").as_deref(), Some("param"));
    }

    #[test]
    fn test_first_registered_wins_param_first() {
        let mut router = Router::new();
        router.get("/cats/:id", tag("param"));
        router.get("/cats/new", tag("literal"));

        assert_eq!(dispatch(&router, Method::GET, "/cats/new").as_deref(), Some("param"));
    }

    #[test]
    fn test_global_prefix_filter() {
        let mut router = Router::new();
        router.use_middleware(noop());
        router.use_at("/cats", noop());
        router.get("/cats/:id", tag("x"));
        router.get("/", tag("root"));

        assert_eq!(router.global_middlewares_for("/cats").len(), 2);
        assert_eq!(router.global_middlewares_for("/cats/1").len(), 2);
        assert_eq!(router.global_middlewares_for("/").len(), 1);
        assert_eq!(router.global_middlewares_for("/dogs").len(), 1);
    }

    #[test]
    fn test_effective_order_globals_then_route() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mark = |name: &'static str| {
            let order = Arc::clone(&order);
            from_fn(move |req, res, next| {
                order.lock().unwrap().push(name);
                next.run(req, res)
            })
        };

        let mut router = Router::new();
        router.use_middleware(mark("global-1"));
        router.get_with("/x", vec![mark("route-1"), mark("route-2")], tag("x"));
        router.use_at("/x", mark("global-2"));

        dispatch(&router, Method::GET, "/x").unwrap();
        assert_eq!(
            *order.lock().unwrap(),
            vec!["global-1", "global-2", "route-1", "route-2"]
        );
    }

    // ==================== Mounting ====================

    #[test]
    fn test_mount_prefixes_paths() {
        let mut cats = Router::new();
        cats.get("/", tag("list"));
        cats.get("/:id", tag("one"));
        cats.post("/", tag("create"));

        let mut app = Router::new();
        app.mount("/cats", &cats);

        let paths: Vec<&str> = app.routes(Method::GET).iter().map(Route::path).collect();
        assert_eq!(paths, vec!["/cats", "/cats/:id"]);
        assert_eq!(app.routes(Method::POST)[0].path(), "/cats");
        assert_eq!(dispatch(&app, Method::GET, "/cats/3").as_deref(), Some("one"));
        assert_eq!(dispatch(&app, Method::GET, "/cats").as_deref(), Some("list"));
    }

    #[test]
    fn test_mount_prepends_sub_router_globals() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mark = |name: &'static str| {
            let order = Arc::clone(&order);
            from_fn(move |req, res, next| {
                order.lock().unwrap().push(name);
                next.run(req, res)
            })
        };

        let mut cats = Router::new();
        cats.use_middleware(mark("sub-global"));
        cats.get_with("/", vec![mark("route")], tag("list"));

        let mut app = Router::new();
        app.use_middleware(mark("app-global"));
        app.mount("/cats", &cats);

        let mounted = &app.routes(Method::GET)[0];
        assert_eq!(mounted.middlewares().len(), 2);

        dispatch(&app, Method::GET, "/cats").unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["app-global", "sub-global", "route"]);
    }

    #[test]
    fn test_mount_copies_routes() {
        let mut cats = Router::new();
        cats.get("/", tag("list"));

        let mut app = Router::new();
        app.mount("/cats", &cats);
        cats.get("/late", tag("late"));

        assert_eq!(app.len(), 1);
        assert!(app.find(Method::GET, "/cats/late").is_none());
    }

    #[test]
    fn test_mount_root_prefix() {
        let mut sub = Router::new();
        sub.get("/", tag("root"));
        let mut app = Router::new();
        app.mount("/", &sub);
        assert_eq!(app.routes(Method::GET)[0].path(), "/");
    }

    #[test]
    fn test_route_tree() {
        let mut router = Router::new();
        router.get("/", tag("root"));
        router.get_with("/cats", vec![noop()], tag("cats"));
        router.post("/cats", tag("create"));
        router.use_at("/cats", noop());

        let tree = router.route_tree();
        assert!(tree.contains("GET\n"));
        assert!(tree.contains("POST\n"));
        assert!(tree.contains("(1 middleware)"));
        assert!(tree.contains("(0 middlewares)"));
        assert!(tree.contains("Global middlewares"));
        assert!(!tree.contains("DELETE"));
    }
}
