//! Path-based client router.
//!
//! Routes map static paths (or `*` patterns) to a [`Page`]. Navigation runs
//! the global and per-route hooks, updates history and hands the resolved
//! [`RouteMatch`] to an [`Outlet`]. The browser shell renders the outlet
//! reactively.

pub mod guard;
pub mod history;
pub mod path;
pub mod routes;

use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    rc::{Rc, Weak},
};

use futures::future::{FutureExt, LocalBoxFuture};

#[cfg(target_arch = "wasm32")]
pub use history::BrowserHistory;
pub use history::{History, Outlet, SignalOutlet};
pub use path::{history_url, normalize_path, wildcard_matches};
pub use routes::{Page, RouteMatch, APP_ROUTES, DEFAULT_TITLE, NOT_FOUND_TITLE};

/// Returning `false` cancels the navigation.
pub type BeforeHook = Rc<dyn Fn(Destination, Option<Route>) -> LocalBoxFuture<'static, bool>>;
pub type AfterHook = Rc<dyn Fn(Destination, Option<Route>) -> LocalBoxFuture<'static, ()>>;
pub type NotFoundHandler = Rc<dyn Fn(&str) -> Page>;

pub struct RouteConfig {
    pub page: Page,
    pub title: Option<String>,
    pub before_enter: Option<BeforeHook>,
    pub after_enter: Option<AfterHook>,
    pub meta: BTreeMap<String, String>,
}

impl RouteConfig {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            title: None,
            before_enter: None,
            after_enter: None,
            meta: BTreeMap::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn before_enter(mut self, hook: BeforeHook) -> Self {
        self.before_enter = Some(hook);
        self
    }

    pub fn after_enter(mut self, hook: AfterHook) -> Self {
        self.after_enter = Some(hook);
        self
    }

    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_string(), value.to_string());
        self
    }
}

/// A registered route.
#[derive(Clone)]
pub struct Route {
    pub path: String,
    pub page: Page,
    pub title: String,
    pub meta: BTreeMap<String, String>,
    before_enter: Option<BeforeHook>,
    after_enter: Option<AfterHook>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("page", &self.page)
            .field("title", &self.title)
            .finish()
    }
}

/// What a hook sees about the navigation in flight.
#[derive(Debug, Clone)]
pub struct Destination {
    pub route: Route,
    /// Normalized path that was requested.
    pub path: String,
    /// URL as it will appear in history.
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    pub replace: bool,
    /// History already moved (popstate), so leave it alone.
    pub skip_history: bool,
}

impl NavigateOptions {
    pub fn replace() -> Self {
        Self {
            replace: true,
            skip_history: false,
        }
    }

    pub fn from_history() -> Self {
        Self {
            replace: false,
            skip_history: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Committed,
    Cancelled,
    NotFound,
}

struct RouterInner {
    routes: RefCell<Vec<Route>>,
    not_found: RefCell<Option<NotFoundHandler>>,
    before_each: RefCell<Option<BeforeHook>>,
    after_each: RefCell<Option<AfterHook>>,
    current: RefCell<Option<Route>>,
    history: Rc<dyn History>,
    outlet: Rc<dyn Outlet>,
}

#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

/// Non-owning handle for hooks that navigate.
#[derive(Clone)]
pub struct WeakRouter {
    inner: Weak<RouterInner>,
}

impl WeakRouter {
    pub fn upgrade(&self) -> Option<Router> {
        self.inner.upgrade().map(|inner| Router { inner })
    }
}

impl Router {
    pub fn new(history: Rc<dyn History>, outlet: Rc<dyn Outlet>) -> Self {
        Self {
            inner: Rc::new(RouterInner {
                routes: RefCell::new(Vec::new()),
                not_found: RefCell::new(None),
                before_each: RefCell::new(None),
                after_each: RefCell::new(None),
                current: RefCell::new(None),
                history,
                outlet,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakRouter {
        WeakRouter {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Registers `path`, replacing any earlier route with the same path.
    pub fn add_route(&self, path: &str, config: RouteConfig) -> &Self {
        let route = Route {
            path: path.to_string(),
            page: config.page,
            title: config.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            meta: config.meta,
            before_enter: config.before_enter,
            after_enter: config.after_enter,
        };
        let mut routes = self.inner.routes.borrow_mut();
        match routes.iter_mut().find(|r| r.path == path) {
            Some(existing) => *existing = route,
            None => routes.push(route),
        }
        self
    }

    pub fn set_not_found(&self, handler: NotFoundHandler) -> &Self {
        *self.inner.not_found.borrow_mut() = Some(handler);
        self
    }

    pub fn before_each(&self, hook: BeforeHook) -> &Self {
        *self.inner.before_each.borrow_mut() = Some(hook);
        self
    }

    pub fn after_each(&self, hook: AfterHook) -> &Self {
        *self.inner.after_each.borrow_mut() = Some(hook);
        self
    }

    /// Exact path first, then the first `*` pattern that matches.
    pub fn resolve(&self, normalized: &str) -> Option<Route> {
        let routes = self.inner.routes.borrow();
        routes
            .iter()
            .find(|r| r.path == normalized)
            .or_else(|| {
                routes
                    .iter()
                    .find(|r| wildcard_matches(&r.path, normalized))
            })
            .cloned()
    }

    pub fn get_current_route(&self) -> Option<Route> {
        self.inner.current.borrow().clone()
    }

    pub fn is_active(&self, path: &str) -> bool {
        self.inner.history.current_path() == normalize_path(path)
    }

    pub fn go_back(&self) {
        self.inner.history.back();
    }

    pub fn go_forward(&self) {
        self.inner.history.forward();
    }

    /// Navigations are independent: a second call does not wait for or
    /// cancel one still in flight.
    pub fn navigate(&self, path: &str, options: NavigateOptions) -> LocalBoxFuture<'static, NavigationOutcome> {
        let router = self.clone();
        let target = path.to_string();
        async move { router.run_navigation(target, options).await }.boxed_local()
    }

    async fn run_navigation(self, target: String, options: NavigateOptions) -> NavigationOutcome {
        let normalized = normalize_path(&target);
        let Some(route) = self.resolve(&normalized) else {
            log::debug!("no route for {}", normalized);
            self.render_not_found(&normalized, &target);
            return NavigationOutcome::NotFound;
        };

        let destination = Destination {
            route: route.clone(),
            path: normalized.clone(),
            url: history_url(&target),
        };
        let from = self.get_current_route();

        let global_before = self.inner.before_each.borrow().clone();
        if let Some(hook) = global_before {
            if !hook(destination.clone(), from.clone()).await {
                return NavigationOutcome::Cancelled;
            }
        }
        if let Some(hook) = route.before_enter.clone() {
            if !hook(destination.clone(), from.clone()).await {
                return NavigationOutcome::Cancelled;
            }
        }

        if !options.skip_history {
            if options.replace {
                self.inner.history.replace(&destination.url);
            } else {
                self.inner.history.push(&destination.url);
            }
        }
        let previous = self.inner.current.replace(Some(route.clone()));

        let matched = RouteMatch::new(route.page, &normalized, &target);
        if let Err(err) = self.inner.outlet.render(&matched) {
            log::error!("navigation to {} failed: {}", normalized, err);
            self.render_not_found(&normalized, &target);
            return NavigationOutcome::NotFound;
        }
        self.inner.outlet.set_title(&route.title);

        if let Some(hook) = route.after_enter.clone() {
            hook(destination.clone(), previous.clone()).await;
        }
        let global_after = self.inner.after_each.borrow().clone();
        if let Some(hook) = global_after {
            hook(destination, previous).await;
        }

        self.inner.outlet.scroll_to_top();
        NavigationOutcome::Committed
    }

    fn render_not_found(&self, normalized: &str, target: &str) {
        let handler = self.inner.not_found.borrow().clone();
        let page = handler.map(|h| h(normalized)).unwrap_or(Page::NotFound);
        if let Err(err) = self
            .inner
            .outlet
            .render(&RouteMatch::new(page, normalized, target))
        {
            log::error!("not-found render failed: {}", err);
        }
        self.inner.outlet.set_title(NOT_FOUND_TITLE);
    }

    /// Wires popstate and `a[data-router]` clicks, then routes the current
    /// location in place.
    #[cfg(target_arch = "wasm32")]
    pub fn init(&self) {
        use wasm_bindgen::{closure::Closure, JsCast};

        let Some(window) = web_sys::window() else {
            log::error!("router started without a window");
            return;
        };

        let router = self.clone();
        let on_popstate = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let router = router.clone();
            let target = current_location();
            leptos::spawn_local(async move {
                router.navigate(&target, NavigateOptions::from_history()).await;
            });
        }) as Box<dyn FnMut(web_sys::Event)>);
        let _ = window
            .add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref());
        on_popstate.forget();

        if let Some(document) = window.document() {
            let router = self.clone();
            let on_click = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
                let anchor = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                    .and_then(|el| el.closest("a[data-router]").ok().flatten());
                let Some(anchor) = anchor else {
                    return;
                };
                event.prevent_default();
                if let Some(href) = anchor.get_attribute("href") {
                    let router = router.clone();
                    leptos::spawn_local(async move {
                        router.navigate(&href, NavigateOptions::default()).await;
                    });
                }
            }) as Box<dyn FnMut(web_sys::MouseEvent)>);
            let _ = document
                .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref());
            on_click.forget();
        }

        let router = self.clone();
        let initial = current_location();
        leptos::spawn_local(async move {
            router.navigate(&initial, NavigateOptions::replace()).await;
        });
    }
}

#[cfg(target_arch = "wasm32")]
fn current_location() -> String {
    web_sys::window()
        .map(|w| {
            let location = w.location();
            format!(
                "{}{}",
                location.pathname().unwrap_or_else(|_| "/".to_string()),
                location.search().unwrap_or_default()
            )
        })
        .unwrap_or_else(|| "/".to_string())
}

/// Hook helper: wraps an async closure as a [`BeforeHook`].
pub fn before_hook<F, Fut>(f: F) -> BeforeHook
where
    F: Fn(Destination, Option<Route>) -> Fut + 'static,
    Fut: std::future::Future<Output = bool> + 'static,
{
    Rc::new(move |to, from| f(to, from).boxed_local())
}

pub fn after_hook<F, Fut>(f: F) -> AfterHook
where
    F: Fn(Destination, Option<Route>) -> Fut + 'static,
    Fut: std::future::Future<Output = ()> + 'static,
{
    Rc::new(move |to, from| f(to, from).boxed_local())
}

/// Registers the application's routes and the auth guard.
pub fn install_app_routes(router: &Router, backend: crate::api::Backend) {
    for (path, page, title) in APP_ROUTES {
        router.add_route(path, RouteConfig::new(*page).title(title));
    }
    router
        .set_not_found(Rc::new(|_| Page::NotFound))
        .before_each(guard::auth_guard(backend, router.downgrade()))
        .after_each(after_hook(|to, from| async move {
            log::debug!(
                "navigated from {} to {}",
                from.map(|r| r.path).unwrap_or_else(|| "/".to_string()),
                to.path
            );
        }));
}
