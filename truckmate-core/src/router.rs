//! Screen routing and role-based view selection.
//!
//! Every navigation goes through [`resolve`], which applies the session gates:
//! `/profile` needs a signed-in user and `/admin` needs an administrator.

use std::fmt;

use crate::session::AuthState;

/// A client screen addressed by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Home,
    About,
    Services,
    Recommendation,
    Profile,
    Confirmation,
    Assessment,
    Admin,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Home => "/home",
            Route::About => "/about",
            Route::Services => "/services",
            Route::Recommendation => "/recommendation",
            Route::Profile => "/profile",
            Route::Confirmation => "/confirmation",
            Route::Assessment => "/assessment",
            Route::Admin => "/admin",
        }
    }

    /// Unknown paths fall through to Home.
    pub fn from_path(path: &str) -> Route {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        match normalized {
            "/" | "" => Route::Root,
            "/home" => Route::Home,
            "/about" => Route::About,
            "/services" => Route::Services,
            "/recommendation" => Route::Recommendation,
            "/profile" => Route::Profile,
            "/confirmation" => Route::Confirmation,
            "/assessment" => Route::Assessment,
            "/admin" => Route::Admin,
            _ => Route::Home,
        }
    }

    /// Title shown in the navigation bar and screen header.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Root | Route::Home => "Home",
            Route::About => "About Us",
            Route::Services => "Services",
            Route::Recommendation => "Recommendation",
            Route::Profile => "My Profile",
            Route::Confirmation => "Email Confirmation",
            Route::Assessment => "Damage Assessment",
            Route::Admin => "Admin Dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Apply session gates; the result is never `Root` and never a gated screen
/// the current state may not see.
pub fn resolve(route: Route, auth: &AuthState) -> Route {
    match route {
        Route::Root => match auth {
            AuthState::Authenticated { is_admin: true, .. } => Route::Admin,
            _ => Route::Home,
        },
        Route::Profile if !auth.is_authenticated() => Route::Home,
        Route::Admin if !auth.is_admin() => resolve(Route::Root, auth),
        other => other,
    }
}

/// Where a fresh login lands.
pub fn landing_after_login(auth: &AuthState) -> Route {
    if auth.is_admin() {
        Route::Admin
    } else {
        Route::Home
    }
}

/// An entry in the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Go(Route),
    Logout,
}

impl NavItem {
    pub fn label(&self) -> &'static str {
        match self {
            NavItem::Go(route) => route.title(),
            NavItem::Logout => "Logout",
        }
    }
}

/// Navigation entries visible for the given session state.
pub fn nav_items(auth: &AuthState) -> Vec<NavItem> {
    let mut items = vec![
        NavItem::Go(Route::Home),
        NavItem::Go(Route::About),
        NavItem::Go(Route::Services),
    ];
    if auth.is_admin() {
        items.push(NavItem::Go(Route::Admin));
    }
    if auth.is_authenticated() {
        items.push(NavItem::Go(Route::Profile));
        items.push(NavItem::Logout);
    }
    items
}

/// What the home screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeView {
    /// Marketing banner plus login / sign-up forms
    Guest,
    /// Greeting plus the assessment shortcut
    Welcome { username: String },
}

pub fn home_view(auth: &AuthState) -> HomeView {
    match auth {
        AuthState::Anonymous => HomeView::Guest,
        AuthState::Authenticated { username, .. } => HomeView::Welcome {
            username: username.clone(),
        },
    }
}
