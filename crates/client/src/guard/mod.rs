//! Route guard: decides whether a path may render for the current session.
//!
//! [`guard`] is a pure function of `(path, session)`. It never navigates;
//! the caller performs the redirect it returns. [`RouteWatcher`] re-runs it
//! on every path change and every session change.
//!
//! # Rules
//!
//! | Path | Requires | Otherwise |
//! |------|----------|-----------|
//! | `/dashboard`, `/checkout`, `/cart`, `/notifications` | signed in | `/auth?redirect=<path>` |
//! | `/dashboard/buyer`, `/dashboard/seller`, `/dashboard/admin` | matching role | `/` |
//! | `/dashboard` exactly | signed in | role dashboard |
//! | `/auth` | signed out | `redirect` param or role dashboard |
//!
//! While the session is loading, protected paths are [`GuardDecision::Pending`]
//! and nothing redirects except path normalization: a path with empty, `.`,
//! or `..` segments is first redirected to its canonical form.

mod nav;
mod watcher;

use artisan_bazaar_core::Role;
use tracing::warn;

use crate::session::SessionState;

pub use nav::{NavEntry, navigation};
pub use watcher::RouteWatcher;

/// Sign-in page.
pub const LOGIN_PATH: &str = "/auth";

/// Where a signed-in user lands when a role check fails.
pub const LANDING_PATH: &str = "/";

/// Query parameter carrying the return target through sign-in.
const REDIRECT_PARAM: &str = "redirect";

/// Upper bound on redirects followed by [`settle`].
const MAX_REDIRECTS: usize = 4;

/// What to do with a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the route.
    Allow,
    /// Session still resolving; render a loading state.
    Pending,
    /// Navigate elsewhere.
    Redirect(String),
}

#[derive(Debug, Clone, Copy)]
enum Access {
    SignedIn,
    Role(Role),
}

/// Protected prefixes. The most specific match wins.
const RULES: &[(&str, Access)] = &[
    ("/dashboard/buyer", Access::Role(Role::Buyer)),
    ("/dashboard/seller", Access::Role(Role::Seller)),
    ("/dashboard/admin", Access::Role(Role::Admin)),
    ("/dashboard", Access::SignedIn),
    ("/checkout", Access::SignedIn),
    ("/cart", Access::SignedIn),
    ("/notifications", Access::SignedIn),
];

/// Decide whether `path` may render for `session`.
///
/// `path` may carry a query string and fragment; they are ignored for
/// matching and kept in the sign-in return target.
#[must_use]
pub fn guard(path: &str, session: &SessionState) -> GuardDecision {
    let route = route_of(path);
    let canonical = canonical_route(route);
    if canonical != route {
        let (_, suffix) = split_route(path);
        return GuardDecision::Redirect(format!("{canonical}{suffix}"));
    }

    if route == LOGIN_PATH {
        // The sign-in page renders while loading; it is not protected.
        return match &session.user {
            Some(user) => GuardDecision::Redirect(
                redirect_param(path).unwrap_or_else(|| user.role.dashboard_path().to_owned()),
            ),
            None => GuardDecision::Allow,
        };
    }

    let Some(access) = access_for(route) else {
        return GuardDecision::Allow;
    };

    if session.loading {
        return GuardDecision::Pending;
    }

    let Some(user) = &session.user else {
        return GuardDecision::Redirect(login_redirect(path));
    };

    match access {
        Access::SignedIn if route == "/dashboard" => {
            GuardDecision::Redirect(user.role.dashboard_path().to_owned())
        }
        Access::SignedIn => GuardDecision::Allow,
        Access::Role(role) if role == user.role => GuardDecision::Allow,
        Access::Role(_) => GuardDecision::Redirect(LANDING_PATH.to_owned()),
    }
}

/// Where a route finally lands after following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landing {
    /// The path that renders.
    pub path: String,
    /// `Allow` or `Pending`; never `Redirect`.
    pub decision: GuardDecision,
}

/// Follow [`guard`] redirects from `path` to a path that renders.
///
/// Gives up on a redirect loop and lands on `/`.
#[must_use]
pub fn settle(path: &str, session: &SessionState) -> Landing {
    let mut current = path.to_owned();
    for _ in 0..=MAX_REDIRECTS {
        match guard(&current, session) {
            GuardDecision::Redirect(target) => current = target,
            decision => {
                return Landing {
                    path: current,
                    decision,
                };
            }
        }
    }

    warn!(path, "Redirect loop, falling back to landing page");
    Landing {
        path: LANDING_PATH.to_owned(),
        decision: GuardDecision::Allow,
    }
}

/// Sign-in path that returns to `path` afterwards.
#[must_use]
pub fn login_redirect(path: &str) -> String {
    let target = urlencoding::encode(path).replace("%2F", "/");
    format!("{LOGIN_PATH}?{REDIRECT_PARAM}={target}")
}

fn access_for(route: &str) -> Option<Access> {
    RULES
        .iter()
        .filter(|(prefix, _)| is_within(route, prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, access)| *access)
}

/// Split `path` into its path component and the query/fragment suffix.
fn split_route(path: &str) -> (&str, &str) {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path.split_at_checked(end).unwrap_or((path, ""))
}

/// Path component without query, fragment, or trailing slash.
fn route_of(path: &str) -> &str {
    let (route, _) = split_route(path);
    match route.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// `route` with empty and `.` segments dropped and `..` resolved.
fn canonical_route(route: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in route.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Segment-aware prefix test: `/cart` covers `/cart/3` but not `/carts`.
fn is_within(route: &str, prefix: &str) -> bool {
    route
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// The `redirect` parameter of a sign-in path, if it names a local path.
fn redirect_param(path: &str) -> Option<String> {
    let path = path.split('#').next().unwrap_or(path);
    let (_, query) = path.split_once('?')?;
    let raw = query.split('&').find_map(|pair| {
        pair.split_once('=')
            .filter(|(name, _)| *name == REDIRECT_PARAM)
            .map(|(_, value)| value)
    })?;
    let target = urlencoding::decode(raw).ok()?.into_owned();
    is_local(&target).then_some(target)
}

/// Whether `target` is a same-origin path (no scheme, no `//host`).
fn is_local(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.starts_with("/\\")
        && canonical_route(route_of(target)) != LOGIN_PATH
}
