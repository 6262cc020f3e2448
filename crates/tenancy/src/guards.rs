//! Navigation guard chain.
//!
//! Each guard is a one-shot predicate evaluated against a single snapshot of
//! the session store and the tenant context at the moment of navigation. A
//! denial is always a redirect decision; guards never raise errors across the
//! navigation boundary.

use comercio_auth::SessionStore;
use comercio_core::TenantId;

use crate::TenantContext;

/// Navigation targets a guard can redirect to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    SelectCompany,
    CompanyHome,
    CompanyDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::SelectCompany => "/seleccionar-empresa",
            Route::CompanyHome => "/empresa/home",
            Route::CompanyDashboard => "/empresa/dashboard",
        }
    }
}

/// Outcome of a guard evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Full guard for tenant-scoped views.
///
/// Chain, terminal at the first failing predicate:
/// 1. no session -> login
/// 2. no company selected -> company selection
/// 3. session tenant != selected tenant -> forced logout, then login
pub fn auth_guard(sessions: &SessionStore, context: &TenantContext) -> GuardDecision {
    let Some(session) = sessions.snapshot() else {
        return GuardDecision::Redirect(Route::Login);
    };

    let Some(selected) = context.current_code() else {
        return GuardDecision::Redirect(Route::SelectCompany);
    };

    if session.tenant_code() != selected {
        // A diverged session/context pair is corruption, not a recoverable
        // state: drop everything and start over at login.
        tracing::error!(
            session_tenant = %session.tenant_code(),
            selected_tenant = %selected,
            "tenant mismatch between session and context; forcing logout"
        );
        sessions.clear();
        context.clear();
        return GuardDecision::Redirect(Route::Login);
    }

    GuardDecision::Allow
}

/// Authentication-only guard, for views that run before a company is
/// selected (the selection screen itself).
pub fn auth_only_guard(sessions: &SessionStore) -> GuardDecision {
    match sessions.snapshot() {
        Some(_) => GuardDecision::Allow,
        None => GuardDecision::Redirect(Route::Login),
    }
}

/// Inverse guard for public-only views (login, register): an authenticated
/// caller is sent to the company landing area.
pub fn public_guard(sessions: &SessionStore) -> GuardDecision {
    match sessions.snapshot() {
        Some(_) => GuardDecision::Redirect(Route::CompanyHome),
        None => GuardDecision::Allow,
    }
}

/// Administrator-gated views. Denials land on the regular home view rather
/// than login: the caller is authenticated, just under-privileged.
pub fn admin_guard(sessions: &SessionStore) -> GuardDecision {
    match sessions.snapshot() {
        None => GuardDecision::Redirect(Route::Login),
        Some(session) if session.is_admin() => GuardDecision::Allow,
        Some(_) => GuardDecision::Redirect(Route::CompanyHome),
    }
}

/// Super-administrator-gated views.
pub fn super_admin_guard(sessions: &SessionStore) -> GuardDecision {
    match sessions.snapshot() {
        None => GuardDecision::Redirect(Route::Login),
        Some(session) if session.is_super_admin() => GuardDecision::Allow,
        Some(_) => GuardDecision::Redirect(Route::CompanyDashboard),
    }
}

/// Route-embedded tenant check: a URL naming a company other than the
/// selected one bounces back to the landing area. Routes without an embedded
/// company pass through.
pub fn tenant_route_guard(context: &TenantContext, route_tenant: Option<TenantId>) -> GuardDecision {
    match (route_tenant, context.current_code()) {
        (Some(from_route), Some(selected)) if from_route != selected => {
            GuardDecision::Redirect(Route::CompanyHome)
        }
        _ => GuardDecision::Allow,
    }
}
