//! Role-based access decisions.
//!
//! Every gate in the application goes through [`check`]: the dashboard route
//! is the [`Capability::ManageCatalog`] check, admin commands check the
//! capability they need, and shopper pages require [`Capability::Shop`].

use shared::models::{Role, User};
use strum::{Display, EnumIter};

use crate::{
    error::{ClientError, ClientResult},
    session::SessionSnapshot,
};

/// What a signed-in account is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    /// Check out and view one's own orders.
    Shop,
    /// Dashboard access: list, edit and delete products, manage orders.
    ManageCatalog,
    /// Administer accounts and approve suppliers.
    ManageUsers,
}

/// Capabilities granted by a user's profile. No profile grants nothing.
#[must_use]
pub fn capabilities(user: &User) -> Vec<Capability> {
    let Some(profile) = &user.profile else {
        return Vec::new();
    };
    match profile.role {
        Role::Admin => vec![
            Capability::Shop,
            Capability::ManageCatalog,
            Capability::ManageUsers,
        ],
        Role::Supplier if profile.is_approved => vec![Capability::Shop, Capability::ManageCatalog],
        Role::Supplier | Role::Client => vec![Capability::Shop],
    }
}

/// `true` when `user` holds `capability`.
#[must_use]
pub fn has_capability(user: &User, capability: Capability) -> bool {
    capabilities(user).contains(&capability)
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session is still being restored or a login is in flight.
    Pending,
    Allow,
    RedirectToLogin,
}

/// Decide whether the session may enter something that requires `capability`.
#[must_use]
pub fn check(session: &SessionSnapshot, capability: Capability) -> GuardDecision {
    if session.loading {
        return GuardDecision::Pending;
    }
    match &session.user {
        Some(user) if has_capability(user, capability) => GuardDecision::Allow,
        _ => GuardDecision::RedirectToLogin,
    }
}

/// Resolve a guard check into an error for command-style callers.
///
/// # Errors
/// Returns [`ClientError::Forbidden`] unless the check allows access.
/// A pending session is treated as a denial.
pub fn ensure(session: &SessionSnapshot, capability: Capability) -> ClientResult<&User> {
    match (check(session, capability), &session.user) {
        (GuardDecision::Allow, Some(user)) => Ok(user),
        _ => Err(ClientError::Forbidden(capability)),
    }
}

/// Storefront and dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Route {
    Home,
    Product,
    Search,
    Cart,
    Login,
    Register,
    Checkout,
    Profile,
    MyOrders,
    Dashboard,
    DashboardProducts,
    DashboardOrders,
    DashboardUsers,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Product => "/product/:id",
            Self::Search => "/search",
            Self::Cart => "/cart",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Checkout => "/checkout",
            Self::Profile => "/profile",
            Self::MyOrders => "/my-orders",
            Self::Dashboard => "/dashboard",
            Self::DashboardProducts => "/dashboard/products",
            Self::DashboardOrders => "/dashboard/orders",
            Self::DashboardUsers => "/dashboard/users",
        }
    }

    /// Capability needed to enter; `None` for public pages.
    #[must_use]
    pub const fn required_capability(self) -> Option<Capability> {
        match self {
            Self::Home
            | Self::Product
            | Self::Search
            | Self::Cart
            | Self::Login
            | Self::Register => None,
            Self::Checkout | Self::Profile | Self::MyOrders => Some(Capability::Shop),
            Self::Dashboard | Self::DashboardProducts | Self::DashboardOrders => {
                Some(Capability::ManageCatalog)
            }
            Self::DashboardUsers => Some(Capability::ManageUsers),
        }
    }

    /// Guard decision for this route. Public routes are always allowed.
    #[must_use]
    pub fn decide(self, session: &SessionSnapshot) -> GuardDecision {
        self.required_capability()
            .map_or(GuardDecision::Allow, |capability| check(session, capability))
    }
}
