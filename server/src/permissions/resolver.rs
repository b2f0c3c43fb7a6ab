//! Authorization resolver.
//!
//! Determines the effective role of an account from its `user_roles` row.
//! Lookups fail closed: any error resolves to the least privileged role
//! instead of blocking the caller.

use tracing::warn;
use uuid::Uuid;

use super::Role;
use crate::db::RoleAssignment;
use crate::store::{decode_rows, Filter, Table, TableStore};

/// Resolved authority of one identity for the duration of a session.
///
/// Passed explicitly into every gated component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRole {
    pub user_id: Uuid,
    /// The account's role row, if any.
    pub assignment: Option<RoleAssignment>,
}

impl SessionRole {
    /// Session holding no assignment, i.e. the default role.
    #[must_use]
    pub const fn unassigned(user_id: Uuid) -> Self {
        Self {
            user_id,
            assignment: None,
        }
    }

    /// Effective role.
    #[must_use]
    pub fn role(&self) -> Role {
        match &self.assignment {
            Some(assignment) => assignment.role,
            None => Role::User,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role().is_admin()
    }
}

/// Look up the role row for `user_id`.
///
/// Returns the first matching row. Store and decode failures are logged and
/// reported as "no assignment".
#[tracing::instrument(skip(store))]
pub async fn resolve_assignment(store: &dyn TableStore, user_id: Uuid) -> Option<RoleAssignment> {
    let rows = match Filter::eq("user_id", user_id) {
        Ok(filter) => store.select(Table::UserRoles, &filter).await,
        Err(e) => Err(e),
    };
    let rows = match rows {
        Ok(rows) => rows,
        Err(e) => {
            warn!(%user_id, error = %e, "Role lookup failed, defaulting to user");
            return None;
        }
    };

    match decode_rows::<RoleAssignment>(rows) {
        Ok(assignments) => assignments.into_iter().next(),
        Err(e) => {
            warn!(%user_id, error = %e, "Role row malformed, defaulting to user");
            None
        }
    }
}

/// Resolve the session authority for `user_id`.
pub async fn resolve_session(store: &dyn TableStore, user_id: Uuid) -> SessionRole {
    SessionRole {
        user_id,
        assignment: resolve_assignment(store, user_id).await,
    }
}

/// Effective role of `user_id`.
pub async fn resolve_role(store: &dyn TableStore, user_id: Uuid) -> Role {
    resolve_session(store, user_id).await.role()
}

/// Per-session cache of the resolved role.
///
/// Resolves once per identity; a different identity or an explicit
/// [`invalidate`](Self::invalidate) triggers a fresh lookup.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: Option<SessionRole>,
}

impl SessionContext {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Session authority for `user_id`, resolving it if not already held.
    pub async fn ensure(&mut self, store: &dyn TableStore, user_id: Uuid) -> &SessionRole {
        let stale = self
            .current
            .as_ref()
            .is_none_or(|session| session.user_id != user_id);
        if stale {
            self.current = Some(resolve_session(store, user_id).await);
        }
        self.current.get_or_insert_with(|| SessionRole::unassigned(user_id))
    }

    /// Currently held session, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&SessionRole> {
        self.current.as_ref()
    }

    /// Drop the held session, e.g. on sign-out.
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}
