//! Admin data aggregation.
//!
//! Loads accounts, role assignments and complaints concurrently and derives
//! the admin view model. A collection whose read fails is logged and left
//! empty; the others still load.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::{debug, error};
use uuid::Uuid;

use super::types::{AccountWithRole, AdminCollections, AdminError, AdminOverview, RoleCounts};
use crate::db::{Account, RoleAssignment};
use crate::moderation::Complaint;
use crate::permissions::{Role, SessionRole};
use crate::store::{decode_rows, Direction, StoreResult, Table, TableStore};

async fn read_newest_first<T: DeserializeOwned>(
    store: &dyn TableStore,
    table: Table,
) -> StoreResult<Vec<T>> {
    let rows = store.read(table, "created_at", Direction::Desc).await?;
    decode_rows(rows)
}

/// Read one collection, degrading to empty on failure.
async fn load_or_empty<T: DeserializeOwned>(store: &dyn TableStore, table: Table) -> Vec<T> {
    match read_newest_first(store, table).await {
        Ok(items) => {
            debug!(table = %table, count = items.len(), "Collection loaded");
            items
        }
        Err(e) => {
            error!(table = %table, error = %e, "Failed to load collection");
            Vec::new()
        }
    }
}

/// Accounts, newest first.
pub async fn load_accounts(store: &dyn TableStore) -> Vec<Account> {
    load_or_empty(store, Table::Accounts).await
}

/// Role assignments, newest first.
pub async fn load_roles(store: &dyn TableStore) -> Vec<RoleAssignment> {
    load_or_empty(store, Table::UserRoles).await
}

/// Complaints, newest first.
pub async fn load_complaints(store: &dyn TableStore) -> Vec<Complaint> {
    load_or_empty(store, Table::Complaints).await
}

/// Load every admin collection concurrently.
///
/// Only admins may aggregate; nothing is read otherwise.
#[tracing::instrument(skip(store, actor), fields(actor = %actor.user_id))]
pub async fn load_collections(
    store: &dyn TableStore,
    actor: &SessionRole,
) -> Result<AdminCollections, AdminError> {
    if !actor.is_admin() {
        return Err(AdminError::NotAdmin);
    }

    let (accounts, roles, complaints) = tokio::join!(
        load_accounts(store),
        load_roles(store),
        load_complaints(store),
    );

    Ok(AdminCollections {
        accounts,
        roles,
        complaints,
    })
}

impl AdminCollections {
    /// Current role of every account. Rows are newest first, so the first
    /// row seen for an account wins.
    fn role_index(&self) -> HashMap<Uuid, Role> {
        let mut index = HashMap::with_capacity(self.roles.len());
        for assignment in &self.roles {
            index.entry(assignment.user_id).or_insert(assignment.role);
        }
        index
    }

    /// Derive the view model.
    #[must_use]
    pub fn overview(&self) -> AdminOverview {
        let roles = self.role_index();

        let accounts: Vec<AccountWithRole> = self
            .accounts
            .iter()
            .map(|account| AccountWithRole {
                role: roles.get(&account.id).copied().unwrap_or_default(),
                account: account.clone(),
            })
            .collect();

        let mut counts = RoleCounts {
            total_accounts: accounts.len(),
            ..RoleCounts::default()
        };
        for entry in &accounts {
            match entry.role {
                Role::Moderator => counts.moderators += 1,
                Role::Admin => counts.admins += 1,
                Role::User => {}
            }
        }

        AdminOverview {
            accounts,
            counts,
            pending_complaints: self.complaints.iter().filter(|c| c.is_pending()).count(),
            complaints: self.complaints.clone(),
        }
    }
}

/// Load and derive the admin view model in one call.
pub async fn load_overview(
    store: &dyn TableStore,
    actor: &SessionRole,
) -> Result<AdminOverview, AdminError> {
    Ok(load_collections(store, actor).await?.overview())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Log sink for a test-local subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn account(name: &str) -> Account {
        Account {
            id: Uuid::now_v7(),
            name: name.to_string(),
            email: format!("{name}@uni.edu"),
            institution: None,
            phone: None,
            created_at: Utc::now(),
        }
    }

    fn assignment(user_id: Uuid, role: Role, age_minutes: i64) -> RoleAssignment {
        RoleAssignment {
            id: Uuid::now_v7(),
            user_id,
            role,
            assigned_by: None,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn test_overview_joins_roles_with_default() {
        let alice = account("alice");
        let bob = account("bob");
        let carol = account("carol");
        let collections = AdminCollections {
            roles: vec![
                assignment(alice.id, Role::Admin, 1),
                assignment(bob.id, Role::Moderator, 2),
            ],
            accounts: vec![alice.clone(), bob.clone(), carol.clone()],
            complaints: Vec::new(),
        };

        let overview = collections.overview();
        let role_of = |id: Uuid| {
            overview
                .accounts
                .iter()
                .find(|a| a.account.id == id)
                .map(|a| a.role)
        };
        assert_eq!(role_of(alice.id), Some(Role::Admin));
        assert_eq!(role_of(bob.id), Some(Role::Moderator));
        assert_eq!(role_of(carol.id), Some(Role::User));
        assert_eq!(
            overview.counts,
            RoleCounts {
                total_accounts: 3,
                moderators: 1,
                admins: 1,
            }
        );
        assert_eq!(overview.pending_complaints, 0);
    }

    #[test]
    fn test_first_role_row_wins() {
        let alice = account("alice");
        let collections = AdminCollections {
            roles: vec![
                assignment(alice.id, Role::Moderator, 1),
                assignment(alice.id, Role::Admin, 10),
            ],
            accounts: vec![alice.clone()],
            complaints: Vec::new(),
        };

        let overview = collections.overview();
        assert_eq!(overview.accounts[0].role, Role::Moderator);
        assert_eq!(overview.counts.admins, 0);
    }

    #[test]
    fn test_orphan_role_rows_are_not_counted() {
        let collections = AdminCollections {
            roles: vec![assignment(Uuid::now_v7(), Role::Admin, 1)],
            accounts: Vec::new(),
            complaints: Vec::new(),
        };
        assert_eq!(collections.overview().counts, RoleCounts::default());
    }

    #[tokio::test]
    async fn test_failed_collection_is_logged_and_left_empty() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::ERROR)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let store = MemoryStore::new();
        let admin_id = Uuid::now_v7();
        store.insert_account(admin_id).await;
        store.set_failing(Table::Complaints, true).await;
        let admin = SessionRole {
            user_id: admin_id,
            assignment: Some(assignment(admin_id, Role::Admin, 0)),
        };

        let collections = load_collections(&store, &admin).await.unwrap();

        assert_eq!(collections.accounts.len(), 1);
        assert!(collections.complaints.is_empty());
        let output = logs.contents();
        assert!(output.contains("Failed to load collection"), "logs: {output}");
        assert!(output.contains("complaints"), "logs: {output}");
        assert!(!output.contains("accounts"), "only the failing read is logged: {output}");
    }
}
