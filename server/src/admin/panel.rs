//! Admin panel controller.
//!
//! Owns the view state of one mounted admin panel. Every successful
//! mutation is followed by a re-read of the collection it touched; nothing
//! is patched locally. Reply drafts survive failed submissions so the
//! operator can retry.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::aggregator::{load_collections, load_complaints, load_roles};
use super::roles::{assign_role, remove_role};
use super::types::{AdminCollections, AdminError, AdminOverview};
use crate::moderation::{resolve_complaint, Complaint, ComplaintError};
use crate::permissions::{Role, SessionRole};
use crate::store::TableStore;

pub struct AdminPanel {
    store: Arc<dyn TableStore>,
    session: SessionRole,
    collections: AdminCollections,
    reply_drafts: HashMap<Uuid, String>,
}

impl AdminPanel {
    /// Load every collection for `session`. Fails for non-admins.
    pub async fn mount(store: Arc<dyn TableStore>, session: SessionRole) -> Result<Self, AdminError> {
        let collections = load_collections(store.as_ref(), &session).await?;
        Ok(Self {
            store,
            session,
            collections,
            reply_drafts: HashMap::new(),
        })
    }

    #[must_use]
    pub const fn session(&self) -> &SessionRole {
        &self.session
    }

    #[must_use]
    pub fn overview(&self) -> AdminOverview {
        self.collections.overview()
    }

    #[must_use]
    pub fn complaints(&self) -> &[Complaint] {
        &self.collections.complaints
    }

    /// Re-read every collection.
    pub async fn refresh(&mut self) -> Result<(), AdminError> {
        self.collections = load_collections(self.store.as_ref(), &self.session).await?;
        Ok(())
    }

    pub async fn set_role(&mut self, target: Uuid, role: Role) -> Result<(), AdminError> {
        assign_role(self.store.as_ref(), &self.session, target, role).await?;
        self.collections.roles = load_roles(self.store.as_ref()).await;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub async fn remove_role(&mut self, target: Uuid) -> Result<bool, AdminError> {
        let removed = remove_role(self.store.as_ref(), &self.session, target).await?;
        self.collections.roles = load_roles(self.store.as_ref()).await;
        Ok(removed)
    }

    pub fn draft_reply(&mut self, complaint_id: Uuid, text: impl Into<String>) {
        self.reply_drafts.insert(complaint_id, text.into());
    }

    #[must_use]
    pub fn reply_draft(&self, complaint_id: Uuid) -> Option<&str> {
        self.reply_drafts.get(&complaint_id).map(String::as_str)
    }

    /// Resolve `complaint_id` with its held draft.
    ///
    /// On success the draft is discarded and complaints are re-read. On any
    /// failure the draft stays in place. `NotPending` also re-reads
    /// complaints, since the view is stale.
    pub async fn submit_reply(&mut self, complaint_id: Uuid) -> Result<(), ComplaintError> {
        let draft = self.reply_draft(complaint_id).unwrap_or_default();
        match resolve_complaint(self.store.as_ref(), &self.session, complaint_id, draft).await {
            Ok(()) => {
                self.reply_drafts.remove(&complaint_id);
                self.collections.complaints = load_complaints(self.store.as_ref()).await;
                Ok(())
            }
            Err(ComplaintError::NotPending) => {
                self.collections.complaints = load_complaints(self.store.as_ref()).await;
                Err(ComplaintError::NotPending)
            }
            Err(e) => Err(e),
        }
    }
}
