//! # Contact Repository
//!
//! Database operations for clients and suppliers.
//!
//! Both tables share the same shape, so a single repository serves both,
//! scoped by [`ContactKind`]. The table name comes from a compile-time
//! allowlist, never from input.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeAction, ChangeEvent, ChangeFeed};
use gestio_core::{Contact, ContactKind};

const COLUMNS: &str =
    "id, name, email, phone, address, tax_id, notes, status, created_at, updated_at, deleted_at";

/// Repository for client/supplier database operations.
#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
    kind: ContactKind,
}

impl ContactRepository {
    /// Creates a new ContactRepository scoped to one contact table.
    pub fn new(pool: SqlitePool, feed: ChangeFeed, kind: ContactKind) -> Self {
        ContactRepository { pool, feed, kind }
    }

    /// The contact kind this repository is scoped to.
    pub fn kind(&self) -> ContactKind {
        self.kind
    }

    fn table(&self) -> &'static str {
        self.kind.table_name()
    }

    /// Lists live contacts, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Contact>> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE deleted_at IS NULL ORDER BY name",
            self.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }

    /// Gets a live contact by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE id = ?1 AND deleted_at IS NULL",
            self.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Inserts a new contact.
    pub async fn insert(&self, contact: &Contact) -> DbResult<Contact> {
        debug!(table = self.table(), name = %contact.name, "Inserting contact");

        sqlx::query(&format!(
            r#"
            INSERT INTO {} (
                id, name, email, phone, address, tax_id, notes, status,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            self.table()
        ))
        .bind(&contact.id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.address)
        .bind(&contact.tax_id)
        .bind(&contact.notes)
        .bind(contact.status)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .bind(contact.deleted_at)
        .execute(&self.pool)
        .await?;

        self.feed.publish(ChangeEvent::with_record(
            self.kind.entity_kind(),
            ChangeAction::Insert,
            &contact.id,
            contact,
        ));

        Ok(contact.clone())
    }

    /// Updates an existing contact.
    pub async fn update(&self, contact: &Contact) -> DbResult<()> {
        debug!(table = self.table(), id = %contact.id, "Updating contact");

        let now = Utc::now();

        let result = sqlx::query(&format!(
            r#"
            UPDATE {} SET
                name = ?2,
                email = ?3,
                phone = ?4,
                address = ?5,
                tax_id = ?6,
                notes = ?7,
                status = ?8,
                updated_at = ?9
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
            self.table()
        ))
        .bind(&contact.id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.address)
        .bind(&contact.tax_id)
        .bind(&contact.notes)
        .bind(contact.status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Contact", &contact.id));
        }

        if let Some(fresh) = self.get_by_id(&contact.id).await? {
            self.feed.publish(ChangeEvent::with_record(
                self.kind.entity_kind(),
                ChangeAction::Update,
                &fresh.id,
                &fresh,
            ));
        }

        Ok(())
    }

    /// Soft-deletes a contact.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(table = self.table(), id = %id, "Soft-deleting contact");

        super::recycle_bin::soft_delete_record(&self.pool, self.kind.entity_kind(), id).await?;

        self.feed.publish(ChangeEvent::bare(
            self.kind.entity_kind(),
            ChangeAction::Delete,
            id,
        ));

        Ok(())
    }

    /// Counts live contacts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE deleted_at IS NULL",
            self.table()
        ))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use gestio_core::{Contact, EntityStatus};
    use uuid::Uuid;

    fn test_contact(name: &str) -> Contact {
        let now = Utc::now();
        Contact {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: Some("geral@example.com".to_string()),
            phone: None,
            address: None,
            tax_id: Some("501234567".to_string()),
            notes: None,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_clients_and_suppliers_are_separate_tables() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let client = db.clients().insert(&test_contact("Mercearia Silva")).await.unwrap();
        db.suppliers()
            .insert(&test_contact("Distribuidora Norte"))
            .await
            .unwrap();

        assert_eq!(db.clients().list().await.unwrap().len(), 1);
        assert_eq!(db.suppliers().list().await.unwrap().len(), 1);
        assert!(db.suppliers().get_by_id(&client.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.clients();

        let mut contact = repo.insert(&test_contact("Mercearia Silva")).await.unwrap();

        contact.phone = Some("912345678".to_string());
        repo.update(&contact).await.unwrap();

        let fetched = repo.get_by_id(&contact.id).await.unwrap().unwrap();
        assert_eq!(fetched.phone.as_deref(), Some("912345678"));

        repo.soft_delete(&contact.id).await.unwrap();
        assert!(repo.get_by_id(&contact.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
