//! # Contacts Service
//!
//! Client and supplier CRUD. Name is required; email, when present, must be
//! well-formed.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use gestio_core::{validation, Contact, ContactKind, EntityStatus};
use gestio_db::{ContactRepository, Database};

use crate::error::{AppError, AppResult};

/// Input for creating a client or supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
}

/// Service for client and supplier operations.
#[derive(Debug, Clone)]
pub struct ContactsService {
    db: Database,
}

impl ContactsService {
    /// Creates a new ContactsService.
    pub fn new(db: Database) -> Self {
        ContactsService { db }
    }

    fn repo(&self, kind: ContactKind) -> ContactRepository {
        match kind {
            ContactKind::Client => self.db.clients(),
            ContactKind::Supplier => self.db.suppliers(),
        }
    }

    /// Creates a client.
    pub async fn create_client(&self, input: ContactInput) -> AppResult<Contact> {
        self.create(ContactKind::Client, input).await
    }

    /// Creates a supplier.
    pub async fn create_supplier(&self, input: ContactInput) -> AppResult<Contact> {
        self.create(ContactKind::Supplier, input).await
    }

    async fn create(&self, kind: ContactKind, input: ContactInput) -> AppResult<Contact> {
        validation::validate_name("name", &input.name)?;
        if let Some(email) = &input.email {
            validation::validate_email(email)?;
        }

        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            email: input.email,
            phone: input.phone,
            address: input.address,
            tax_id: input.tax_id,
            notes: input.notes,
            status: input.status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let contact = self.repo(kind).insert(&contact).await?;
        info!(kind = ?kind, name = %contact.name, "Contact created");

        Ok(contact)
    }

    /// Updates a contact in the given table.
    pub async fn update(&self, kind: ContactKind, contact: &Contact) -> AppResult<Contact> {
        validation::validate_name("name", &contact.name)?;
        if let Some(email) = &contact.email {
            validation::validate_email(email)?;
        }

        let repo = self.repo(kind);
        repo.update(contact).await?;

        repo.get_by_id(&contact.id)
            .await?
            .ok_or_else(|| AppError::not_found("Contact", &contact.id))
    }

    /// Soft-deletes a contact.
    pub async fn delete(&self, kind: ContactKind, id: &str) -> AppResult<()> {
        self.repo(kind).soft_delete(id).await?;
        Ok(())
    }

    /// Gets a contact or fails NotFound.
    pub async fn get(&self, kind: ContactKind, id: &str) -> AppResult<Contact> {
        self.repo(kind)
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Contact", id))
    }

    /// Lists live clients.
    pub async fn list_clients(&self) -> AppResult<Vec<Contact>> {
        Ok(self.db.clients().list().await?)
    }

    /// Lists live suppliers.
    pub async fn list_suppliers(&self) -> AppResult<Vec<Contact>> {
        Ok(self.db.suppliers().list().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use gestio_db::DbConfig;

    async fn service() -> ContactsService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ContactsService::new(db)
    }

    fn input(name: &str) -> ContactInput {
        ContactInput {
            name: name.to_string(),
            email: Some("geral@example.com".to_string()),
            phone: None,
            address: None,
            tax_id: None,
            notes: None,
            status: EntityStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_create_client_and_supplier() {
        let service = service().await;

        service.create_client(input("Mercearia Silva")).await.unwrap();
        service
            .create_supplier(input("Distribuidora Norte"))
            .await
            .unwrap();

        assert_eq!(service.list_clients().await.unwrap().len(), 1);
        assert_eq!(service.list_suppliers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_name_required() {
        let service = service().await;

        let err = service.create_client(input(" ")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_malformed_email_rejected() {
        let service = service().await;

        let mut bad = input("Mercearia Silva");
        bad.email = Some("not-an-email".to_string());

        let err = service.create_client(bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
