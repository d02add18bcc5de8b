//! Customer and supplier directory
//!
//! Both tables share one shape, so one service serves both.

use serde::Deserialize;
use shared::models::{Customer, Supplier};
use sqlx::{postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const CONTACT_COLUMNS: &str = "id, factory_id, name, phone, address, notes, created_at";

/// Which directory a contact lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directory {
    Customers,
    Suppliers,
}

impl Directory {
    fn table(&self) -> &'static str {
        match self {
            Directory::Customers => "customers",
            Directory::Suppliers => "suppliers",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Directory::Customers => "Customer",
            Directory::Suppliers => "Supplier",
        }
    }
}

/// A contact record type stored in one of the directories
pub trait Contact: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    const DIRECTORY: Directory;
}

impl Contact for Customer {
    const DIRECTORY: Directory = Directory::Customers;
}

impl Contact for Supplier {
    const DIRECTORY: Directory = Directory::Suppliers;
}

#[derive(Debug, Deserialize)]
pub struct CreateContactInput {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    pub search: Option<String>,
}

fn validate_contact(name: &str, phone: Option<&str>) -> AppResult<()> {
    shared::validation::validate_required(name).map_err(|m| AppError::validation("name", m))?;
    shared::validation::validate_optional_phone(phone).map_err(|m| AppError::validation("phone", m))?;
    Ok(())
}

/// Directory service
#[derive(Clone)]
pub struct DirectoryService {
    db: PgPool,
}

impl DirectoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list<T: Contact>(&self, factory_id: Uuid, query: &ContactQuery) -> AppResult<Vec<T>> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()));

        let contacts = sqlx::query_as::<_, T>(&format!(
            r#"
            SELECT {} FROM {}
            WHERE factory_id = $1
              AND ($2::text IS NULL OR LOWER(name) LIKE $2 OR phone LIKE $2)
            ORDER BY name
            "#,
            CONTACT_COLUMNS,
            T::DIRECTORY.table()
        ))
        .bind(factory_id)
        .bind(search)
        .fetch_all(&self.db)
        .await?;

        Ok(contacts)
    }

    pub async fn get<T: Contact>(&self, factory_id: Uuid, id: Uuid) -> AppResult<T> {
        sqlx::query_as::<_, T>(&format!(
            "SELECT {} FROM {} WHERE id = $1 AND factory_id = $2",
            CONTACT_COLUMNS,
            T::DIRECTORY.table()
        ))
        .bind(id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(T::DIRECTORY.label().to_string()))
    }

    pub async fn create<T: Contact>(&self, factory_id: Uuid, input: CreateContactInput) -> AppResult<T> {
        validate_contact(&input.name, input.phone.as_deref())?;

        let contact = sqlx::query_as::<_, T>(&format!(
            r#"
            INSERT INTO {} (factory_id, name, phone, address, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            T::DIRECTORY.table(),
            CONTACT_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("name".to_string())
            }
            other => AppError::DatabaseError(other),
        })?;

        Ok(contact)
    }

    pub async fn update<T: Contact>(
        &self,
        factory_id: Uuid,
        id: Uuid,
        input: UpdateContactInput,
    ) -> AppResult<T> {
        let row = sqlx::query_as::<_, (String, Option<String>, Option<String>, Option<String>)>(
            &format!(
                "SELECT name, phone, address, notes FROM {} WHERE id = $1 AND factory_id = $2",
                T::DIRECTORY.table()
            ),
        )
        .bind(id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(T::DIRECTORY.label().to_string()))?;

        let name = input.name.unwrap_or(row.0);
        let phone = input.phone.or(row.1);
        validate_contact(&name, phone.as_deref())?;

        let contact = sqlx::query_as::<_, T>(&format!(
            r#"
            UPDATE {} SET name = $1, phone = $2, address = $3, notes = $4
            WHERE id = $5 AND factory_id = $6
            RETURNING {}
            "#,
            T::DIRECTORY.table(),
            CONTACT_COLUMNS
        ))
        .bind(name.trim())
        .bind(&phone)
        .bind(input.address.or(row.2))
        .bind(input.notes.or(row.3))
        .bind(id)
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        Ok(contact)
    }

    pub async fn delete<T: Contact>(&self, factory_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND factory_id = $2",
            T::DIRECTORY.table()
        ))
        .bind(id)
        .bind(factory_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(T::DIRECTORY.label().to_string()));
        }

        Ok(())
    }
}
