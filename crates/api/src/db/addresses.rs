//! Customer address book repository.
//!
//! Every write that can touch `is_default` locks the owning customer row
//! first, so concurrent writers for one customer queue up instead of racing
//! on the partial unique index.

use sqlx::{PgConnection, PgPool};

use swiftbite_core::{AddressId, CustomerId};

use super::RepositoryError;
use crate::models::CustomerAddress;

const ADDRESS_COLUMNS: &str =
    "id, customer_id, label, address, notes, is_default, created_at, updated_at";

/// Fields for a new address.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub label: String,
    pub address: String,
    pub notes: Option<String>,
    pub is_default: bool,
}

/// Partial update of an address. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AddressChanges {
    pub label: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub is_default: Option<bool>,
}

/// Repository for customer address operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a customer's addresses, default first, then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, customer_id: CustomerId) -> Result<Vec<CustomerAddress>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerAddress>(&format!(
            r"
            SELECT {ADDRESS_COLUMNS}
            FROM customer_addresses
            WHERE customer_id = $1
            ORDER BY is_default DESC, created_at DESC, id DESC
            "
        ))
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Add an address. The customer's first address always becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        new: &NewAddress,
    ) -> Result<CustomerAddress, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_customer(&mut tx, customer_id).await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customer_addresses WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_one(&mut *tx)
                .await?;

        let make_default = new.is_default || existing == 0;
        if make_default {
            clear_default(&mut tx, customer_id).await?;
        }

        let address = sqlx::query_as::<_, CustomerAddress>(&format!(
            r"
            INSERT INTO customer_addresses (customer_id, label, address, notes, is_default)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(customer_id)
        .bind(&new.label)
        .bind(&new.address)
        .bind(new.notes.as_deref())
        .bind(make_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Update an address. `is_default = Some(true)` moves the default here.
    ///
    /// `Some(false)` is ignored: a default is only ever replaced, never
    /// dropped, so clearing it would leave the customer without one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't belong to the customer.
    pub async fn update(
        &self,
        customer_id: CustomerId,
        address_id: AddressId,
        changes: &AddressChanges,
    ) -> Result<CustomerAddress, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_customer(&mut tx, customer_id).await?;

        if changes.is_default == Some(true) {
            clear_default(&mut tx, customer_id).await?;
        }

        let address = sqlx::query_as::<_, CustomerAddress>(&format!(
            r"
            UPDATE customer_addresses
            SET label = COALESCE($3, label),
                address = COALESCE($4, address),
                notes = COALESCE($5, notes),
                is_default = COALESCE($6, is_default),
                updated_at = NOW()
            WHERE id = $1 AND customer_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(address_id)
        .bind(customer_id)
        .bind(changes.label.as_deref())
        .bind(changes.address.as_deref())
        .bind(changes.notes.as_deref())
        .bind(default_flag_update(changes.is_default))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }

    /// Make one address the customer's only default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't belong to the customer.
    pub async fn set_default(
        &self,
        customer_id: CustomerId,
        address_id: AddressId,
    ) -> Result<CustomerAddress, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_customer(&mut tx, customer_id).await?;
        clear_default(&mut tx, customer_id).await?;

        let address = sqlx::query_as::<_, CustomerAddress>(&format!(
            r"
            UPDATE customer_addresses
            SET is_default = TRUE, updated_at = NOW()
            WHERE id = $1 AND customer_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(address_id)
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }

    /// Delete an address. If it was the default, the newest remaining
    /// address takes over.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't belong to the customer.
    pub async fn delete(
        &self,
        customer_id: CustomerId,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_customer(&mut tx, customer_id).await?;

        let was_default: bool = sqlx::query_scalar(
            r"
            DELETE FROM customer_addresses
            WHERE id = $1 AND customer_id = $2
            RETURNING is_default
            ",
        )
        .bind(address_id)
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if was_default {
            sqlx::query(
                r"
                UPDATE customer_addresses
                SET is_default = TRUE, updated_at = NOW()
                WHERE id = (
                    SELECT id FROM customer_addresses
                    WHERE customer_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                )
                ",
            )
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// The `is_default` value an update may write: only `true` is applied.
const fn default_flag_update(requested: Option<bool>) -> Option<bool> {
    match requested {
        Some(true) => Some(true),
        _ => None,
    }
}

async fn lock_customer(
    conn: &mut PgConnection,
    customer_id: CustomerId,
) -> Result<(), RepositoryError> {
    sqlx::query_scalar::<_, i32>("SELECT id FROM customers WHERE id = $1 FOR UPDATE")
        .bind(customer_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    Ok(())
}

async fn clear_default(
    conn: &mut PgConnection,
    customer_id: CustomerId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE customer_addresses
        SET is_default = FALSE, updated_at = NOW()
        WHERE customer_id = $1 AND is_default
        ",
    )
    .bind(customer_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
