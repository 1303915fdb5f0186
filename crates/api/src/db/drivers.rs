//! Driver repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use swiftbite_core::{DriverId, Money, Phone};

use super::RepositoryError;
use crate::models::Driver;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    id: i32,
    name: String,
    phone: String,
    email: Option<String>,
    password_hash: String,
    vehicle_type: String,
    is_available: bool,
    is_active: bool,
    current_location: Option<String>,
    total_earnings: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DriverRow {
    fn into_driver_with_hash(self) -> Result<(Driver, String), RepositoryError> {
        let phone = Phone::parse(&self.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        let driver = Driver {
            id: DriverId::new(self.id),
            name: self.name,
            phone,
            email: self.email,
            vehicle_type: self.vehicle_type,
            is_available: self.is_available,
            is_active: self.is_active,
            current_location: self.current_location,
            total_earnings: self.total_earnings,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        Ok((driver, self.password_hash))
    }
}

impl TryFrom<DriverRow> for Driver {
    type Error = RepositoryError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        row.into_driver_with_hash().map(|(driver, _)| driver)
    }
}

const DRIVER_COLUMNS: &str = "id, name, phone, email, password_hash, vehicle_type, is_available, \
     is_active, current_location, total_earnings, created_at, updated_at";

/// Fields for a new driver account.
#[derive(Debug, Clone)]
pub struct NewDriver<'a> {
    pub name: &'a str,
    pub phone: &'a Phone,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
    pub vehicle_type: &'a str,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for driver database operations.
pub struct DriverRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DriverRepository<'a> {
    /// Create a new driver repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all drivers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Driver>, RepositoryError> {
        let rows = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a driver by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: DriverId) -> Result<Option<Driver>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::get_in(&mut conn, id).await
    }

    /// Get a driver by ID on an existing connection or transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_in(
        conn: &mut PgConnection,
        id: DriverId,
    ) -> Result<Option<Driver>, RepositoryError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a driver and their password hash by phone, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials(
        &self,
        phone: &Phone,
    ) -> Result<Option<(Driver, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE phone = $1"
        ))
        .bind(phone.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(DriverRow::into_driver_with_hash).transpose()
    }

    /// Create a driver. New drivers start active but unavailable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone is already registered.
    pub async fn create(&self, new: &NewDriver<'_>) -> Result<Driver, RepositoryError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            r"
            INSERT INTO drivers (name, phone, email, password_hash, vehicle_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {DRIVER_COLUMNS}
            "
        ))
        .bind(new.name)
        .bind(new.phone.as_str())
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.vehicle_type)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Update a driver's availability and/or location. `None` keeps the stored value.
    ///
    /// Going available is guarded in the same statement, so a concurrent
    /// deactivation can't leave an inactive driver available.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the driver doesn't exist and
    /// `RepositoryError::Conflict` if an inactive driver asks to go available.
    pub async fn update_status(
        &self,
        id: DriverId,
        is_available: Option<bool>,
        current_location: Option<&str>,
    ) -> Result<Driver, RepositoryError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            r"
            UPDATE drivers
            SET is_available = COALESCE($2, is_available),
                current_location = COALESCE($3, current_location),
                updated_at = NOW()
            WHERE id = $1 AND (is_active OR $2 IS NOT TRUE)
            RETURNING {DRIVER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(is_available)
        .bind(current_location)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None if self.exists(id).await? => Err(RepositoryError::Conflict(
                "inactive driver cannot go available".to_string(),
            )),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn exists(&self, id: DriverId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM drivers WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Activate or deactivate a driver. Deactivation also clears availability.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the driver doesn't exist.
    pub async fn set_active(&self, id: DriverId, is_active: bool) -> Result<Driver, RepositoryError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            r"
            UPDATE drivers
            SET is_active = $2,
                is_available = is_available AND $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DRIVER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Hard-delete a driver. Their orders keep existing with `driver_id` cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the driver doesn't exist.
    pub async fn delete(&self, id: DriverId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count drivers that are active and available.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_available(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM drivers WHERE is_active AND is_available")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Add a delivered order's fee to the driver's running total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn credit_earnings(
        conn: &mut PgConnection,
        id: DriverId,
        amount: Money,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE drivers
            SET total_earnings = total_earnings + $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(amount)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
