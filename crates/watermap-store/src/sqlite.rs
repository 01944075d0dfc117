//! SQLite storage implementation.
//!
//! This module provides the [`SqliteStore`] implementation of the
//! [`Store`](crate::Store) trait over a `sqlx` connection pool.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use watermap_core::{
    Admin, AdminId, Payment, PaymentId, PointId, User, UserId, WaterPoint, WaterPointDraft,
};

use crate::error::{Result, StoreError};
use crate::{schema, NewUser, PaymentOrder, PointFilter, Store, UserUpdate};

/// Maximum connections held by the pool.
const MAX_POOL_CONNECTIONS: u32 = 5;

/// SQLite-backed storage implementation.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given URL
    /// (e.g. `sqlite://watermap.db`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the database cannot be
    /// opened.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_POOL_CONNECTIONS)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Apply the schema DDL. Idempotent; intended to be invoked once by a
    /// binary before it starts serving or importing.
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    pub async fn migrate(&self) -> Result<()> {
        for ddl in schema::all_tables() {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        tracing::debug!("Schema migration applied");
        Ok(())
    }
}

/// Shared column list for water point selects.
const POINT_COLUMNS: &str = "id, name, description, type, address, city, country, rating, \
     website, reviews_count, region, timezone, phone, latitude, longitude";

fn point_from_row(row: &SqliteRow) -> Result<WaterPoint> {
    Ok(WaterPoint {
        id: PointId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        kind: row.try_get("type")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        rating: row.try_get("rating")?,
        website: row.try_get("website")?,
        reviews_count: row.try_get("reviews_count")?,
        region: row.try_get("region")?,
        timezone: row.try_get("timezone")?,
        phone: row.try_get("phone")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        bonus_balance: row.try_get("bonus_balance")?,
        total_volume: row.try_get("total_volume")?,
    })
}

fn payment_from_row(row: &SqliteRow) -> Result<Payment> {
    let method: String = row.try_get("payment_method")?;
    let timestamp: DateTime<Utc> = row.try_get("timestamp")?;
    Ok(Payment {
        id: PaymentId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        water_point_id: PointId::new(row.try_get("water_point_id")?),
        volume: row.try_get("volume")?,
        amount: row.try_get("amount")?,
        payment_method: method
            .parse()
            .map_err(|_| StoreError::Database(format!("unknown payment method label: {method}")))?,
        bonus_used: row.try_get("bonus_used")?,
        bonus_earned: row.try_get("bonus_earned")?,
        timestamp,
    })
}

fn admin_from_row(row: &SqliteRow) -> Result<Admin> {
    Ok(Admin {
        id: AdminId::new(row.try_get("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

/// Bind the fourteen draft fields in column order.
fn bind_draft<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    draft: &'q WaterPointDraft,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.kind)
        .bind(&draft.address)
        .bind(&draft.city)
        .bind(&draft.country)
        .bind(draft.rating)
        .bind(&draft.website)
        .bind(draft.reviews_count)
        .bind(&draft.region)
        .bind(&draft.timezone)
        .bind(&draft.phone)
        .bind(draft.latitude)
        .bind(draft.longitude)
}

const INSERT_POINT_SQL: &str = "\
INSERT INTO water_points (name, description, type, address, city, country, rating, website, \
 reviews_count, region, timezone, phone, latitude, longitude) \
 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";

#[async_trait]
impl Store for SqliteStore {
    // =========================================================================
    // Water Point Operations
    // =========================================================================

    async fn list_points(&self, offset: i64, limit: i64) -> Result<Vec<WaterPoint>> {
        let rows = sqlx::query(&format!(
            "SELECT {POINT_COLUMNS} FROM water_points ORDER BY id LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(point_from_row).collect()
    }

    async fn search_points(&self, filter: &PointFilter) -> Result<Vec<WaterPoint>> {
        // One static statement; absent filters are disabled by NULL binds.
        let sql = format!(
            "SELECT {POINT_COLUMNS} FROM water_points \
             WHERE (?1 IS NULL \
                    OR LOWER(name) LIKE '%' || LOWER(?1) || '%' \
                    OR LOWER(COALESCE(description, '')) LIKE '%' || LOWER(?1) || '%' \
                    OR LOWER(COALESCE(address, '')) LIKE '%' || LOWER(?1) || '%') \
               AND (?2 IS NULL OR type = ?2) \
               AND (?3 IS NULL OR city = ?3) \
               AND (?4 IS NULL OR region = ?4) \
               AND (?5 IS NULL OR rating >= ?5) \
             ORDER BY id LIMIT ?6 OFFSET ?7"
        );

        let rows = sqlx::query(&sql)
            .bind(&filter.query)
            .bind(&filter.kind)
            .bind(&filter.city)
            .bind(&filter.region)
            .bind(filter.min_rating)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(point_from_row).collect()
    }

    async fn get_point(&self, id: PointId) -> Result<Option<WaterPoint>> {
        let row = sqlx::query(&format!(
            "SELECT {POINT_COLUMNS} FROM water_points WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(point_from_row).transpose()
    }

    async fn create_point(&self, draft: &WaterPointDraft) -> Result<WaterPoint> {
        let result = bind_draft(sqlx::query(INSERT_POINT_SQL), draft)
            .execute(&self.pool)
            .await?;

        Ok(draft.clone().into_point(PointId::new(result.last_insert_rowid())))
    }

    async fn update_point(&self, id: PointId, draft: &WaterPointDraft) -> Result<WaterPoint> {
        let result = bind_draft(
            sqlx::query(
                "UPDATE water_points SET name = ?1, description = ?2, type = ?3, address = ?4, \
                 city = ?5, country = ?6, rating = ?7, website = ?8, reviews_count = ?9, \
                 region = ?10, timezone = ?11, phone = ?12, latitude = ?13, longitude = ?14 \
                 WHERE id = ?15",
            ),
            draft,
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "water point",
                id: id.as_i64(),
            });
        }

        Ok(draft.clone().into_point(id))
    }

    async fn delete_point(&self, id: PointId) -> Result<()> {
        let result = sqlx::query("DELETE FROM water_points WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "water point",
                id: id.as_i64(),
            });
        }

        Ok(())
    }

    async fn import_points(&self, drafts: &[WaterPointDraft]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        for draft in drafts {
            bind_draft(sqlx::query(INSERT_POINT_SQL), draft)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::debug!(count = drafts.len(), "Bulk-imported water points");

        Ok(drafts.len() as u64)
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    async fn create_user(&self, new: &NewUser) -> Result<User> {
        let result =
            sqlx::query("INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3)")
                .bind(&new.name)
                .bind(&new.email)
                .bind(&new.password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::conflict_on_unique(e, "email already registered"))?;

        Ok(User {
            id: UserId::new(result.last_insert_rowid()),
            name: new.name.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            bonus_balance: 0.0,
            total_volume: 0.0,
        })
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET name = ?2, email = ?3, \
             password_hash = COALESCE(?4, password_hash) WHERE id = ?1",
        )
        .bind(id.as_i64())
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::conflict_on_unique(e, "email already registered"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                id: id.as_i64(),
            });
        }

        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(id.as_i64())
            .fetch_one(&mut *tx)
            .await?;
        let user = user_from_row(&row)?;

        tx.commit().await?;
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                id: id.as_i64(),
            });
        }

        Ok(())
    }

    // =========================================================================
    // Payment Operations
    // =========================================================================

    async fn record_payment(&self, order: &PaymentOrder) -> Result<Payment> {
        let mut tx = self.pool.begin().await?;

        // Referential checks are application-level: payments carry no FK
        // constraints.
        let user_row = sqlx::query("SELECT bonus_balance FROM users WHERE id = ?1")
            .bind(order.user_id.as_i64())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(user_row) = user_row else {
            return Err(StoreError::NotFound {
                entity: "user",
                id: order.user_id.as_i64(),
            });
        };
        let balance: f64 = user_row.try_get("bonus_balance")?;

        let point_row = sqlx::query("SELECT id FROM water_points WHERE id = ?1")
            .bind(order.water_point_id.as_i64())
            .fetch_optional(&mut *tx)
            .await?;
        if point_row.is_none() {
            return Err(StoreError::NotFound {
                entity: "water point",
                id: order.water_point_id.as_i64(),
            });
        }

        // Guarded conditional debit: the WHERE clause re-checks sufficiency
        // against the live balance, so a concurrent payment cannot slip a
        // second debit past a stale read.
        let updated = sqlx::query(
            "UPDATE users SET bonus_balance = bonus_balance - ?2 + ?3, \
             total_volume = total_volume + ?4 \
             WHERE id = ?1 AND bonus_balance >= ?2",
        )
        .bind(order.user_id.as_i64())
        .bind(order.debit)
        .bind(order.bonus_earned)
        .bind(order.volume)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::InsufficientBalance {
                balance,
                required: order.debit,
            });
        }

        let timestamp = Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO payments (user_id, water_point_id, volume, amount, payment_method, \
             bonus_used, bonus_earned, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(order.user_id.as_i64())
        .bind(order.water_point_id.as_i64())
        .bind(order.volume)
        .bind(order.amount)
        .bind(order.method.as_str())
        .bind(order.debit)
        .bind(order.bonus_earned)
        .bind(timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Payment {
            id: PaymentId::new(inserted.last_insert_rowid()),
            user_id: order.user_id,
            water_point_id: order.water_point_id,
            volume: order.volume,
            amount: order.amount,
            payment_method: order.method,
            bonus_used: order.debit,
            bonus_earned: order.bonus_earned,
            timestamp,
        })
    }

    async fn list_payments_by_user(&self, user_id: UserId) -> Result<Vec<Payment>> {
        let rows = sqlx::query("SELECT * FROM payments WHERE user_id = ?1 ORDER BY id")
            .bind(user_id.as_i64())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(payment_from_row).collect()
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    async fn count_admins(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let row = sqlx::query("SELECT * FROM admins WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(admin_from_row).transpose()
    }

    async fn bootstrap_admin(&self, username: &str, password_hash: &str) -> Result<Option<Admin>> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            return Ok(None);
        }

        let result = sqlx::query("INSERT INTO admins (username, password_hash) VALUES (?1, ?2)")
            .bind(username)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(Admin {
            id: AdminId::new(result.last_insert_rowid()),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        }))
    }

    async fn rotate_admin(&self, username: &str, password_hash: &str) -> Result<Admin> {
        let mut tx = self.pool.begin().await?;

        // Collision check first; delete-then-insert keeps the single-admin
        // invariant even if the insert fails.
        let colliding = sqlx::query("SELECT id FROM admins WHERE username = ?1")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?;
        if colliding.is_some() {
            return Err(StoreError::Conflict("admin username already in use".into()));
        }

        sqlx::query("DELETE FROM admins").execute(&mut *tx).await?;

        let result = sqlx::query("INSERT INTO admins (username, password_hash) VALUES (?1, ?2)")
            .bind(username)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Admin {
            id: AdminId::new(result.last_insert_rowid()),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    async fn delete_all_admins(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM admins").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
