use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::models::*;
use super::{listing_not_found, review_not_found, Store, StoreError};
use crate::config::DatabaseConfig;

const LISTING_COLUMNS: &str = r#"
    id, title, description, image_filename, image_url, price,
    location, country, owner, reviews, created_at, updated_at
"#;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS listings (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        image_filename TEXT,
        image_url TEXT,
        price TEXT,
        location TEXT,
        country TEXT,
        owner UUID NOT NULL,
        reviews UUID[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id UUID PRIMARY KEY,
        rating SMALLINT NOT NULL,
        comment TEXT NOT NULL,
        author UUID NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

/// Postgres-backed store. A listing keeps its review references in a
/// `uuid[]` column, in insertion order.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        info!("Connected to database (max_connections={})", config.max_connections);
        Ok(Self { pool })
    }

    /// Create tables that do not exist yet. There is no versioned migration scheme.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }

    async fn fetch_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let sql = format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS);
        let row: Option<ListingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Listing::from))
    }
}

fn image_columns(image: &Option<ListingImage>) -> (Option<&str>, Option<&str>) {
    match image {
        Some(image) => (Some(image.filename.as_str()), Some(image.url.as_str())),
        None => (None, None),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_listings(&self) -> Result<Vec<Listing>, StoreError> {
        let sql = format!("SELECT {} FROM listings ORDER BY created_at, id", LISTING_COLUMNS);
        let rows: Vec<ListingRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        self.fetch_listing(id).await
    }

    async fn insert_listing(&self, new: NewListing) -> Result<Listing, StoreError> {
        let (image_filename, image_url) = image_columns(&new.image);
        let sql = format!(
            r#"
            INSERT INTO listings (id, title, description, image_filename, image_url, price, location, country, owner)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );

        let row: ListingRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.title)
            .bind(&new.description)
            .bind(image_filename)
            .bind(image_url)
            .bind(&new.price)
            .bind(&new.location)
            .bind(&new.country)
            .bind(new.owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_listing(
        &self,
        id: Uuid,
        changes: ListingChanges,
    ) -> Result<Option<Listing>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so the merge of submitted and stored fields is not lost
        let sql = format!("SELECT {} FROM listings WHERE id = $1 FOR UPDATE", LISTING_COLUMNS);
        let row: Option<ListingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(mut listing) = row.map(Listing::from) else {
            tx.rollback().await?;
            return Ok(None);
        };
        changes.apply(&mut listing);

        let (image_filename, image_url) = image_columns(&listing.image);
        let sql = format!(
            r#"
            UPDATE listings
            SET title = $2, description = $3, image_filename = $4, image_url = $5,
                price = $6, location = $7, country = $8, updated_at = $9
            WHERE id = $1
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );

        let row: ListingRow = sqlx::query_as(&sql)
            .bind(id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(image_filename)
            .bind(image_url)
            .bind(&listing.price)
            .bind(&listing.location)
            .bind(&listing.country)
            .bind(listing.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    async fn delete_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("DELETE FROM listings WHERE id = $1 RETURNING {}", LISTING_COLUMNS);
        let row: Option<ListingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(listing) = row.map(Listing::from) else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM reviews WHERE id = ANY($1)")
            .bind(&listing.reviews)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(listing))
    }

    async fn clear_listings(&self) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM listings").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM reviews").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(deleted.rows_affected())
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        let review = sqlx::query_as::<_, Review>(
            "SELECT id, rating, comment, author, created_at FROM reviews WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn reviews_for(&self, listing: &Listing) -> Result<Vec<ReviewView>, StoreError> {
        if listing.reviews.is_empty() {
            return Ok(vec![]);
        }

        let query = r#"
            SELECT r.id, r.rating, r.comment, r.author, r.created_at, u.username AS author_name
            FROM unnest($1::uuid[]) WITH ORDINALITY AS ref(id, position)
            JOIN reviews r ON r.id = ref.id
            LEFT JOIN users u ON u.id = r.author
            ORDER BY ref.position
        "#;

        let reviews = sqlx::query_as::<_, ReviewView>(query)
            .bind(&listing.reviews)
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    async fn add_review(&self, listing_id: Uuid, new: NewReview) -> Result<Review, StoreError> {
        let mut tx = self.pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, rating, comment, author)
            VALUES ($1, $2, $3, $4)
            RETURNING id, rating, comment, author, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.rating)
        .bind(&new.comment)
        .bind(new.author)
        .fetch_one(&mut *tx)
        .await?;

        let updated = sqlx::query(
            "UPDATE listings SET reviews = array_append(reviews, $2), updated_at = now() WHERE id = $1",
        )
        .bind(listing_id)
        .bind(review.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(listing_not_found());
        }

        tx.commit().await?;
        Ok(review)
    }

    async fn remove_review(&self, listing_id: Uuid, review_id: Uuid) -> Result<Review, StoreError> {
        let mut tx = self.pool.begin().await?;

        let references: Option<Vec<Uuid>> =
            sqlx::query_scalar("SELECT reviews FROM listings WHERE id = $1 FOR UPDATE")
                .bind(listing_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(references) = references else {
            tx.rollback().await?;
            return Err(listing_not_found());
        };

        // A review attached to another listing is not reachable through this one
        if !references.contains(&review_id) {
            tx.rollback().await?;
            return Err(review_not_found());
        }

        sqlx::query(
            "UPDATE listings SET reviews = array_remove(reviews, $2), updated_at = now() WHERE id = $1",
        )
        .bind(listing_id)
        .bind(review_id)
        .execute(&mut *tx)
        .await?;

        let review = sqlx::query_as::<_, Review>(
            "DELETE FROM reviews WHERE id = $1 RETURNING id, rating, comment, author, created_at",
        )
        .bind(review_id)
        .fetch_optional(&mut *tx)
        .await?;

        match review {
            Some(review) => {
                tx.commit().await?;
                Ok(review)
            }
            None => {
                tx.rollback().await?;
                Err(review_not_found())
            }
        }
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Conflict(format!(
                    "A user with the given username is already registered: {}",
                    new.username
                )))
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Pings the pool to ensure connectivity
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
