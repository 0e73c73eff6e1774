//! Competitor link repository.

use sqlx::PgPool;

use shop_insights_core::BrandId;

use super::RepositoryError;

/// Repository for directed brand → competitor links.
pub struct CompetitorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitorRepository<'a> {
    /// Create a new competitor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Link `competitor_id` as a competitor of `brand_id`.
    ///
    /// Returns `false` if the link already existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a brand is linked to itself.
    /// Returns `RepositoryError::NotFound` if either brand does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        brand_id: BrandId,
        competitor_id: BrandId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO competitor_links (brand_id, competitor_brand_id)
            VALUES ($1, $2)
            ON CONFLICT (brand_id, competitor_brand_id) DO NOTHING
            ",
        )
        .bind(brand_id)
        .bind(competitor_id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_check_violation() {
                    return RepositoryError::Conflict(
                        "a brand cannot be its own competitor".to_owned(),
                    );
                }
                if db_err.is_foreign_key_violation() {
                    return RepositoryError::NotFound;
                }
            }
            RepositoryError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a competitor link. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        brand_id: BrandId,
        competitor_id: BrandId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM competitor_links WHERE brand_id = $1 AND competitor_brand_id = $2",
        )
        .bind(brand_id)
        .bind(competitor_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// IDs of all competitors linked from a brand, oldest link first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn competitor_ids(&self, brand_id: BrandId) -> Result<Vec<BrandId>, RepositoryError> {
        let ids = sqlx::query_scalar(
            r"
            SELECT competitor_brand_id FROM competitor_links
            WHERE brand_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(brand_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }
}
