use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopViewedRow {
    pub title: String,
    pub views: i64,
    pub category: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryCountRow {
    pub category: String,
    pub count: i64,
}

/// One calendar day of the upload trend, `day` formatted YYYY-MM-DD
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub day: String,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentComponentRow {
    pub component_id: Uuid,
    pub title: String,
    pub category: String,
    pub owner_name: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only aggregates for the admin dashboard
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// (total components, visible components)
    pub async fn counts(pool: &PgPool) -> Result<(i64, i64)> {
        let row: (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_visible) FROM component",
        )
        .fetch_one(pool)
        .await
        .context("Failed to count components")?;
        Ok(row)
    }

    pub async fn top_viewed(pool: &PgPool, limit: i64) -> Result<Vec<TopViewedRow>> {
        let rows = sqlx::query_as::<_, TopViewedRow>(
            "SELECT title, views, category FROM component ORDER BY views DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to get most viewed components")?;
        Ok(rows)
    }

    /// Component count per category, largest first
    pub async fn category_distribution(pool: &PgPool) -> Result<Vec<CategoryCountRow>> {
        let rows = sqlx::query_as::<_, CategoryCountRow>(
            "SELECT category, COUNT(*) AS count FROM component \
             GROUP BY category ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await
        .context("Failed to get category distribution")?;
        Ok(rows)
    }

    /// Uploads per calendar day over the trailing week, ascending by day
    pub async fn upload_trend(pool: &PgPool) -> Result<Vec<TrendRow>> {
        let rows = sqlx::query_as::<_, TrendRow>(
            "SELECT to_char(created_at, 'YYYY-MM-DD') AS day, COUNT(*) AS count \
             FROM component WHERE created_at >= NOW() - INTERVAL '7 days' \
             GROUP BY 1 ORDER BY 1 ASC",
        )
        .fetch_all(pool)
        .await
        .context("Failed to get upload trend")?;
        Ok(rows)
    }

    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<RecentComponentRow>> {
        let rows = sqlx::query_as::<_, RecentComponentRow>(
            r#"SELECT c.component_id, c.title, c.category, u.name AS owner_name, c.created_at
               FROM component c JOIN "user" u ON u.user_id = c.owner_id
               ORDER BY c.created_at DESC LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to get recent components")?;
        Ok(rows)
    }
}
