use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Feedback entry with the submitter's name resolved
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackRow {
    pub feedback_id: Uuid,
    pub user_name: String,
    pub message: String,
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
}

pub struct FeedbackRepo;

impl FeedbackRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        message: &str,
        rating: Option<i16>,
    ) -> Result<Uuid> {
        let feedback_id = Uuid::new_v4();
        sqlx::query("INSERT INTO feedback (feedback_id, user_id, message, rating) VALUES ($1, $2, $3, $4)")
            .bind(feedback_id)
            .bind(user_id)
            .bind(message)
            .bind(rating)
            .execute(pool)
            .await
            .context("Failed to create feedback")?;
        Ok(feedback_id)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<FeedbackRow>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            r#"SELECT f.feedback_id, u.name AS user_name, f.message, f.rating, f.created_at
               FROM feedback f JOIN "user" u ON u.user_id = f.user_id
               ORDER BY f.created_at DESC"#,
        )
        .fetch_all(pool)
        .await
        .context("Failed to list feedback")?;
        Ok(rows)
    }
}
