use anyhow::{bail, Context, Result};
use atelier_common::models::component::ComponentSort;
use atelier_common::slug::{slug_candidate, slugify};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Bounded retry count for the slug unique-suffix loop. Collisions past
/// this depth mean something is wrong with the input, not the data.
const MAX_SLUG_ATTEMPTS: u32 = 50;

const COMPONENT_COLUMNS: &str = "c.component_id, c.title, c.slug, c.description, c.code, \
     c.category, c.is_public, c.is_visible, c.owner_id, u.name AS owner_name, \
     c.views, c.copies, c.preview_image, c.preview_theme, c.use_house_theme, \
     c.props_schema, c.tags, c.created_at, c.updated_at, \
     (SELECT COUNT(*) FROM component_like cl WHERE cl.component_id = c.component_id) AS like_count, \
     (SELECT COUNT(*) FROM component_save cs WHERE cs.component_id = c.component_id) AS save_count";

const COMPONENT_FROM: &str = r#"FROM component c JOIN "user" u ON u.user_id = c.owner_id"#;

/// Component row with the owner name and like/save cardinalities joined in
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ComponentRow {
    pub component_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub code: String,
    pub category: String,
    pub is_public: bool,
    pub is_visible: bool,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub views: i64,
    pub copies: i64,
    pub preview_image: Option<String>,
    pub preview_theme: String,
    pub use_house_theme: bool,
    pub props_schema: JsonValue,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub like_count: i64,
    pub save_count: i64,
}

#[derive(Debug)]
pub struct NewComponent<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub code: &'a str,
    pub category: &'a str,
    pub is_public: bool,
    pub owner_id: Uuid,
    pub tags: &'a [String],
    pub preview_image: Option<&'a str>,
    pub preview_theme: &'a str,
    pub use_house_theme: bool,
    pub props_schema: &'a JsonValue,
}

/// Fully merged replacement values for an update; the caller resolves
/// which fields the request actually supplied.
#[derive(Debug)]
pub struct ComponentUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub code: &'a str,
    pub category: &'a str,
    pub is_public: bool,
    pub is_visible: bool,
    pub tags: &'a [String],
    pub preview_image: Option<&'a str>,
    pub preview_theme: &'a str,
    pub use_house_theme: bool,
    pub props_schema: &'a JsonValue,
    /// Set when the title changed; the slug is rebuilt with the same
    /// bounded unique-suffix loop used at creation.
    pub regenerate_slug: bool,
}

#[derive(Debug)]
pub struct AdminListParams<'a> {
    pub search: Option<&'a str>,
    pub category: Option<&'a str>,
    pub sort_by: &'a str,
    pub descending: bool,
    pub limit: i64,
    pub offset: i64,
}

fn is_slug_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some("component_slug_key"),
        _ => false,
    }
}

/// Escape LIKE metacharacters in user-supplied search text and wrap it
/// for substring matching.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Whitelist of admin sort fields; anything else falls back to creation time.
fn admin_sort_column(sort_by: &str) -> &'static str {
    match sort_by {
        "created_at" => "c.created_at",
        "updated_at" => "c.updated_at",
        "title" => "c.title",
        "views" => "c.views",
        "copies" => "c.copies",
        "category" => "c.category",
        _ => "c.created_at",
    }
}

pub struct ComponentRepo;

impl ComponentRepo {
    /// Insert a new component. Slug uniqueness is enforced by the
    /// database index: insert, catch the unique violation, retry with an
    /// incrementing numeric suffix, bounded by `MAX_SLUG_ATTEMPTS`.
    pub async fn create(pool: &PgPool, new: &NewComponent<'_>) -> Result<ComponentRow> {
        let component_id = Uuid::new_v4();
        let base = match slugify(new.title) {
            s if s.is_empty() => "component".to_string(),
            s => s,
        };

        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = slug_candidate(&base, attempt);
            let res = sqlx::query(
                r#"
                INSERT INTO component
                    (component_id, title, slug, description, code, category, is_public,
                     owner_id, tags, preview_image, preview_theme, use_house_theme, props_schema)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(component_id)
            .bind(new.title)
            .bind(&slug)
            .bind(new.description)
            .bind(new.code)
            .bind(new.category)
            .bind(new.is_public)
            .bind(new.owner_id)
            .bind(new.tags)
            .bind(new.preview_image)
            .bind(new.preview_theme)
            .bind(new.use_house_theme)
            .bind(new.props_schema)
            .execute(pool)
            .await;

            match res {
                Ok(_) => {
                    return Self::get(pool, component_id)
                        .await?
                        .context("Component missing immediately after insert");
                }
                Err(e) if is_slug_conflict(&e) => continue,
                Err(e) => return Err(e).context("Failed to create component"),
            }
        }

        bail!(
            "No unique slug for '{}' after {} attempts",
            base,
            MAX_SLUG_ATTEMPTS
        )
    }

    pub async fn get(pool: &PgPool, component_id: Uuid) -> Result<Option<ComponentRow>> {
        let row = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {} {} WHERE c.component_id = $1",
            COMPONENT_COLUMNS, COMPONENT_FROM
        ))
        .bind(component_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get component")?;
        Ok(row)
    }

    pub async fn exists(pool: &PgPool, component_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM component WHERE component_id = $1)")
                .bind(component_id)
                .fetch_one(pool)
                .await
                .context("Failed to check component existence")?;
        Ok(exists)
    }

    /// Public listing: public AND visible rows only, optional category
    /// and case-insensitive substring search over title/description.
    pub async fn list_public(
        pool: &PgPool,
        category: Option<&str>,
        search: Option<&str>,
        sort: ComponentSort,
    ) -> Result<Vec<ComponentRow>> {
        let order = match sort {
            ComponentSort::Recent => "c.created_at DESC",
            ComponentSort::Popular => "c.views DESC",
            ComponentSort::Liked => "like_count DESC",
        };
        let rows = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {} {} \
             WHERE c.is_public AND c.is_visible \
               AND ($1::text IS NULL OR c.category = $1) \
               AND ($2::text IS NULL OR c.title ILIKE $2 OR c.description ILIKE $2) \
             ORDER BY {}",
            COMPONENT_COLUMNS, COMPONENT_FROM, order
        ))
        .bind(category)
        .bind(search.map(like_pattern))
        .fetch_all(pool)
        .await
        .context("Failed to list public components")?;
        Ok(rows)
    }

    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<ComponentRow>> {
        let rows = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {} {} WHERE c.owner_id = $1 ORDER BY c.created_at DESC",
            COMPONENT_COLUMNS, COMPONENT_FROM
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .context("Failed to list components by owner")?;
        Ok(rows)
    }

    /// Components a user has liked, most recently liked first
    pub async fn list_liked_by(pool: &PgPool, user_id: Uuid) -> Result<Vec<ComponentRow>> {
        let rows = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {} {} JOIN component_like l ON l.component_id = c.component_id \
             WHERE l.user_id = $1 ORDER BY l.created_at DESC",
            COMPONENT_COLUMNS, COMPONENT_FROM
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list liked components")?;
        Ok(rows)
    }

    /// Components a user has saved, most recently saved first
    pub async fn list_saved_by(pool: &PgPool, user_id: Uuid) -> Result<Vec<ComponentRow>> {
        let rows = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {} {} JOIN component_save s ON s.component_id = c.component_id \
             WHERE s.user_id = $1 ORDER BY s.created_at DESC",
            COMPONENT_COLUMNS, COMPONENT_FROM
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to list saved components")?;
        Ok(rows)
    }

    /// Replace the content fields of a component. Returns the updated
    /// row, or `None` when the id does not exist.
    pub async fn update(
        pool: &PgPool,
        component_id: Uuid,
        update: &ComponentUpdate<'_>,
    ) -> Result<Option<ComponentRow>> {
        if !Self::exists(pool, component_id).await? {
            return Ok(None);
        }

        if update.regenerate_slug {
            let base = match slugify(update.title) {
                s if s.is_empty() => "component".to_string(),
                s => s,
            };
            for attempt in 0..MAX_SLUG_ATTEMPTS {
                let slug = slug_candidate(&base, attempt);
                let res = Self::apply_update(pool, component_id, update, Some(&slug)).await;
                match res {
                    Ok(()) => return Self::get(pool, component_id).await,
                    Err(e) => match e.downcast_ref::<sqlx::Error>() {
                        Some(db_err) if is_slug_conflict(db_err) => continue,
                        _ => return Err(e),
                    },
                }
            }
            bail!(
                "No unique slug for '{}' after {} attempts",
                base,
                MAX_SLUG_ATTEMPTS
            )
        } else {
            Self::apply_update(pool, component_id, update, None).await?;
            Self::get(pool, component_id).await
        }
    }

    async fn apply_update(
        pool: &PgPool,
        component_id: Uuid,
        update: &ComponentUpdate<'_>,
        slug: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE component SET
                title = $2, description = $3, code = $4, category = $5, is_public = $6,
                is_visible = $7, tags = $8, preview_image = $9, preview_theme = $10,
                use_house_theme = $11, props_schema = $12, slug = COALESCE($13, slug),
                updated_at = NOW()
            WHERE component_id = $1
            "#,
        )
        .bind(component_id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.code)
        .bind(update.category)
        .bind(update.is_public)
        .bind(update.is_visible)
        .bind(update.tags)
        .bind(update.preview_image)
        .bind(update.preview_theme)
        .bind(update.use_house_theme)
        .bind(update.props_schema)
        .bind(slug)
        .execute(pool)
        .await
        .context("Failed to update component")?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, component_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM component WHERE component_id = $1")
            .bind(component_id)
            .execute(pool)
            .await
            .context("Failed to delete component")?;
        Ok(result.rows_affected() > 0)
    }

    /// Single-item reads are view-incrementing by contract.
    pub async fn increment_views(pool: &PgPool, component_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE component SET views = views + 1 WHERE component_id = $1")
            .bind(component_id)
            .execute(pool)
            .await
            .context("Failed to increment views")?;
        Ok(())
    }

    /// Advisory copy counter; returns the new value, or `None` for an
    /// unknown id.
    pub async fn increment_copies(pool: &PgPool, component_id: Uuid) -> Result<Option<i64>> {
        let copies: Option<i64> = sqlx::query_scalar(
            "UPDATE component SET copies = copies + 1 WHERE component_id = $1 RETURNING copies",
        )
        .bind(component_id)
        .fetch_optional(pool)
        .await
        .context("Failed to increment copies")?;
        Ok(copies)
    }

    /// Toggle like membership for (component, user). A single insert or
    /// delete per direction -- no dual write to race. Returns the new
    /// membership state and cardinality.
    pub async fn toggle_like(
        pool: &PgPool,
        component_id: Uuid,
        user_id: Uuid,
    ) -> Result<(bool, i64)> {
        let inserted = sqlx::query(
            "INSERT INTO component_like (component_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(component_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to insert like")?
        .rows_affected()
            == 1;

        if !inserted {
            sqlx::query("DELETE FROM component_like WHERE component_id = $1 AND user_id = $2")
                .bind(component_id)
                .bind(user_id)
                .execute(pool)
                .await
                .context("Failed to delete like")?;
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM component_like WHERE component_id = $1")
                .bind(component_id)
                .fetch_one(pool)
                .await
                .context("Failed to count likes")?;
        Ok((inserted, count))
    }

    /// Identical structure to `toggle_like`, independent membership set.
    pub async fn toggle_save(
        pool: &PgPool,
        component_id: Uuid,
        user_id: Uuid,
    ) -> Result<(bool, i64)> {
        let inserted = sqlx::query(
            "INSERT INTO component_save (component_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(component_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to insert save")?
        .rows_affected()
            == 1;

        if !inserted {
            sqlx::query("DELETE FROM component_save WHERE component_id = $1 AND user_id = $2")
                .bind(component_id)
                .bind(user_id)
                .execute(pool)
                .await
                .context("Failed to delete save")?;
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM component_save WHERE component_id = $1")
                .bind(component_id)
                .fetch_one(pool)
                .await
                .context("Failed to count saves")?;
        Ok((inserted, count))
    }

    /// (is_liked, is_saved) for a caller on one component
    pub async fn membership(
        pool: &PgPool,
        component_id: Uuid,
        user_id: Uuid,
    ) -> Result<(bool, bool)> {
        let row: (bool, bool) = sqlx::query_as(
            "SELECT \
             EXISTS (SELECT 1 FROM component_like WHERE component_id = $1 AND user_id = $2), \
             EXISTS (SELECT 1 FROM component_save WHERE component_id = $1 AND user_id = $2)",
        )
        .bind(component_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .context("Failed to check like/save membership")?;
        Ok(row)
    }

    /// Moderation listing: all rows (private and hidden included),
    /// paginated, searchable, sortable by a whitelisted column. Returns
    /// the page and the total row count for the filter.
    pub async fn admin_list(
        pool: &PgPool,
        params: &AdminListParams<'_>,
    ) -> Result<(Vec<ComponentRow>, i64)> {
        let filter = "($1::text IS NULL OR c.category = $1) \
             AND ($2::text IS NULL OR c.title ILIKE $2 OR c.description ILIKE $2)";
        let direction = if params.descending { "DESC" } else { "ASC" };
        let pattern = params.search.map(like_pattern);

        let rows = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {} {} WHERE {} ORDER BY {} {} LIMIT $3 OFFSET $4",
            COMPONENT_COLUMNS,
            COMPONENT_FROM,
            filter,
            admin_sort_column(params.sort_by),
            direction
        ))
        .bind(params.category)
        .bind(pattern.as_deref())
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(pool)
        .await
        .context("Failed to list components for moderation")?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM component c WHERE {}",
            filter
        ))
        .bind(params.category)
        .bind(pattern.as_deref())
        .fetch_one(pool)
        .await
        .context("Failed to count components for moderation")?;

        Ok((rows, total))
    }

    /// Flip the admin visibility axis. Returns the new state, or `None`
    /// for an unknown id.
    pub async fn toggle_visibility(pool: &PgPool, component_id: Uuid) -> Result<Option<bool>> {
        let visible: Option<bool> = sqlx::query_scalar(
            "UPDATE component SET is_visible = NOT is_visible, updated_at = NOW() \
             WHERE component_id = $1 RETURNING is_visible",
        )
        .bind(component_id)
        .fetch_optional(pool)
        .await
        .context("Failed to toggle visibility")?;
        Ok(visible)
    }
}
