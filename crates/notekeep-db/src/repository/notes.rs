//! Note operations
//!
//! Every single-note operation takes the owner's ID and filters on it, so a
//! note belonging to someone else is indistinguishable from a missing one.

use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewNote, Note, NoteChanges};
use crate::repository::Database;
use crate::utils::{escape_like, fold_case, format_timestamp, now};

/// Default page number
pub const DEFAULT_PAGE: i64 = 1;
/// Default page size
pub const DEFAULT_LIMIT: i64 = 20;

/// Query parameters for listing notes
#[derive(Debug, Clone)]
pub struct NoteQuery {
    /// Restrict to notes owned by this user
    pub owner: Option<String>,
    /// Case-insensitive exact tag match
    pub tag: Option<String>,
    /// Case-insensitive substring match on title or content
    pub search: Option<String>,
    /// 1-based page number
    pub page: i64,
    /// Page size
    pub limit: i64,
}

impl Default for NoteQuery {
    fn default() -> Self {
        Self {
            owner: None,
            tag: None,
            search: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl NoteQuery {
    /// Validates and normalizes the query parameters
    ///
    /// Page and limit are floored at 1; limit is capped at `max_limit` when
    /// one is configured. Empty filter strings are treated as absent.
    pub fn validated(mut self, max_limit: Option<i64>) -> Self {
        if self.page < 1 {
            self.page = 1;
        }
        if self.limit < 1 {
            self.limit = 1;
        }
        if let Some(max_limit) = max_limit {
            self.limit = self.limit.min(max_limit.max(1));
        }
        self.tag = self.tag.filter(|t| !t.is_empty());
        self.search = self.search.filter(|s| !s.is_empty());
        self
    }

    /// Number of rows to skip for the current page
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit.max(1))
    }
}

/// One page of notes plus the total match count
#[derive(Debug, Clone, Serialize)]
pub struct NotePage {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub notes: Vec<Note>,
}

/// JSON array of the case-folded tags, matched by the tag filter
fn folded_tags_json(tags: &[String]) -> Result<String, DbError> {
    let folded: Vec<String> = tags.iter().map(|t| fold_case(t)).collect();
    Ok(serde_json::to_string(&folded)?)
}

impl Database {
    // ==================== Note Operations ====================

    /// Insert a new note
    pub async fn insert_note(&self, note: NewNote) -> Result<Note, DbError> {
        let now = now();
        let id = Uuid::new_v4().to_string();
        let tags_json = serde_json::to_string(&note.tags)?;
        let tags_folded = folded_tags_json(&note.tags)?;

        sqlx::query(
            r#"
            INSERT INTO notes (
                id, owner_id, title, content, tags,
                title_folded, content_folded, tags_folded,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&note.owner)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&tags_json)
        .bind(fold_case(&note.title))
        .bind(fold_case(&note.content))
        .bind(&tags_folded)
        .bind(format_timestamp(&now))
        .bind(format_timestamp(&now))
        .execute(&self.pool)
        .await?;

        Ok(Note {
            id,
            owner: note.owner,
            title: note.title,
            content: note.content,
            tags: note.tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a note by ID, only if it belongs to `owner`
    pub async fn get_note(&self, id: &str, owner: &str) -> Result<Option<Note>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, owner_id, title, content, tags, created_at, updated_at
            FROM notes
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Note::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List notes with filtering and pagination, newest first
    ///
    /// Note: query parameters should be normalized via `NoteQuery::validated()`
    /// before calling this method.
    pub async fn list_notes(&self, query: &NoteQuery) -> Result<NotePage, DbError> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(owner) = &query.owner {
            conditions.push("owner_id = ?");
            params.push(owner.clone());
        }
        if let Some(tag) = &query.tag {
            conditions.push(
                "EXISTS (SELECT 1 FROM json_each(notes.tags_folded) WHERE json_each.value = ?)",
            );
            params.push(fold_case(tag));
        }
        if let Some(search) = &query.search {
            conditions.push(
                r"(title_folded LIKE ? ESCAPE '\' OR content_folded LIKE ? ESCAPE '\')",
            );
            let pattern = format!("%{}%", escape_like(&fold_case(search)));
            params.push(pattern.clone());
            params.push(pattern);
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        // Get total count
        let count_sql = format!("SELECT COUNT(*) as count FROM notes {}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let count_row = count_query.fetch_one(&self.pool).await?;
        let total: i64 = count_row.get("count");

        // rowid breaks ties between notes created in the same microsecond
        let sql = format!(
            r#"
            SELECT id, owner_id, title, content, tags, created_at, updated_at
            FROM notes
            {}
            ORDER BY created_at DESC, rowid DESC
            LIMIT ? OFFSET ?
            "#,
            where_clause
        );

        let limit = query.limit.max(1);
        let mut notes_query = sqlx::query(&sql);
        for param in &params {
            notes_query = notes_query.bind(param);
        }
        notes_query = notes_query.bind(limit).bind(query.offset());

        let rows = notes_query.fetch_all(&self.pool).await?;
        let notes: Result<Vec<Note>, _> = rows
            .iter()
            .map(|row| Note::try_from(row).map_err(DbError::from))
            .collect();

        Ok(NotePage {
            total,
            page: query.page.max(1),
            limit,
            notes: notes?,
        })
    }

    /// Apply a partial update to a note owned by `owner`
    ///
    /// Returns `None` if the note does not exist or belongs to someone else.
    pub async fn update_note(
        &self,
        id: &str,
        owner: &str,
        changes: NoteChanges,
    ) -> Result<Option<Note>, DbError> {
        let Some(mut note) = self.get_note(id, owner).await? else {
            return Ok(None);
        };

        // Nothing to write, so updated_at stays as it was
        if changes.is_empty() {
            return Ok(Some(note));
        }

        changes.apply(&mut note);
        note.updated_at = now();
        let tags_json = serde_json::to_string(&note.tags)?;
        let tags_folded = folded_tags_json(&note.tags)?;

        let result = sqlx::query(
            r#"
            UPDATE notes
            SET title = ?, content = ?, tags = ?,
                title_folded = ?, content_folded = ?, tags_folded = ?,
                updated_at = ?
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(&note.title)
        .bind(&note.content)
        .bind(&tags_json)
        .bind(fold_case(&note.title))
        .bind(fold_case(&note.content))
        .bind(&tags_folded)
        .bind(format_timestamp(&note.updated_at))
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        // Deleted between the read and the write
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(note))
    }

    /// Delete a note owned by `owner`
    pub async fn delete_note(&self, id: &str, owner: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
