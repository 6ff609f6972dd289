//! PostgreSQL-backed `ProjectRepository` implementation.
//!
//! The `projects` row and its `project_authors` associations are written in
//! one transaction. Edits bump `revision` in SQL and, when the caller names
//! an expected revision, only apply if it still matches.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::Bool;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    ProjectPersistenceError, ProjectRepository, ProjectSearchQuery, ProjectSlice,
};
use crate::domain::{FileRef, Project, ProjectId, UserId};

use super::diesel_error_mapping::{
    map_diesel_error, map_pool_error, revision_from_db, revision_to_db,
};
use super::models::{NewProjectRow, ProjectAuthorRow, ProjectRow, ProjectUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{project_authors, projects};

/// Diesel-backed implementation of the [`ProjectRepository`] port.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ProjectPersistenceError {
    map_pool_error(error, ProjectPersistenceError::connection)
}

fn diesel_error(error: DieselError) -> ProjectPersistenceError {
    map_diesel_error(
        error,
        ProjectPersistenceError::query,
        ProjectPersistenceError::connection,
    )
}

/// Result of the conditional update inside `replace`.
enum ReplaceOutcome {
    Applied(i32),
    Missing,
    Stale(i32),
}

/// Escape `LIKE` metacharacters and wrap the needle for substring matching.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn filtered(needle: Option<&str>) -> projects::BoxedQuery<'static, Pg> {
    let query = projects::table.into_boxed();
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        Some(needle) => {
            let pattern = like_pattern(needle);
            query.filter(
                projects::title
                    .ilike(pattern.clone())
                    .or(projects::description.ilike(pattern.clone()))
                    .or(projects::authors_text.ilike(pattern)),
            )
        }
        None => query,
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn author_rows(id: &ProjectId, authors: &BTreeSet<UserId>) -> Vec<ProjectAuthorRow> {
    authors
        .iter()
        .map(|user| ProjectAuthorRow {
            project_id: *id.as_uuid(),
            user_id: *user.as_uuid(),
        })
        .collect()
}

fn row_to_project(
    row: ProjectRow,
    author_ids: BTreeSet<UserId>,
) -> Result<Project, ProjectPersistenceError> {
    let file_ref = row
        .file_ref
        .map(FileRef::new)
        .transpose()
        .map_err(|err| {
            ProjectPersistenceError::query(format!(
                "invalid stored file reference for project {}: {err}",
                row.id
            ))
        })?;
    Ok(Project {
        id: ProjectId::from(row.id),
        title: row.title,
        description: row.description,
        created_at: row.created_at,
        file_ref,
        authors_text: row.authors_text,
        author_ids,
        revision: revision_from_db(row.revision, ProjectPersistenceError::query)?,
    })
}

async fn load_authors(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> Result<BTreeMap<Uuid, BTreeSet<UserId>>, DieselError> {
    let rows: Vec<ProjectAuthorRow> = project_authors::table
        .filter(project_authors::project_id.eq_any(ids))
        .select(ProjectAuthorRow::as_select())
        .load(conn)
        .await?;
    let mut by_project: BTreeMap<Uuid, BTreeSet<UserId>> = BTreeMap::new();
    for row in rows {
        by_project
            .entry(row.project_id)
            .or_default()
            .insert(UserId::from(row.user_id));
    }
    Ok(by_project)
}

/// Attach author sets to loaded rows, preserving row order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<ProjectRow>,
) -> Result<Vec<Project>, ProjectPersistenceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut authors = load_authors(conn, &ids).await.map_err(diesel_error)?;
    rows.into_iter()
        .map(|row| {
            let author_ids = authors.remove(&row.id).unwrap_or_default();
            row_to_project(row, author_ids)
        })
        .collect()
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let revision = revision_to_db(project.revision, ProjectPersistenceError::query)?;
        let row = NewProjectRow {
            id: *project.id.as_uuid(),
            title: &project.title,
            description: &project.description,
            authors_text: &project.authors_text,
            file_ref: project.file_ref.as_ref().map(FileRef::as_str),
            revision,
            created_at: project.created_at,
        };
        let authors = author_rows(&project.id, &project.author_ids);
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(projects::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                if !authors.is_empty() {
                    diesel::insert_into(project_authors::table)
                        .values(&authors)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, DieselError>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error)
    }

    async fn replace(
        &self,
        project: &Project,
        expected_revision: Option<u32>,
    ) -> Result<u32, ProjectPersistenceError> {
        let expected = expected_revision
            .map(|rev| revision_to_db(rev, ProjectPersistenceError::query))
            .transpose()?;
        let id = *project.id.as_uuid();
        let changes = ProjectUpdate {
            title: &project.title,
            description: &project.description,
            authors_text: &project.authors_text,
            file_ref: project.file_ref.as_ref().map(FileRef::as_str),
        };
        let authors = author_rows(&project.id, &project.author_ids);
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    let revision_matches = projects::revision
                        .nullable()
                        .eq(expected)
                        .or(expected.is_none().into_sql::<Bool>());
                    let updated: Option<i32> = diesel::update(projects::table)
                        .filter(projects::id.eq(id))
                        .filter(revision_matches)
                        .set((&changes, projects::revision.eq(projects::revision + 1)))
                        .returning(projects::revision)
                        .get_result(conn)
                        .await
                        .optional()?;

                    let Some(revision) = updated else {
                        let stored: Option<i32> = projects::table
                            .find(id)
                            .select(projects::revision)
                            .first(conn)
                            .await
                            .optional()?;
                        return Ok(stored.map_or(ReplaceOutcome::Missing, ReplaceOutcome::Stale));
                    };

                    diesel::delete(project_authors::table.filter(project_authors::project_id.eq(id)))
                        .execute(conn)
                        .await?;
                    if !authors.is_empty() {
                        diesel::insert_into(project_authors::table)
                            .values(&authors)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, DieselError>(ReplaceOutcome::Applied(revision))
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        match outcome {
            ReplaceOutcome::Applied(revision) => {
                revision_from_db(revision, ProjectPersistenceError::query)
            }
            ReplaceOutcome::Missing => Err(ProjectPersistenceError::not_found(project.id)),
            ReplaceOutcome::Stale(actual) => Err(ProjectPersistenceError::revision_mismatch(
                expected_revision.unwrap_or_default(),
                revision_from_db(actual, ProjectPersistenceError::query)?,
            )),
        }
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(projects::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(diesel_error)
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<ProjectRow> = projects::table
            .find(id.as_uuid())
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        let rows: Vec<ProjectRow> = row.into_iter().collect();
        Ok(hydrate(&mut conn, rows).await?.into_iter().next())
    }

    async fn find_many(&self, ids: &[ProjectId]) -> Result<Vec<Project>, ProjectPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<ProjectRow> = projects::table
            .filter(projects::id.eq_any(&uuids))
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn search(
        &self,
        query: &ProjectSearchQuery,
    ) -> Result<ProjectSlice, ProjectPersistenceError> {
        let needle = query.needle.as_deref();
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let total: i64 = filtered(needle)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        let rows: Vec<ProjectRow> = filtered(needle)
            .select(ProjectRow::as_select())
            .order_by((projects::created_at.desc(), projects::id))
            .offset(to_i64(query.offset))
            .limit(to_i64(query.limit))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(ProjectSlice {
            items: hydrate(&mut conn, rows).await?,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn list_all(&self) -> Result<Vec<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<ProjectRow> = projects::table
            .select(ProjectRow::as_select())
            .order_by((projects::created_at.desc(), projects::id))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        hydrate(&mut conn, rows).await
    }

    async fn add_authors(
        &self,
        id: &ProjectId,
        authors: &BTreeSet<UserId>,
    ) -> Result<usize, ProjectPersistenceError> {
        if authors.is_empty() {
            return Ok(0);
        }
        let rows = author_rows(id, authors);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(project_authors::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(diesel_error)
    }
}
