use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use uuid::Uuid;

use shared::domain::{RegistrationId, RegistrationRequest, SessionId, WebinarId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredWebinar {
    pub webinar_id: WebinarId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredSession {
    pub session_id: SessionId,
    pub webinar_id: WebinarId,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredRegistration {
    pub registration_id: RegistrationId,
    pub session_id: SessionId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // Every in-memory connection is its own database.
        let max_connections = if sqlite_path(database_url).is_none() { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_webinar(&self, title: &str) -> Result<WebinarId> {
        let webinar_id = WebinarId::generate();
        sqlx::query("INSERT INTO webinars (id, title) VALUES (?, ?)")
            .bind(webinar_id.as_str())
            .bind(title)
            .execute(&self.pool)
            .await
            .context("failed to insert webinar")?;
        Ok(webinar_id)
    }

    pub async fn load_webinar(&self, webinar_id: &WebinarId) -> Result<Option<StoredWebinar>> {
        let row = sqlx::query("SELECT id, title, created_at FROM webinars WHERE id = ?")
            .bind(webinar_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| -> Result<StoredWebinar> {
            Ok(StoredWebinar {
                webinar_id: WebinarId(r.try_get("id")?),
                title: r.try_get("title")?,
                created_at: r.try_get("created_at")?,
            })
        })
        .transpose()
    }

    pub async fn create_session(
        &self,
        webinar_id: &WebinarId,
        starts_at: DateTime<Utc>,
    ) -> Result<SessionId> {
        let session_id = SessionId::generate();
        sqlx::query("INSERT INTO webinar_sessions (id, webinar_id, starts_at) VALUES (?, ?, ?)")
            .bind(session_id.to_string())
            .bind(webinar_id.as_str())
            .bind(starts_at)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to insert session for webinar '{webinar_id}'"))?;
        Ok(session_id)
    }

    /// Looks a session up only within the given webinar.
    pub async fn session_for_webinar(
        &self,
        webinar_id: &WebinarId,
        session_id: SessionId,
    ) -> Result<Option<StoredSession>> {
        let row = sqlx::query(
            "SELECT id, webinar_id, starts_at FROM webinar_sessions WHERE id = ? AND webinar_id = ?",
        )
        .bind(session_id.to_string())
        .bind(webinar_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| session_from_row(&r)).transpose()
    }

    pub async fn list_sessions(&self, webinar_id: &WebinarId) -> Result<Vec<StoredSession>> {
        let rows = sqlx::query(
            "SELECT id, webinar_id, starts_at FROM webinar_sessions
             WHERE webinar_id = ? ORDER BY starts_at ASC",
        )
        .bind(webinar_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(session_from_row).collect()
    }

    /// Returns `None` when the email is already registered for the session.
    pub async fn insert_registration(
        &self,
        request: &RegistrationRequest,
    ) -> Result<Option<RegistrationId>> {
        let row = sqlx::query(
            "INSERT INTO registrations (session_id, first_name, last_name, email, phone)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(session_id, email) DO NOTHING
             RETURNING id",
        )
        .bind(request.session_id.to_string())
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.email.to_ascii_lowercase())
        .bind(request.phone.as_deref())
        .fetch_optional(&self.pool)
        .await
        .context("failed to insert registration")?;
        Ok(row.map(|r| RegistrationId(r.get::<i64, _>(0))))
    }

    pub async fn list_registrations(
        &self,
        webinar_id: &WebinarId,
    ) -> Result<Vec<StoredRegistration>> {
        let rows = sqlx::query(
            "SELECT r.id, r.session_id, r.first_name, r.last_name, r.email, r.phone, r.created_at
             FROM registrations r
             JOIN webinar_sessions s ON s.id = r.session_id
             WHERE s.webinar_id = ?
             ORDER BY r.id ASC",
        )
        .bind(webinar_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| -> Result<StoredRegistration> {
                Ok(StoredRegistration {
                    registration_id: RegistrationId(r.try_get("id")?),
                    session_id: parse_session_id(&r.try_get::<String, _>("session_id")?)?,
                    first_name: r.try_get("first_name")?,
                    last_name: r.try_get("last_name")?,
                    email: r.try_get("email")?,
                    phone: r.try_get("phone")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect()
    }
}

fn session_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<StoredSession> {
    Ok(StoredSession {
        session_id: parse_session_id(&row.try_get::<String, _>("id")?)?,
        webinar_id: WebinarId(row.try_get("webinar_id")?),
        starts_at: row.try_get("starts_at")?,
    })
}

fn parse_session_id(raw: &str) -> Result<SessionId> {
    let id = Uuid::parse_str(raw).with_context(|| format!("corrupt session id '{raw}'"))?;
    Ok(SessionId(id))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
