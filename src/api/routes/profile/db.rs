//! Database queries for the profile API
use anyhow::{Error, Result};
use tokio_rusqlite::{Connection, params};

/// Idempotent profile sync keyed by the identity-provider user id.
pub async fn upsert_profile(
    db: &Connection,
    id: &str,
    email: Option<String>,
    full_name: Option<String>,
    avatar_url: Option<String>,
) -> Result<(), Error> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute(
            r#"
            INSERT INTO profile (id, email, full_name, avatar_url)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                email = excluded.email,
                full_name = excluded.full_name,
                avatar_url = excluded.avatar_url
            "#,
            params![id, email, full_name, avatar_url],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Look up a profile id by email. Emails are stored lowercased, so
/// callers lowercase and trim before querying.
pub async fn profile_id_by_email(db: &Connection, email: &str) -> Result<Option<String>, Error> {
    let email = email.to_string();
    let id = db
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT id FROM profile WHERE email = ?1")?;
            let mut rows = stmt.query_map([&email], |row| row.get::<_, String>(0))?;
            Ok(rows.next().transpose()?)
        })
        .await?;
    Ok(id)
}
