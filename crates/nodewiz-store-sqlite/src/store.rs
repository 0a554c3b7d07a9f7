//! [`SqliteStore`] — the SQLite implementation of [`SiteStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, types::Value};

use nodewiz_core::{
  contact::{ContactSubmission, NewContactSubmission},
  store::{SiteStore, SubmissionQuery, TestimonialQuery},
  testimonial::{NewTestimonial, Testimonial},
};

use crate::{
  Error, Result,
  encode::{
    RawSubmission, RawTestimonial, SUBMISSION_COLUMNS, TESTIMONIAL_COLUMNS,
    encode_dt, like_pattern, now,
  },
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The site store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let found: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;

    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion(found));
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    if found < SCHEMA_VERSION {
      tracing::info!(from = found, to = SCHEMA_VERSION, "migrated site database");
    }
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Run a `SELECT COUNT(*)` over `table`.
  async fn count(&self, table: &'static str) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }
}

// ─── Query building ──────────────────────────────────────────────────────────

/// Accumulates `WHERE` clauses and their positional parameters.
#[derive(Default)]
struct Filter {
  clauses: Vec<String>,
  params:  Vec<Value>,
}

impl Filter {
  /// Push a clause whose `{}` placeholders are replaced by fresh `?N` params.
  fn push(&mut self, clause: &str, values: Vec<Value>) {
    let mut rendered = String::with_capacity(clause.len() + 8);
    let mut values = values.into_iter();
    for (i, part) in clause.split("{}").enumerate() {
      if i > 0
        && let Some(v) = values.next()
      {
        self.params.push(v);
        rendered.push_str(&format!("?{}", self.params.len()));
      }
      rendered.push_str(part);
    }
    self.clauses.push(rendered);
  }

  fn search(&mut self, term: Option<&str>, columns: &[&str]) {
    let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
      return;
    };
    let pattern = like_pattern(term);
    let ors: Vec<String> = columns
      .iter()
      .map(|c| format!("{c} LIKE {{}} ESCAPE '\\'"))
      .collect();
    let clause = format!("({})", ors.join(" OR "));
    let values = columns.iter().map(|_| Value::Text(pattern.clone())).collect();
    self.push(&clause, values);
  }

  fn sql(&self, select: &str, order: &str, limit: Option<usize>) -> String {
    let mut sql = select.to_owned();
    if !self.clauses.is_empty() {
      sql.push_str(" WHERE ");
      sql.push_str(&self.clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(order);
    if let Some(limit) = limit {
      sql.push_str(&format!(" LIMIT {limit}"));
    }
    sql
  }
}

// ─── SiteStore impl ──────────────────────────────────────────────────────────

impl SiteStore for SqliteStore {
  type Error = Error;

  // ── Contact submissions ───────────────────────────────────────────────────

  async fn create_submission(&self, input: NewContactSubmission) -> Result<ContactSubmission> {
    let submitted_at = now();
    let at_str = encode_dt(submitted_at);
    let NewContactSubmission { name, email, company, message } = input;
    let row = (name.clone(), email.clone(), company.clone(), message.clone());

    let id: i64 = self
      .conn
      .call(move |conn| {
        let (name, email, company, message) = row;
        conn.execute(
          "INSERT INTO contact_submissions (name, email, company, message, submitted_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![name, email, company, message, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ContactSubmission { id, name, email, company, message, submitted_at })
  }

  async fn get_submission(&self, id: i64) -> Result<Option<ContactSubmission>> {
    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUBMISSION_COLUMNS} FROM contact_submissions WHERE id = ?1"),
              rusqlite::params![id],
              RawSubmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn list_submissions(&self, query: &SubmissionQuery) -> Result<Vec<ContactSubmission>> {
    let mut filter = Filter::default();
    filter.search(query.search.as_deref(), &["name", "email", "company"]);
    if let Some(after) = query.submitted_after {
      filter.push("submitted_at >= {}", vec![Value::Text(encode_dt(after))]);
    }

    let sql = filter.sql(
      &format!("SELECT {SUBMISSION_COLUMNS} FROM contact_submissions"),
      "submitted_at DESC, id DESC",
      query.limit,
    );
    let params = filter.params;

    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn count_submissions(&self) -> Result<u64> { self.count("contact_submissions").await }

  // ── Testimonials ──────────────────────────────────────────────────────────

  async fn create_testimonial(&self, input: NewTestimonial) -> Result<Testimonial> {
    let created_at = now();
    let at_str = encode_dt(created_at);
    let row = input.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO testimonials (
             client_name, company, position, testimonial_text,
             rating, is_featured, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.client_name,
            row.company,
            row.position,
            row.testimonial_text,
            i64::from(row.rating),
            row.is_featured,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Testimonial {
      id,
      client_name: input.client_name,
      company: input.company,
      position: input.position,
      testimonial_text: input.testimonial_text,
      rating: input.rating,
      is_featured: input.is_featured,
      created_at,
    })
  }

  async fn get_testimonial(&self, id: i64) -> Result<Option<Testimonial>> {
    let raw: Option<RawTestimonial> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TESTIMONIAL_COLUMNS} FROM testimonials WHERE id = ?1"),
              rusqlite::params![id],
              RawTestimonial::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTestimonial::into_testimonial).transpose()
  }

  async fn update_testimonial(&self, id: i64, input: NewTestimonial) -> Result<Option<Testimonial>> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE testimonials
           SET client_name = ?2, company = ?3, position = ?4,
               testimonial_text = ?5, rating = ?6, is_featured = ?7
           WHERE id = ?1",
          rusqlite::params![
            id,
            input.client_name,
            input.company,
            input.position,
            input.testimonial_text,
            i64::from(input.rating),
            input.is_featured,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_testimonial(id).await
  }

  async fn set_featured(&self, id: i64, is_featured: bool) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE testimonials SET is_featured = ?2 WHERE id = ?1",
          rusqlite::params![id, is_featured],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn delete_testimonial(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM testimonials WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn list_testimonials(&self, query: &TestimonialQuery) -> Result<Vec<Testimonial>> {
    let mut filter = Filter::default();
    filter.search(query.search.as_deref(), &["client_name", "company"]);
    if let Some(rating) = query.rating {
      filter.push("rating = {}", vec![Value::Integer(i64::from(rating))]);
    }
    if let Some(featured) = query.featured {
      filter.push("is_featured = {}", vec![Value::Integer(i64::from(featured))]);
    }
    if let Some(after) = query.created_after {
      filter.push("created_at >= {}", vec![Value::Text(encode_dt(after))]);
    }

    let sql = filter.sql(
      &format!("SELECT {TESTIMONIAL_COLUMNS} FROM testimonials"),
      "created_at DESC, id DESC",
      query.limit,
    );
    let params = filter.params;

    let raws: Vec<RawTestimonial> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawTestimonial::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTestimonial::into_testimonial).collect()
  }

  async fn count_testimonials(&self) -> Result<u64> { self.count("testimonials").await }
}

#[cfg(test)]
mod filter_tests {
  use super::*;

  #[test]
  fn placeholders_are_numbered_in_order() {
    let mut f = Filter::default();
    f.search(Some("acme"), &["a", "b"]);
    f.push("x >= {}", vec![Value::Integer(3)]);
    let sql = f.sql("SELECT * FROM t", "id DESC", Some(6));
    assert_eq!(
      sql,
      "SELECT * FROM t WHERE (a LIKE ?1 ESCAPE '\\' OR b LIKE ?2 ESCAPE '\\') \
       AND x >= ?3 ORDER BY id DESC LIMIT 6"
    );
    assert_eq!(f.params.len(), 3);
  }

  #[test]
  fn blank_search_adds_nothing() {
    let mut f = Filter::default();
    f.search(Some("   "), &["a"]);
    f.search(None, &["a"]);
    assert_eq!(f.sql("SELECT 1", "id", None), "SELECT 1 ORDER BY id");
  }
}
