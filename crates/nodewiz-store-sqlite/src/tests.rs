//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use nodewiz_core::{
  contact::NewContactSubmission,
  store::{SiteStore, SubmissionQuery, TestimonialQuery},
  testimonial::{NewTestimonial, Rating},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn submission(name: &str, email: &str, company: &str) -> NewContactSubmission {
  NewContactSubmission {
    name:    name.into(),
    email:   email.into(),
    company: company.into(),
    message: "Hello there".into(),
  }
}

// ─── Contact submissions ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_submission() {
  let s = store().await;

  let created = s
    .create_submission(submission("Ada", "ada@example.com", "Analytical"))
    .await
    .unwrap();
  assert!(created.id > 0);

  let fetched = s.get_submission(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_submission_missing_returns_none() {
  let s = store().await;
  assert!(s.get_submission(42).await.unwrap().is_none());
}

#[tokio::test]
async fn submissions_list_newest_first() {
  let s = store().await;
  let a = s.create_submission(submission("A", "a@example.com", "")).await.unwrap();
  let b = s.create_submission(submission("B", "b@example.com", "")).await.unwrap();
  let c = s.create_submission(submission("C", "c@example.com", "")).await.unwrap();

  let all = s.list_submissions(&SubmissionQuery::default()).await.unwrap();
  let ids: Vec<i64> = all.iter().map(|x| x.id).collect();
  assert_eq!(ids, vec![c.id, b.id, a.id]);
  assert_eq!(s.count_submissions().await.unwrap(), 3);
}

#[tokio::test]
async fn submissions_search_is_case_insensitive_across_fields() {
  let s = store().await;
  s.create_submission(submission("Ada", "ada@example.com", "Analytical Engines")).await.unwrap();
  s.create_submission(submission("Grace", "grace@navy.mil", "")).await.unwrap();
  s.create_submission(submission("Alan", "alan@bletchley.uk", "")).await.unwrap();

  let q = |term: &str| SubmissionQuery { search: Some(term.into()), ..Default::default() };

  let by_company = s.list_submissions(&q("analytical")).await.unwrap();
  assert_eq!(by_company.len(), 1);
  assert_eq!(by_company[0].name, "Ada");

  let by_email = s.list_submissions(&q("NAVY")).await.unwrap();
  assert_eq!(by_email.len(), 1);
  assert_eq!(by_email[0].name, "Grace");

  let by_name = s.list_submissions(&q("a")).await.unwrap();
  assert_eq!(by_name.len(), 3);
}

#[tokio::test]
async fn submissions_search_treats_wildcards_literally() {
  let s = store().await;
  s.create_submission(submission("Ada", "ada@example.com", "100% Pure")).await.unwrap();
  s.create_submission(submission("Bob", "bob@example.com", "Plain")).await.unwrap();

  let q = SubmissionQuery { search: Some("%".into()), ..Default::default() };
  let hits = s.list_submissions(&q).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "Ada");
}

#[tokio::test]
async fn submissions_date_filter() {
  let s = store().await;
  s.create_submission(submission("Ada", "ada@example.com", "")).await.unwrap();

  let past = SubmissionQuery {
    submitted_after: Some(Utc::now() - Duration::hours(1)),
    ..Default::default()
  };
  assert_eq!(s.list_submissions(&past).await.unwrap().len(), 1);

  let future = SubmissionQuery {
    submitted_after: Some(Utc::now() + Duration::hours(1)),
    ..Default::default()
  };
  assert!(s.list_submissions(&future).await.unwrap().is_empty());
}

// ─── Testimonials ────────────────────────────────────────────────────────────

fn testimonial(name: &str, featured: bool) -> NewTestimonial {
  NewTestimonial::new(name, format!("{name} Corp"), "Great work.").featured(featured)
}

#[tokio::test]
async fn create_get_update_testimonial() {
  let s = store().await;
  let created = s.create_testimonial(testimonial("Ada", false)).await.unwrap();
  assert_eq!(created.rating, Rating::default());

  let mut edit = testimonial("Ada", true).rating(Rating::new(3).unwrap());
  edit.position = "CTO".into();
  let updated = s.update_testimonial(created.id, edit).await.unwrap().unwrap();
  assert!(updated.is_featured);
  assert_eq!(updated.rating.get(), 3);
  assert_eq!(updated.position, "CTO");
  assert_eq!(updated.created_at, created.created_at);

  assert!(s.update_testimonial(999, testimonial("X", false)).await.unwrap().is_none());
}

#[tokio::test]
async fn featured_listing_is_capped_filtered_and_ordered() {
  let s = store().await;
  let mut featured_ids = Vec::new();
  for i in 0..8 {
    let t = s.create_testimonial(testimonial(&format!("F{i}"), true)).await.unwrap();
    featured_ids.push(t.id);
    s.create_testimonial(testimonial(&format!("N{i}"), false)).await.unwrap();
  }

  let shown = s.featured_testimonials(6).await.unwrap();
  assert_eq!(shown.len(), 6);
  assert!(shown.iter().all(|t| t.is_featured));

  let expected: Vec<i64> = featured_ids.iter().rev().take(6).copied().collect();
  let ids: Vec<i64> = shown.iter().map(|t| t.id).collect();
  assert_eq!(ids, expected);
  assert!(shown.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn set_featured_and_delete() {
  let s = store().await;
  let t = s.create_testimonial(testimonial("Ada", false)).await.unwrap();

  assert!(s.featured_testimonials(6).await.unwrap().is_empty());
  assert!(s.set_featured(t.id, true).await.unwrap());
  assert_eq!(s.featured_testimonials(6).await.unwrap().len(), 1);
  assert!(!s.set_featured(999, true).await.unwrap());

  assert!(s.delete_testimonial(t.id).await.unwrap());
  assert!(!s.delete_testimonial(t.id).await.unwrap());
  assert!(s.get_testimonial(t.id).await.unwrap().is_none());
  assert_eq!(s.count_testimonials().await.unwrap(), 0);
}

#[tokio::test]
async fn testimonial_filters() {
  let s = store().await;
  s.create_testimonial(testimonial("Ada", true).rating(Rating::new(5).unwrap())).await.unwrap();
  s.create_testimonial(testimonial("Bob", false).rating(Rating::new(2).unwrap())).await.unwrap();
  s.create_testimonial(testimonial("Cy", true).rating(Rating::new(2).unwrap())).await.unwrap();

  let low = TestimonialQuery { rating: Some(Rating::new(2).unwrap()), ..Default::default() };
  assert_eq!(s.list_testimonials(&low).await.unwrap().len(), 2);

  let low_featured = TestimonialQuery { featured: Some(true), ..low.clone() };
  let hits = s.list_testimonials(&low_featured).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].client_name, "Cy");

  let search = TestimonialQuery { search: Some("bob corp".into()), ..Default::default() };
  assert_eq!(s.list_testimonials(&search).await.unwrap().len(), 1);
}

#[tokio::test]
async fn database_rejects_out_of_range_rating() {
  let s = store().await;
  let result = s
    .conn_for_tests()
    .call(|conn| {
      Ok(conn.execute(
        "INSERT INTO testimonials (client_name, company, testimonial_text, rating, created_at)
         VALUES ('X', 'Y', 'Z', 6, '2026-01-01T00:00:00.000000Z')",
        [],
      )?)
    })
    .await;
  assert!(result.is_err());
}

#[tokio::test]
async fn reopening_file_store_keeps_rows() {
  let dir = std::env::temp_dir().join(format!("nodewiz-store-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("site.sqlite3");
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_submission(submission("Ada", "ada@example.com", "")).await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.count_submissions().await.unwrap(), 1);

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}
