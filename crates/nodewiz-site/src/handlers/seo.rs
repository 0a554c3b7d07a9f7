//! `sitemap.xml` and `robots.txt`.

use axum::{
  extract::State,
  http::header,
  response::{IntoResponse, Response},
};
use nodewiz_core::store::SiteStore;
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{AppState, error::Error, mail::Mailer};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Public pages listed in the sitemap: path, change frequency, priority.
const PAGES: [(&str, &str, &str); 6] = [
  ("/", "weekly", "1.0"),
  ("/services/", "monthly", "0.8"),
  ("/use-cases/", "monthly", "0.8"),
  ("/testimonials/", "weekly", "0.7"),
  ("/about/", "monthly", "0.6"),
  ("/contact/", "yearly", "0.5"),
];

fn emit(w: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), Error> {
  w.write_event(event).map_err(|e| Error::Xml(e.to_string()))
}

fn text_elem(w: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), Error> {
  emit(w, Event::Start(BytesStart::new(tag)))?;
  emit(w, Event::Text(BytesText::new(text)))?;
  emit(w, Event::End(BytesEnd::new(tag)))
}

/// Render the sitemap for a site rooted at `site_url` (no trailing slash).
pub fn sitemap_xml(site_url: &str) -> Result<Vec<u8>, Error> {
  let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
  emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

  let mut urlset = BytesStart::new("urlset");
  urlset.push_attribute(("xmlns", SITEMAP_NS));
  emit(&mut w, Event::Start(urlset))?;

  for (path, changefreq, priority) in PAGES {
    emit(&mut w, Event::Start(BytesStart::new("url")))?;
    text_elem(&mut w, "loc", &format!("{site_url}{path}"))?;
    text_elem(&mut w, "changefreq", changefreq)?;
    text_elem(&mut w, "priority", priority)?;
    emit(&mut w, Event::End(BytesEnd::new("url")))?;
  }

  emit(&mut w, Event::End(BytesEnd::new("urlset")))?;
  Ok(w.into_inner())
}

pub fn robots_txt(site_url: &str) -> String {
  format!("User-agent: *\nAllow: /\nDisallow: /admin/\n\nSitemap: {site_url}/sitemap.xml\n")
}

pub async fn sitemap<S, M>(State(state): State<AppState<S, M>>) -> Result<Response, Error>
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  let body = sitemap_xml(state.config.site_url())?;
  Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], body).into_response())
}

pub async fn robots<S, M>(State(state): State<AppState<S, M>>) -> Response
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  (
    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
    robots_txt(state.config.site_url()),
  )
    .into_response()
}
