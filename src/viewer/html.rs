//! HTML pages of the viewer.

use super::artifacts::latest_artifact;
use crate::Result;
use crate::github::{PopularPath, Referrer};
use crate::ingest::{Measurand, PayloadKind};
use chrono::NaiveDate;
use core::fmt::Write;
use ohno::IntoAppError;
use std::fs;
use std::path::Path;
use strum::IntoEnumIterator;

pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

fn page(title: &str, body: &str) -> Result<String> {
    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html>")?;
    writeln!(html, "<head>")?;
    writeln!(html, "  <meta charset=\"UTF-8\">")?;
    writeln!(html, "  <title>{}</title>", html_escape(title))?;
    writeln!(html, "  <style>")?;
    writeln!(html, "    body {{ font-family: sans-serif; margin: 2em; }}")?;
    writeln!(html, "    table {{ border-collapse: collapse; margin-bottom: 2em; }}")?;
    writeln!(html, "    th, td {{ border: 1px solid #ccc; padding: 4px 8px; }}")?;
    writeln!(html, "    td.num {{ text-align: right; }}")?;
    writeln!(html, "    img {{ display: block; margin-bottom: 1em; }}")?;
    writeln!(html, "  </style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<h1>{}</h1>", html_escape(title))?;
    html.push_str(body);
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

/// Landing page linking the summary of every measurand
pub fn index_page() -> Result<String> {
    let mut body = String::new();
    writeln!(body, "<ul>")?;
    for measurand in Measurand::iter() {
        writeln!(
            body,
            "  <li><a href=\"/summary/{}\">{} summary</a></li>",
            measurand.code(),
            html_escape(measurand.description())
        )?;
    }
    writeln!(body, "</ul>")?;

    page("GitHub traffic", &body)
}

/// Title shared by a chart and the image that embeds it
#[must_use]
pub fn chart_title(measurand: Measurand, series: &str) -> String {
    format!("{} for {series}", measurand.description())
}

/// One chart per repository in `series`
pub fn summary_page<'a>(measurand: Measurand, series: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let mut body = String::new();
    for id in series {
        writeln!(
            body,
            "<img src=\"/plot/{}/{}\" alt=\"{}\">",
            measurand.code(),
            html_escape(id),
            html_escape(&chart_title(measurand, id))
        )?;
    }

    page(&format!("{} summary", measurand.description()), &body)
}

/// Tables of the latest referrer and popular path payloads of a repository.
///
/// Returns `None` when either kind of payload has never been archived (for `day`, if given).
pub fn repo_page(datastore: &Path, owner: &str, repo: &str, day: Option<NaiveDate>) -> Result<Option<String>> {
    let Some(referrers_path) = latest_artifact(datastore, owner, repo, PayloadKind::Referrer, day)? else {
        return Ok(None);
    };
    let Some(paths_path) = latest_artifact(datastore, owner, repo, PayloadKind::Path, day)? else {
        return Ok(None);
    };

    let referrers: Vec<Referrer> = read_payload(&referrers_path)?;
    let paths: Vec<PopularPath> = read_payload(&paths_path)?;

    let mut body = String::new();
    writeln!(body, "<h2>Referrers</h2>")?;
    writeln!(body, "<table>")?;
    writeln!(body, "  <tr><th>Referrer</th><th>Count</th><th>Uniques</th></tr>")?;
    for r in &referrers {
        writeln!(
            body,
            "  <tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            html_escape(&r.referrer),
            r.count,
            r.uniques
        )?;
    }
    writeln!(body, "</table>")?;

    writeln!(body, "<h2>Popular paths</h2>")?;
    writeln!(body, "<table>")?;
    writeln!(body, "  <tr><th>Title</th><th>Path</th><th>Count</th><th>Uniques</th></tr>")?;
    for p in &paths {
        writeln!(
            body,
            "  <tr><td>{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            html_escape(&p.title),
            html_escape(&p.path),
            p.count,
            p.uniques
        )?;
    }
    writeln!(body, "</table>")?;

    let title = match day {
        Some(day) => format!("{owner}/{repo} on {}", day.format("%Y-%m-%d")),
        None => format!("{owner}/{repo}"),
    };

    Ok(Some(page(&title, &body)?))
}

fn read_payload<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).into_app_err_with(|| format!("unable to read artifact '{}'", path.display()))?;
    serde_json::from_slice(&bytes).into_app_err_with(|| format!("unable to parse artifact '{}'", path.display()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_index_links_every_measurand() {
        let html = index_page().unwrap();
        for measurand in Measurand::iter() {
            assert!(html.contains(&format!("href=\"/summary/{}\"", measurand.code())));
        }
    }

    #[test]
    fn test_summary_embeds_charts() {
        let html = summary_page(Measurand::UniqueViews, ["a/x", "b/y"]).unwrap();
        assert!(html.contains("<img src=\"/plot/UV/a/x\" alt=\"Number of unique views for a/x\">"));
        assert!(html.contains("<img src=\"/plot/UV/b/y\""));
    }

    #[test]
    fn test_repo_page_tables() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("a/x/2024/6");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("20240601_0900_referrer.json"),
            r#"[{"referrer":"google.com","count":4,"uniques":3}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("20240601_0900_path.json"),
            r#"[{"path":"/a/x","title":"<x>","count":9,"uniques":2}]"#,
        )
        .unwrap();

        let html = repo_page(temp_dir.path(), "a", "x", None).unwrap().unwrap();
        assert!(html.contains("<td>google.com</td><td class=\"num\">4</td><td class=\"num\">3</td>"));
        assert!(html.contains("<td>&lt;x&gt;</td><td>/a/x</td>"));

        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(repo_page(temp_dir.path(), "a", "x", Some(day)).unwrap().unwrap().contains("a/x on 2024-06-01"));
    }

    #[test]
    fn test_repo_page_needs_both_payloads() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("a/x/2024/6");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("20240601_0900_referrer.json"), "[]").unwrap();

        assert!(repo_page(temp_dir.path(), "a", "x", None).unwrap().is_none());
    }

    #[test]
    fn test_repo_page_malformed_payload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("a/x/2024/6");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("20240601_0900_referrer.json"), "not json").unwrap();
        fs::write(dir.join("20240601_0900_path.json"), "[]").unwrap();

        let _ = repo_page(temp_dir.path(), "a", "x", None).unwrap_err();
    }
}
