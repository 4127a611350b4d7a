//! Read-only web viewer over a datastore.
//!
//! Routes:
//!
//! - `/`: links to the summary page of every measurand
//! - `/plot/{measurand}/{owner}/{repo}`: SVG chart of one stored series
//! - `/summary/{measurand}`: the charts of every repository with data for a measurand
//! - `/repo/{owner}/{repo}`: tables of the latest referrer and popular path payloads
//! - `/repo/{owner}/{repo}/{year}/{month}/{day}`: the same for the latest payloads of one day
//!
//! The store catalog is read again on each request, so a collection that finishes while the
//! viewer runs shows up without a restart.

mod artifacts;
mod chart;
mod html;

use crate::Result;
use crate::ingest::{Measurand, SOURCE_CODE, store_location};
use crate::store::{InstanceKey, Store};
use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use chrono::NaiveDate;
use core::net::SocketAddr;
use ohno::IntoAppError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use artifacts::latest_artifact;
pub use chart::render_svg;

const LOG_TARGET: &str = "    viewer";

#[derive(Debug, Clone)]
struct ViewerState {
    datastore: Arc<Path>,
}

/// Routes of the viewer over `datastore`
pub fn router(datastore: impl Into<PathBuf>) -> Router {
    let state = ViewerState {
        datastore: Arc::from(datastore.into()),
    };

    Router::new()
        .route("/", get(index))
        .route("/plot/{measurand}/{owner}/{repo}", get(plot))
        .route("/summary/{measurand}", get(summary))
        .route("/repo/{owner}/{repo}", get(repo_latest))
        .route("/repo/{owner}/{repo}/{year}/{month}/{day}", get(repo_day))
        .with_state(state)
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr).await.into_app_err_with(|| format!("unable to listen on {addr}"))
}

/// Serve the viewer over `datastore` until the process is stopped
pub async fn serve(listener: TcpListener, datastore: impl Into<PathBuf>) -> Result<()> {
    let datastore = datastore.into();
    if let Ok(addr) = listener.local_addr() {
        log::info!(target: LOG_TARGET, "Serving '{}' on http://{addr}", datastore.display());
    }

    axum::serve(listener, router(datastore)).await.into_app_err("viewer server failed")
}

fn not_found(what: impl Into<String>) -> Response {
    (StatusCode::NOT_FOUND, what.into()).into_response()
}

fn internal_error(e: &ohno::AppError) -> Response {
    log::error!(target: LOG_TARGET, "{e:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")).into_response()
}

fn html_response(result: Result<String>) -> Response {
    match result {
        Ok(body) => Html(body).into_response(),
        Err(e) => internal_error(&e),
    }
}

fn open_store(datastore: &Path) -> Result<Option<Store>> {
    let location = store_location(datastore);
    if !Store::exists(&location) {
        return Ok(None);
    }

    Store::open_read_only(location).map(Some)
}

/// Values of one repository's series, or `None` when it has none
fn series_values(store: &Store, measurand: Measurand, series: &str) -> Result<Option<Vec<(NaiveDate, f64)>>> {
    let key = InstanceKey::daily(series, SOURCE_CODE, measurand.code());
    if !store.has_instance(&key) {
        return Ok(None);
    }

    let values = store.read(&key)?;
    Ok(if values.is_empty() { None } else { Some(values) })
}

async fn index() -> Response {
    html_response(html::index_page())
}

/// Run filesystem work on the blocking pool so reads of the store don't stall the server
async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.into_app_err("viewer task panicked")?
}

async fn plot(State(state): State<ViewerState>, UrlPath((code, owner, repo)): UrlPath<(String, String, String)>) -> Response {
    let Some(measurand) = Measurand::from_code(&code) else {
        return not_found(format!("unknown measurand '{code}'"));
    };

    let series = format!("{owner}/{repo}");
    let lookup = {
        let series = series.clone();
        blocking(move || match open_store(&state.datastore)? {
            Some(store) => series_values(&store, measurand, &series),
            None => Ok(None),
        })
    };

    let values = match lookup.await {
        Ok(Some(values)) => values,
        Ok(None) => return not_found(format!("no {} data for {series}", measurand.code())),
        Err(e) => return internal_error(&e),
    };

    match render_svg(&html::chart_title(measurand, &series), &values) {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => internal_error(&e),
    }
}

async fn summary(State(state): State<ViewerState>, UrlPath(code): UrlPath<String>) -> Response {
    let Some(measurand) = Measurand::from_code(&code) else {
        return not_found(format!("unknown measurand '{code}'"));
    };

    html_response(blocking(move || summary_for(&state.datastore, measurand)).await)
}

fn summary_for(datastore: &Path, measurand: Measurand) -> Result<String> {
    let mut with_data = Vec::new();
    if let Some(store) = open_store(datastore)? {
        for id in store.series_ids() {
            if series_values(&store, measurand, id)?.is_some() {
                with_data.push(id.to_string());
            }
        }
    }

    html::summary_page(measurand, with_data.iter().map(String::as_str))
}

async fn repo_latest(State(state): State<ViewerState>, UrlPath((owner, repo)): UrlPath<(String, String)>) -> Response {
    repo_response(state.datastore, owner, repo, None).await
}

async fn repo_day(
    State(state): State<ViewerState>,
    UrlPath((owner, repo, year, month, day)): UrlPath<(String, String, i32, u32, u32)>,
) -> Response {
    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        return not_found(format!("invalid date {year}-{month}-{day}"));
    };

    repo_response(state.datastore, owner, repo, Some(date)).await
}

async fn repo_response(datastore: Arc<Path>, owner: String, repo: String, day: Option<NaiveDate>) -> Response {
    let missing = format!("no archived traffic payloads for {owner}/{repo}");

    match blocking(move || html::repo_page(&datastore, &owner, &repo, day)).await {
        Ok(Some(body)) => Html(body).into_response(),
        Ok(None) => not_found(missing),
        Err(e) => internal_error(&e),
    }
}
