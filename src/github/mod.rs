//! Minimal GitHub REST client for the traffic endpoints.

mod client;
mod links;
mod models;
mod pages;
mod resilient_http;

pub use client::{Client, ClientSettings, DEFAULT_API_URL};
pub use links::LinkRelations;
pub use models::{ClonesResponse, PopularPath, Referrer, RepoSummary, Repository, TrafficSample, ViewsResponse, parse_day};
pub use pages::Pages;
pub use resilient_http::RetryPolicy;
