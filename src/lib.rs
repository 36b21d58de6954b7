//! qr-snap - small shareable mini-pages with QR codes
//!
//! A visitor fills a form (title, author, message, theme, optional image),
//! the page is persisted, and a QR code linking to `/page/{id}` is handed
//! back. Every visit to the page bumps its view counter.
//!
//! - Record store over a pretty-printed JSON document, or redb
//! - Local filesystem storage for uploaded images, served with the public assets
//! - SVG QR codes inlined as data URLs
//! - Server-rendered HTML over axum

pub mod api;
pub mod config;
pub mod object_store;
pub mod pages;
pub mod qr;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod uploads;

use config::Config;
use pages::PageService;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub pages: PageService,
}
