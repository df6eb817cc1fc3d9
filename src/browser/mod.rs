//! Narrow capabilities the controller needs from "the browser": the active
//! page, its cookies, and a way to hand a custom-scheme URI to the OS.

pub mod cookie_jar;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use futures::FutureExt;
use url::Url;

use crate::domain::{AppError, BrowserCookie};
use crate::utils::get_timestamp;

pub trait TabReader: Send + Sync {
    /// URL of the active page; `None` when there is none.
    fn active_tab_url(&self) -> BoxFuture<'_, Result<Option<String>, AppError>>;
}

pub trait CookieReader: Send + Sync {
    /// Every cookie the browser would send with a request to `url`.
    fn cookies_for_url<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, Result<Vec<BrowserCookie>, AppError>>;
}

pub trait SchemeLauncher: Send + Sync {
    fn launch(&self, uri: &str) -> Result<(), AppError>;
}

/// The page URL typed or pasted into the window.
///
/// Clones share the same slot, so the view can write while the controller
/// reads.
#[derive(Clone, Default)]
pub struct PageTab {
    url: Arc<RwLock<String>>,
}

impl PageTab {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            url: Arc::new(RwLock::new(initial.into())),
        }
    }

    pub fn set(&self, url: impl Into<String>) {
        let mut slot = match self.url.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = url.into();
    }

    pub fn get(&self) -> String {
        match self.url.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl TabReader for PageTab {
    fn active_tab_url(&self) -> BoxFuture<'_, Result<Option<String>, AppError>> {
        let url = self.get().trim().to_string();
        async move { Ok::<_, AppError>((!url.is_empty()).then_some(url)) }.boxed()
    }
}

/// Cookies read from a Netscape cookie jar on disk.
#[derive(Debug, Clone, Default)]
pub struct CookieJarFile {
    path: Option<PathBuf>,
}

impl CookieJarFile {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl CookieReader for CookieJarFile {
    fn cookies_for_url<'a>(
        &'a self,
        url: &'a str,
    ) -> BoxFuture<'a, Result<Vec<BrowserCookie>, AppError>> {
        async move {
            let path = self
                .path
                .as_ref()
                .ok_or_else(|| AppError::CookieStore("No cookie jar selected".to_string()))?;
            let url = Url::parse(url)
                .map_err(|e| AppError::CookieStore(format!("Invalid page URL: {}", e)))?;

            let contents = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| AppError::Io(format!("{}: {}", path.display(), e)))?;

            let jar = cookie_jar::parse(&contents);
            let cookies = cookie_jar::cookies_for(&jar, &url, get_timestamp() as i64);
            tracing::debug!(
                "{} of {} cookies in {} apply to {}",
                cookies.len(),
                jar.len(),
                path.display(),
                url
            );
            Ok::<_, AppError>(cookies)
        }
        .boxed()
    }
}

/// Hands URIs to the operating system's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl SchemeLauncher for SystemLauncher {
    fn launch(&self, uri: &str) -> Result<(), AppError> {
        open::that(uri).map_err(|e| AppError::Launch {
            uri: uri.to_string(),
            reason: e.to_string(),
        })
    }
}
