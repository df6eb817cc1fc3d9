use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::{
    api::{ApiClient, CookiePayload},
    browser::{CookieReader, SchemeLauncher, TabReader},
    domain::{
        AppError, Mode, Notice, RequestState, ServiceAvailability, TabContext, UrlValidation,
    },
    utils::hitomi_uri,
};

/// Result of one `/version` probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub availability: ServiceAvailability,
    pub version: Option<String>,
}

/// Result of classifying the active page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabCheck {
    pub url: Option<String>,
    pub validation: UrlValidation,
}

/// Probe the service. Anything but a 200 answer means unavailable.
pub async fn probe_service(api: ApiClient) -> ProbeReport {
    match api.version().await {
        Ok(version) => {
            tracing::info!(
                "Hitomi Downloader HTTP API is up at {} (version {})",
                api.base_url(),
                version.as_deref().unwrap_or("unknown")
            );
            ProbeReport {
                availability: ServiceAvailability::Available,
                version,
            }
        }
        Err(e) => {
            tracing::debug!("Probe of {} failed: {}", api.base_url(), AppError::from(e));
            ProbeReport {
                availability: ServiceAvailability::Unavailable,
                version: None,
            }
        }
    }
}

/// Classify the active page. An empty URL never reaches the service, and
/// every failure reads as "invalid".
pub async fn validate_current_tab(api: ApiClient, tab: Arc<dyn TabReader>) -> TabCheck {
    let url = match tab.active_tab_url().await {
        Ok(Some(url)) if !url.is_empty() => url,
        Ok(_) => return TabCheck::default(),
        Err(e) => {
            tracing::warn!("Could not read the active page: {e}");
            return TabCheck::default();
        }
    };

    let validation = match api.types(&url).await {
        Ok(types) => {
            if types.is_empty() {
                tracing::debug!("No extractor accepts {url}: {}", AppError::EmptyResult);
            }
            UrlValidation::from_types(&types)
        }
        Err(e) => {
            tracing::warn!("Classifying {url} failed: {}", AppError::from(e));
            UrlValidation::invalid()
        }
    };

    TabCheck {
        url: Some(url),
        validation,
    }
}

pub async fn request_download(api: ApiClient, url: String) -> Result<(), AppError> {
    api.download(&url).await.map_err(AppError::from)?;
    tracing::info!("Download requested for {url}");
    Ok(())
}

/// Forward the page's cookies to the service. Returns how many were sent.
pub async fn sync_cookies(
    api: ApiClient,
    cookies: Arc<dyn CookieReader>,
    url: String,
) -> Result<usize, AppError> {
    let context = TabContext {
        cookies: cookies.cookies_for_url(&url).await?,
        url,
    };

    let payload: Vec<CookiePayload> = context.cookies.iter().map(CookiePayload::from).collect();
    let count = payload.len();
    api.update_cookies(payload).await.map_err(AppError::from)?;

    tracing::info!("Sent {count} cookies for {}", context.url);
    Ok(count)
}

/// Owns the popup's state machine.
///
/// `start_*` methods flip the relevant state and hand back the future to run,
/// or `None` when the action isn't allowed right now. `finish_*` methods
/// apply the outcome.
pub struct PopupController {
    api: ApiClient,
    tab: Arc<dyn TabReader>,
    cookies: Arc<dyn CookieReader>,
    launcher: Arc<dyn SchemeLauncher>,
    availability: ServiceAvailability,
    service_version: Option<String>,
    validation: UrlValidation,
    validated_url: Option<String>,
    validating: RequestState,
    /// The page changed while a validation was in flight.
    validation_stale: bool,
    download: RequestState,
    cookie_sync: RequestState,
    compat_launch: RequestState,
}

impl PopupController {
    pub fn new(
        api: ApiClient,
        tab: Arc<dyn TabReader>,
        cookies: Arc<dyn CookieReader>,
        launcher: Arc<dyn SchemeLauncher>,
    ) -> Self {
        Self {
            api,
            tab,
            cookies,
            launcher,
            availability: ServiceAvailability::Unknown,
            service_version: None,
            validation: UrlValidation::invalid(),
            validated_url: None,
            validating: RequestState::Idle,
            validation_stale: false,
            download: RequestState::Idle,
            cookie_sync: RequestState::Idle,
            compat_launch: RequestState::Idle,
        }
    }

    #[cfg(test)]
    pub fn availability(&self) -> ServiceAvailability {
        self.availability
    }

    pub fn mode(&self) -> Mode {
        self.availability.mode()
    }

    pub fn service_version(&self) -> Option<&str> {
        self.service_version.as_deref()
    }

    pub fn validation(&self) -> &UrlValidation {
        &self.validation
    }

    #[cfg(test)]
    pub fn validated_url(&self) -> Option<&str> {
        self.validated_url.as_deref()
    }

    pub fn validating(&self) -> RequestState {
        self.validating
    }

    pub fn download_state(&self) -> RequestState {
        self.download
    }

    pub fn cookie_sync_state(&self) -> RequestState {
        self.cookie_sync
    }

    pub fn set_cookie_reader(&mut self, cookies: Arc<dyn CookieReader>) {
        self.cookies = cookies;
    }

    /// The page actions are usable: extended mode, and a validated non-empty URL.
    pub fn actions_enabled(&self) -> bool {
        self.mode() == Mode::Extended
            && self.validation.is_valid
            && self.validated_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn download_enabled(&self) -> bool {
        self.actions_enabled() && !self.download.is_in_flight()
    }

    pub fn cookie_sync_enabled(&self) -> bool {
        self.actions_enabled() && !self.cookie_sync.is_in_flight()
    }

    /// Begin a probe. Only allowed on startup and from compatibility mode;
    /// extended mode is never left once entered.
    pub fn start_probe(&mut self) -> Option<BoxFuture<'static, ProbeReport>> {
        match self.availability {
            ServiceAvailability::Unknown | ServiceAvailability::Unavailable => {
                self.availability = ServiceAvailability::Checking;
                Some(probe_service(self.api.clone()).boxed())
            }
            ServiceAvailability::Checking | ServiceAvailability::Available => None,
        }
    }

    /// Apply a probe result. Entering extended mode immediately starts
    /// validating the active page.
    pub fn finish_probe(&mut self, report: ProbeReport) -> Option<BoxFuture<'static, TabCheck>> {
        if self.availability != ServiceAvailability::Checking {
            tracing::debug!("Dropping stale probe result");
            return None;
        }

        self.availability = report.availability;
        match report.availability {
            ServiceAvailability::Available => {
                self.service_version = report.version;
                self.start_validation()
            }
            _ => {
                tracing::info!("HTTP API unavailable, using compatibility mode");
                None
            }
        }
    }

    pub fn start_validation(&mut self) -> Option<BoxFuture<'static, TabCheck>> {
        if self.mode() != Mode::Extended || self.validating.is_in_flight() {
            return None;
        }

        self.validating = RequestState::InFlight;
        self.validation_stale = false;
        self.validation = UrlValidation::invalid();
        self.validated_url = None;
        Some(validate_current_tab(self.api.clone(), self.tab.clone()).boxed())
    }

    /// The active page changed: forget the previous classification, and
    /// drop any result still on its way for the old page.
    pub fn invalidate_page(&mut self) {
        self.validation = UrlValidation::invalid();
        self.validated_url = None;
        self.validation_stale = self.validating.is_in_flight();
    }

    pub fn finish_validation(&mut self, check: TabCheck) {
        self.validating = RequestState::Idle;
        if std::mem::take(&mut self.validation_stale) {
            tracing::debug!("Dropping validation of a page that is no longer active");
            return;
        }
        self.validated_url = if check.validation.is_valid {
            check.url
        } else {
            None
        };
        self.validation = check.validation;
    }

    pub fn start_download(&mut self) -> Option<BoxFuture<'static, Result<(), AppError>>> {
        if !self.download_enabled() {
            return None;
        }
        let url = self.validated_url.clone()?;

        self.download = RequestState::InFlight;
        Some(request_download(self.api.clone(), url).boxed())
    }

    pub fn finish_download(&mut self, result: Result<(), AppError>) -> Notice {
        self.download = RequestState::Idle;
        match result {
            Ok(()) => Notice::success("Download has been requested!"),
            Err(e) => {
                tracing::error!("Download request failed: {e}");
                Notice::error("Failed to request download!")
            }
        }
    }

    pub fn start_cookie_sync(&mut self) -> Option<BoxFuture<'static, Result<usize, AppError>>> {
        if !self.cookie_sync_enabled() {
            return None;
        }
        let url = self.validated_url.clone()?;

        self.cookie_sync = RequestState::InFlight;
        Some(sync_cookies(self.api.clone(), self.cookies.clone(), url).boxed())
    }

    pub fn finish_cookie_sync(&mut self, result: Result<usize, AppError>) -> Notice {
        self.cookie_sync = RequestState::Idle;
        match result {
            Ok(_) => Notice::success("Cookies have been updated!"),
            Err(e) => {
                tracing::error!("Cookie sync failed: {e}");
                Notice::error("Failed to update cookies!")
            }
        }
    }

    /// Hand the active page to the desktop app through `hitomi://`.
    /// Compatibility mode only; never touches the HTTP API.
    pub fn start_compat_download(
        &mut self,
    ) -> Option<BoxFuture<'static, Result<String, AppError>>> {
        if self.mode() != Mode::Compat || self.compat_launch.is_in_flight() {
            return None;
        }

        self.compat_launch = RequestState::InFlight;
        let tab = self.tab.clone();
        let launcher = self.launcher.clone();
        Some(
            async move {
                let url = tab
                    .active_tab_url()
                    .await?
                    .filter(|u| !u.is_empty())
                    .ok_or(AppError::MissingUrl)?;
                let uri = hitomi_uri(&url);
                launcher.launch(&uri)?;
                tracing::info!("Handed {url} to Hitomi Downloader via URL scheme");
                Ok::<_, AppError>(uri)
            }
            .boxed(),
        )
    }

    pub fn finish_compat_download(
        &mut self,
        result: Result<String, AppError>,
    ) -> Option<Notice> {
        self.compat_launch = RequestState::Idle;
        match result {
            Ok(_) => None,
            Err(AppError::MissingUrl) => Some(Notice::error("Enter a page URL first")),
            Err(e) => {
                tracing::error!("URL scheme handoff failed: {e}");
                Some(Notice::error("Failed to open Hitomi Downloader!"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use crate::domain::{BrowserCookie, NoticeLevel};
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Mutex;

    const PAGE: &str = "https://hitomi.la/galleries/1.html";

    struct FixedTab(Option<String>);

    impl TabReader for FixedTab {
        fn active_tab_url(&self) -> BoxFuture<'_, Result<Option<String>, AppError>> {
            let url = self.0.clone();
            async move { Ok::<_, AppError>(url) }.boxed()
        }
    }

    struct MemoryCookies(Result<Vec<BrowserCookie>, AppError>);

    impl CookieReader for MemoryCookies {
        fn cookies_for_url<'a>(
            &'a self,
            _url: &'a str,
        ) -> BoxFuture<'a, Result<Vec<BrowserCookie>, AppError>> {
            let cookies = self.0.clone();
            async move { cookies }.boxed()
        }
    }

    #[derive(Default)]
    struct RecordingLauncher(Mutex<Vec<String>>);

    impl SchemeLauncher for RecordingLauncher {
        fn launch(&self, uri: &str) -> Result<(), AppError> {
            self.0.lock().unwrap().push(uri.to_string());
            Ok(())
        }
    }

    fn cookie(name: &str) -> BrowserCookie {
        BrowserCookie {
            domain: ".hitomi.la".into(),
            name: name.into(),
            value: "v".into(),
            path: "/".into(),
            expires_at: None,
        }
    }

    fn controller_with(
        base_url: String,
        tab: Option<&str>,
        cookies: Result<Vec<BrowserCookie>, AppError>,
        launcher: Arc<RecordingLauncher>,
    ) -> PopupController {
        let api = ApiClient::new(ApiConfig {
            base_url,
            ..ApiConfig::default()
        })
        .unwrap();
        PopupController::new(
            api,
            Arc::new(FixedTab(tab.map(str::to_string))),
            Arc::new(MemoryCookies(cookies)),
            launcher,
        )
    }

    fn controller(base_url: String, tab: Option<&str>) -> PopupController {
        controller_with(base_url, tab, Ok(vec![]), Arc::default())
    }

    /// Probe, and if that enters extended mode, finish validation too.
    async fn boot(controller: &mut PopupController) {
        let probe = controller.start_probe().expect("probe should start");
        assert_eq!(controller.mode(), Mode::Checking);
        let report = probe.await;
        if let Some(validation) = controller.finish_probe(report) {
            let check = validation.await;
            controller.finish_validation(check);
        }
    }

    async fn mock_version(server: &mut mockito::ServerGuard, status: usize) -> mockito::Mock {
        server
            .mock("GET", "/version")
            .with_status(status)
            .with_body(r#"{"version":"1.2.0"}"#)
            .create_async()
            .await
    }

    async fn mock_types(server: &mut mockito::ServerGuard, body: &str) -> mockito::Mock {
        server
            .mock("POST", "/types")
            .match_body(Matcher::Json(json!({ "input": PAGE })))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_probe_200_enters_extended_mode() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;

        assert_eq!(c.mode(), Mode::Extended);
        assert_eq!(c.service_version(), Some("1.2.0"));
    }

    #[tokio::test]
    async fn test_probe_non_200_enters_compat_mode() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 500).await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;

        assert_eq!(c.mode(), Mode::Compat);
        assert!(!c.actions_enabled());
    }

    #[tokio::test]
    async fn test_unreachable_service_stays_compat_across_reloads() {
        let mut c = controller("http://127.0.0.1:1".to_string(), Some(PAGE));
        for _ in 0..3 {
            boot(&mut c).await;
            assert_eq!(c.mode(), Mode::Compat);
            assert_eq!(c.availability(), ServiceAvailability::Unavailable);
        }
    }

    #[tokio::test]
    async fn test_extended_mode_is_terminal() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;

        assert!(c.start_probe().is_none());
        assert_eq!(c.mode(), Mode::Extended);
    }

    #[tokio::test]
    async fn test_reload_while_checking_is_ignored() {
        let mut c = controller("http://127.0.0.1:1".to_string(), Some(PAGE));
        let _pending = c.start_probe().unwrap();
        assert!(c.start_probe().is_none());
        assert_eq!(c.availability(), ServiceAvailability::Checking);
    }

    #[tokio::test]
    async fn test_stale_probe_result_is_dropped() {
        let mut c = controller("http://127.0.0.1:1".to_string(), Some(PAGE));
        let stale = ProbeReport {
            availability: ServiceAvailability::Available,
            version: None,
        };
        assert!(c.finish_probe(stale).is_none());
        assert_eq!(c.availability(), ServiceAvailability::Unknown);
    }

    // Service unreachable: the deep link is used and no HTTP call is made.
    #[tokio::test]
    async fn test_compat_download_launches_scheme_without_http() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 503).await;
        let posts = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let launcher = Arc::new(RecordingLauncher::default());
        let mut c = controller_with(server.url(), Some(PAGE), Ok(vec![]), launcher.clone());
        boot(&mut c).await;
        assert_eq!(c.mode(), Mode::Compat);

        let uri = c.start_compat_download().unwrap().await.unwrap();
        assert_eq!(uri, format!("hitomi://{PAGE}"));
        assert_eq!(*launcher.0.lock().unwrap(), vec![uri]);
        assert!(c.start_download().is_none());
        posts.assert_async().await;
    }

    #[tokio::test]
    async fn test_compat_download_without_url_is_error_notice() {
        let mut c = controller("http://127.0.0.1:1".to_string(), None);
        boot(&mut c).await;

        let result = c.start_compat_download().unwrap().await;
        assert_eq!(result, Err(AppError::MissingUrl));
        let notice = c.finish_compat_download(result).unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    // Probe returns a version, page classifies as a gallery.
    #[tokio::test]
    async fn test_valid_page_enables_actions() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery","manga"]}"#).await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;

        assert_eq!(c.mode(), Mode::Extended);
        assert!(c.validation().is_valid);
        assert_eq!(c.validation().matched_type.as_deref(), Some("gallery"));
        assert_eq!(c.validated_url(), Some(PAGE));
        assert!(c.download_enabled());
        assert!(c.cookie_sync_enabled());
    }

    // Probe succeeds, classification is empty.
    #[tokio::test]
    async fn test_empty_types_disables_actions() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":[]}"#).await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;

        assert_eq!(c.mode(), Mode::Extended);
        assert!(!c.validation().is_valid);
        assert!(!c.download_enabled());
        assert!(!c.cookie_sync_enabled());
        assert!(c.start_download().is_none());
        assert!(c.start_cookie_sync().is_none());
    }

    #[tokio::test]
    async fn test_types_error_is_silently_invalid() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _mock = server
            .mock("POST", "/types")
            .with_status(500)
            .create_async()
            .await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;

        assert_eq!(c.mode(), Mode::Extended);
        assert!(!c.actions_enabled());
        assert_eq!(c.validating(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_empty_url_skips_classification() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let types = server
            .mock("POST", "/types")
            .expect(0)
            .create_async()
            .await;

        let mut c = controller(server.url(), Some(""));
        boot(&mut c).await;

        assert!(!c.validation().is_valid);
        assert_eq!(c.validated_url(), None);
        types.assert_async().await;
    }

    #[tokio::test]
    async fn test_download_success_and_in_flight_guard() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;
        let download = server
            .mock("POST", "/download")
            .match_body(Matcher::Json(json!({ "input": PAGE })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;

        let request = c.start_download().unwrap();
        assert_eq!(c.download_state(), RequestState::InFlight);
        assert!(!c.download_enabled());
        assert!(c.start_download().is_none());
        // The other action is independent.
        assert!(c.cookie_sync_enabled());

        let notice = c.finish_download(request.await);
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.title, "Download has been requested!");
        assert_eq!(c.download_state(), RequestState::Idle);
        download.assert_async().await;
    }

    #[tokio::test]
    async fn test_download_failure_surfaces_error() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;
        let _mock = server
            .mock("POST", "/download")
            .with_status(400)
            .create_async()
            .await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;

        let result = c.start_download().unwrap().await;
        assert_eq!(result, Err(AppError::NonSuccessStatus(400)));
        let notice = c.finish_download(result);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(c.download_state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_cookie_sync_posts_mapped_cookies() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;
        let update = server
            .mock("POST", "/update_cookies")
            .match_body(Matcher::Json(json!({
                "cookies": [
                    {"domain": ".hitomi.la", "name": "a", "value": "v", "path": "/"},
                    {"domain": ".hitomi.la", "name": "b", "value": "v", "path": "/"}
                ]
            })))
            .with_status(200)
            .create_async()
            .await;

        let mut c = controller_with(
            server.url(),
            Some(PAGE),
            Ok(vec![cookie("a"), cookie("b")]),
            Arc::default(),
        );
        boot(&mut c).await;

        let result = c.start_cookie_sync().unwrap().await;
        assert_eq!(result, Ok(2));
        let notice = c.finish_cookie_sync(result);
        assert_eq!(notice.title, "Cookies have been updated!");
        update.assert_async().await;
    }

    // Cookie sync answered with 500.
    #[tokio::test]
    async fn test_cookie_sync_500_shows_error_and_resets_flag() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;
        let _mock = server
            .mock("POST", "/update_cookies")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let mut c = controller_with(server.url(), Some(PAGE), Ok(vec![cookie("a")]), Arc::default());
        boot(&mut c).await;

        let request = c.start_cookie_sync().unwrap();
        assert_eq!(c.cookie_sync_state(), RequestState::InFlight);
        let notice = c.finish_cookie_sync(request.await);

        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Failed to update cookies!");
        assert_eq!(c.cookie_sync_state(), RequestState::Idle);
        assert!(c.cookie_sync_enabled());
    }

    #[tokio::test]
    async fn test_cookie_store_failure_skips_post() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;
        let update = server
            .mock("POST", "/update_cookies")
            .expect(0)
            .create_async()
            .await;

        let mut c = controller_with(
            server.url(),
            Some(PAGE),
            Err(AppError::CookieStore("No cookie jar selected".into())),
            Arc::default(),
        );
        boot(&mut c).await;

        let result = c.start_cookie_sync().unwrap().await;
        assert!(matches!(result, Err(AppError::CookieStore(_))));
        assert_eq!(c.finish_cookie_sync(result).level, NoticeLevel::Error);
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_revalidation_clears_previous_result() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;
        assert!(c.actions_enabled());

        let pending = c.start_validation().unwrap();
        assert!(!c.actions_enabled());
        assert!(c.start_validation().is_none());
        c.finish_validation(pending.await);
        assert!(c.actions_enabled());
    }

    #[tokio::test]
    async fn test_page_change_disables_actions() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;
        assert!(c.download_enabled());

        c.invalidate_page();
        assert!(!c.validation().is_valid);
        assert_eq!(c.validated_url(), None);
        assert!(!c.download_enabled());
        assert!(!c.cookie_sync_enabled());
        assert!(c.start_download().is_none());
        assert!(c.start_cookie_sync().is_none());
        assert_eq!(c.mode(), Mode::Extended);
    }

    #[tokio::test]
    async fn test_result_for_replaced_page_is_dropped() {
        let mut server = mockito::Server::new_async().await;
        let _version = mock_version(&mut server, 200).await;
        let _types = mock_types(&mut server, r#"{"types":["gallery"]}"#).await;

        let mut c = controller(server.url(), Some(PAGE));
        boot(&mut c).await;

        let pending = c.start_validation().unwrap();
        c.invalidate_page();
        c.finish_validation(pending.await);

        assert_eq!(c.validating(), RequestState::Idle);
        assert!(!c.download_enabled());
        assert!(c.start_download().is_none());

        // A fresh check of the new page applies normally.
        let check = c.start_validation().unwrap();
        c.finish_validation(check.await);
        assert!(c.download_enabled());
    }

    #[tokio::test]
    async fn test_compat_download_in_flight_guard() {
        let launcher = Arc::new(RecordingLauncher::default());
        let mut c = controller_with(
            "http://127.0.0.1:1".to_string(),
            Some(PAGE),
            Ok(vec![]),
            launcher.clone(),
        );
        boot(&mut c).await;
        assert_eq!(c.mode(), Mode::Compat);

        let launch = c.start_compat_download().unwrap();
        assert!(c.start_compat_download().is_none());

        assert_eq!(c.finish_compat_download(launch.await), None);
        assert!(c.start_compat_download().is_some());
        assert_eq!(launcher.0.lock().unwrap().len(), 1);
    }
}
