use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use iced::{Subscription, Task};

use crate::api::{is_new_release, ApiClient, Release, ReleaseFeed};
use crate::application::{PopupController, ProbeReport, TabCheck};
use crate::browser::{CookieJarFile, PageTab, SchemeLauncher, SystemLauncher};
use crate::config::AppConfig;
use crate::domain::{AppError, Notice};
use crate::ui::{self, PopupMessage, PopupView};

/// Everything `main` prepares before the window opens.
#[derive(Clone)]
pub struct AppParts {
    pub api: ApiClient,
    pub config: AppConfig,
    pub config_path: Option<PathBuf>,
    pub release_feed: Option<ReleaseFeed>,
    pub initial_url: Option<String>,
}

pub struct PopupApp {
    controller: PopupController,
    view: PopupView,
    page: PageTab,
    config: AppConfig,
    config_path: Option<PathBuf>,
    /// Page of the announced release
    release_url: Option<String>,
}

impl PopupApp {
    pub fn boot(parts: AppParts) -> (Self, Task<Message>) {
        let AppParts {
            api,
            config,
            config_path,
            release_feed,
            initial_url,
        } = parts;

        let page = PageTab::new(initial_url.clone().unwrap_or_default());
        let cookies = CookieJarFile::new(config.cookies_file.clone());
        let mut controller = PopupController::new(
            api,
            Arc::new(page.clone()),
            Arc::new(cookies),
            Arc::new(SystemLauncher),
        );

        let view = PopupView {
            page_url: initial_url.unwrap_or_default(),
            cookies_file: config
                .cookies_file
                .as_ref()
                .map(|p| p.display().to_string()),
            ..PopupView::default()
        };

        let mut tasks = Vec::new();
        if let Some(probe) = controller.start_probe() {
            tasks.push(Task::perform(probe, Message::ProbeFinished));
        }
        if let Some(feed) = release_feed {
            tasks.push(Task::perform(
                async move {
                    match feed.latest().await {
                        Ok(release) => release,
                        Err(e) => {
                            tracing::debug!("Release check failed: {e}");
                            None
                        }
                    }
                },
                Message::LatestReleaseFetched,
            ));
        }

        (
            Self {
                controller,
                view,
                page,
                config,
                config_path,
                release_url: None,
            },
            Task::batch(tasks),
        )
    }

    fn save_config(&self) {
        let Some(path) = self.config_path.clone().or_else(AppConfig::default_path) else {
            return;
        };
        if let Err(e) = self.config.save_to(&path) {
            tracing::warn!("Could not save config: {e}");
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(PopupMessage),
    ProbeFinished(ProbeReport),
    ValidationFinished(TabCheck),
    DownloadFinished(Result<(), AppError>),
    CookieSyncFinished(Result<usize, AppError>),
    /// Result of the `hitomi://` handoff, with the URI that was opened
    CompatLaunchFinished(Result<String, AppError>),
    CookieJarSelected(Option<PathBuf>),
    LatestReleaseFetched(Option<Release>),
    Tick(Instant),
}

fn handle_ui(app: &mut PopupApp, message: PopupMessage) -> Task<Message> {
    app.view.update(&message);

    match message {
        PopupMessage::PageUrlChanged(url) => {
            app.page.set(url);
            app.controller.invalidate_page();
        }
        PopupMessage::CheckPagePressed => {
            if let Some(check) = app.controller.start_validation() {
                return Task::perform(check, Message::ValidationFinished);
            }
        }
        PopupMessage::DownloadPressed => {
            if let Some(request) = app.controller.start_download() {
                return Task::perform(request, Message::DownloadFinished);
            }
        }
        PopupMessage::SyncCookiesPressed => {
            if let Some(request) = app.controller.start_cookie_sync() {
                return Task::perform(request, Message::CookieSyncFinished);
            }
        }
        PopupMessage::CompatDownloadPressed => {
            if let Some(launch) = app.controller.start_compat_download() {
                return Task::perform(launch, Message::CompatLaunchFinished);
            }
        }
        PopupMessage::ReloadPressed => {
            if let Some(probe) = app.controller.start_probe() {
                return Task::perform(probe, Message::ProbeFinished);
            }
        }
        PopupMessage::ChooseCookiesPressed => {
            return Task::perform(
                async {
                    rfd::AsyncFileDialog::new()
                        .set_title("Select an exported cookies.txt")
                        .add_filter("Netscape cookie jar", &["txt"])
                        .pick_file()
                        .await
                        .map(|handle| handle.path().to_path_buf())
                },
                Message::CookieJarSelected,
            );
        }
        PopupMessage::OpenReleasePressed => {
            if let Some(page) = &app.release_url {
                if let Err(e) = SystemLauncher.launch(page) {
                    tracing::warn!("{e}");
                }
            }
        }
    }
    Task::none()
}

pub fn update(app: &mut PopupApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => return handle_ui(app, ui_msg),
        Message::ProbeFinished(report) => {
            if let Some(check) = app.controller.finish_probe(report) {
                return Task::perform(check, Message::ValidationFinished);
            }
        }
        Message::ValidationFinished(check) => {
            app.controller.finish_validation(check);
        }
        Message::DownloadFinished(result) => {
            let notice = app.controller.finish_download(result);
            app.view.push_notice(notice);
        }
        Message::CookieSyncFinished(result) => {
            let notice = app.controller.finish_cookie_sync(result);
            app.view.push_notice(notice);
        }
        Message::CompatLaunchFinished(result) => {
            if let Some(notice) = app.controller.finish_compat_download(result) {
                app.view.push_notice(notice);
            }
        }
        Message::CookieJarSelected(Some(path)) => {
            tracing::info!("Using cookie jar {}", path.display());
            app.controller
                .set_cookie_reader(Arc::new(CookieJarFile::new(Some(path.clone()))));
            app.view.cookies_file = Some(path.display().to_string());
            app.config.cookies_file = Some(path);
            app.save_config();
        }
        Message::CookieJarSelected(None) => {
            // User cancelled dialog
        }
        Message::LatestReleaseFetched(Some(release)) => {
            if is_new_release(env!("CARGO_PKG_VERSION"), &release.tag_name) {
                tracing::info!("New release available: {}", release.tag_name);
                app.release_url = release.html_url;
                app.view.update_tag = Some(release.tag_name);
            }
        }
        Message::LatestReleaseFetched(None) => {}
        Message::Tick(now) => {
            app.view.notices.retain(|n: &Notice| !n.is_expired(now));
        }
    }
    Task::none()
}

pub fn view(app: &PopupApp) -> iced::Element<'_, Message> {
    app.view
        .view(ui::screen(&app.controller), app.controller.service_version())
        .map(Message::UiMessage)
}

/// Ticks only while notices are on screen.
pub fn subscription(app: &PopupApp) -> Subscription<Message> {
    if app.view.notices.is_empty() {
        Subscription::none()
    } else {
        iced::time::every(Duration::from_millis(250)).map(Message::Tick)
    }
}
