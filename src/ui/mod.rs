use iced::{
    widget::{button, column, container, row, text, text_input, Column, Space},
    Alignment, Color, Element, Length,
};

use crate::application::PopupController;
use crate::domain::{Mode, Notice, NoticeLevel};

const SUCCESS: Color = Color::from_rgb(0.2, 0.65, 0.35);
const WARNING: Color = Color::from_rgb(0.85, 0.6, 0.1);
const ERROR: Color = Color::from_rgb(0.85, 0.25, 0.25);

pub const LOADING_TEXT: &str = "Checking HTTP API was enabled...";
pub const INVALID_URL: &str = "Invalid URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Success,
    Error,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub level: BannerLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionButton {
    pub enabled: bool,
    pub loading: bool,
}

/// What the window shows. Exactly one variant at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading {
        text: &'static str,
    },
    Compat,
    Extended {
        banner: Banner,
        download: ActionButton,
        cookies: ActionButton,
    },
}

/// Map controller state to the screen to draw.
pub fn screen(controller: &PopupController) -> Screen {
    match controller.mode() {
        Mode::Checking => Screen::Loading { text: LOADING_TEXT },
        Mode::Compat => Screen::Compat,
        Mode::Extended => {
            let validation = controller.validation();
            let banner = if controller.validating().is_in_flight() {
                Banner {
                    level: BannerLevel::Pending,
                    text: "Checking page...".to_string(),
                }
            } else if validation.is_valid {
                Banner {
                    level: BannerLevel::Success,
                    text: format!(
                        "You can download {}",
                        validation.matched_type.as_deref().unwrap_or_default()
                    ),
                }
            } else {
                Banner {
                    level: BannerLevel::Error,
                    text: INVALID_URL.to_string(),
                }
            };

            Screen::Extended {
                banner,
                download: ActionButton {
                    enabled: controller.download_enabled(),
                    loading: controller.download_state().is_in_flight(),
                },
                cookies: ActionButton {
                    enabled: controller.cookie_sync_enabled(),
                    loading: controller.cookie_sync_state().is_in_flight(),
                },
            }
        }
    }
}

/// View-only state
#[derive(Default)]
pub struct PopupView {
    pub page_url: String,
    pub cookies_file: Option<String>,
    pub update_tag: Option<String>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub enum PopupMessage {
    PageUrlChanged(String),
    CheckPagePressed,
    DownloadPressed,
    SyncCookiesPressed,
    CompatDownloadPressed,
    ReloadPressed,
    ChooseCookiesPressed,
    OpenReleasePressed,
}

fn banner_line<'a>(color: Color, content: String) -> Element<'a, PopupMessage> {
    container(text(content).size(15).color(color))
        .padding([8, 12])
        .width(Length::Fill)
        .into()
}

fn action<'a>(label: &'a str, state: ActionButton, msg: PopupMessage) -> Element<'a, PopupMessage> {
    let label = if state.loading { "Requesting..." } else { label };
    button(text(label))
        .on_press_maybe(state.enabled.then_some(msg))
        .padding([10, 20])
        .into()
}

impl PopupView {
    pub fn update(&mut self, message: &PopupMessage) {
        if let PopupMessage::PageUrlChanged(url) = message {
            self.page_url = url.clone();
        }
        // Everything else is handled by the app
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn page_input(&self) -> Element<'_, PopupMessage> {
        text_input("Paste the page URL...", &self.page_url)
            .on_input(PopupMessage::PageUrlChanged)
            .on_submit(PopupMessage::CheckPagePressed)
            .padding(10)
            .into()
    }

    fn compat(&self) -> Element<'_, PopupMessage> {
        column![
            banner_line(WARNING, "Couldn't connect with Hitomi Downloader :(".to_string()),
            self.page_input(),
            text("But that's ok. I'll use compatibility mode.").size(16),
            text("Please turn on HTTP API for a better experience.").size(13),
            text("( Options -> Preferences -> Advanced -> HTTP API )").size(13),
            button(text("Download current page"))
                .on_press(PopupMessage::CompatDownloadPressed)
                .padding([10, 20]),
            Space::new().height(Length::Fixed(10.0)),
            button(text("Reload")).on_press(PopupMessage::ReloadPressed),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into()
    }

    fn extended(
        &self,
        banner: Banner,
        download: ActionButton,
        cookies: ActionButton,
        service_version: Option<&str>,
    ) -> Element<'_, PopupMessage> {
        let color = match banner.level {
            BannerLevel::Success => SUCCESS,
            BannerLevel::Error => ERROR,
            BannerLevel::Pending => WARNING,
        };
        let jar = self
            .cookies_file
            .clone()
            .unwrap_or_else(|| "No cookie jar selected".to_string());

        column![
            banner_line(color, banner.text),
            row![
                self.page_input(),
                button(text("Check page")).on_press(PopupMessage::CheckPagePressed),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
            action("Download current page", download, PopupMessage::DownloadPressed),
            action("Load (Update) cookies", cookies, PopupMessage::SyncCookiesPressed),
            row![
                text(jar).size(12),
                button(text("Choose cookies.txt").size(12))
                    .style(button::text)
                    .on_press(PopupMessage::ChooseCookiesPressed),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
            text(format!(
                "Hitomi Downloader version: {}",
                service_version.unwrap_or("unknown")
            ))
            .size(12),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into()
    }

    pub fn view<'a>(
        &'a self,
        screen: Screen,
        service_version: Option<&'a str>,
    ) -> Element<'a, PopupMessage> {
        let mut content = Column::new()
            .push(text("Hitomi Downloader companion").size(28))
            .spacing(10)
            .align_x(Alignment::Center);

        if let Some(tag) = &self.update_tag {
            content = content.push(
                row![
                    text("New version released!").color(WARNING),
                    button(text(format!("Download {}", tag)))
                        .style(button::text)
                        .on_press(PopupMessage::OpenReleasePressed),
                ]
                .spacing(6)
                .align_y(Alignment::Center),
            );
        }

        let body: Element<'_, PopupMessage> = match screen {
            Screen::Loading { text: label } => column![text(label).size(16)]
                .align_x(Alignment::Center)
                .into(),
            Screen::Compat => self.compat(),
            Screen::Extended {
                banner,
                download,
                cookies,
            } => self.extended(banner, download, cookies, service_version),
        };
        content = content.push(body);

        for notice in &self.notices {
            let color = match notice.level {
                NoticeLevel::Success => SUCCESS,
                NoticeLevel::Error => ERROR,
            };
            content = content.push(banner_line(color, notice.title.clone()));
        }

        content = content
            .push(Space::new().height(Length::Fill))
            .push(text(concat!("hitomi-companion v", env!("CARGO_PKG_VERSION"))).size(11));

        container(content).padding(20).into()
    }
}
