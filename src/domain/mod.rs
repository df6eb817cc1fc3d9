pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    BrowserCookie, Mode, Notice, NoticeLevel, RequestState, ServiceAvailability, TabContext,
    UrlValidation,
};
