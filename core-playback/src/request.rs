//! Start requests as received from the application layer, and their
//! normalised form after defaults are applied.

use bridge_traits::NotificationIcon;
use core_runtime::config::StartDefaults;

/// Raw start request. Every field is optional; see [`StartRequest::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartRequest {
    pub url: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub looping: Option<bool>,
}

impl StartRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = Some(looping);
        self
    }

    /// Apply defaults. A missing or blank URL resolves to `None`, which
    /// means "show the notification, play nothing".
    pub fn resolve(self, defaults: &StartDefaults) -> ResolvedStart {
        let url = self
            .url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        ResolvedStart {
            url,
            title: self.title.unwrap_or_else(|| defaults.title.clone()),
            body: self.body.unwrap_or_else(|| defaults.body.clone()),
            icon: NotificationIcon::from_name(self.icon.as_deref()),
            looping: self.looping.unwrap_or(defaults.looping),
        }
    }
}

/// Start request with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStart {
    pub url: Option<String>,
    pub title: String,
    pub body: String,
    pub icon: NotificationIcon,
    pub looping: bool,
}
