//! Push notifications and notification clicks.
//!
//! Both are fixed-content triggers: a push always produces the same
//! "new project" notification, and a click either opens the projects section
//! or just dismisses the notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Static content of the push notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    /// Headline.
    pub title: String,
    /// Text below the headline.
    pub body: String,
    /// Icon URL.
    pub icon: String,
    /// Small monochrome badge URL.
    pub badge: String,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    /// Buttons, in display order.
    pub actions: Vec<NotificationAction>,
    /// Action id that opens [`explore_url`](Self::explore_url).
    pub explore_action: String,
    /// Page opened by the explore action.
    pub explore_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "CedoDev Portfolio".to_owned(),
            body: "Novo projeto adicionado ao portfólio!".to_owned(),
            icon: "/favicon.svg".to_owned(),
            badge: "/favicon.svg".to_owned(),
            vibrate: vec![100, 50, 100],
            actions: vec![
                NotificationAction {
                    action: "explore".to_owned(),
                    title: "Ver projeto".to_owned(),
                    icon: "/favicon.svg".to_owned(),
                },
                NotificationAction {
                    action: "close".to_owned(),
                    title: "Fechar".to_owned(),
                    icon: "/favicon.svg".to_owned(),
                },
            ],
            explore_action: "explore".to_owned(),
            explore_url: "/#projects".to_owned(),
        }
    }
}

/// A button shown on the notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationAction {
    /// Id reported back on click.
    pub action: String,
    /// Button label.
    pub title: String,
    /// Button icon URL.
    pub icon: String,
}

/// Payload attached to a shown notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// When the push arrived.
    pub date_of_arrival: DateTime<Utc>,
    /// Always `1`.
    pub primary_key: u32,
}

/// A notification ready to be displayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    /// Headline.
    pub title: String,
    /// Text below the headline.
    pub body: String,
    /// Icon URL.
    pub icon: String,
    /// Badge URL.
    pub badge: String,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    /// Arrival stamp.
    pub data: NotificationData,
    /// Buttons, in display order.
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Builds the push notification shown at `now`.
    pub fn from_config(config: &NotificationConfig, now: DateTime<Utc>) -> Self {
        Notification {
            title: config.title.clone(),
            body: config.body.clone(),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData {
                date_of_arrival: now,
                primary_key: 1,
            },
            actions: config.actions.clone(),
        }
    }
}

/// What to do after a notification was clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickResponse {
    /// The notification is dismissed. Always `true`.
    pub close: bool,
    /// Page to open in a new window, if any.
    pub open_window: Option<String>,
}

/// Resolves a click on a notification button.
///
/// `action` is the id of the clicked button, or `None` for a click on the
/// notification body, which only dismisses it.
pub fn resolve_click(config: &NotificationConfig, action: Option<&str>) -> ClickResponse {
    let open_window = match action {
        Some(action) if action == config.explore_action => Some(config.explore_url.clone()),
        _ => None,
    };
    debug!(?action, opens = ?open_window, "notification clicked");
    ClickResponse {
        close: true,
        open_window,
    }
}
