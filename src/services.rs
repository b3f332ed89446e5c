//! Authentication and push-notification collaborators
//!
//! Sign-in and message delivery belong to external SDKs. This module only
//! describes the capabilities the application consumes from them and turns
//! their outcomes into user-facing [`Notice`]s. Nothing here reimplements
//! either service.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// A dismissable message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// The signed-in user as reported by the authentication provider
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl Identity {
    pub fn name_or_guest(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("Guest User")
    }

    pub fn email_or_placeholder(&self) -> &str {
        self.email.as_deref().filter(|e| !e.is_empty()).unwrap_or("No email")
    }

    /// Upper-cased first letter of the display name, `U` when there is none
    pub fn initial(&self) -> String {
        self.display_name
            .as_deref()
            .and_then(|n| n.chars().next())
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_else(|| "U".to_string())
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Provider(String),
}

/// Current-identity and sign-out capabilities of the authentication SDK
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_identity(&self) -> Option<Identity>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Provider for hosts with no authentication SDK: nobody is ever signed in
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedOut;

#[async_trait]
impl AuthProvider for SignedOut {
    async fn current_identity(&self) -> Option<Identity> {
        None
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Signs out and describes the outcome; a failure never escapes as an error
pub async fn sign_out<A: AuthProvider + ?Sized>(auth: &A) -> Notice {
    match auth.sign_out().await {
        Ok(()) => Notice::new("Logged out", "See you soon!"),
        Err(err) => {
            warn!(error = %err, "sign-out failed");
            Notice::new("Error", err.to_string())
        }
    }
}

/// Outcome of a notification permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
}

impl PermissionStatus {
    pub fn is_enabled(self) -> bool {
        matches!(self, PermissionStatus::Authorized | PermissionStatus::Provisional)
    }
}

/// A message delivered by the push service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PushMessage {
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: HashMap<String, String>,
}

/// Callback invoked for each delivered message
pub type MessageHandler = Box<dyn Fn(PushMessage) + Send + Sync>;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push service error: {0}")]
    Provider(String),
}

/// Permission, token and delivery capabilities of the push SDK
#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionStatus, PushError>;

    async fn get_token(&self) -> Result<String, PushError>;

    /// The message whose notification launched the app from a quit state, if any
    async fn initial_message(&self) -> Result<Option<PushMessage>, PushError>;

    /// Registers the handler for messages received while the app is in front
    fn on_foreground_message(&self, handler: MessageHandler);

    /// Registers the handler for messages that opened the app from the background
    fn on_background_message(&self, handler: MessageHandler);
}

/// Provider for hosts with no push SDK
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPush;

#[async_trait]
impl PushProvider for NoPush {
    async fn request_permission(&self) -> Result<PermissionStatus, PushError> {
        Ok(PermissionStatus::NotDetermined)
    }

    async fn get_token(&self) -> Result<String, PushError> {
        Err(PushError::Provider("push messaging not available".to_string()))
    }

    async fn initial_message(&self) -> Result<Option<PushMessage>, PushError> {
        Ok(None)
    }

    fn on_foreground_message(&self, _handler: MessageHandler) {}

    fn on_background_message(&self, _handler: MessageHandler) {}
}

/// Asks for notification permission, fetches the device token and wires message handlers
///
/// Foreground messages are forwarded to `notices`; background-opened ones and
/// the message that launched the app are only logged. Returns the device token
/// when one was obtained.
pub async fn register_notifications<P>(push: &P, notices: mpsc::Sender<Notice>) -> Option<String>
where
    P: PushProvider + ?Sized,
{
    match push.request_permission().await {
        Ok(status) if status.is_enabled() => info!(?status, "notification permission enabled"),
        Ok(status) => {
            info!(?status, "notification permission not granted");
            let _ = notices
                .send(Notice::new(
                    "Permission Denied",
                    "Please enable notifications from settings.",
                ))
                .await;
        }
        Err(err) => warn!(error = %err, "notification permission request failed"),
    }

    let token = match push.get_token().await {
        Ok(token) => {
            info!("obtained push token");
            Some(token)
        }
        Err(err) => {
            warn!(error = %err, "failed to get push token");
            None
        }
    };

    let tx = notices.clone();
    push.on_foreground_message(Box::new(move |message| {
        let notice = Notice::new(
            message.title.unwrap_or_default(),
            message.body.unwrap_or_default(),
        );
        if tx.try_send(notice).is_err() {
            warn!("dropping foreground notification, notice queue unavailable");
        }
    }));
    push.on_background_message(Box::new(|message| {
        info!(title = ?message.title, "notification opened app from background");
    }));

    match push.initial_message().await {
        Ok(Some(message)) => info!(title = ?message.title, "notification opened app from quit state"),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "failed to read launch notification"),
    }

    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct FakeAuth {
        fail: bool,
    }

    #[async_trait]
    impl AuthProvider for FakeAuth {
        async fn current_identity(&self) -> Option<Identity> {
            None
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            if self.fail {
                Err(AuthError::Provider("network unreachable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct FakePush {
        status: Option<PermissionStatus>,
        token: Option<String>,
        launched_by: Option<PushMessage>,
        launch_checked: AtomicBool,
        foreground: Mutex<Option<MessageHandler>>,
        background: Mutex<Option<MessageHandler>>,
    }

    #[async_trait]
    impl PushProvider for FakePush {
        async fn request_permission(&self) -> Result<PermissionStatus, PushError> {
            self.status
                .ok_or_else(|| PushError::Provider("no permission api".to_string()))
        }

        async fn get_token(&self) -> Result<String, PushError> {
            self.token
                .clone()
                .ok_or_else(|| PushError::Provider("no token".to_string()))
        }

        async fn initial_message(&self) -> Result<Option<PushMessage>, PushError> {
            self.launch_checked.store(true, Ordering::SeqCst);
            Ok(self.launched_by.clone())
        }

        fn on_foreground_message(&self, handler: MessageHandler) {
            *self.foreground.lock().unwrap() = Some(handler);
        }

        fn on_background_message(&self, handler: MessageHandler) {
            *self.background.lock().unwrap() = Some(handler);
        }
    }

    #[test]
    fn test_identity_fallbacks() {
        let guest = Identity::default();
        assert_eq!(guest.name_or_guest(), "Guest User");
        assert_eq!(guest.email_or_placeholder(), "No email");
        assert_eq!(guest.initial(), "U");

        let user = Identity {
            uid: "1".to_string(),
            display_name: Some("asha rao".to_string()),
            email: Some("asha@example.com".to_string()),
            photo_url: None,
        };
        assert_eq!(user.name_or_guest(), "asha rao");
        assert_eq!(user.email_or_placeholder(), "asha@example.com");
        assert_eq!(user.initial(), "A");
    }

    #[tokio::test]
    async fn test_sign_out_success_notice() {
        let notice = sign_out(&FakeAuth { fail: false }).await;
        assert_eq!(notice, Notice::new("Logged out", "See you soon!"));
    }

    #[tokio::test]
    async fn test_sign_out_failure_becomes_alert() {
        let notice = sign_out(&FakeAuth { fail: true }).await;
        assert_eq!(notice.title, "Error");
        assert_eq!(notice.body, "network unreachable");
    }

    #[test]
    fn test_permission_status_enabled() {
        assert!(PermissionStatus::Authorized.is_enabled());
        assert!(PermissionStatus::Provisional.is_enabled());
        assert!(!PermissionStatus::Denied.is_enabled());
        assert!(!PermissionStatus::NotDetermined.is_enabled());
    }

    #[tokio::test]
    async fn test_register_granted_returns_token_and_forwards_foreground() {
        let push = FakePush {
            status: Some(PermissionStatus::Authorized),
            token: Some("device-token".to_string()),
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::channel(4);

        let token = register_notifications(&push, tx).await;
        assert_eq!(token.as_deref(), Some("device-token"));
        assert!(rx.try_recv().is_err(), "No notice when permission is granted");

        let handler = push.foreground.lock().unwrap().take().expect("handler registered");
        handler(PushMessage {
            title: Some("Breaking".to_string()),
            body: Some("Something happened".to_string()),
            ..Default::default()
        });

        assert_eq!(
            rx.try_recv().unwrap(),
            Notice::new("Breaking", "Something happened")
        );
        assert!(push.background.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_register_denied_emits_notice() {
        let push = FakePush {
            status: Some(PermissionStatus::Denied),
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::channel(4);

        let token = register_notifications(&push, tx).await;

        assert!(token.is_none());
        assert_eq!(rx.try_recv().unwrap().title, "Permission Denied");
    }

    #[tokio::test]
    async fn test_register_with_failing_provider_does_not_panic() {
        let push = FakePush::default();
        let (tx, mut rx) = mpsc::channel(4);

        assert!(register_notifications(&push, tx).await.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_launch_notification_is_read_but_not_queued() {
        let push = FakePush {
            status: Some(PermissionStatus::Authorized),
            token: Some("device-token".to_string()),
            launched_by: Some(PushMessage {
                title: Some("Opened from quit".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::channel(4);

        assert!(register_notifications(&push, tx).await.is_some());

        assert!(push.launch_checked.load(Ordering::SeqCst));
        assert!(rx.try_recv().is_err(), "Launch message is only logged");
    }

    #[tokio::test]
    async fn test_no_push_provider() {
        let (tx, _rx) = mpsc::channel(4);
        assert!(register_notifications(&NoPush, tx).await.is_none());
    }
}
