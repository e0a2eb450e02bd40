//! storefront-server: order fulfillment and account API
//!
//! # Module layout
//!
//! ```text
//! storefront-server/src/
//! ├── config.rs      # Environment configuration (loaded once)
//! ├── state.rs       # Shared application state
//! ├── auth/          # Password hashing, JWT issue/validate, session gate
//! ├── db/            # Repository traits, in-memory and PostgreSQL stores
//! ├── services/      # Order fulfillment engine, account service
//! ├── api/           # axum routes and handlers
//! └── utils/         # Logging
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod services;
pub mod state;
pub mod utils;

pub use auth::{CurrentUser, JwtService, PasswordService};
pub use config::Config;
pub use services::{AccountService, OrderService};
pub use state::AppState;

/// Security event logging under the `security` target
///
/// Events are emitted at INFO; the severity travels in the `level` field.
///
/// ```ignore
/// security_log!("WARN", "auth_failed", reason = %e, uri = %req.uri());
/// ```
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $($arg:tt)+)?) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event
            $(, $($arg)+)?
        );
    };
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Debug, Default)]
    struct Captured {
        level: Option<Level>,
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<Captured>>>);

    impl Visit for Captured {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut captured = Captured {
                level: Some(*event.metadata().level()),
                target: event.metadata().target().to_string(),
                ..Default::default()
            };
            event.record(&mut captured);
            self.0.lock().unwrap().push(captured);
        }
    }

    #[test]
    fn test_security_log_records_level_field_at_info() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            let reason = "bad signature";
            security_log!("WARN", "auth_failed", reason = %reason, user_id = 7);
        });

        let events = capture.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.level, Some(Level::INFO));
        assert_eq!(event.target, "security");
        let field = |name: &str| {
            event
                .fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(field("level").as_deref(), Some("WARN"));
        assert_eq!(field("event").as_deref(), Some("auth_failed"));
        assert_eq!(field("reason").as_deref(), Some("bad signature"));
        assert_eq!(field("user_id").as_deref(), Some("7"));
    }
}
