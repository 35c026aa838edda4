use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{error, info, warn};

use hostel_api::{build_router, AppState};
use hostel_core::repositories::AuditRecorder;
use hostel_core::services::notification::{EmailSender, MessageTemplates, NotificationDispatcher, SmsSender};
use hostel_core::services::Services;
use hostel_infrastructure::{
    create_pool, run_migrations, AuditLogger, HttpSmsSender, PgMessageHistoryRepository, PgRepositories,
    SmtpEmailSender,
};
use hostel_security::JwtService;
use hostel_shared::config::{AppConfig, NotificationSettings};
use hostel_shared::telemetry::init_telemetry;

const AUDIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_telemetry(&config.log)?;

    info!("{} starting ({})", config.app.name, config.app.env);

    // Database
    let pool = create_pool(&config.database).await?;
    info!("Database connection established");

    if config.database.run_migrations {
        run_migrations(&pool).await?;
        info!("Database migrations applied");
    }

    // Notification channels
    let (email, sms) = delivery_channels(&config.notifications);
    let templates = MessageTemplates::new(config.notifications.currency_suffix.clone())
        .map_err(|e| anyhow::anyhow!("notification templates failed to compile: {}", e))?;
    let notifier = Arc::new(NotificationDispatcher::new(
        email,
        sms,
        Arc::new(PgMessageHistoryRepository::new(pool.clone())),
        templates,
    ));

    // Audit trail
    let (audit_logger, audit_workers) = AuditLogger::new(pool.clone(), &config.audit);
    let audit: Arc<dyn AuditRecorder> = Arc::new(audit_logger);

    let services = Services::new(
        PgRepositories::build(&pool),
        audit,
        notifier,
        chrono::Duration::seconds(config.ledger.duplicate_window_secs as i64),
    );
    let jwt = Arc::new(JwtService::new(config.jwt.secret.clone(), config.jwt.access_token_expiry));

    let app = build_router(AppState::new(services, jwt))
        .layer(cors_layer(&config.app.allowed_origins))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()));

    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // The router held the last audit sender; the workers now flush and stop
    info!("Server stopped, flushing audit trail");
    audit_workers.drain(AUDIT_DRAIN_TIMEOUT).await;

    served?;
    Ok(())
}

/// Builds the configured senders. A channel that fails to initialise is
/// disabled with an error log; the server still starts.
fn delivery_channels(
    settings: &NotificationSettings,
) -> (Option<Arc<dyn EmailSender>>, Option<Arc<dyn SmsSender>>) {
    let email: Option<Arc<dyn EmailSender>> = if settings.email.enabled {
        match SmtpEmailSender::new(&settings.email) {
            Ok(sender) => {
                info!("Email notifications enabled via {}", settings.email.smtp_host);
                Some(Arc::new(sender))
            }
            Err(e) => {
                error!("Email notifications disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    let sms: Option<Arc<dyn SmsSender>> = if settings.sms.enabled {
        match HttpSmsSender::new(&settings.sms) {
            Ok(sender) => {
                info!("SMS notifications enabled");
                Some(Arc::new(sender))
            }
            Err(e) => {
                error!("SMS notifications disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    if email.is_none() && sms.is_none() {
        warn!("No notification channel configured; messages will only be logged");
    }

    (email, sms)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("idempotency-key"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. If the handler cannot be installed the server
/// keeps running rather than shutting down straight away.
async fn wait_for_shutdown<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_starts_shutdown() {
        let done = tokio::time::timeout(Duration::from_millis(100), wait_for_shutdown(async { Ok(()) })).await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn failed_signal_handler_keeps_serving() {
        let failing = async { Err(std::io::Error::other("no signal support")) };
        let done = tokio::time::timeout(Duration::from_millis(100), wait_for_shutdown(failing)).await;
        assert!(done.is_err());
    }
}
