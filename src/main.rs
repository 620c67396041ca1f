use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;

use auth_api::create_app;
use auth_api::shared::clients::{EmailSender, LogEmailSender, SmtpEmailSender};
use auth_api::shared::config::AppConfig;
use auth_api::shared::database::{
    Database, MemoryStore, RefreshTokenRepository, RefreshTokenStore, UserRepository, UserStore,
};
use auth_api::shared::services::{spawn_failure_logger, AppState, NotificationService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // 저장소: DATABASE_URL이 있으면 PostgreSQL, 없으면 인메모리
    let (users, tokens) = match &config.database_url {
        Some(database_url) => {
            let db = Database::new(database_url)
                .await
                .context("Failed to connect to database")?;
            db.initialize()
                .await
                .context("Failed to initialize database")?;

            tracing::info!("using PostgreSQL store");
            let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db.pool().clone()));
            let tokens: Arc<dyn RefreshTokenStore> = Arc::new(RefreshTokenRepository::new(db.pool().clone()));
            (users, tokens)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            let store = MemoryStore::new();
            let users: Arc<dyn UserStore> = Arc::new(store.clone());
            let tokens: Arc<dyn RefreshTokenStore> = Arc::new(store);
            (users, tokens)
        }
    };

    // 메일 전송기: SMTP 자격 증명이 있으면 SMTP, 없으면 로그만
    let sender: Arc<dyn EmailSender> = match &config.smtp {
        Some(smtp) => {
            let smtp_sender = Arc::new(
                SmtpEmailSender::new(smtp).context("Failed to configure SMTP transport")?,
            );

            let checker = smtp_sender.clone();
            tokio::spawn(async move {
                match checker.test_connection().await {
                    Ok(true) => tracing::info!("email service connected"),
                    Ok(false) => tracing::error!("email service rejected the connection"),
                    Err(e) => tracing::error!(error = %e, "email service connection failed"),
                }
            });

            tracing::info!(host = %smtp.host, port = smtp.port, "using SMTP email transport");
            smtp_sender as Arc<dyn EmailSender>
        }
        None => {
            tracing::warn!("Email credentials not configured. Emails will only be logged.");
            Arc::new(LogEmailSender)
        }
    };

    // 메일 발송 실패는 채널로 받아 로그로 남김
    let (notifications, failures) =
        NotificationService::new(sender, config.email.clone()).with_failure_channel();
    spawn_failure_logger(failures);

    // AppState 생성 (모든 Service 초기화)
    let app_state = AppState::new(&config, users, tokens, notifications)
        .context("Failed to initialize AppState")?;
    app_state.ledger_cleanup_scheduler.start();

    let app = create_app(app_state, &config);

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, "auth api listening");
    tracing::info!("Swagger UI available at http://localhost:{}/docs", config.port);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
