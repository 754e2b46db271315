use paperhearts::auth::AuthConfig;
use paperhearts::reveal::RevealGate;
use paperhearts::selections::locks::UserLocks;
use paperhearts::{app, db, AppState};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("paperhearts=info")))
        .init();

    let database_path =
        dotenv::var("DATABASE_PATH").unwrap_or_else(|_| "paperhearts.db".to_owned());
    let bind_addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    let deadline =
        dotenv::var("REVEAL_DEADLINE").unwrap_or_else(|_| "2026-02-14T00:00:00Z".to_owned());
    let allowed_email_domain = dotenv::var("ALLOWED_EMAIL_DOMAIN").ok();

    let db_pool = db::open(&database_path).await.unwrap();
    let reveal_gate = RevealGate::parse(&deadline).unwrap();

    let app_state = AppState {
        db_pool,
        locks: UserLocks::new(),
        reveal: reveal_gate,
        auth: AuthConfig { allowed_email_domain },
    };

    tracing::info!("listening on {bind_addr}, reveal at {deadline}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    axum::serve(listener, app(app_state)).await.unwrap();
}
