use std::{process, sync::Arc};

use perch::{
    application::{
        auth::AuthService,
        error::AppError,
        notifications::NotificationService,
        posts::PostService,
        repos::{NotificationsRepo, PostsRepo, SessionsRepo, UsersRepo},
        users::UserService,
    },
    config,
    infra::{
        db::PgRepositories,
        error::InfraError,
        http::{self, RouterState},
        telemetry,
    },
};
use time::OffsetDateTime;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    sweep_expired_sessions(repositories.as_ref()).await;
    let state = build_router_state(repositories, &settings);

    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.listen_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        addr = %settings.server.listen_addr,
        mode = ?settings.server.mode,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn init_repositories(settings: &config::Settings) -> Result<Arc<PgRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PgRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PgRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PgRepositories::new(pool)))
}

// Best-effort boot cleanup; stale rows also fail authentication individually.
async fn sweep_expired_sessions(sessions: &dyn SessionsRepo) {
    match sessions
        .delete_expired_sessions(OffsetDateTime::now_utc())
        .await
    {
        Ok(removed) if removed > 0 => info!(removed, "expired sessions removed"),
        Ok(_) => {}
        Err(err) => warn!(error = %err, "expired session sweep failed"),
    }
}

fn build_router_state(
    repositories: Arc<PgRepositories>,
    settings: &config::Settings,
) -> RouterState {
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repositories.clone();
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let notifications_repo: Arc<dyn NotificationsRepo> = repositories;

    RouterState {
        auth: Arc::new(AuthService::new(users_repo.clone(), sessions_repo)),
        users: Arc::new(UserService::new(
            users_repo.clone(),
            notifications_repo.clone(),
        )),
        posts: Arc::new(PostService::new(
            posts_repo,
            users_repo,
            notifications_repo.clone(),
        )),
        notifications: Arc::new(NotificationService::new(notifications_repo)),
        mode: settings.server.mode,
    }
}
