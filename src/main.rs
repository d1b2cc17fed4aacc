use std::collections::HashMap;
use std::sync::Arc;

use admissions_desk::config::AppConfig;
use admissions_desk::error::AppError;
use admissions_desk::infra::{
    FixedMeetingLinks, LogMailer, MemoryAdmissionsRepository, NotificationHub,
};
use admissions_desk::telemetry;
use admissions_desk::workflows::admissions::{
    admissions_router, AdmissionsConfig, AdmissionsRepository, AdmissionsService, Role,
    ScoreWeights, User, UserId,
};
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Duration;
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Admissions Desk",
    about = "Schedule admission interviews and finalize enrollment decisions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let args = match cli.command {
        Some(Command::Serve(args)) => args,
        None => ServeArgs::default(),
    };
    if let Err(err) = run(args).await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();

    let repository = Arc::new(MemoryAdmissionsRepository::default());
    let addresses = seed_directory(repository.as_ref())
        .map_err(|err| AppError::Startup(format!("seeding demo directory: {err}")))?;
    let notifier = Arc::new(NotificationHub::with_mailer(
        Arc::new(LogMailer::default()),
        addresses,
    ));
    let meetings = Arc::new(FixedMeetingLinks::new("interview"));

    let admissions_config = AdmissionsConfig {
        default_interview_duration: Duration::minutes(
            config.scheduling.default_interview_minutes,
        ),
        weights: ScoreWeights::default(),
    };
    let service = Arc::new(AdmissionsService::new(
        repository,
        notifier,
        meetings,
        admissions_config,
    ));

    let app = admissions_router(service)
        .route("/healthz", get(|| async { "ok" }))
        .route(
            "/metrics",
            get(move || async move { prometheus_handle.render() }),
        )
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(?config.environment, %addr, "admissions desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// The identity provider is external; local runs get a small fixed
/// directory so every role is exercisable out of the box.
fn seed_directory(
    repository: &MemoryAdmissionsRepository,
) -> Result<HashMap<UserId, String>, admissions_desk::workflows::admissions::RepositoryError> {
    let users = [
        ("admin-1", Role::Admin, "Dana Admin"),
        ("interviewer-1", Role::Interviewer, "Iris Interviewer"),
        ("interviewer-2", Role::Interviewer, "Ivan Interviewer"),
        ("candidate-1", Role::Candidate, "Casey Candidate"),
        ("candidate-2", Role::Candidate, "Corey Candidate"),
    ];

    let mut addresses = HashMap::new();
    for (id, role, name) in users {
        let email = format!("{id}@admissions.example");
        repository.upsert_user(User {
            id: UserId(id.to_string()),
            role,
            display_name: name.to_string(),
            email: email.clone(),
        })?;
        addresses.insert(UserId(id.to_string()), email);
    }
    Ok(addresses)
}
