use std::{
    net::{Ipv4Addr, SocketAddr},
    process::ExitCode,
    sync::Arc,
};

use clap::{Parser, Subcommand};

use asg_reaper::{
    AppState,
    config::ReaperConfig,
    observability::init_tracing,
    provider::{AutoScalingProvider, AutoScalingProviderConfig, GroupLister, GroupTerminator},
    routes::build_app,
    runner,
};

#[derive(Parser)]
#[command(name = "asg-reaper", version, about = "Retires stale deployment clusters")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one pass over a single application and print the decisions.
    Check {
        /// Application namespace to evaluate.
        #[arg(default_value = "alpha")]
        application: String,
    },
    /// Serve the triggered HTTP surface.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match args.command {
        Some(Command::Check { application }) => run_check(&application).await,
        Some(Command::Serve { bind }) => run_server(bind).await,
        None => run_server(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))).await,
    }
}

async fn run_check(application: &str) -> ExitCode {
    let config = ReaperConfig::check_from_env();
    init_tracing(config.log_format, "warn");

    let provider =
        Arc::new(AutoScalingProvider::new(AutoScalingProviderConfig::new(config.region.clone())).await);

    let now = chrono::Utc::now();
    let (mut decisions, summary) = match runner::run_application(
        application,
        &config,
        now,
        provider.as_ref(),
        provider.as_ref(),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    decisions.sort_by(|a, b| {
        a.record
            .service_name
            .cmp(&b.record.service_name)
            .then_with(|| a.record.name.cmp(&b.record.name))
    });

    println!("Application {application}: {} services checked", summary.services_checked);
    for decision in &decisions {
        println!(
            "  {}  v{:<4} (baseline v{}, {}h old)  {}",
            decision.record.name,
            decision.record.version,
            decision.baseline_version,
            decision.age_hours,
            decision.reason,
        );
    }
    println!(
        "kept: {}  terminated: {}  failed: {}",
        summary.kept, summary.terminated, summary.failed
    );

    ExitCode::SUCCESS
}

async fn run_server(bind: SocketAddr) -> ExitCode {
    let config = Arc::new(ReaperConfig::triggered_from_env());
    init_tracing(config.log_format, "info,tower_http=warn");

    tracing::info!(
        region = %config.region,
        applications = ?config.applications,
        max_cluster_age_hours = config.max_cluster_age_hours,
        dry_run = config.dry_run,
        interval_hours = ?config.interval_hours,
        "Starting reaper server"
    );

    let provider = Arc::new(
        AutoScalingProvider::new(AutoScalingProviderConfig::new(config.region.clone())).await,
    );
    let lister: Arc<dyn GroupLister> = provider.clone();
    let terminator: Arc<dyn GroupTerminator> = provider;

    tokio::spawn(runner::start_reaper_worker(
        config.clone(),
        lister.clone(),
        terminator.clone(),
    ));

    let app = build_app(AppState {
        config,
        lister,
        terminator,
    });

    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %bind, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%bind, "Listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
