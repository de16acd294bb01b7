use image_lifecycle::adapters::outbound::filesystem::FileSystemPayloadReader;
use image_lifecycle::adapters::outbound::persistence::SqliteStore;
use image_lifecycle::application::dto::{BuildRequest, CompletionPayload, OutputFormat};
use image_lifecycle::application::factories::{
    FormatterFactory, OrchestratorFactory, PresenterFactory, PresenterType,
};
use image_lifecycle::application::read_models::LifecycleReport;
use image_lifecycle::application::services::{AuditRecorder, SlaScheduler};
use image_lifecycle::application::use_cases::{
    BuildLifecycleUseCase, CatalogUseCase, SlaEvaluationUseCase,
};
use image_lifecycle::cli::{
    Args, AuditCommand, Command, CustomersCommand, ImagesCommand, SlaCommand,
};
use image_lifecycle::config::{self, Overrides, Settings, DATABASE_ENV};
use image_lifecycle::lifecycle::domain::{
    BuildEventId, ImageId, NewCustomer, SlaTier, TenantNamespace,
};
use image_lifecycle::ports::inbound::BuildLifecyclePort;
use image_lifecycle::ports::outbound::{BuildOrchestrator, PayloadReader};
use image_lifecycle::shared::error::{AppError, ExitCode};
use image_lifecycle::shared::Result;
use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use std::future::Future;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

type Lifecycle =
    BuildLifecycleUseCase<SqliteStore, SqliteStore, Box<dyn BuildOrchestrator>, SqliteStore>;
type Evaluation = SlaEvaluationUseCase<SqliteStore, SqliteStore, SqliteStore, SqliteStore>;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::InvalidArguments
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            process::exit(code.as_i32());
        }
    };

    if let Err(e) = run(args) {
        eprintln!("\n{}\n", "❌ An error occurred:".red().bold());
        eprintln!("{}", e);

        // Display error chain
        for cause in e.chain().skip(1) {
            eprintln!("\nCaused by: {}", cause);
        }

        eprintln!();
        process::exit(ExitCode::for_error(&e).as_i32());
    }
}

fn run(args: Args) -> Result<()> {
    let config = match args.config.as_deref() {
        Some(path) => config::load_config_from_path(path)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read the working directory")?;
            config::discover_config(&cwd)?.unwrap_or_default()
        }
    };

    let settings = Settings::resolve(
        config,
        Overrides {
            database_path: args.database.clone(),
            log_level: args.log_level.clone(),
        },
        std::env::var(DATABASE_ENV).ok(),
    );
    init_logging(&settings.log_level)?;

    let format = args.format.or(settings.format).unwrap_or_default();
    let presenter_type = PresenterType::from_output(args.output.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(execute(args.command, &settings, format, presenter_type))
}

/// Sends diagnostics to stderr; `RUST_LOG` wins over the configured level
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level: {}", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

/// Bounds an operation by the configured timeout
async fn with_timeout<T>(
    limit: Duration,
    operation: &str,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout {
            operation: operation.to_string(),
            seconds: limit.as_secs(),
        }
        .into()),
    }
}

fn tenant(namespace: &str) -> Result<TenantNamespace> {
    Ok(TenantNamespace::new(namespace.trim())?)
}

async fn execute(
    command: Command,
    settings: &Settings,
    format: OutputFormat,
    presenter_type: PresenterType,
) -> Result<()> {
    let store = Arc::new(
        SqliteStore::open(&settings.database_path).with_context(|| {
            format!(
                "Failed to open database: {}",
                settings.database_path.display()
            )
        })?,
    );
    tracing::debug!(database = %settings.database_path.display(), "database opened");

    let orchestrator = OrchestratorFactory::create(
        settings.orchestrator_endpoint.as_deref(),
        settings.orchestrator_timeout,
    )?;
    let lifecycle: Lifecycle = BuildLifecycleUseCase::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(orchestrator),
        AuditRecorder::new(Arc::clone(&store)),
    )
    .with_actor(settings.actor.clone());
    let evaluation: Evaluation = SlaEvaluationUseCase::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        AuditRecorder::new(Arc::clone(&store)),
        settings.sla_policy,
    );
    let catalog = CatalogUseCase::new(Arc::clone(&store));
    let limit = settings.operation_timeout;

    let report = match command {
        Command::RequestBuild {
            tenant,
            trigger,
            actor,
        } => {
            let request = BuildRequest::new(&tenant, &trigger)?
                .with_actor(actor.unwrap_or_else(|| settings.actor.clone()));
            let event = with_timeout(limit, "request build", async {
                lifecycle
                    .request_build(request)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Build(event))
        }
        Command::CompleteBuild { id, payload } => {
            let text = FileSystemPayloadReader::new().read_payload(&payload)?;
            let payload = CompletionPayload::from_json(&text)?;
            let completed = with_timeout(limit, "complete build", async {
                lifecycle
                    .complete_build(BuildEventId::new(id), payload)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Completion(Box::new(completed)))
        }
        Command::FailBuild { id, reason } => {
            let event = with_timeout(limit, "fail build", async {
                lifecycle
                    .fail_build(BuildEventId::new(id), &reason)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Build(event))
        }
        Command::ShowBuild { id } => {
            let event = with_timeout(limit, "show build", async {
                catalog
                    .show_build(BuildEventId::new(id))
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Build(event))
        }
        Command::ListBuilds { tenant: namespace } => {
            let namespace = tenant(&namespace)?;
            let events = with_timeout(limit, "list builds", async {
                catalog
                    .list_builds(&namespace)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Builds(events))
        }
        Command::Images(ImagesCommand::List { tenant: namespace }) => {
            let namespace = namespace.as_deref().map(tenant).transpose()?;
            let images = with_timeout(limit, "list images", async {
                catalog
                    .list_images(namespace.as_ref())
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Images(images))
        }
        Command::Images(ImagesCommand::Show { id }) => {
            let detail = with_timeout(limit, "show image", async {
                catalog
                    .image_detail(ImageId::new(id))
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::ImageDetail(Box::new(detail)))
        }
        Command::Customers(CustomersCommand::List) => {
            let customers = with_timeout(limit, "list customers", async {
                catalog
                    .list_customers()
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Customers(customers))
        }
        Command::Customers(CustomersCommand::Show { namespace }) => {
            let namespace = tenant(&namespace)?;
            let customer = with_timeout(limit, "show customer", async {
                catalog
                    .show_customer(&namespace)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Customer(customer))
        }
        Command::Customers(CustomersCommand::Add(add)) => {
            let customer = NewCustomer::new(
                tenant(&add.namespace)?,
                add.name,
                add.contact,
                SlaTier::from_label(&add.tier),
            )?;
            let created = with_timeout(limit, "register customer", async {
                catalog
                    .register_customer(customer)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Customer(created))
        }
        Command::Sla(SlaCommand::Evaluate) => {
            let sweep = with_timeout(limit, "evaluate sla", async {
                evaluation
                    .evaluate()
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::SlaSweep(sweep))
        }
        Command::Sla(SlaCommand::Watch { interval }) => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or(settings.sweep_interval);
            watch_sla(evaluation, interval).await?;
            None
        }
        Command::Sla(SlaCommand::List {
            tenant: namespace,
            active,
        }) => {
            let namespace = tenant(&namespace)?;
            let violations = with_timeout(limit, "list sla violations", async {
                catalog
                    .list_violations(&namespace, active)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::Violations(violations))
        }
        Command::Audit(AuditCommand::List { tenant: namespace }) => {
            let namespace = tenant(&namespace)?;
            let entries = with_timeout(limit, "list audit log", async {
                catalog
                    .list_audit(&namespace)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;
            Some(LifecycleReport::AuditLog(entries))
        }
    };

    if !lifecycle.drain_triggers(settings.orchestrator_timeout).await {
        tracing::warn!("exiting with build triggers still in flight");
    }

    if let Some(report) = report {
        let formatter = FormatterFactory::create(format);
        let rendered = formatter.format(&report)?;
        PresenterFactory::create(presenter_type).present(&rendered)?;
    }

    Ok(())
}

/// Runs the SLA scheduler until Ctrl-C
async fn watch_sla(evaluation: Evaluation, interval: Duration) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = SlaScheduler::new(Arc::new(evaluation), interval);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("interrupt received, stopping after the current sweep"),
            Err(e) => tracing::warn!(error = %e, "failed to listen for interrupt"),
        }
        let _ = shutdown_tx.send(true);
    });

    let sweeps = scheduler.run(shutdown_rx).await;
    eprintln!("{} {} SLA sweep(s) completed", "✅".green(), sweeps);
    Ok(())
}
