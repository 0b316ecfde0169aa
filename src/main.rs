use clap::Parser;
use small_mediator::app::users::{CreateUser, GetUser, UserCreated, UsersModule};
use small_mediator::utils::error::MediatorError;
use small_mediator::utils::logger::{self, LogFormat};
use small_mediator::utils::validation::Validate;
use small_mediator::{CliConfig, HandlerRegistry, Mediator, MediatorConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, cli.verbose);

    tracing::info!("Starting mediator-demo");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match &cli.config {
        Some(path) => MediatorConfig::from_file(path),
        None => Ok(MediatorConfig::default()),
    }
    .and_then(|config| config.validate().map(|_| config));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let module = UsersModule::new();
    let mut builder = HandlerRegistry::builder();
    if let Err(e) = builder.install(&module) {
        fail(e);
    }
    let mediator = Mediator::new(Arc::new(builder.build()), &config);

    if let Err(e) = run(&mediator, &cli).await {
        fail(e);
    }

    for entry in module.journal().lock().await.iter() {
        tracing::debug!("📝 {}", entry);
    }
    for (request, stats) in mediator.telemetry().snapshot() {
        tracing::info!(
            "📊 {}: {} total, {} ok, {} failed, avg {:?}",
            request,
            stats.total,
            stats.succeeded,
            stats.failed,
            stats.average_duration().unwrap_or_default()
        );
    }

    Ok(())
}

async fn run(mediator: &Mediator, cli: &CliConfig) -> Result<(), MediatorError> {
    let user = mediator
        .send(CreateUser {
            name: cli.name.clone(),
            email: cli.email.clone(),
            age: cli.age,
        })
        .await?;
    println!("✅ Created user #{}: {} <{}>", user.id, user.name, user.email);

    let report = mediator.publish(UserCreated { user: user.clone() }).await;
    println!(
        "📣 {} delivered to {}/{} subscriber(s)",
        report.notification,
        report.succeeded(),
        report.handlers
    );
    for failure in &report.failures {
        eprintln!("⚠️ #{} {}: {}", failure.index, failure.handler, failure.message);
    }

    let id = if cli.lookup_missing { user.id + 1000 } else { user.id };
    match mediator.send(GetUser { id }).await? {
        Some(found) => println!("🔎 Found user #{}: {}", found.id, found.name),
        None => println!("🔎 No user with id {}", id),
    }

    Ok(())
}

fn fail(e: MediatorError) -> ! {
    tracing::error!(
        "❌ Dispatch failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    if let Some(failures) = e.failures() {
        for failure in failures {
            eprintln!("   - {}", failure);
        }
    }
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    std::process::exit(e.exit_code());
}
