use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pdf_translator::ui::command::spawn_stdin_reader;
use pdf_translator::ui::{run_event_loop, ConsolePresenter, Controller};
use pdf_translator::utils::{logger, validation::Validate};
use pdf_translator::{
    AppConfig, CliArgs, ConnectivityMonitor, DeepLClient, DocumentPicker, TcpProbe,
    TranslationOrchestrator,
};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting pdf-translator");

    let config = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return Err(e).context("invalid configuration");
    }

    let credential = config.credential();
    if credential.is_blank() {
        tracing::warn!("No DeepL auth key configured; translations will be refused");
    }

    let service = DeepLClient::new(config.deepl_settings()).context("failed to build HTTP client")?;
    let orchestrator = Arc::new(TranslationOrchestrator::new(service));

    let probe = TcpProbe::new(config.probe_address()?, config.probe_timeout());
    let (connectivity, monitor) = ConnectivityMonitor::new(probe, config.probe_interval()).spawn();

    let mut presenter = ConsolePresenter::stdout();
    presenter.open_window();

    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let controller = Controller::new(
        orchestrator,
        presenter,
        DocumentPicker::default(),
        credential,
        config.default_language()?,
        outcome_tx,
    );

    run_event_loop(controller, connectivity, spawn_stdin_reader(), outcome_rx).await;

    monitor.abort();
    tracing::info!("pdf-translator stopped");
    Ok(())
}
