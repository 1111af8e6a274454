use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tree_history::cli::Cli;
use tree_history::config::Config;
use tree_history::driver::Driver;
use tree_history::interrupt::InterruptFlag;
use tree_history::runner::SystemRunner;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v/-q when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = Config::resolve(cli.config.as_deref(), cli.overrides())?;

    let interrupt = InterruptFlag::new();
    if let Err(e) = interrupt.install_handler() {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }

    let runner = SystemRunner::new(&config.repo_dir, config.snapshot.tree_tool.clone());
    let driver = Driver::new(config, runner).with_interrupt(interrupt);

    match driver.run() {
        Ok(summary) => {
            for warning in summary.warnings() {
                tracing::warn!("{}", warning);
            }
            println!(
                "Done! {}/{} snapshots written to {}",
                summary.succeeded,
                summary.total,
                summary.output_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("{}", e);
            if e.is_before_mutation() {
                tracing::info!("Working tree was not modified");
            }
            let code = u8::try_from(e.exit_code()).unwrap_or(1);
            Ok(ExitCode::from(code))
        }
    }
}
