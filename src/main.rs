use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use nddf::adapter::{excel, export, http};
use nddf::app::{compute_all, Progress};
use nddf::cli::{Cli, Command};
use nddf::config::Config;
use nddf::domain::solver::HighsSolver;
use nddf::domain::ModelConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    config.init_logging();

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let state = web::Data::new(http::AppState::new(
                Arc::new(HighsSolver::new()),
                config.compute.max_workers,
            ));
            http::run_server(&bind, state).await?;
        }
        Command::Compute {
            input,
            model,
            sheet,
            output,
        } => {
            run_compute(&config, &input, &model, sheet, output).await?;
        }
    }

    Ok(())
}

/// Local batch: read the workbook, solve every DMU, export the results.
async fn run_compute(
    config: &Config,
    input: &PathBuf,
    model_path: &PathBuf,
    sheet: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let model_text = std::fs::read_to_string(model_path)
        .with_context(|| format!("reading model config {}", model_path.display()))?;
    let model: ModelConfig = toml::from_str(&model_text)
        .with_context(|| format!("parsing model config {}", model_path.display()))?;

    let bytes =
        std::fs::read(input).with_context(|| format!("reading workbook {}", input.display()))?;
    let sheet_name = match sheet {
        Some(name) => name,
        None => excel::sheet_names(&bytes)?
            .into_iter()
            .next()
            .context("workbook has no sheets")?,
    };
    let data = excel::read_sheet(&bytes, &sheet_name)?;

    let progress = Arc::new(Progress::new());
    let bar = ProgressBar::new(data.total_rows as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} DMUs ({eta})") {
        bar.set_style(style);
    }

    let poller = tokio::spawn({
        let progress = progress.clone();
        let bar = bar.clone();
        async move {
            loop {
                let (current, total) = progress.snapshot();
                if total > 0 {
                    bar.set_position(current as u64);
                    if current >= total {
                        break;
                    }
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    });

    let outcome = compute_all(
        &data.records,
        &model,
        Arc::new(HighsSolver::new()),
        &progress,
        config.compute.max_workers,
    )
    .await;
    poller.abort();
    let _ = poller.await;
    bar.finish();
    let results = outcome?;

    let out_path = output.unwrap_or_else(|| PathBuf::from(export::export_filename(&model)));
    let workbook = export::results_workbook(&model, &results)?;
    std::fs::write(&out_path, workbook)
        .with_context(|| format!("writing {}", out_path.display()))?;

    info!(
        sheet = sheet_name,
        submitted = data.total_rows,
        solved = results.len(),
        output = %out_path.display(),
        "compute finished"
    );

    Ok(())
}
