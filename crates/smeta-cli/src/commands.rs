//! Command handlers

use crate::cli::{Cli, Commands, HintArgs};
use crate::output::{output_estimate, output_outcome, output_report, save_json};
use indicatif::{ProgressBar, ProgressStyle};
use smeta_app::app::{build_estimate, hints_from_analysis, AnalysisOrchestrator, AnalysisOutcome};
use smeta_app::config::Config;
use smeta_app::scanner::collect_pages;
use smeta_domain::{merge, validate_analysis, LineOverride, SanityChecker};
use smeta_infra::PriceCatalogLoader;
use smeta_types::{BuildingAnalysis, Error, OutputFormat, Result};
use smeta_vision::{parse_page_response, CommandBackend, VisionExtractor};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref command) = cli.vision_command {
        config.vision_command = Some(command.clone());
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Analyze {
            pages,
            hints,
            output,
        } => cmd_analyze(&config, &pages, &hints, output, output_format),

        Commands::Merge {
            pages,
            hints,
            output,
        } => cmd_merge(&config, &pages, &hints, output, output_format),

        Commands::Estimate {
            analysis,
            hints,
            catalog,
            overrides,
            output,
        } => {
            // CLI catalog wins over the configured one
            let catalog = catalog.or_else(|| config.price_catalog.clone());
            cmd_estimate(
                &config,
                &analysis,
                &hints,
                catalog,
                overrides.as_deref(),
                output,
                output_format,
            )
        }

        Commands::Config {
            show,
            set_vision_command,
            set_catalog,
            set_output,
            reset,
        } => cmd_config(show, set_vision_command, set_catalog, set_output, reset),
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn cmd_analyze(
    config: &Config,
    inputs: &[String],
    hint_args: &HintArgs,
    output: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let hints = hint_args.resolve()?;
    let pages = collect_pages(inputs)?;
    if pages.is_empty() {
        return Err(Error::EmptyInput);
    }

    let backend = CommandBackend::new(config.require_vision_command()?)?;
    info!(program = backend.program(), pages = pages.len(), "starting analysis");

    let pb = spinner();
    let progress_pb = pb.clone();
    let orchestrator = AnalysisOrchestrator::new(VisionExtractor::new(backend), &config.options)?
        .with_progress(Box::new(move |msg| progress_pb.set_message(msg.to_string())));

    let result = orchestrator.run_report(&pages, hints.as_ref());
    pb.finish_and_clear();
    let report = result?;

    if let Some(path) = output {
        save_json(&path, &report)?;
    }
    output_report(output_format, &report)
}

fn read_page_result(index: usize, path: &Path) -> Result<BuildingAnalysis> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_page_response(&content).map_err(|e| match e {
        Error::SchemaValidation(msg) => Error::SchemaValidation(format!("page {}: {}", index, msg)),
        e => Error::page(index, e),
    })
}

fn cmd_merge(
    config: &Config,
    paths: &[PathBuf],
    hint_args: &HintArgs,
    output: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let hints = hint_args.resolve()?;
    let checker = SanityChecker::new(config.options.sanity.clone())?;

    let results = paths
        .iter()
        .enumerate()
        .map(|(i, path)| read_page_result(i + 1, path))
        .collect::<Result<Vec<_>>>()?;
    debug!(pages = results.len(), "page results loaded");

    let analysis = merge(results)?;
    validate_analysis(&analysis)?;
    let warnings = checker.check(&analysis, hints.as_ref());
    let outcome = AnalysisOutcome { analysis, warnings };

    if let Some(path) = output {
        save_json(&path, &outcome)?;
    }
    output_outcome(output_format, &outcome)
}

/// Read a building model from a bare analysis or a report holding one
fn load_analysis(path: &Path) -> Result<BuildingAnalysis> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let mut value: serde_json::Value = serde_json::from_str(&content)?;
    let analysis = match value.get_mut("analysis") {
        Some(inner) => inner.take(),
        None => value,
    };
    Ok(serde_json::from_value(analysis)?)
}

fn load_overrides(path: &Path) -> Result<Vec<LineOverride>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::InvalidOverride(format!("{}: {}", path.display(), e)))
}

fn cmd_estimate(
    config: &Config,
    analysis_path: &Path,
    hint_args: &HintArgs,
    catalog: Option<PathBuf>,
    overrides: Option<&Path>,
    output: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let analysis = load_analysis(analysis_path)?;
    let hints = match hint_args.resolve()? {
        Some(hints) => hints,
        None => hints_from_analysis(&analysis),
    };

    let catalog = match catalog {
        Some(path) => PriceCatalogLoader::load_from_file(&path)?,
        None => PriceCatalogLoader::builtin(),
    };
    debug!(items = catalog.count(), "price catalog loaded");

    let mut report = build_estimate(&analysis, &hints, &config.options, &catalog)?;
    if let Some(path) = overrides {
        let overrides = load_overrides(path)?;
        report.estimate.apply_overrides(&overrides)?;
        info!(count = overrides.len(), grand_total = report.estimate.grand_total, "overrides applied");
    }

    if let Some(path) = output {
        save_json(&path, &report)?;
    }
    output_estimate(output_format, &report)
}

fn cmd_config(
    show: bool,
    set_vision_command: Option<String>,
    set_catalog: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(command) = set_vision_command {
        // Fail early on a template that cannot be split
        CommandBackend::new(&command)?;
        config.vision_command = Some(command);
        modified = true;
    }

    if let Some(catalog) = set_catalog {
        PriceCatalogLoader::load_from_file(&catalog)?;
        config.price_catalog = Some(catalog);
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_analysis_bare_and_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let bare = dir.path().join("bare.json");
        std::fs::write(
            &bare,
            r#"{"total_area_m2": 20, "rooms": [{"name": "Комната", "area_m2": 20}], "bathrooms_count": 1}"#,
        )
        .unwrap();
        let wrapped = dir.path().join("report.json");
        std::fs::write(
            &wrapped,
            r#"{"warnings": [], "analysis": {"total_area_m2": 20, "rooms": [{"name": "Комната", "area_m2": 20}], "bathrooms_count": 1}}"#,
        )
        .unwrap();

        assert_eq!(load_analysis(&bare).unwrap(), load_analysis(&wrapped).unwrap());
        assert!(matches!(
            load_analysis(&dir.path().join("missing.json")),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fix.json");
        std::fs::write(
            &path,
            r#"[{"stage_code": "FINISH", "work_code": "FIN_SINK", "qty": 2}]"#,
        )
        .unwrap();
        let overrides = load_overrides(&path).unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].qty, Some(2.0));
        assert_eq!(overrides[0].unit_price, None);

        std::fs::write(&path, r#"[{"stage_code": "NOPE", "work_code": "X"}]"#).unwrap();
        assert!(matches!(load_overrides(&path), Err(Error::InvalidOverride(_))));
    }

    #[test]
    fn test_read_page_result_reports_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p3.json");
        std::fs::write(&path, "no json here").unwrap();
        let err = read_page_result(3, &path).unwrap_err();
        assert_eq!(err.page_index(), Some(3));

        std::fs::write(&path, r#"{"bathrooms_count": 1}"#).unwrap();
        match read_page_result(3, &path) {
            Err(Error::SchemaValidation(msg)) => assert!(msg.starts_with("page 3")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
