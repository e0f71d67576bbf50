// ctrsum process: read inputs, classify, aggregate, write the summary workbook

use std::path::{Path, PathBuf};

use ctrsum_config::settings::Settings;
use ctrsum_config::JsonFileStore;
use ctrsum_core::{Aggregator, BatchReport, ClassifierChain, IndicatorStore, MemoryStore};
use ctrsum_io::{discover_inputs, read_first_sheet, write_report};
use tracing::info;

use crate::exit_codes::EXIT_FILES_SKIPPED;
use crate::util::{format_amount, format_ctr, render_table};
use crate::{CliError, ProcessArgs};

/// Widest column in console previews.
const MAX_CELL_WIDTH: usize = 40;

pub(crate) fn cmd_process(args: ProcessArgs) -> Result<(), CliError> {
    let settings = Settings::load();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.processing.output_name));
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| settings.company_config_path(Path::new("")));

    let files = discover_inputs(&args.inputs, Some(output.as_path())).map_err(|e| CliError::args(e.to_string()))?;

    // AI failures fall through to the capitalization heuristic
    let ai = ai::classifier(&args, &settings)?;
    let mut chain = if args.heuristic || settings.processing.heuristic_fallback || ai.is_some() {
        ClassifierChain::with_heuristic()
    } else {
        ClassifierChain::dictionary_only()
    };
    if let Some(ai) = ai {
        chain.prepend(ai);
    }

    if files.is_empty() {
        eprintln!("Nothing to process: no spreadsheet files found.");
        return Ok(());
    }

    let learn = settings.processing.learn && !args.no_learn;
    let mut file_store = JsonFileStore::new(&config_path);
    let mut memory_store;
    let store: &mut dyn IndicatorStore = if args.no_persist {
        memory_store = MemoryStore::new(file_store.load());
        &mut memory_store
    } else {
        &mut file_store
    };

    info!(
        files = files.len(),
        strategies = ?chain.strategy_names(),
        config = %config_path.display(),
        learn,
        "processing batch"
    );

    let mut aggregator = Aggregator::new(&chain, store).learning(learn);
    for path in &files {
        let name = file_label(path);
        // Failures are recorded in the report
        let _ = aggregator.process_file(&name, read_first_sheet(path));
    }
    let report = aggregator.finish();

    if report.monthly.is_empty() {
        eprintln!(
            "Nothing to process: none of {} file(s) could be read.",
            files.len()
        );
        print_failures(&report);
        return strict_check(&args, &report);
    }

    write_report(&report, &output)
        .map_err(|e| CliError::output(e.to_string()).with_hint("check that the output directory exists and the file is not open elsewhere"))?;

    if args.json {
        let json = serde_json::json!({
            "schema_version": 1,
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "output": output.display().to_string(),
            "config": config_path.display().to_string(),
            "strategies": chain.strategy_names(),
            "report": report,
        });
        let text = serde_json::to_string_pretty(&json).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
    }

    if !args.quiet {
        print_summary(&report);
    }
    if !report.newly_detected.is_empty() {
        let saved = if !learn || args.no_persist {
            String::new()
        } else if file_store.read_error().is_some() {
            format!(" (not saved: {} could not be read)", config_path.display())
        } else {
            format!(" (saved to {})", config_path.display())
        };
        eprintln!("New companies detected: {}{}", report.newly_detected.join(", "), saved);
    }
    print_failures(&report);
    eprintln!(
        "Wrote {} ({} companies, {} files)",
        output.display(),
        report.company_summary.len(),
        report.monthly.len()
    );

    strict_check(&args, &report)
}

fn strict_check(args: &ProcessArgs, report: &BatchReport) -> Result<(), CliError> {
    if args.strict && !report.failures.is_empty() {
        return Err(CliError {
            code: EXIT_FILES_SKIPPED,
            message: format!("{} file(s) skipped", report.failures.len()),
            hint: None,
        });
    }
    Ok(())
}

/// Name recorded in the Monthly Summary: the file name without directories.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_summary(report: &BatchReport) {
    let company_rows: Vec<Vec<String>> = report
        .company_summary
        .iter()
        .map(|r| {
            vec![
                r.company.clone(),
                format_amount(r.total_search_volume),
                format_amount(r.total_traffic),
                format_ctr(r.ctr),
            ]
        })
        .collect();
    eprintln!("Company Summary");
    eprint!(
        "{}",
        render_table(&["Company", "Total Search Volume", "Total Traffic", "CTR"], &company_rows, 1, MAX_CELL_WIDTH)
    );
    eprintln!();

    let monthly_rows: Vec<Vec<String>> = report
        .monthly
        .iter()
        .map(|r| {
            vec![
                r.file_name.clone(),
                r.company.clone(),
                format_amount(r.monthly_search_volume),
                format_amount(r.monthly_traffic),
            ]
        })
        .collect();
    eprintln!("Monthly Summary");
    eprint!(
        "{}",
        render_table(
            &["File Name", "Company", "Monthly Search Volume", "Monthly Traffic"],
            &monthly_rows,
            2,
            MAX_CELL_WIDTH
        )
    );
    eprintln!();
}

fn print_failures(report: &BatchReport) {
    if report.failures.is_empty() {
        return;
    }
    eprintln!("Skipped {} file(s):", report.failures.len());
    for failure in &report.failures {
        eprintln!("  {}: {}", failure.file_name, failure.error);
    }
}

#[cfg(feature = "ai")]
mod ai {
    use std::time::Duration;

    use ctrsum_ai_client::{AiClientConfig, OpenAiClassifier};
    use ctrsum_config::ai::{env_var_name, ResolvedAIConfig};
    use ctrsum_config::settings::{AIProvider, Settings};
    use ctrsum_core::CompanyClassifier;

    use crate::{CliError, ProcessArgs};

    /// AI strategy for this run, if enabled and a key is available.
    ///
    /// `--ai` turns the OpenAI provider on even when settings say none, and
    /// makes a missing key an error. Enabled from settings alone, a missing
    /// key only drops the strategy.
    pub(super) fn classifier(
        args: &ProcessArgs,
        settings: &Settings,
    ) -> Result<Option<Box<dyn CompanyClassifier>>, CliError> {
        let mut ai_settings = settings.ai.clone();
        if args.ai && !ai_settings.provider.is_enabled() {
            ai_settings.provider = AIProvider::OpenAI;
        }
        if !ai_settings.provider.is_enabled() {
            return Ok(None);
        }
        if let Some(model) = &args.model {
            ai_settings.model = model.clone();
        }

        let resolved = ResolvedAIConfig::resolve(&ai_settings, args.api_key.clone());
        let Some(api_key) = resolved.api_key.clone() else {
            if args.ai {
                return Err(CliError::ai_missing_key("AI classification requested but no API key found")
                    .with_hint(format!("pass --api-key, set {}, or store the key in the system keychain", env_var_name(resolved.provider.name()))));
            }
            tracing::info!("no AI API key found, AI classification skipped");
            return Ok(None);
        };

        tracing::info!(model = %resolved.model, endpoint = %resolved.endpoint, key_source = resolved.key_source.as_str(), "AI classification enabled");
        let classifier = OpenAiClassifier::new(AiClientConfig {
            endpoint: resolved.endpoint,
            model: resolved.model,
            api_key,
            timeout: Duration::from_secs(resolved.timeout_secs),
            temperature: resolved.temperature,
            max_tokens: resolved.max_tokens,
        })
        .map_err(|e| CliError::general(e.to_string()))?;
        Ok(Some(Box::new(classifier)))
    }
}

#[cfg(not(feature = "ai"))]
mod ai {
    use ctrsum_config::settings::Settings;
    use ctrsum_core::CompanyClassifier;

    use crate::{CliError, ProcessArgs};

    pub(super) fn classifier(
        args: &ProcessArgs,
        settings: &Settings,
    ) -> Result<Option<Box<dyn CompanyClassifier>>, CliError> {
        if args.ai {
            return Err(CliError::ai_disabled("this build has no AI support").with_hint("rebuild with --features ai"));
        }
        if settings.ai.provider.is_enabled() {
            tracing::info!("AI provider configured but this build has no AI support");
        }
        Ok(None)
    }
}
