// ctrsum companies: view and edit company_config.json

use std::path::{Path, PathBuf};

use ctrsum_config::settings::Settings;
use ctrsum_config::JsonFileStore;
use ctrsum_core::{IndicatorDictionary, IndicatorStore};

use crate::util::render_table;
use crate::CliError;

fn config_path(config: Option<PathBuf>) -> PathBuf {
    config.unwrap_or_else(|| Settings::load().company_config_path(Path::new("")))
}

/// Current dictionary, built-in companies when the file does not exist yet.
/// A file that exists but cannot be read is an error here, unlike during
/// processing.
fn read_dictionary(store: &JsonFileStore) -> Result<(IndicatorDictionary, bool), CliError> {
    match store.read() {
        Ok(Some(dict)) => Ok((dict, true)),
        Ok(None) => Ok((IndicatorDictionary::builtin(), false)),
        Err(e) => Err(CliError::store(e.to_string())
            .with_hint(format!("fix or delete {} to start from the built-in companies", store.path().display()))),
    }
}

pub(crate) fn cmd_list(config: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let store = JsonFileStore::new(config_path(config));
    let (dict, from_file) = read_dictionary(&store)?;

    if json {
        let value = serde_json::json!({
            "config": store.path().display().to_string(),
            "source": if from_file { "file" } else { "builtin" },
            "companies": dict,
        });
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::general(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = dict
        .iter()
        .map(|(company, phrases)| vec![company.to_string(), phrases.join(", ")])
        .collect();
    print!("{}", render_table(&["Company", "Indicator Phrases"], &rows, 2, 80));
    if !from_file {
        println!();
        println!("(built-in companies; {} does not exist yet)", store.path().display());
    }
    Ok(())
}

pub(crate) fn cmd_add(config: Option<PathBuf>, name: String, phrases: Vec<String>) -> Result<(), CliError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::args("company name must not be empty"));
    }
    if phrases.iter().all(|p| p.trim().is_empty()) {
        return Err(CliError::args("at least one non-empty phrase is required"));
    }

    let mut store = JsonFileStore::new(config_path(config));
    let (mut dict, _) = read_dictionary(&store)?;
    let added = dict.insert(name, &phrases);
    store.save(&dict).map_err(|e| CliError::store(e.to_string()))?;

    let phrases = dict.phrases(name).unwrap_or_default().join(", ");
    if added {
        println!("Added {}: {}", name, phrases);
    } else {
        println!("Updated {}: {}", name, phrases);
    }
    Ok(())
}

pub(crate) fn cmd_remove(config: Option<PathBuf>, name: String) -> Result<(), CliError> {
    let mut store = JsonFileStore::new(config_path(config));
    let (mut dict, _) = read_dictionary(&store)?;
    if !dict.remove(&name) {
        return Err(CliError::general(format!("no company named '{}'", name))
            .with_hint("run `ctrsum companies list` to see known companies"));
    }
    store.save(&dict).map_err(|e| CliError::store(e.to_string()))?;
    println!("Removed {}", name);
    Ok(())
}
