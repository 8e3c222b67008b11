pub mod cli;
pub mod config;
pub mod display;
pub mod filter;
pub mod memo;

use crate::config::{FilterConfig, filter_warnings};
use crate::display::{
    format_check_json, format_check_text, format_filter_json, format_filter_table,
    format_pass_json, format_pass_text,
};
use crate::filter::{
    FilterSet, compile_expression, decode, encode, filter_records, from_query, parse_saved_query,
    to_query_param,
};
use anyhow::{Context, Result};
pub use cli::{Cli, ColorMode, Commands, OutputFormat, cli_parse};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn parse_filter_list(raw: &str, saved: bool) -> Result<FilterSet> {
    if saved {
        return Ok(parse_saved_query(raw)?);
    }
    serde_json::from_str(raw).context("Invalid filter list, expected a JSON array of entries")
}

fn decode_filter(query: &str) -> Result<FilterSet> {
    decode(query).with_context(|| format!("Invalid filter string '{query}'"))
}

/// Execute the parsed command line
///
/// Returns `Ok(false)` when the command ran but found invalid input the
/// caller should signal through the exit status.
pub fn run(cli: &Cli) -> Result<bool> {
    cli.color.apply();

    let config: FilterConfig = config::load_config(cli.config.as_deref())?;
    if let Some(path) = &cli.config {
        info!(path = %path.display(), "loaded config");
    }

    match &cli.command {
        Commands::Encode { file, saved, param } => {
            let raw = read_input(file.as_deref())?;
            let set = parse_filter_list(&raw, *saved)?;
            debug!(entries = set.len(), "encoding filter set");
            if *param {
                println!("{}", to_query_param(&set, &config.query_param));
            } else {
                println!("{}", encode(&set));
            }
        }
        Commands::Decode { query, url } => {
            let set = if *url {
                from_query(query, &config.query_param)
                    .with_context(|| format!("Invalid query string '{query}'"))?
            } else {
                decode_filter(query)?
            };
            match cli.format {
                OutputFormat::Text => print!("{}", format_filter_table(&set)),
                OutputFormat::Json => println!("{}", format_filter_json(&set)),
            }
        }
        Commands::Check { query } => {
            let set = decode_filter(query)?;
            let errors = set.validation_errors();
            let warnings = filter_warnings(&set, &config);
            match cli.format {
                OutputFormat::Text => print!("{}", format_check_text(&set, &errors, &warnings)),
                OutputFormat::Json => {
                    println!("{}", format_check_json(&set, &errors, &warnings))
                }
            }
            return Ok(errors.is_empty());
        }
        Commands::Apply { filter, memos } => {
            let set = decode_filter(filter)?;
            for warning in filter_warnings(&set, &config) {
                warn!("{warning}");
            }
            let memos = memo::load_memos(memos)?;
            let pass = filter_records(&set, &memos);
            info!(
                total = memos.len(),
                matched = pass.matched.len(),
                failed = pass.failures.len(),
                "applied filter"
            );
            match cli.format {
                OutputFormat::Text => print!("{}", format_pass_text(&pass, memos.len())),
                OutputFormat::Json => println!("{}", format_pass_json(&pass, memos.len())),
            }
        }
        Commands::Expr { query } => {
            let set = decode_filter(query)?;
            match compile_expression(&set, &config.expression_options())? {
                Some(expr) => println!("{expr}"),
                None => info!("empty filter set, no expression to print"),
            }
        }
    }

    Ok(true)
}
