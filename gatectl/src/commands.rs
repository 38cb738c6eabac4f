//! CLI command implementations.

use std::io;
use std::path::Path;

use gate::{
    parse_expression, Config, Marker, MarkerBinding, Result, ServerInfo, SkipAction, VersionTuple,
    MARKER_HELP,
};
use serde::Serialize;

/// Load config from an explicit path, or by the standard resolution order.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    println!("{}", json);
    Ok(())
}

/// Print the normalized form of an expression.
pub fn parse(expr: &str, json: bool) -> Result<()> {
    let predicate = parse_expression(expr)?;
    if json {
        print_json(&predicate)
    } else {
        println!("{}", predicate);
        Ok(())
    }
}

/// Build the server description from command line flags.
pub fn server_info(flavor: bool, version: Option<&str>, version_num: Option<u32>) -> ServerInfo {
    let version = match (version, version_num) {
        (Some(reported), _) => {
            let parsed = VersionTuple::from_reported(reported);
            if parsed.is_none() {
                log::warn!("ignoring unparseable server version {:?}", reported);
            }
            parsed
        }
        (None, Some(num)) => Some(VersionTuple::from_server_num(num)),
        (None, None) => None,
    };

    ServerInfo {
        is_flavor: flavor,
        version,
    }
}

/// Evaluate a marker expression against the described server.
pub fn check(
    config: &Config,
    expr: Option<&str>,
    server: &ServerInfo,
    reason: Option<&str>,
    json: bool,
) -> Result<()> {
    let binding = MarkerBinding::from_config(config);

    let mut marker = match expr {
        Some(expr) => Marker::expr(expr),
        None => Marker::new(),
    };
    if let Some(reason) = reason {
        marker = marker.reason(reason);
    }

    let action = binding.check(&marker, server)?;

    if json {
        return print_json(&action);
    }
    match action {
        SkipAction::Proceed => println!("run"),
        SkipAction::Skip(msg) => println!("skip: {}", msg),
    }
    Ok(())
}

/// Print a reason with its issue link, if known.
pub fn reason(config: &Config, keyword: &str) -> Result<()> {
    println!("{}", config.reason_registry().enrich(Some(keyword)));
    Ok(())
}

#[derive(Serialize)]
struct ReasonRow {
    reason: String,
    issue: u32,
    url: String,
}

/// List all known reasons.
pub fn reasons(config: &Config, json: bool) -> Result<()> {
    let registry = config.reason_registry();
    let rows: Vec<ReasonRow> = registry
        .entries()
        .into_iter()
        .map(|(reason, issue)| ReasonRow {
            url: registry.issue_url(&reason).unwrap_or_default(),
            reason,
            issue,
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    let width = rows.iter().map(|r| r.reason.len()).max().unwrap_or(0);
    for row in &rows {
        println!("{:<width$}  {:>6}  {}", row.reason, row.issue, row.url, width = width);
    }
    Ok(())
}

/// Print the marker registration line.
pub fn marker() -> Result<()> {
    println!("{}", MARKER_HELP);
    Ok(())
}
