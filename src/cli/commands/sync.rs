use std::io::{self, BufRead, Write};

use crate::adapters::http::http_fetcher::HttpFetcher;
use crate::adapters::key_stores::directory_key_store::DirectoryKeyStore;
use crate::cli::context::RunContext;
use crate::cli::output;
use crate::core::errors::{DirectoryError, Result};
use crate::core::models::certificate::DirectoryListing;
use crate::core::models::sync_report::SyncReport;
use crate::core::services::sync_service::SyncService;

/// Name of the option carrying the service URL.
pub const URL_PARAMETER: &str = "webkey-service-url";

/// Execute the `webkey sync` command.
///
/// Fetches the certificate listing from the webkey service and writes every
/// lookup entry to the key store. Prompts for the URL when it was not given
/// on the command line or in the environment.
pub fn execute(url: Option<&str>, ctx: &RunContext) -> Result<()> {
    let url = match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => url.to_string(),
        None => prompt_for_url()?,
    };

    let fetcher = HttpFetcher::new(ctx.config.sync.user_agent.clone(), ctx.config.sync.timeout());
    let store = DirectoryKeyStore::new(ctx.storage_root().to_path_buf());
    let service = SyncService::new(fetcher, store);

    if ctx.quiet {
        service.synchronize(&url)?;
        return Ok(());
    }

    output::header(&format!("{}: syncing web keys", ctx.config.app.name));

    let listing = output::with_spinner(
        &format!("Fetching {url}"),
        describe_listing,
        || service.fetch_listing(&url),
    )?;

    let report = output::with_spinner(
        &format!("Writing keys to {}", ctx.storage_root().display()),
        |r: &SyncReport| format!("{} entries written", r.total()),
        || service.apply(listing),
    )?;

    if ctx.verbose {
        print_report(&report);
    }

    output::success("Web keys successfully synced!");
    Ok(())
}

/// Ask for the URL on stdin. An empty answer (or closed stdin) is an error.
fn prompt_for_url() -> Result<String> {
    print!("  Please enter the webkey service url: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let url = input.trim();

    if url.is_empty() {
        return Err(DirectoryError::MissingParameter {
            name: URL_PARAMETER.into(),
        });
    }
    Ok(url.to_string())
}

fn describe_listing(listing: &DirectoryListing) -> String {
    match listing {
        DirectoryListing::Flat(records) => format!("Received {} certificate records", records.len()),
        DirectoryListing::Grouped(_) => "Received grouped key listing".into(),
        DirectoryListing::Empty => "Listing is empty".into(),
    }
}

fn print_report(report: &SyncReport) {
    output::detail("fingerprints", &report.fingerprints.to_string());
    output::detail("key ids", &report.key_ids.to_string());
    output::detail("emails", &report.emails.to_string());
    output::detail("wkd", &report.wkd_entries.to_string());
    output::detail(
        "finished",
        &report.finished_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    output::detail("elapsed", &format!("{} ms", report.elapsed_ms()));
}
