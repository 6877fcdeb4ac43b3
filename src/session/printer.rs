use std::{fmt::Display, path::Path};

use colored::Colorize;
use url::Url;

use super::models::{SavedResource, SessionSummary};

pub fn print_intro(target: &Url, output_root: &Path) {
    println!(
        "{} <{}> to folder <{}>",
        "Intercepting requests from site".bold(),
        target.as_str().cyan(),
        output_root.display()
    );
}

pub(super) fn print_saved(saved: &SavedResource) {
    println!(
        "{} {} -> {} {}",
        sequence_tag(saved.sequence),
        saved.url.as_str().cyan(),
        saved.path.display(),
        format!("({})", saved.content_type).dimmed()
    );
}

pub(super) fn print_skipped(sequence: u64, url: &Url) {
    println!(
        "{} {} -> {}",
        sequence_tag(sequence),
        url.as_str().cyan(),
        "Skipping (localOnly flag)".yellow()
    );
}

pub(super) fn print_stubbed(sequence: u64, url: &str, marker: &str) {
    println!(
        "{} {} -> {}",
        sequence_tag(sequence),
        url.cyan(),
        format!("Refusing ({marker})").yellow()
    );
}

pub(super) fn print_failed(sequence: u64, url: &str, err: &dyn Display) {
    eprintln!(
        "{} {} {}: {}",
        sequence_tag(sequence),
        "Error processing".red(),
        url,
        err
    );
}

pub fn print_navigation_error(target: &Url, err: &dyn Display) {
    eprintln!(
        "{} {}: {}",
        "Error navigating to".red(),
        target.as_str(),
        err
    );
}

pub fn print_summary(summary: &SessionSummary) {
    println!(
        "{} {} files saved from <{}> to {}",
        "Intercept complete,".bold(),
        summary.files_saved.to_string().green(),
        summary.target.as_str().cyan(),
        summary.output_root.display()
    );
    if summary.stubbed + summary.skipped + summary.failed > 0 {
        println!(
            "{}",
            format!(
                "{} requests observed, {} stubbed, {} skipped, {} failed",
                summary.observed, summary.stubbed, summary.skipped, summary.failed
            )
            .dimmed()
        );
    }
}

fn sequence_tag(sequence: u64) -> String {
    format!("[{sequence}]:").bold().to_string()
}
