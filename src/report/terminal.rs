use std::collections::HashMap;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use super::Report;
use crate::models::{PackageRecord, UNDETECTED, UNKNOWN};

/// Render a colored terminal report.
///
/// Flagged records are always listed; clean ones only with `verbose`.
pub fn render(report: &Report, verbose: bool, quiet: bool) {
    let total = report.len();
    let warn_count = report.warning_count();
    let ok_count = total - warn_count;

    if quiet {
        println!(
            "Total: {}  OK: {}  Warning: {}",
            total,
            ok_count.to_string().green(),
            warn_count.to_string().yellow(),
        );
        return;
    }

    println!(
        "\n {} v{}\n",
        "license-solver".bold(),
        env!("CARGO_PKG_VERSION")
    );

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Packages          : {}", total));
    println!(
        " │  {:<48} │",
        format!(
            "{}  OK            : {:>4}  {}",
            "✓".green(),
            ok_count,
            summarize_licenses(report, false)
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Warning       : {:>4}  {}",
            "⚠".yellow(),
            warn_count,
            summarize_licenses(report, true)
        )
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if warn_count > 0 {
        println!(" {} Packages with warnings:\n", "[WARN]".yellow().bold());
        render_table(report, true);
        println!();
    }

    if verbose && ok_count > 0 {
        println!(" {} Consistent packages:\n", "[OK]".green().bold());
        render_table(report, false);
        println!();
    }
}

fn render_table(report: &Report, warning: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("SPDX").add_attribute(Attribute::Bold),
            Cell::new("License version").add_attribute(Attribute::Bold),
            Cell::new("Classifier").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for record in report.records().filter(|r| r.warning == warning) {
        let summary = report.summary(&record.name, &record.version);

        let license_color = match summary.license.as_str() {
            UNDETECTED => Color::Red,
            UNKNOWN => Color::DarkGrey,
            _ => Color::Reset,
        };
        let (status, status_color) = if summary.warning {
            ("⚠ warning", Color::Yellow)
        } else {
            ("✓ ok", Color::Green)
        };

        table.add_row(vec![
            Cell::new(&record.name),
            Cell::new(&record.version),
            Cell::new(&summary.license).fg(license_color),
            Cell::new(&summary.license_identifier),
            Cell::new(&summary.license_version),
            Cell::new(classifier_names(record)),
            Cell::new(status)
                .fg(status_color)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{}", table);
}

fn classifier_names(record: &PackageRecord) -> String {
    if record.classifier.is_empty() {
        return UNDETECTED.to_string();
    }
    record
        .classifier
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn summarize_licenses(report: &Report, warning: bool) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in report.records().filter(|r| r.warning == warning) {
        let license = record
            .license
            .as_ref()
            .map(|l| match l.identifier_spdx.as_str() {
                UNDETECTED => l.full_name.clone(),
                id => id.to_string(),
            })
            .unwrap_or_else(|| UNDETECTED.to_string());
        *counts.entry(license).or_insert(0) += 1;
    }

    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}
