use crate::error::RenderResult;
use crate::report::{Report, ReportFilters, ScanEntry};
use crate::reporter::Reporter;
use colored::Colorize;
use prettytable::{Cell, Row, Table, format};

const TABLE_HEADERS: [&str; 4] = ["Scanner", "Running Time", "Required", "Passed"];

pub struct TerminalReporter {
    verbose: bool,
    use_colors: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            use_colors: false,
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn status_label(&self, passed: bool) -> String {
        let label = if passed { "PASSED" } else { "FAILED" };
        match (self.use_colors, passed) {
            (false, _) => label.to_string(),
            (true, true) => label.green().bold().to_string(),
            (true, false) => label.red().bold().to_string(),
        }
    }

    /// Per-scanner block shown in verbose mode.
    fn format_scan(&self, entry: &ScanEntry) -> RenderResult<String> {
        let result = entry.result();
        let mut output = format!(
            "==== {}: {}",
            result.scanner_name(),
            self.status_label(entry.passed())
        );

        if !result.info().is_empty() {
            push_section(
                &mut output,
                "Info",
                &serde_json::to_string_pretty(result.info())?,
            );
        }
        if !result.warn().is_empty() {
            push_section(
                &mut output,
                "Warnings",
                &serde_json::to_string_pretty(result.warn())?,
            );
        }
        if !result.errors().is_empty() {
            push_section(
                &mut output,
                "Errors",
                &serde_json::to_string_pretty(result.errors())?,
            );
        }

        Ok(output)
    }

    fn render(&self, report: &Report) -> RenderResult<String> {
        let mut output = format!("==== Salus Scan v{}", report.version());
        if let Some(project_name) = report.project_name() {
            output.push_str(&format!(" for {}", project_name));
        }

        if self.verbose {
            for entry in report.scans() {
                output.push_str("\n\n");
                output.push_str(&self.format_scan(entry)?);
            }
        }

        if let Some(sources) = report.config_sources() {
            output.push_str("\n\n==== Salus Configuration Files Used:\n\n");
            for source in sources {
                output.push_str(&format!("  {}\n", source));
            }
        }

        if !report.errors().is_empty() {
            let errors = serde_json::to_string_pretty(report.errors())?;
            output.push_str("\n\n==== Salus Errors\n\n");
            output.push_str(&indent(&errors, 2));
            output.push('\n');
        }

        output.push_str(&format!(
            "\n\nOverall scan status: {}\n\n",
            self.status_label(report.passed())
        ));

        let rows: Vec<[String; 4]> = report.scans().iter().map(table_row).collect();
        output.push_str(&render_table(&rows));

        Ok(output)
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &Report, filters: &ReportFilters) -> RenderResult<String> {
        Ok(filters.apply_text(self.render(report)?))
    }
}

fn push_section(output: &mut String, label: &str, body: &str) {
    output.push_str(&format!("\n\n  {}:\n\n{}", label, indent(body, 4)));
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn yes_no(flag: bool) -> String {
    let label = if flag { "yes" } else { "no" };
    label.to_string()
}

fn table_row(entry: &ScanEntry) -> [String; 4] {
    let running_time = entry
        .result()
        .running_time()
        .map(|secs| format!("{:.2}s", secs))
        .unwrap_or_else(|| "-".to_string());
    [
        entry.result().scanner_name().to_string(),
        running_time,
        yes_no(entry.required()),
        yes_no(entry.passed()),
    ]
}

/// Box-drawn summary table.
///
/// Each column is as wide as its header or its longest cell. Cells are never
/// truncated.
fn render_table(rows: &[[String; 4]]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    let titles = TABLE_HEADERS.iter().map(|h| Cell::new(h)).collect();
    table.set_titles(Row::new(titles));
    for row in rows {
        table.add_row(Row::new(row.iter().map(|cell| Cell::new(cell)).collect()));
    }
    table.to_string().trim_end().to_string()
}
