//! Output formatting module for armctl
//!
//! Provides colored task results, state diffs, and the run recap, or one JSON
//! document per event when `--output json` is selected.

use armctl::config::ColorsConfig;
use armctl::modules::{ModuleOutput, ModuleStatus};
use colored::{Color, Colorize};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Task execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task completed successfully with no changes
    Ok,
    /// Task completed with changes made (or would have, in check mode)
    Changed,
    /// Task failed
    Failed,
    /// Task failed but `ignore_errors` was set
    Ignored,
}

impl TaskStatus {
    /// Get the plain string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Ok => "ok",
            TaskStatus::Changed => "changed",
            TaskStatus::Failed => "failed",
            TaskStatus::Ignored => "ignored",
        }
    }
}

impl From<&ModuleOutput> for TaskStatus {
    fn from(output: &ModuleOutput) -> Self {
        match output.status {
            ModuleStatus::Ok => TaskStatus::Ok,
            ModuleStatus::Changed => TaskStatus::Changed,
        }
    }
}

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// JSON output mode
    json_mode: bool,
    /// Verbosity level
    verbosity: u8,
    /// Configured palette
    colors: ColorsConfig,
    /// Start time for duration calculations
    start_time: Instant,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, json_mode: bool, verbosity: u8) -> Self {
        Self {
            use_color,
            json_mode,
            verbosity,
            colors: ColorsConfig::default(),
            start_time: Instant::now(),
        }
    }

    /// Use the configured palette
    pub fn with_colors(mut self, colors: &ColorsConfig) -> Self {
        self.use_color = self.use_color && colors.enabled;
        self.colors = colors.clone();
        self
    }

    pub fn is_json(&self) -> bool {
        self.json_mode
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.use_color {
            text.color(Color::from(color)).to_string()
        } else {
            text.to_string()
        }
    }

    fn status_color(&self, status: TaskStatus) -> &str {
        match status {
            TaskStatus::Ok => &self.colors.ok,
            TaskStatus::Changed => &self.colors.changed,
            TaskStatus::Failed => &self.colors.error,
            TaskStatus::Ignored => "cyan",
        }
    }

    fn emit_json<T: Serialize>(value: &T) {
        println!("{}", serde_json::to_string(value).unwrap_or_default());
    }

    fn emit_stderr_json(kind: &str, message: &str) {
        let event = serde_json::json!({"type": kind, "message": message});
        eprintln!("{}", serde_json::to_string(&event).unwrap_or_default());
    }

    /// Print a banner/header
    pub fn banner(&self, title: &str) {
        if self.json_mode {
            return;
        }

        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            println!("\n{}", line.bright_blue());
            println!("{}", format!("  {}  ", title).bright_blue().bold());
            println!("{}\n", line.bright_blue());
        } else {
            println!("\n{}", line);
            println!("  {}  ", title);
            println!("{}\n", line);
        }
    }

    /// Print a task header
    pub fn task_header(&self, task_name: &str) {
        if self.json_mode {
            return;
        }

        let header = format!("TASK [{}]", task_name);
        let stars = "*".repeat(80_usize.saturating_sub(header.len()));

        if self.use_color {
            println!(
                "\n{} {}",
                header.bright_white().bold(),
                stars.bright_black()
            );
        } else {
            println!("\n{} {}", header, stars);
        }
    }

    /// Print task result
    pub fn task_result(&self, task: &str, status: TaskStatus, message: Option<&str>) {
        if self.json_mode {
            Self::emit_json(&serde_json::json!({
                "type": "task",
                "task": task,
                "status": status.as_str(),
                "message": message
            }));
            return;
        }

        let status_str = self.paint(status.as_str(), self.status_color(status));
        print!("{}: [{}]", status_str, task);
        if let Some(msg) = message {
            print!(" => {}", msg);
        }
        println!();
    }

    /// Print a module's full output (ad hoc runs, or `-v` in task runs)
    pub fn module_output(&self, module: &str, output: &ModuleOutput) {
        if self.json_mode {
            Self::emit_json(&serde_json::json!({
                "type": "result",
                "module": module,
                "result": output
            }));
            return;
        }

        let status = TaskStatus::from(output);
        let status_str = self.paint(status.as_str(), self.status_color(status));
        println!("{}: [{}] => {}", status_str, module, output.msg);

        if let Some(diff) = &output.diff {
            self.diff(&diff.before, &diff.after);
        }

        if self.verbosity >= 1 && !output.data.is_empty() {
            let rendered = serde_json::to_string_pretty(&output.data).unwrap_or_default();
            for line in rendered.lines() {
                println!("    {}", line);
            }
        }
    }

    /// Print a line diff of two renderings
    pub fn diff(&self, old: &str, new: &str) {
        if self.json_mode {
            Self::emit_json(&serde_json::json!({
                "type": "diff",
                "before": old,
                "after": new
            }));
            return;
        }

        let diff = TextDiff::from_lines(old, new);
        println!();
        for change in diff.iter_all_changes() {
            let line = change.to_string_lossy();
            let line = line.trim_end_matches('\n');
            match change.tag() {
                ChangeTag::Delete => {
                    println!("{}", self.paint(&format!("- {}", line), &self.colors.diff_remove))
                }
                ChangeTag::Insert => {
                    println!("{}", self.paint(&format!("+ {}", line), &self.colors.diff_add))
                }
                ChangeTag::Equal => println!("  {}", line),
            }
        }
        println!();
    }

    /// Print a recap summary
    pub fn recap(&self, stats: &RecapStats) {
        if self.json_mode {
            Self::emit_json(&serde_json::json!({"type": "recap", "stats": stats}));
            return;
        }

        let header = "RECAP";
        let stars = "*".repeat(80 - header.len());

        if self.use_color {
            println!(
                "\n{} {}",
                header.bright_white().bold(),
                stars.bright_black()
            );
        } else {
            println!("\n{} {}", header, stars);
        }

        let fmt_stat = |label: &str, value: u32, color: &str| -> String {
            let text = format!("{}={:<4}", label, value);
            if value > 0 {
                self.paint(&text, color)
            } else if self.use_color {
                text.dimmed().to_string()
            } else {
                text
            }
        };

        println!(
            "{:<12} : {} {} {} {}",
            "tasks",
            fmt_stat("ok", stats.ok, &self.colors.ok),
            fmt_stat("changed", stats.changed, &self.colors.changed),
            fmt_stat("failed", stats.failed, &self.colors.error),
            fmt_stat("ignored", stats.ignored, "cyan"),
        );

        let duration_str = format_duration(self.start_time.elapsed());
        if self.use_color {
            println!(
                "\n{} {}",
                "Run took".bright_black(),
                duration_str.bright_white()
            );
        } else {
            println!("\nRun took {}", duration_str);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.json_mode {
            Self::emit_stderr_json("error", message);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.json_mode {
            Self::emit_stderr_json("warning", message);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print a table
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        if self.json_mode {
            Self::emit_json(&serde_json::json!({
                "type": "table",
                "headers": headers,
                "rows": rows
            }));
            return;
        }

        // Calculate column widths
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.len());
                }
            }
        }

        let render = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let header_line = render(headers.to_vec());
        let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        if self.use_color {
            println!("{}", header_line.bright_white().bold());
            println!("{}", sep.join("-+-").bright_black());
        } else {
            println!("{}", header_line);
            println!("{}", sep.join("-+-"));
        }

        for row in rows {
            println!("{}", render(row.iter().map(String::as_str).collect()));
        }
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Task totals for one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecapStats {
    pub ok: u32,
    pub changed: u32,
    pub failed: u32,
    pub ignored: u32,
}

impl RecapStats {
    /// Create new empty recap stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a task status
    pub fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Ok => self.ok += 1,
            TaskStatus::Changed => self.changed += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Ignored => self.ignored += 1,
        }
    }

    /// Check if any task failed without `ignore_errors`
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Format a duration as a human-readable string
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        let secs = secs % 60;
        format!("{}h {}m {}s", hours, mins, secs)
    } else if secs >= 60 {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_from_output() {
        assert_eq!(TaskStatus::from(&ModuleOutput::ok("fine")), TaskStatus::Ok);
        assert_eq!(
            TaskStatus::from(&ModuleOutput::changed("done")),
            TaskStatus::Changed
        );
        assert_eq!(TaskStatus::Ignored.as_str(), "ignored");
    }

    #[test]
    fn test_recap_stats() {
        let mut recap = RecapStats::new();
        recap.record(TaskStatus::Ok);
        recap.record(TaskStatus::Changed);
        recap.record(TaskStatus::Ignored);
        assert!(!recap.has_failures());

        recap.record(TaskStatus::Failed);
        assert!(recap.has_failures());
        assert_eq!(recap.ok + recap.changed + recap.failed + recap.ignored, 4);
    }

    #[test]
    fn test_palette_disabled_by_config() {
        let colors = ColorsConfig {
            enabled: false,
            ..ColorsConfig::default()
        };
        let output = OutputFormatter::new(true, false, 0).with_colors(&colors);
        assert_eq!(output.paint("ok", "green"), "ok");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m 5s");
    }
}
