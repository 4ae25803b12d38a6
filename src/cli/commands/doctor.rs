//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Roost Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Extraction tools are optional; missing ones only limit formats.
    println!("{}", style("Extraction Tools").bold());
    let tool_checks = vec![
        check_tool("tesseract", "tesseract --version", "Needed for image lab reports. Install with your package manager."),
        check_tool("pdftoppm", "pdftoppm -v", "Needed for PDF page images. Part of poppler-utils."),
    ];
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    println!("{}", style("API Configuration").bold());
    let api_checks = vec![
        check_required_env(
            "OPENAI_API_KEY",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        check_optional_env("WEATHER_API_KEY", "weather advisories"),
        check_optional_env("GOOGLE_SEARCH_API_KEY", "web search enrichment"),
        check_optional_env("GOOGLE_CSE_ID", "web search enrichment"),
        check_optional_env("YOUTUBE_API_KEY", "video search enrichment"),
    ];
    for check in &api_checks {
        check.print();
    }
    checks.extend(api_checks);

    println!();

    println!("{}", style("Documents & Index").bold());
    let doc_checks = check_documents(settings);
    for check in &doc_checks {
        check.print();
    }
    checks.extend(doc_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Roost.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Roost is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available. Missing tools are warnings
/// because only some extraction formats need them.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let parts: Vec<&str> = version_cmd.split_whitespace().collect();
    let cmd = parts[0];
    let args = &parts[1..];

    match Command::new(cmd).args(args).output() {
        Ok(output) if output.status.success() => {
            // pdftoppm prints its version to stderr
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let version = stdout
                .lines()
                .chain(stderr.lines())
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.len() > 50 {
                format!("{}...", &version[..50])
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::warning(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::warning(name, "not found", hint)
        }
        Err(e) => CheckResult::warning(name, &format!("error: {}", e), hint),
    }
}

/// Check a required environment variable.
fn check_required_env(name: &str, hint: &str) -> CheckResult {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => {
            let masked = if value.len() > 11 {
                format!("{}...{}", &value[..7], &value[value.len() - 4..])
            } else {
                "configured".to_string()
            };
            CheckResult::ok(name, &format!("configured ({})", masked))
        }
        Ok(_) => CheckResult::error(name, "empty", hint),
        Err(_) => CheckResult::error(name, "not set", hint),
    }
}

/// Check an optional environment variable.
fn check_optional_env(name: &str, purpose: &str) -> CheckResult {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => CheckResult::ok(name, "configured"),
        _ => CheckResult::warning(
            name,
            "not set",
            &format!("{} will be unavailable", purpose),
        ),
    }
}

/// Check corpus documents and the index database.
fn check_documents(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let docs_dir = settings.documents_dir();
    if docs_dir.exists() {
        results.push(CheckResult::ok(
            "Document directory",
            &format!("{}", docs_dir.display()),
        ));
    } else {
        results.push(CheckResult::warning(
            "Document directory",
            &format!("{} (missing)", docs_dir.display()),
            "Create it and add your reference documents",
        ));
    }

    for path in settings.document_paths() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        if path.exists() {
            results.push(CheckResult::ok(&name, "present"));
        } else {
            results.push(CheckResult::warning(
                &name,
                "missing",
                "Indexing will fail until this file exists",
            ));
        }
    }

    let db_path = settings.sqlite_path();
    if db_path.exists() {
        let size = std::fs::metadata(&db_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        results.push(CheckResult::ok(
            "Index database",
            &format!("{} ({})", db_path.display(), size),
        ));
    } else {
        results.push(CheckResult::warning(
            "Index database",
            &format!("{} (not built yet)", db_path.display()),
            "Build it with: roost index",
        ));
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: roost init (or roost config edit)",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }
}
