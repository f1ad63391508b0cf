//! Command-line interface for audit-trail.
//!
//! Feeds engine notifications (one JSON object per line) into a recorder
//! session and shows the resolved configuration.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::RecorderSettings;
use crate::core::HookAdapter;
use crate::domain::Notification;

/// audit-trail - Audit recorder for pipeline runs
#[derive(Parser, Debug)]
#[command(name = "audit-trail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record one run from a stream of notifications
    Feed {
        /// Notification file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write to this log directory instead of the configured one
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Feed { input, log_dir } => feed(input, log_dir),
            Commands::Config => show_config(),
        }
    }
}

/// Replay notifications into a fresh recorder session
fn feed(input: Option<PathBuf>, log_dir: Option<PathBuf>) -> Result<()> {
    let mut settings = RecorderSettings::load()?;
    if let Some(dir) = log_dir {
        settings.log_dir = dir;
    }

    let reader: Box<dyn BufRead> = match input {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open notification file: {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut hooks = HookAdapter::create(&settings)?;
    let count = feed_lines(&mut hooks, reader)?;

    info!(
        notifications = count,
        errors = hooks.context().error_count(),
        state = ?hooks.state(),
        "Feed complete"
    );
    eprintln!(
        "[Session {} recorded {} notifications to {}]",
        hooks.context().session_id(),
        count,
        hooks.sink().log_path().display()
    );

    Ok(())
}

/// Decode and dispatch each non-blank line in order; returns how many were
/// dispatched.
pub fn feed_lines<R: BufRead>(hooks: &mut HookAdapter, reader: R) -> Result<usize> {
    let mut count = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("Failed to read notification line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let notification: Notification = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse notification on line {}", line_no))?;

        hooks.dispatch(&notification).with_context(|| {
            format!(
                "Failed to record {} notification on line {}",
                notification.kind(),
                line_no
            )
        })?;
        count += 1;
    }

    Ok(count)
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = RecorderSettings::load()?;

    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Log:");
    println!("  Directory:        {}", cfg.log_dir.display());
    println!("  File:             {}", cfg.log_path().display());
    println!("  Sync each write:  {}", cfg.sync_writes);
    println!();
    println!("Identity:");
    println!("  User override:    ${}", cfg.user_override_var);
    println!("  Environment var:  {}", cfg.environment_var);

    Ok(())
}
