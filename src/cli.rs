//! CLI: AST snapshot(s) → (metadata JSON | interface listing)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::availability::Version;
use crate::config::ExtractOptions;
use crate::decl::InterfaceDecl;
use crate::framework::{FrameworkMetadata, extract_snapshot};
use crate::snapshot::AstSnapshot;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// extract Objective-C interface metadata (classes, methods, properties, types) from clang AST snapshots
#[derive(Parser, Debug)]
#[command(name = "objc-meta", version)]
pub struct CommandLineInterface {
    /// more logging: -v info, -vv debug, -vvv trace (RUST_LOG wins when set)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// extract and print the framework metadata as JSON
    Extract(ExtractOut),
    /// extract and print one line per interface
    List(ListOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more snapshot files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct PolicySettings {
    /// availability platform to filter for (macos, ios, tvos, watchos, ...)
    #[arg(long, default_value = "macos")]
    platform: String,

    /// minimum OS version; declarations introduced later are dropped
    #[arg(long)]
    deployment_target: Option<Version>,

    /// keep only interfaces declared inside <NAME>.framework
    #[arg(long)]
    framework: Option<String>,

    /// keep deprecated declarations
    #[arg(long, default_value_t = false)]
    include_deprecated: bool,
}

#[derive(clap::Parser, Debug)]
struct ExtractOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    policy: PolicySettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// single-line JSON
    #[arg(long)]
    compact: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct ListOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    policy: PolicySettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl PolicySettings {
    fn options(&self) -> ExtractOptions {
        ExtractOptions {
            platform: self.platform.clone(),
            deployment_target: self.deployment_target,
            framework: self.framework.clone(),
            include_deprecated: self.include_deprecated,
        }
    }
}

impl InputSettings {
    fn extract_all(&self, options: &ExtractOptions) -> Result<FrameworkMetadata> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;

        let parts = source_paths
            .par_iter()
            .map(|source_path| {
                let snapshot = AstSnapshot::load(source_path)
                    .with_context(|| format!("failed to load snapshot {}", source_path.display()))?;
                debug!(
                    path = %source_path.display(),
                    cursors = snapshot.cursors.len(),
                    types = snapshot.types.len(),
                    "loaded snapshot"
                );
                extract_snapshot(&snapshot, options)
                    .with_context(|| format!("failed to extract {}", source_path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FrameworkMetadata::merge(parts, options))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Extract(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let options = target.policy.options();
                let metadata = target.input_settings.extract_all(&options)?;
                let json = if target.compact {
                    serde_json::to_string(&metadata)?
                } else {
                    serde_json::to_string_pretty(&metadata)?
                };
                write_output(target.out.as_deref(), &json)
            }
            Command::List(target) => {
                let options = target.policy.options();
                let metadata = target.input_settings.extract_all(&options)?;
                for interface in &metadata.interfaces {
                    println!("{}", listing_line(interface));
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn listing_line(interface: &InterfaceDecl) -> String {
    let heading = match &interface.superclass {
        Some(superclass) => format!("{} : {}", interface.name.bold(), superclass.name.cyan()),
        None => interface.name.bold().to_string(),
    };
    format!(
        "{heading}  {} properties, {} instance methods, {} class methods  {}",
        interface.properties.len(),
        interface.instance_methods.len(),
        interface.class_methods.len(),
        interface.file.dimmed(),
    )
}

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    let Some(out) = out else {
        println!("{contents}");
        return Ok(());
    };
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))?;
    info!(path = %out.display(), "wrote metadata");
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }

        let before = out.len();
        for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
            out.push(entry?);
        }
        if out.len() == before {
            // explicitly a glob but matched nothing
            bail!("glob pattern matched no files: {pattern}");
        }
    }

    Ok(out)
}
