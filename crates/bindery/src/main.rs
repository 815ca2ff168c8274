//! bindery - Assemble markdown documents from linked fragments
//!
//! bindery scans a root markdown document for fragment links (by default
//! `[Title](chapters/chapter-<N>/ch<N>-section-<X>.<Y>.md)`), loads each
//! referenced fragment once, rewrites the links into in-document anchors,
//! and appends the fragment bodies after the rewritten text.

mod config;

use bindery_core::{FsReader, FsWriter, LinkPattern, OutputWriter, transclude};
use eyre::{Result, WrapErr};
use facet_args as args;
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Root document to assemble
    #[facet(args::positional)]
    source: PathBuf,

    /// Destination for the assembled document (overwritten on each run)
    #[facet(args::positional)]
    dest: PathBuf,

    /// Path to config file (default: .config/bindery/config.kdl)
    #[facet(args::named, args::short = 'c', default)]
    config: Option<PathBuf>,

    /// Path template for fragment links (overrides the config file)
    #[facet(args::named, args::short = 't', default)]
    template: Option<String>,

    /// List each fragment with its load status
    #[facet(args::named, args::short = 'v', default)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args: Args =
        facet_args::from_std_args().wrap_err("Failed to parse command line arguments")?;

    let pattern = resolve_pattern(&args)?;

    let root_text = std::fs::read_to_string(&args.source)
        .wrap_err_with(|| format!("Failed to read {}", args.source.display()))?;

    eprintln!(
        "{} Assembling {}...",
        "->".blue().bold(),
        args.source.display()
    );

    // Fragment paths in the root document are relative to its directory
    let reader = match args.source.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => FsReader::rooted(dir),
        _ => FsReader::new(),
    };

    let doc = transclude(&root_text, &pattern, &reader);

    eprintln!(
        "   Found {} fragments",
        doc.len().to_string().green()
    );

    for record in doc.fragments.iter().filter(|f| !f.load_succeeded) {
        eprintln!(
            "{} Could not load {}, emitted a placeholder section",
            "!".yellow().bold(),
            record.target_path.red()
        );
    }

    if args.verbose {
        for record in &doc.fragments {
            let status = if record.load_succeeded {
                "loaded".green().to_string()
            } else {
                "missing".red().to_string()
            };
            eprintln!(
                "   {} [{}] {} ({})",
                "-".dimmed(),
                record.id.to_string().cyan(),
                record.target_path,
                status
            );
            for shadowed in &record.shadowed_paths {
                eprintln!(
                    "     {} also linked as {} (first target kept)",
                    "~".dimmed(),
                    shadowed.dimmed()
                );
            }
        }
    }

    FsWriter.write_output(&args.dest, &doc.output)?;

    eprintln!(
        "{} Wrote {} ({} fragments, {} missing)",
        "OK".green().bold(),
        args.dest.display(),
        doc.len(),
        doc.placeholder_count()
    );

    Ok(())
}

/// Pick the link pattern: CLI flag beats config file beats built-in default.
fn resolve_pattern(args: &Args) -> Result<LinkPattern> {
    if let Some(template) = &args.template {
        return LinkPattern::new(template.clone());
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(".config/bindery/config.kdl"));

    if let Some(config) = config::load(&config_path, args.config.is_some())?
        && let Some(pattern) = config.pattern
    {
        return LinkPattern::new(pattern.template.value).wrap_err_with(|| {
            format!("Invalid link pattern in {}", config_path.display())
        });
    }

    Ok(LinkPattern::default())
}
