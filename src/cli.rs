use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, info};
use wrapgen_symbols::{SymbolTable, header_counts};
use wrapgen_utils::logger;

use crate::codegen::{CodeEmitter, EmitOptions, Templates};
use crate::config::ProjectConfig;
use crate::extract::{DefinitionExtractor, DoxygenExtractor, ExtractOptions};
use crate::output;
use crate::store::{CacheFormat, store_for};
use crate::warnings::WarningLog;

#[derive(Parser, Debug)]
#[command(
    name = "wrapgen",
    version,
    about = "Wrapper generator for documented C/C++ APIs"
)]
pub struct WrapgenCli {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    /// Print every warning; repeat for more log output.
    verbose: u8,

    #[arg(long, global = true)]
    /// Project configuration file (defaults to ./wrapgen.json when present).
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl WrapgenCli {
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reads documentation XML and writes a definitions cache.
    Extract {
        xml_dir: PathBuf,
        cache_dir: PathBuf,
        #[arg(long, value_enum)]
        format: Option<CacheFormat>,
        #[arg(long)]
        headers_root: Option<String>,
    },
    /// Renders wrapper sources from a definitions cache.
    Generate {
        cache_dir: PathBuf,
        templates: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum)]
        format: Option<CacheFormat>,
    },
    /// Rewrites a definitions cache in another format.
    Convert {
        cache_dir: PathBuf,
        #[arg(value_name = "TO_DIR")]
        destination: PathBuf,
        #[arg(long, value_enum)]
        from: CacheFormat,
        #[arg(long, value_enum)]
        to: CacheFormat,
    },
    /// Shows per-header element counts of a definitions cache.
    Inspect {
        cache_dir: PathBuf,
        #[arg(long, value_enum)]
        format: Option<CacheFormat>,
    },
}

pub fn run() -> Result<()> {
    let cli = WrapgenCli::parse();
    logger::init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "configuration");

    match &cli.command {
        Command::Extract {
            xml_dir,
            cache_dir,
            format,
            headers_root,
        } => {
            let mut config = config;
            if let Some(root) = headers_root {
                config.headers_root = root.clone();
            }
            handle_extract(&cli, &config, xml_dir, cache_dir, *format)
        }
        Command::Generate {
            cache_dir,
            templates,
            output,
            format,
        } => handle_generate(&cli, &config, cache_dir, templates, output, *format),
        Command::Convert {
            cache_dir,
            destination,
            from,
            to,
        } => handle_convert(&config, cache_dir, destination, *from, *to),
        Command::Inspect { cache_dir, format } => handle_inspect(&config, cache_dir, *format),
    }
}

fn load_config(path: Option<&Path>) -> Result<ProjectConfig> {
    let config = match path {
        Some(path) => ProjectConfig::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to read the working directory")?;
            ProjectConfig::discover(&cwd)?
        }
    };
    Ok(config.with_env_overrides())
}

fn handle_extract(
    cli: &WrapgenCli,
    config: &ProjectConfig,
    xml_dir: &Path,
    cache_dir: &Path,
    format: Option<CacheFormat>,
) -> Result<()> {
    let format = format.unwrap_or(config.cache_format);
    let store = store_for(format, config.duplicate_parameter_policy());
    let extractor =
        DoxygenExtractor::new(ExtractOptions::from(config)).with_progress(cli.verbose == 0);

    let mut table = SymbolTable::new();
    let mut warnings = WarningLog::new();
    let stats = extractor
        .extract(xml_dir, &mut table, &mut warnings)
        .with_context(|| format!("failed to extract definitions from {}", xml_dir.display()))?;

    // Headers switched off in a previous cache stay switched off.
    if cache_dir.is_dir() {
        let previous = store.load(cache_dir)?;
        for header in previous.headers().filter(|header| !header.enabled) {
            if table.header(&header.name).is_some() {
                table.set_header_enabled(&header.name, false);
            }
        }
    }

    store.save(&table, cache_dir)?;
    info!(
        compounds = stats.compounds,
        members = stats.members,
        "extraction complete"
    );

    println!(
        "{} {} headers from {} compounds into {} ({})",
        "extracted".green().bold(),
        table.header_count(),
        stats.compounds,
        cache_dir.display(),
        format
    );
    report_warnings(cli, &warnings);
    Ok(())
}

fn handle_generate(
    cli: &WrapgenCli,
    config: &ProjectConfig,
    cache_dir: &Path,
    templates_dir: &Path,
    output_dir: &Path,
    format: Option<CacheFormat>,
) -> Result<()> {
    let format = format.unwrap_or(config.cache_format);
    let table = store_for(format, config.duplicate_parameter_policy()).load(cache_dir)?;
    if table.is_empty() {
        bail!("definitions cache {} is empty", cache_dir.display());
    }
    let templates = Templates::load_dir(templates_dir)?;

    let mut warnings = WarningLog::new();
    let emitter = CodeEmitter::new(&table, &templates, EmitOptions::from(config));
    let files = emitter.emit(&mut warnings);
    let report = output::write_all(output_dir, &files)?;

    println!(
        "{} {} files into {} ({} unchanged)",
        "generated".green().bold(),
        report.written.len(),
        output_dir.display(),
        report.unchanged.len()
    );
    report_warnings(cli, &warnings);
    Ok(())
}

fn handle_convert(
    config: &ProjectConfig,
    cache_dir: &Path,
    destination: &Path,
    from: CacheFormat,
    to: CacheFormat,
) -> Result<()> {
    let policy = config.duplicate_parameter_policy();
    let table = store_for(from, policy).load(cache_dir)?;
    store_for(to, policy).save(&table, destination)?;

    println!(
        "{} {} ({from}) -> {} ({to})",
        "converted".green().bold(),
        cache_dir.display(),
        destination.display()
    );
    Ok(())
}

fn handle_inspect(
    config: &ProjectConfig,
    cache_dir: &Path,
    format: Option<CacheFormat>,
) -> Result<()> {
    let format = format.unwrap_or(config.cache_format);
    let table = store_for(format, config.duplicate_parameter_policy()).load(cache_dir)?;

    println!(
        "{:<32} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "header".bold(),
        "const",
        "enum",
        "alias",
        "var",
        "func",
        "class",
        "method"
    );
    for header in table.headers() {
        let counts = header_counts(header);
        let name = if header.enabled {
            header.name.normal()
        } else {
            header.name.dimmed()
        };
        println!(
            "{:<32} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}",
            name,
            counts.constants,
            counts.enumerations,
            counts.type_aliases,
            counts.variables,
            counts.functions,
            counts.classes,
            counts.methods
        );
    }

    let total = table.counts();
    println!(
        "{} {} headers, {} functions, {} classes, {} methods",
        "total".bold(),
        table.header_count(),
        total.functions,
        total.classes,
        total.methods
    );
    Ok(())
}

fn report_warnings(cli: &WrapgenCli, warnings: &WarningLog) {
    if warnings.is_empty() {
        return;
    }
    if cli.verbose > 0 {
        for warning in warnings.iter() {
            eprintln!("{} {warning}", "warning:".yellow().bold());
        }
    } else {
        eprintln!(
            "{} {} data-quality warnings (use -v to list them)",
            "warning:".yellow().bold(),
            warnings.len()
        );
    }
}
