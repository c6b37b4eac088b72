//! dtsdoc: turn ambient TypeScript declarations into API reference docs.
//!
//! The pipeline has an external extractor in the middle; dtsdoc handles both
//! ends of it, plus a coverage report:
//!
//! - **preprocess**: `dtsdoc preprocess -o build/dts api/*.d.ts`
//! - **postprocess**: `dtsdoc postprocess -i build/yaml -o docs --declarations excel=api/excel.d.ts`
//! - **coverage**: `dtsdoc coverage -i docs -o coverage.csv`
//! - **enums**: `dtsdoc enums api/excel.d.ts`

mod coverage;
mod declaration;
mod error;
mod model;
mod navigation;
mod normalize;
mod report;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "dtsdoc",
    about = "Generate API reference documentation from ambient TypeScript declarations"
)]
struct Cli {
    /// More logging (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the enum names declared in a declaration file
    Enums {
        /// Declaration file (.d.ts)
        file: PathBuf,
    },

    /// Rewrite declaration files for the documentation extractor
    Preprocess {
        /// Input files, directories or glob patterns
        #[arg(required = true)]
        files: Vec<String>,

        /// Output directory
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Base-type substitution as FROM=TO. Repeatable; replaces the default
        /// OfficeCore.RequestContext=OfficeExtension.ClientRequestContext.
        #[arg(long, value_parser = parse_pair)]
        retarget: Vec<(String, String)>,
    },

    /// Normalize extractor YAML and rebuild navigation
    Postprocess {
        /// Directory of extractor YAML documents
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Output directory
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// YAML file mapping uids to code samples
        #[arg(long)]
        snippets: Option<PathBuf>,

        /// Declaration source for a package's enum grouping, as PACKAGE=PATH. Repeatable.
        #[arg(long = "declarations", value_parser = parse_pair)]
        declarations: Vec<(String, String)>,

        /// Prefix for type alias cross-reference links
        #[arg(long, default_value = "/javascript/api")]
        link_base: String,

        /// Link of the "API reference overview" navigation entry
        #[arg(long, default_value = "overview.md")]
        overview_href: String,
    },

    /// Rate documentation coverage of extractor YAML
    Coverage {
        /// Directory of extractor (or normalized) YAML documents
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Report file; the format's extension is added when it has none.
        /// Defaults to stdout.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Report format: csv (default), markdown
        #[arg(short = 'f', long, default_value = "csv")]
        format: String,
    },
}

/// Settings for [`preprocess_files`].
struct PreprocessConfig<'a> {
    output_dir: &'a Path,
    transform: declaration::TransformOptions,
}

/// Settings for [`postprocess`].
struct PostprocessConfig<'a> {
    input_dir: &'a Path,
    output_dir: &'a Path,
    normalize: normalize::NormalizeOptions,
    declarations: &'a [(String, String)],
    overview_href: &'a str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Enums { file } => print_enums(&file),
        Command::Preprocess {
            files,
            output,
            retarget,
        } => {
            let mut transform = declaration::TransformOptions::default();
            if !retarget.is_empty() {
                transform.retargets = retarget
                    .into_iter()
                    .map(|(from, to)| declaration::Retarget::new(from, to))
                    .collect();
            }
            preprocess_files(
                &files,
                &PreprocessConfig {
                    output_dir: &output,
                    transform,
                },
            )
        }
        Command::Postprocess {
            input,
            output,
            snippets,
            declarations,
            link_base,
            overview_href,
        } => {
            let snippets = match snippets {
                Some(path) => load_snippets(&path)?,
                None => normalize::SnippetStore::new(),
            };
            postprocess(&PostprocessConfig {
                input_dir: &input,
                output_dir: &output,
                normalize: normalize::NormalizeOptions {
                    link_base,
                    snippets,
                },
                declarations: &declarations,
                overview_href: &overview_href,
            })
        }
        Command::Coverage {
            input,
            output,
            format,
        } => coverage_report(&input, output.as_deref(), &format),
    }
}

/// Log to stderr; stdout carries command output.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Parse `KEY=VALUE` command-line pairs.
fn parse_pair(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn print_enums(file: &Path) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    for name in declaration::extract_enum_names(&source) {
        println!("{}", name);
    }
    Ok(())
}

/// Transform every declaration file into the output directory, keeping file
/// names. Unreadable inputs are skipped.
fn preprocess_files(files: &[String], config: &PreprocessConfig) -> Result<()> {
    fs::create_dir_all(config.output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    let inputs = expand_globs(files, declaration::is_declaration_file)?;
    for path in &inputs {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let output = declaration::preprocess(&source, &config.transform);

        let name = path
            .file_name()
            .with_context(|| format!("no file name: {}", path.display()))?;
        let out_path = config.output_dir.join(name);
        fs::write(&out_path, output)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        info!(file = %path.display(), "preprocessed");
    }
    Ok(())
}

/// Normalize entity documents and rebuild navigation documents. A document
/// that fails doesn't stop the others; the run fails at the end instead.
fn postprocess(config: &PostprocessConfig) -> Result<()> {
    let documents = yaml_files(config.input_dir)?;
    let enums = load_enum_index(config.declarations);

    let mut failed = 0usize;
    for path in &documents {
        let relative = path.strip_prefix(config.input_dir).unwrap_or(path);
        let out_path = config.output_dir.join(relative);

        let result = if is_navigation_file(path) {
            rebuild_navigation(path, &enums, config.overview_href)
        } else {
            normalize_file(path, &config.normalize)
        };

        match result {
            Ok(text) => {
                if let Some(parent) = out_path.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create directory: {}", parent.display())
                    })?;
                }
                fs::write(&out_path, text)
                    .with_context(|| format!("failed to write {}", out_path.display()))?;
            }
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
            }
        }
    }

    info!(documents = documents.len(), failed, "postprocess finished");
    if failed > 0 {
        anyhow::bail!("{} of {} documents failed", failed, documents.len());
    }
    Ok(())
}

fn normalize_file(path: &Path, options: &normalize::NormalizeOptions) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(normalize::normalize(path, &raw, options)?)
}

/// Rebuild one toc.yml, keeping a leading comment line if there is one.
fn rebuild_navigation(path: &Path, enums: &navigation::EnumIndex, overview_href: &str) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let (header, body) = match raw.split_once('\n') {
        Some((first, rest)) if first.starts_with('#') => (Some(first), rest),
        _ => (None, raw.as_str()),
    };

    let doc: model::NavigationDocument = serde_yaml::from_str(body)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let rebuilt = navigation::rebuild(&doc, enums, overview_href);
    let yaml = serde_yaml::to_string(&rebuilt)
        .with_context(|| format!("failed to serialize {}", path.display()))?;

    Ok(match header {
        Some(header) => format!("{}\n{}", header, yaml),
        None => yaml,
    })
}

/// Read declaration sources into the package → enum names index. Unreadable
/// sources only cost that package its enum grouping.
fn load_enum_index(declarations: &[(String, String)]) -> navigation::EnumIndex {
    let mut sources: Vec<(&str, String)> = Vec::new();
    for (package, path) in declarations {
        match fs::read_to_string(path) {
            Ok(source) => sources.push((package.as_str(), source)),
            Err(e) => warn!(package = %package, "cannot read declarations {}: {}", path, e),
        }
    }
    navigation::index_enums(sources.iter().map(|(package, source)| (*package, source.as_str())))
}

fn load_snippets(path: &Path) -> Result<normalize::SnippetStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read snippets: {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("failed to parse snippets: {}", path.display()))
}

/// Rate every entity document under `input` and write the report.
fn coverage_report(input: &Path, output: Option<&Path>, format: &str) -> Result<()> {
    let format = report::create_format(format)?;

    let mut rows = Vec::new();
    for path in yaml_files(input)? {
        if is_navigation_file(&path) {
            continue;
        }
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        match normalize::parse_entity(&path, &raw) {
            Ok(entity) => rows.extend(coverage::rate_class(&entity).rows()),
            Err(e) => warn!(file = %e.path().display(), "skipping: {}", e),
        }
    }

    for (rating, count) in coverage::tally(&rows) {
        info!(%rating, count, "coverage");
    }

    let text = format.render(&rows);
    match output {
        Some(path) => {
            let path = if path.extension().is_none() {
                path.with_extension(format.file_extension())
            } else {
                path.to_path_buf()
            };
            fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn is_navigation_file(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some("toc.yml" | "toc.yaml")
    )
}

/// Every `.yml`/`.yaml` file under `dir`, sorted.
fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }
    let root = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = Vec::new();
    for ext in ["yml", "yaml"] {
        let pattern = format!("{}/**/*.{}", root, ext);
        files.extend(
            glob::glob(&pattern)
                .with_context(|| format!("invalid glob pattern: {}", pattern))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file()),
        );
    }
    files.sort();
    Ok(files)
}

/// Expand glob patterns into a list of real file paths.
/// Bare directories are scanned (non-recursively) for files `accept` allows.
fn expand_globs(patterns: &[String], accept: fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && accept(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
