use anyhow::{bail, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use console::style;
use libprobe_storm::{
    apply_extensions, directory_candidates, expand, subdomain_candidates, FilterRules, ResultSink,
    ScanConfig, Scanner, WordlistStore, DEFAULT_MARKER,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pf")]
#[command(about = "Pathstorm - wordlist-driven subdomain and path discovery", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Mode>,

    /// Print the default config to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Subdomain enumeration via DNS resolution
    Sub(CommonArgs),
    /// Directory enumeration via HTTP requests
    Dir(DirArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Target URL or domain, may embed wordlist markers (e.g. https://WL1.example.com)
    #[arg(short = 'u', long = "url")]
    target: String,

    /// Wordlist file as /path or /path:MARKER (marker defaults to WL1); repeatable
    #[arg(short = 'w', long = "wordlist", value_parser = parse_wordlist_spec, required = true)]
    wordlists: Vec<WordlistSpec>,

    /// Number of concurrent workers
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Requests per second across all workers combined
    #[arg(short = 'r', long)]
    rate_limit: Option<u32>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Append results to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit findings as NDJSON (one JSON object per line)
    #[arg(long)]
    ndjson: bool,
}

#[derive(Args, Debug)]
struct DirArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// File extensions appended to every candidate (comma-separated, e.g. php,html)
    #[arg(short = 'x', long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// Status codes to report
    #[arg(long, value_delimiter = ',')]
    match_codes: Option<Vec<u16>>,

    /// Status codes to drop after matching
    #[arg(long, value_delimiter = ',')]
    filter_codes: Vec<u16>,

    /// Response sizes to drop
    #[arg(long, value_delimiter = ',')]
    filter_sizes: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct WordlistSpec {
    marker: String,
    path: PathBuf,
}

/// `path` or `path:MARKER`; everything after the first colon is the marker,
/// as in the original flag format.
fn parse_wordlist_spec(value: &str) -> Result<WordlistSpec, String> {
    let (path, marker) = match value.split_once(':') {
        Some((path, marker)) => (path, marker),
        None => (value, DEFAULT_MARKER),
    };

    if path.is_empty() {
        return Err("wordlist path is empty".to_string());
    }
    if marker.is_empty() {
        return Err("marker name is empty".to_string());
    }

    Ok(WordlistSpec {
        marker: marker.to_string(),
        path: PathBuf::from(path),
    })
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    http: HttpConfig,
}

#[derive(Debug, Default, Deserialize)]
struct DefaultsConfig {
    threads: Option<usize>,
    rate_limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct HttpConfig {
    timeout_secs: Option<u64>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pf").join("config.toml"))
}

fn load_config() -> FileConfig {
    config_path()
        .and_then(|path| std::fs::read_to_string(&path).ok())
        .and_then(|content| toml::from_str(&content).ok())
        .unwrap_or_default()
}

fn default_config_toml() -> String {
    r#"# Pathstorm (pf) Configuration

[defaults]
# Number of concurrent workers
# threads = 50

# Requests per second across all workers combined
# rate_limit = 10

[http]
# Per-request timeout in seconds
# timeout_secs = 10
"#
    .to_string()
}

/// Precedence: command-line flag, then config file, then built-in default.
fn resolve_scan_config(args: &CommonArgs, file: &FileConfig) -> ScanConfig {
    let fallback = ScanConfig::default();
    ScanConfig {
        workers: args
            .threads
            .or(file.defaults.threads)
            .unwrap_or(fallback.workers),
        rate_limit: args
            .rate_limit
            .or(file.defaults.rate_limit)
            .unwrap_or(fallback.rate_limit),
        timeout: file
            .http
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(fallback.timeout),
    }
}

fn wordlist_sources(specs: &[WordlistSpec]) -> Result<HashMap<String, PathBuf>> {
    let mut sources = HashMap::with_capacity(specs.len());
    for spec in specs {
        if sources
            .insert(spec.marker.clone(), spec.path.clone())
            .is_some()
        {
            bail!("marker {} is bound to more than one wordlist", spec.marker);
        }
    }
    Ok(sources)
}

fn subdomain_targets(target: &str, store: &WordlistStore) -> Result<Vec<String>> {
    if store.matches(target) {
        return Ok(expand(target, store));
    }
    match store.words(DEFAULT_MARKER) {
        Some(words) => Ok(subdomain_candidates(target, words)),
        None => bail!(
            "no marker found in the target and no '{}' wordlist provided",
            DEFAULT_MARKER
        ),
    }
}

fn directory_targets(target: &str, store: &WordlistStore) -> Result<Vec<String>> {
    if store.matches(target) {
        return Ok(expand(target, store));
    }
    match store.words(DEFAULT_MARKER) {
        Some(words) => Ok(directory_candidates(target, words)),
        None => bail!(
            "no marker found in the target and no '{}' wordlist provided",
            DEFAULT_MARKER
        ),
    }
}

fn print_banner() {
    println!(
        "{}",
        style(
            r#"
             _   _         _
  _ __   __ _| |_| |__  ___| |_ ___  _ __ _ __ ___
 | '_ \ / _` | __| '_ \/ __| __/ _ \| '__| '_ ` _ \"#
        )
        .red()
    );
    println!(
        "{}",
        style(
            r#" | |_) | (_| | |_| | | \__ \ || (_) | |  | | | | | |
 | .__/ \__,_|\__|_| |_|___/\__\___/|_|  |_| |_| |_|
 |_|"#
        )
        .dim()
    );
}

fn print_overview(target: &str, specs: &[WordlistSpec], config: &ScanConfig) {
    let tag = style("[*]").cyan();
    println!("{} Target URL:      {}", tag, target);
    println!("{} Threads:         {}", tag, config.workers);
    println!("{} Rate Limit:      {} req/s", tag, config.rate_limit);
    println!("{} Wordlists:", tag);
    for spec in specs {
        println!("    - {}: {}", spec.marker, spec.path.display());
    }
}

fn print_dir_overview(extensions: &[String], rules: &FilterRules) {
    let tag = style("[*]").cyan();
    if !extensions.is_empty() {
        println!("{} Extensions:      {}", tag, extensions.join(", "));
    }
    println!("{} Match Codes:     {}", tag, join_nums(rules.match_codes()));
    if !rules.filter_codes().is_empty() {
        println!("{} Filter Codes:    {}", tag, join_nums(rules.filter_codes()));
    }
    if !rules.filter_sizes().is_empty() {
        println!("{} Filter Sizes:    {}", tag, join_nums(rules.filter_sizes()));
    }
}

fn join_nums<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_summary(scanner: &Scanner, verbose: bool) {
    let stats = scanner.stats();
    println!(
        "\n{} Scan Complete. {} probed, {} found.",
        style("[*]").cyan(),
        stats.probed(),
        stats.found()
    );

    let failures = stats.failures();
    if verbose && !failures.is_empty() {
        println!("{} Probe failures:", style("[*]").cyan());
        for (reason, count) in failures {
            println!("    - {}: {}", reason, count);
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("libprobe_storm={}", level).parse()?)
        .add_directive(format!("pf={}", level).parse()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    Ok(())
}

fn write_default_config() -> Result<()> {
    let path = config_path().context("could not determine the config directory")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }
    std::fs::write(&path, default_config_toml())
        .with_context(|| format!("could not write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

async fn run_sub(args: CommonArgs) -> Result<()> {
    init_tracing(args.verbose)?;
    print_banner();

    let file_config = load_config();
    let config = resolve_scan_config(&args, &file_config);

    print_overview(&args.target, &args.wordlists, &config);
    println!("{}", "-".repeat(60));

    let sources = wordlist_sources(&args.wordlists)?;
    let store = WordlistStore::load(&sources)?;
    let targets = subdomain_targets(&args.target, &store)?;

    println!(
        "{} Generated {} targets. Starting scan...\n",
        style("[*]").cyan(),
        targets.len()
    );

    let sink = Arc::new(ResultSink::new(args.output.as_deref(), args.ndjson));
    let scanner = Scanner::new(config);
    scanner.scan_hosts(targets, sink).await;

    print_summary(&scanner, args.verbose);
    Ok(())
}

async fn run_dir(args: DirArgs) -> Result<()> {
    let common = args.common;
    init_tracing(common.verbose)?;
    print_banner();

    let rules = match args.match_codes {
        Some(codes) => FilterRules::new(codes, args.filter_codes, args.filter_sizes)?,
        None => FilterRules::with_default_matches(args.filter_codes, args.filter_sizes),
    };

    let file_config = load_config();
    let config = resolve_scan_config(&common, &file_config);

    print_overview(&common.target, &common.wordlists, &config);
    print_dir_overview(&args.extensions, &rules);
    println!("{}", "-".repeat(60));

    let sources = wordlist_sources(&common.wordlists)?;
    let store = WordlistStore::load(&sources)?;
    let base_targets = directory_targets(&common.target, &store)?;
    let targets = apply_extensions(base_targets, &args.extensions);

    println!(
        "{} Generated {} requests. Starting scan...\n",
        style("[*]").cyan(),
        targets.len()
    );

    let sink = Arc::new(ResultSink::new(common.output.as_deref(), common.ndjson));
    let scanner = Scanner::new(config);
    scanner.scan_pages(targets, rules, sink).await;

    print_summary(&scanner, common.verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", default_config_toml());
        return Ok(());
    }
    if cli.write_default_config {
        return write_default_config();
    }

    let Some(mode) = cli.command else {
        Cli::command().print_help()?;
        std::process::exit(2);
    };

    match mode {
        Mode::Sub(args) => run_sub(args).await,
        Mode::Dir(args) => run_dir(args).await,
    }
}
