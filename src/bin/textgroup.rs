use anyhow::Context;
use clap::Parser;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::Once;
use textgroup::record::LogRecord;
use textgroup::report::{self, GroupSummary, OutputFormat, SortOrder};
use textgroup::{GroupingConfig, Grouper};
use tracing_subscriber::EnvFilter;

fn init_parallelism() {
    static START: Once = Once::new();
    START.call_once(|| {
        let n = num_cpus::get();
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    });
}

fn init_logging(verbose: bool) {
    let default = if verbose { "textgroup=debug" } else { "textgroup=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(name = "textgroup", version, about = "Group log lines by templates inferred from text diffs")]
struct Cli {
    /// Input files (`-` for stdin). May be repeated.
    #[arg(required = false)]
    input: Vec<String>,

    /// JSON file with grouping settings; flags below override it
    #[arg(long = "config")]
    config: Option<String>,

    #[arg(long = "threshold")] threshold: Option<f64>,
    #[arg(long = "min-literal")] min_literal: Option<usize>,
    #[arg(long = "placeholder")] placeholder: Option<char>,
    #[arg(long = "display-char")] display_char: Option<char>,
    /// Keep a trailing differing run as a placeholder instead of dropping it
    #[arg(long = "flush-trailing", default_value_t = false)] flush_trailing: bool,
    /// Per-diff time budget in milliseconds (0 = unbounded)
    #[arg(long = "diff-timeout-ms")] diff_timeout_ms: Option<u64>,

    /// For JSON lines, group by this flattened field (e.g. `msg`, `event.message`)
    #[arg(long = "key-field")] key_field: Option<String>,

    /// Offer each line to existing groups concurrently
    #[arg(long = "parallel", default_value_t = false)] parallel: bool,

    /// Output format: json | table
    #[arg(long = "format", default_value = "json")] format: OutputFormat,
    /// Sort groups by: count | input
    #[arg(long = "sort", default_value = "count")] sort_by: SortOrder,
    #[arg(long = "examples", default_value_t = 3)] examples: usize,
    #[arg(long = "top")] top: Option<usize>,
    #[arg(long = "match")] match_re: Option<String>,
    #[arg(long = "exclude")] exclude_re: Option<String>,

    /// Log every accept/merge decision to stderr
    #[arg(long = "verbose", short = 'v', default_value_t = false)] verbose: bool,
}

impl Cli {
    fn grouping_config(&self) -> anyhow::Result<GroupingConfig> {
        let mut cfg = match &self.config {
            Some(path) => GroupingConfig::from_json_file(path)
                .with_context(|| format!("loading config from {path}"))?,
            None => GroupingConfig::default(),
        };
        if let Some(t) = self.threshold { cfg.similarity_threshold = t; }
        if let Some(n) = self.min_literal { cfg.min_literal_run = n; }
        if let Some(c) = self.placeholder { cfg.placeholder_char = c; }
        if let Some(c) = self.display_char { cfg.placeholder_display_char = c; }
        if self.flush_trailing { cfg.flush_trailing_placeholder = true; }
        if let Some(ms) = self.diff_timeout_ms { cfg.diff_timeout_ms = Some(ms); }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn read_records(paths: &[String], key_field: Option<&str>) -> io::Result<Vec<LogRecord>> {
    let mut out = Vec::new();
    let mut push_from = |reader: &mut dyn BufRead| -> io::Result<()> {
        for (idx, line) in reader.lines().enumerate() {
            let l = line?;
            if l.trim().is_empty() { continue; }
            out.push(LogRecord::parse_with_key_field(&l, idx + 1, key_field));
        }
        Ok(())
    };
    for p in paths {
        if p == "-" {
            let stdin = io::stdin();
            let mut reader = stdin.lock();
            push_from(&mut reader)?;
        } else {
            let f = File::open(p)?;
            // Larger buffer reduces syscalls on big files.
            let mut r = BufReader::with_capacity(1 << 20, f);
            push_from(&mut r)?;
        }
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    init_parallelism();

    let config = cli.grouping_config()?;
    let grouper = Grouper::new(config)?;

    // Default to stdin if no input specified
    let input_files = if cli.input.is_empty() { vec!["-".to_string()] } else { cli.input.clone() };
    let records = read_records(&input_files, cli.key_field.as_deref())?;
    let total = records.len();

    let groups = if cli.parallel {
        grouper.group_parallel(records)?
    } else {
        grouper.group(records)?
    };

    let mut out = report::build_report(&groups, grouper.config(), total, cli.examples, cli.sort_by);
    if let Some(re) = &cli.match_re {
        let rx = Regex::new(re).with_context(|| format!("invalid --match regex {re}"))?;
        out.groups.retain(|g| rx.is_match(&g.template));
    }
    if let Some(re) = &cli.exclude_re {
        let rx = Regex::new(re).with_context(|| format!("invalid --exclude regex {re}"))?;
        out.groups.retain(|g| !rx.is_match(&g.template));
    }
    if let Some(top) = cli.top { out.groups.truncate(top); }
    out.total_groups = out.groups.len();

    match cli.format {
        OutputFormat::Table => print_groups_table(&out.groups),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&out)?),
    }
    Ok(())
}

fn print_groups_table(groups: &[GroupSummary]) {
    println!("{:<6} {:<8} {:<6} {}", "Count", "Freq", "Holes", "Template");
    for g in groups {
        println!("{:<6} {:<8.4} {:<6} {}", g.count, g.frequency, g.placeholders, g.template);
    }
}
