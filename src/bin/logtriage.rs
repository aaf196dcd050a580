use anyhow::{bail, Context};
use chrono::{Duration, Utc};
use clap::Parser;
use logtriage::analyzer::{TriageAnalyzer, TriageSummary};
use logtriage::classify::Category;
use logtriage::filter::TimeRange;
use logtriage::incident::AlertPayload;
use logtriage::opts::TriageOpts;
use logtriage::parser::{self, LoadErrors, Loaded};
use logtriage::recommend::{self, Suggestion, GENERAL_STEPS};
use logtriage::record::{Record, Severity};
use logtriage::stats::RecordStats;
use logtriage::window::{self, IncidentWindow};
use serde::Serialize;
use std::io::{self, Read};
use std::sync::{Arc, Once};

fn init_parallelism() {
    static START: Once = Once::new();
    START.call_once(|| {
        let n = num_cpus::get();
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    });
}

#[derive(Parser, Debug)]
#[command(name = "logtriage", version, about = "Classify, group and triage fetched log records")]
struct Cli {
    /// Record files (`-` for stdin): saved-logs JSON, JSON array or JSON Lines.
    #[arg(required = false)]
    input: Vec<String>,

    /// Minimum severity level for the query filter
    #[arg(long, short = 's', default_value = "ERROR")]
    severity: Severity,
    /// Hours to look back when no incident is given
    #[arg(long, default_value_t = 24)]
    hours: i64,
    /// Resource type filter (e.g. cloud_run_revision)
    #[arg(long = "resource-type", short = 'r')]
    resource_type: Option<String>,
    /// Free-text search term
    #[arg(long = "search", short = 't')]
    search: Option<String>,
    /// Extra filter clause passed through verbatim
    #[arg(long = "filter", short = 'f')]
    raw_filter: Option<String>,
    /// Maximum number of records to classify
    #[arg(long, short = 'l', default_value_t = 100)]
    limit: usize,

    /// Alert payload JSON; scopes the filter to the incident's resource and window
    #[arg(long)]
    incident: Option<String>,
    #[arg(long = "minutes-before", short = 'b', default_value_t = 1)]
    minutes_before: i64,
    #[arg(long = "minutes-after", short = 'a', default_value_t = 1)]
    minutes_after: i64,
    /// Only collect ERROR and above for the incident
    #[arg(long = "errors-only", default_value_t = false)]
    errors_only: bool,

    /// Print only a specific section: filter | window | summary | suggestions | stats
    #[arg(long = "only")]
    only: Option<String>,
    /// Output format: json | table
    #[arg(long = "format", default_value = "json")]
    format: String,
    /// Number of message groups to show
    #[arg(long = "top", default_value_t = 10)]
    top: usize,
    /// Show full records
    #[arg(long = "detailed", short = 'd', default_value_t = false)]
    detailed: bool,
    /// Restrict the detailed view to one category
    #[arg(long = "error-type", short = 'e')]
    error_type: Option<String>,
}

impl Cli {
    fn opts(&self) -> anyhow::Result<TriageOpts> {
        Ok(TriageOpts {
            severity_floor: Some(self.severity),
            resource_type: self.resource_type.clone(),
            text_search: self.search.clone(),
            raw_filter: self.raw_filter.clone(),
            before: Duration::try_minutes(self.minutes_before)
                .context("--minutes-before is out of range")?,
            after: Duration::try_minutes(self.minutes_after)
                .context("--minutes-after is out of range")?,
            max_records: Some(self.limit),
            top_groups: self.top,
            errors_only: self.errors_only,
        })
    }
}

#[derive(Serialize)]
struct GroupOut<'a> {
    pattern: &'a str,
    occurrences: usize,
}

#[derive(Serialize)]
struct CategoryOut {
    category: Category,
    count: usize,
}

#[derive(Serialize)]
struct Report<'a> {
    filter: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    window: Option<IncidentWindow>,
    total_count: usize,
    categories: Vec<CategoryOut>,
    top_groups: Vec<GroupOut<'a>>,
    recent: &'a [Arc<Record>],
    suggestions: &'a [Suggestion],
    general_steps: &'static [&'static str],
    stats: RecordStats,
    errors: &'a LoadErrors,
}

fn read_input(paths: &[String]) -> anyhow::Result<Loaded> {
    let mut out = Loaded::default();
    for p in paths {
        let mut text = String::new();
        if p == "-" {
            io::stdin().lock().read_to_string(&mut text).context("reading stdin")?;
        } else {
            text = std::fs::read_to_string(p).with_context(|| format!("reading {p}"))?;
        }
        out.append(parser::parse_document(&text));
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    init_parallelism();
    let cli = Cli::parse();
    let opts = cli.opts()?;
    let now = Utc::now();

    let (filter, window) = match cli.incident.as_deref() {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            let incident = AlertPayload::from_json(&text)?.incident;
            let window = window::resolve(&incident.trigger(), opts.before, opts.after, now)?;
            log::info!(
                "incident {} project {}",
                incident.incident_id.as_deref().unwrap_or("?"),
                incident.project_id().unwrap_or("?")
            );
            (opts.incident_filter(&incident, &window)?, Some(window))
        }
        None => {
            let lookback = Duration::try_hours(cli.hours).context("--hours is out of range")?;
            let range = TimeRange::lookback(lookback, now);
            (opts.filter(Some(range)).build(), None)
        }
    };

    match cli.only.as_deref() {
        Some("filter") => {
            println!("{filter}");
            return Ok(());
        }
        Some("window") => {
            let Some(w) = window else { bail!("--only window needs --incident") };
            println!("{}", serde_json::to_string_pretty(&w)?);
            return Ok(());
        }
        _ => {}
    }
    log::info!("query filter:\n{filter}");

    let input_files = if cli.input.is_empty() { vec!["-".to_string()] } else { cli.input.clone() };
    let loaded = read_input(&input_files)?;
    if loaded.errors.total > 0 {
        log::warn!("{} entries could not be parsed", loaded.errors.total);
    }
    if loaded.records.is_empty() {
        println!("No log entries found matching the criteria.");
        return Ok(());
    }

    let mut analyzer = TriageAnalyzer::new().with_max_records(opts.max_records);
    analyzer.extend(loaded.records);
    let summary = analyzer.into_summary();
    let suggestions = recommend::recommend(&summary);

    match cli.only.as_deref() {
        Some("summary") => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }
        Some("suggestions") => {
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
            return Ok(());
        }
        Some("stats") => {
            let stats = RecordStats::collect(summary.timeline.iter().map(|r| r.as_ref()));
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }
        Some(other) => bail!("unknown section: {other}"),
        None => {}
    }

    if cli.format == "table" {
        print_summary_table(&summary, opts.top_groups);
        if cli.detailed {
            let detail_limit = if cli.limit < 100 { cli.limit } else { 10 };
            print_detailed(&summary, cli.error_type.as_deref(), detail_limit)?;
        }
        print_suggestions_table(&suggestions);
        return Ok(());
    }

    let report = Report {
        filter: &filter,
        window,
        total_count: summary.total_count,
        categories: summary
            .category_counts()
            .into_iter()
            .map(|(category, count)| CategoryOut { category, count })
            .collect(),
        top_groups: summary
            .top_groups(opts.top_groups)
            .into_iter()
            .map(|(pattern, occurrences)| GroupOut { pattern, occurrences })
            .collect(),
        recent: summary.recent(20),
        suggestions: &suggestions,
        general_steps: GENERAL_STEPS,
        stats: RecordStats::collect(summary.timeline.iter().map(|r| r.as_ref())),
        errors: &loaded.errors,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

fn print_summary_table(summary: &TriageSummary, top: usize) {
    println!("ERROR TRIAGE SUMMARY");
    println!("\nTotal Errors: {}\n", summary.total_count);

    println!("{:<20} {}", "Error Type", "Count");
    for (category, count) in summary.category_counts() {
        println!("{:<20} {}", category, count);
    }

    println!("\n{:<6} {}", "Count", "Message Pattern");
    for (pattern, count) in summary.top_groups(top) {
        println!("{:<6} {}", count, clip(pattern, 60));
    }

    println!("\n{:<20} {:<9} {:<22} {}", "Timestamp", "Severity", "Resource", "Message");
    for r in summary.recent(20) {
        println!(
            "{:<20} {:<9} {:<22} {}",
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.severity,
            r.resource_type,
            clip(&r.message, 60)
        );
    }
}

fn print_detailed(summary: &TriageSummary, error_type: Option<&str>, limit: usize) -> anyhow::Result<()> {
    let records: &[Arc<Record>] = match error_type {
        Some(name) => {
            let Some(category) = Category::parse(name) else { bail!("unknown error type: {name}") };
            println!("\nShowing {} errors of type: {}", summary.count(category).min(limit), category);
            summary.records_in(category)
        }
        None => {
            println!("\nShowing {} most recent errors", summary.timeline.len().min(limit));
            &summary.timeline
        }
    };
    for (i, r) in records.iter().take(limit).enumerate() {
        println!("\nError #{}", i + 1);
        println!("Timestamp:    {}", r.timestamp.format("%Y-%m-%dT%H:%M:%SZ"));
        println!("Severity:     {}", r.severity);
        println!("Resource:     {}", r.resource_type);
        println!("Service:      {}", r.service().unwrap_or("N/A"));
        println!("Revision:     {}", r.revision().unwrap_or("N/A"));
        println!("Insert ID:    {}", r.insert_id);
        if let Some(trace) = &r.trace {
            println!("Trace:        {trace}");
        }
        println!("\nMessage:\n{}", r.message);
        if !r.labels.is_empty() {
            println!("\nLabels:");
            for (k, v) in &r.labels {
                println!("  {k}: {v}");
            }
        }
    }
    Ok(())
}

fn print_suggestions_table(suggestions: &[Suggestion]) {
    println!("\nSUGGESTED NEXT STEPS");
    if suggestions.is_empty() {
        println!("\nNo specific patterns detected. Review detailed errors above for more context.");
    } else {
        println!("{:<9} {:<40} {:<6} {}", "Priority", "Issue", "Count", "Recommended Action");
        for s in suggestions {
            println!("{:<9} {:<40} {:<6} {}", s.priority, s.issue, s.count, s.action);
        }
    }
    println!("\nGeneral Triage Steps:");
    for (i, step) in GENERAL_STEPS.iter().enumerate() {
        println!("{}. {}", i + 1, step);
    }
}
