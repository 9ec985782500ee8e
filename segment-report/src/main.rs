use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use segment_pipeline::export::write_members_csv_file;
use segment_pipeline::table::{GradeBucket, GradeTotals, TableSummary};
use segment_pipeline::{
    grade_buckets, AmountField, EnrichedRecord, Grade, MemberQuery, MemberTable, NetCategory,
    SegmentationConfig, ZeroDepositPolicy,
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "segment-report")]
#[command(about = "Member segmentation digest for a deposit/withdraw report", long_about = None)]
#[command(version)]
struct Cli {
    /// Member report CSV with Username, Deposit Amount and Withdraw Amount columns
    csv: PathBuf,

    /// JSON segmentation config; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Deposit above which a member is VIP (required unless set in --config)
    #[arg(long)]
    vip_threshold: Option<f64>,

    #[arg(long)]
    high_risk_ratio: Option<f64>,

    #[arg(long)]
    high_withdraw_ratio: Option<f64>,

    /// High Risk outcome for zero-deposit members: not-high-risk, high-risk or reject
    #[arg(long = "zero-deposit")]
    zero_deposit: Option<ZeroDepositPolicy>,

    /// Number of members in the ranking
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Column to rank by: deposit, withdraw, net, profit
    #[arg(long, default_value = "profit")]
    rank_by: AmountField,

    /// Case-insensitive username regex
    #[arg(short, long)]
    search: Option<String>,

    /// Match --search as plain text
    #[arg(long)]
    literal: bool,

    #[arg(long)]
    net_category: Option<NetCategory>,

    #[arg(long)]
    vip_only: bool,

    #[arg(long)]
    grade: Option<Grade>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Write every enriched member to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Exit with an error when no active member remains
    #[arg(long)]
    fail_on_empty: bool,
}

impl Cli {
    /// Config file first, then flag overrides. The VIP threshold has no default.
    fn segmentation_config(&self) -> Result<SegmentationConfig> {
        let mut config = match (&self.config, self.vip_threshold) {
            (Some(path), _) => SegmentationConfig::load_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            (None, Some(vip_threshold)) => SegmentationConfig::new(vip_threshold),
            (None, None) => bail!("a VIP threshold is required: pass --vip-threshold or --config"),
        };

        if let Some(vip_threshold) = self.vip_threshold {
            config = config.with_vip_threshold(vip_threshold);
        }
        if let Some(ratio) = self.high_risk_ratio {
            config = config.with_high_risk_ratio(ratio);
        }
        if let Some(ratio) = self.high_withdraw_ratio {
            config = config.with_high_withdraw_ratio(ratio);
        }
        if let Some(policy) = self.zero_deposit {
            config = config.with_zero_deposit_policy(policy);
        }

        config.validate().context("invalid segmentation config")?;
        Ok(config)
    }

    fn member_query(&self) -> MemberQuery {
        MemberQuery {
            username_pattern: self.search.clone().unwrap_or_default(),
            literal: self.literal,
            net_category: self.net_category,
            vip_only: self.vip_only,
            grade: self.grade,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportJson<'a> {
    generated_at: String,
    source: String,
    config: &'a SegmentationConfig,
    pipeline_ms: u128,
    summary: TableSummary,
    grades: Vec<GradeTotals>,
    top: TopJson,
    search: SearchJson,
}

#[derive(Serialize)]
struct TopJson {
    rank_by: String,
    members: Vec<EnrichedRecord>,
}

#[derive(Serialize)]
struct SearchJson {
    pattern: String,
    literal: bool,
    net_category: Option<NetCategory>,
    vip_only: bool,
    grade: Option<Grade>,
    matched: usize,
    buckets: Vec<GradeBucket>,
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

/// Format an amount as ringgit with comma thousands separators and two decimals.
fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    let digits = (cents / 100).to_string();
    let mut whole = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            whole.push(',');
        }
        whole.push(ch);
    }
    let whole: String = whole.chars().rev().collect();

    format!("{}RM{}.{:02}", sign, whole, cents % 100)
}

fn flag(set: bool, label: &'static str) -> &'static str {
    if set {
        label
    } else {
        ""
    }
}

fn print_member(rank: Option<usize>, m: &EnrichedRecord) {
    let position = rank.map(|r| format!("{}.", r)).unwrap_or_default();
    println!(
        "  {:>4} {:20} {:>4} {:13} {:>14} {:>14} {:>14}  {} {} {}",
        position,
        m.username,
        m.grade,
        m.net_category,
        format_money(m.deposit_amount),
        format_money(m.withdraw_amount),
        format_money(m.profit),
        flag(m.vip, "VIP"),
        flag(m.high_risk, "RISK"),
        flag(m.high_withdraw, "HW"),
    );
}

fn print_human(
    table: &MemberTable,
    config: &SegmentationConfig,
    cli: &Cli,
    top: &[EnrichedRecord],
    buckets: &[GradeBucket],
    pipeline_ms: u128,
) {
    let summary = table.summary();

    println!();
    println!("  \u{2554}{}\u{2557}", "\u{2550}".repeat(62));
    println!("  \u{2551}{:^62}\u{2551}", "MEMBER SEGMENTATION DIGEST");
    println!("  \u{255a}{}\u{255d}", "\u{2550}".repeat(62));
    println!();

    println!(
        "  {} active members  \u{00b7}  {} VIP (deposit > {})  \u{00b7}  {} high risk  \u{00b7}  {} high withdraw",
        summary.members,
        summary.vip_members,
        format_money(config.vip_threshold),
        summary.high_risk_members,
        summary.high_withdraw_members,
    );
    println!(
        "  Total Deposit {}  \u{00b7}  Total Withdraw {}  \u{00b7}  Total Profit {}",
        format_money(summary.total_deposit),
        format_money(summary.total_withdraw),
        format_money(summary.total_profit),
    );
    println!();

    if table.is_empty() {
        println!("  No active members in this report.");
        println!();
        return;
    }

    println!("  {:\u{2500}<62}", " Grades ");
    for totals in table.grade_breakdown() {
        println!(
            "  {:>4}  {:>5} members  deposit {:>14}  withdraw {:>14}  profit {:>14}",
            totals.grade,
            totals.members,
            format_money(totals.deposit),
            format_money(totals.withdraw),
            format_money(totals.profit),
        );
    }
    println!();

    println!("  {:\u{2500}<62}", format!(" Top {} by {} ", top.len(), cli.rank_by));
    for (i, m) in top.iter().enumerate() {
        print_member(Some(i + 1), m);
    }
    println!();

    let query = cli.member_query();
    if !query.username_pattern.is_empty() {
        println!(
            "  Search: \"{}\"{}",
            query.username_pattern,
            if query.literal { " (literal)" } else { "" }
        );
    }
    for bucket in buckets {
        println!("  {:\u{2500}<62}", format!(" Grade {} ", bucket.grade));
        for m in &bucket.members {
            print_member(None, m);
        }
        println!("  Total Members in Grade {}: {}", bucket.grade, bucket.count);
        println!();
    }

    println!("  \u{23f1}  Pipeline ran in {}ms", pipeline_ms);
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "segment_pipeline=info,segment_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = cli.segmentation_config()?;

    let start = Instant::now();
    let mut table = MemberTable::ingest_file(&cli.csv, &config)
        .with_context(|| format!("processing {}", cli.csv.display()))?;
    if cli.fail_on_empty {
        table = table
            .ensure_non_empty()
            .with_context(|| format!("{} has no active members", cli.csv.display()))?;
    }

    let top = table.top_n(cli.rank_by, cli.top);
    let query = cli.member_query();
    let matched = table
        .filter(&query)
        .with_context(|| format!("searching for \"{}\"", query.username_pattern))?;
    let buckets = grade_buckets(&matched);
    let pipeline_ms = start.elapsed().as_millis();

    tracing::info!(
        members = table.len(),
        matched = matched.len(),
        pipeline_ms,
        "segmentation complete"
    );

    if let Some(path) = &cli.export {
        write_members_csv_file(table.records(), path)
            .with_context(|| format!("exporting to {}", path.display()))?;
    }

    if cli.json {
        let report = ReportJson {
            generated_at: Utc::now().to_rfc3339(),
            source: cli.csv.display().to_string(),
            config: &config,
            pipeline_ms,
            summary: table.summary(),
            grades: table.grade_breakdown(),
            top: TopJson {
                rank_by: cli.rank_by.to_string(),
                members: top,
            },
            search: SearchJson {
                pattern: query.username_pattern,
                literal: query.literal,
                net_category: query.net_category,
                vip_only: query.vip_only,
                grade: query.grade,
                matched: matched.len(),
                buckets,
            },
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human(&table, &config, &cli, &top, &buckets, pipeline_ms);
    }

    Ok(())
}
