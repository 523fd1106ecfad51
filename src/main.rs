use clap::{Arg, ArgMatches, Command};
use clearnet::blocklist::{BlockPolicy, BlockSource, Blocklist};
use clearnet::config::loader::{
    load_config_or_default, load_rules, write_default_config, write_default_rules,
};
use clearnet::config::Config;
use clearnet::history::ScanHistory;
use clearnet::output;
use clearnet::reports::{Report, ReportStatus, ReportStore, ReportType};
use clearnet::statistics::{self, StatEvent, StatisticsCollector};
use clearnet::UrlRiskEngine;
use log::LevelFilter;
use std::process;

fn cli() -> Command {
    Command::new("clearnet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Offline URL risk scoring for phishing, scam and malicious links")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("clearnet.yaml")
                .global(true),
        )
        .arg(
            Arg::new("rules")
                .short('r')
                .long("rules")
                .value_name("FILE")
                .help("Rule file overriding the configured rule set")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging with per-analyzer scores")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("scan")
                .about("Analyze one or more URLs")
                .arg(Arg::new("urls").value_name("URL").required(true).num_args(1..))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print results as JSON")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("details")
                        .long("details")
                        .help("Include the per-analyzer breakdown")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Report a fraudulent URL")
                .arg(Arg::new("url").long("url").value_name("URL").required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("TYPE")
                        .help("phishing, scam, malware, fake_shop, identity_theft, cryptocurrency_scam, other")
                        .required(true),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .value_name("TEXT")
                        .default_value(""),
                )
                .arg(Arg::new("email").long("email").value_name("EMAIL")),
        )
        .subcommand(
            Command::new("stats").about("Show scan statistics").arg(
                Arg::new("reset")
                    .long("reset")
                    .help("Reset all statistics and exit")
                    .action(clap::ArgAction::SetTrue),
            ),
        )
        .subcommand(
            Command::new("history").about("Show recent scans").arg(
                Arg::new("limit")
                    .long("limit")
                    .value_name("N")
                    .value_parser(clap::value_parser!(usize))
                    .default_value("20"),
            ),
        )
        .subcommand(
            Command::new("reports").about("Show recent reports and their status").arg(
                Arg::new("limit")
                    .long("limit")
                    .value_name("N")
                    .value_parser(clap::value_parser!(usize))
                    .default_value("10"),
            ),
        )
        .subcommand(
            Command::new("review")
                .about("Record the review outcome for a reported URL")
                .arg(Arg::new("url").long("url").value_name("URL").required(true))
                .arg(
                    Arg::new("status")
                        .long("status")
                        .value_name("STATUS")
                        .help("pending, reviewing, approved, rejected")
                        .required(true),
                )
                .arg(Arg::new("notes").long("notes").value_name("TEXT")),
        )
        .subcommand(Command::new("blocked").about("List actively blocked URLs"))
        .subcommand(
            Command::new("unblock")
                .about("Lift a block")
                .arg(Arg::new("url").value_name("URL").required(true)),
        )
        .subcommand(
            Command::new("classify")
                .about("Map a raw score to its risk level")
                .arg(
                    Arg::new("score")
                        .value_name("SCORE")
                        .value_parser(clap::value_parser!(i32))
                        .allow_negative_numbers(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("generate-config")
                .about("Write default configuration and rule files")
                .arg(Arg::new("file").value_name("FILE").required(true))
                .arg(
                    Arg::new("rules-file")
                        .long("rules-file")
                        .value_name("FILE")
                        .help("Also write the built-in rule set here"),
                ),
        )
        .subcommand(Command::new("test-config").about("Validate configuration and rules"))
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("clearnet.yaml");

    if let Some(("generate-config", sub)) = matches.subcommand() {
        init_logging(matches.get_flag("verbose"), None);
        generate_default_config(sub);
        return;
    }

    let config = match load_config_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };
    init_logging(
        matches.get_flag("verbose"),
        config.logging.as_ref().map(|l| l.level.as_str()),
    );

    let rules_override = matches.get_one::<String>("rules").map(String::as_str);
    let engine = match load_rules(&config, rules_override)
        .and_then(|rules| UrlRiskEngine::from_config(&rules).map_err(anyhow::Error::from))
    {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error loading rules: {e:#}");
            process::exit(1);
        }
    };

    let result = match matches.subcommand() {
        Some(("scan", sub)) => run_scan(&engine, &config, sub).await,
        Some(("report", sub)) => run_report(&engine, &config, sub).await,
        Some(("stats", sub)) => run_stats(&config, sub),
        Some(("history", sub)) => run_history(&config, sub),
        Some(("reports", sub)) => run_reports(&config, sub),
        Some(("review", sub)) => run_review(&config, sub),
        Some(("blocked", _)) => run_blocked(&config),
        Some(("unblock", sub)) => run_unblock(&config, sub),
        Some(("classify", sub)) => {
            let score = sub.get_one::<i32>("score").copied().unwrap_or(0);
            let classification = engine.classify(score);
            println!(
                "{} -> {} ({}, {})",
                score, classification.level, classification.label, classification.color
            );
            Ok(())
        }
        Some(("test-config", _)) => {
            let rules = engine.rules();
            println!("Configuration: {}", config_path);
            println!("  Data directory: {}", config.storage.data_dir);
            println!("  Trusted domains: {}", rules.trusted_domains.len());
            println!("  Malicious signatures: {}", rules.signatures.len());
            println!("  Suspicious keywords: {}", rules.suspicious_keywords.len());
            println!("  Phishing indicators: {}", rules.phishing_indicators.len());
            println!(
                "  Thresholds: high >= {}, medium >= {}, low >= {}",
                rules.thresholds.high, rules.thresholds.medium, rules.thresholds.low
            );
            println!("All signatures compiled successfully.");
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool, configured: Option<&str>) {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        configured
            .and_then(|level| level.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Info)
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();
}

fn generate_default_config(sub: &ArgMatches) {
    let Some(path) = sub.get_one::<String>("file") else {
        return;
    };

    match write_default_config(path) {
        Ok(()) => println!("Default configuration written to: {path}"),
        Err(e) => {
            eprintln!("Error writing configuration: {e:#}");
            process::exit(1);
        }
    }

    if let Some(rules_path) = sub.get_one::<String>("rules-file") {
        match write_default_rules(rules_path) {
            Ok(()) => println!("Default rule set written to: {rules_path}"),
            Err(e) => {
                eprintln!("Error writing rule set: {e:#}");
                process::exit(1);
            }
        }
    }
}

fn start_statistics(config: &Config) -> Option<StatisticsCollector> {
    if !config.statistics_enabled() {
        return None;
    }

    match StatisticsCollector::new(
        config.storage.statistics_path(),
        config.flush_interval_seconds(),
    ) {
        Ok(collector) => Some(collector),
        Err(e) => {
            log::warn!("Statistics disabled: {e:#}");
            None
        }
    }
}

async fn stop_statistics(collector: Option<StatisticsCollector>) {
    if let Some(collector) = collector {
        if let Err(e) = collector.shutdown().await {
            log::error!("Failed to flush statistics: {e:#}");
        }
    }
}

async fn run_scan(engine: &UrlRiskEngine, config: &Config, sub: &ArgMatches) -> anyhow::Result<()> {
    let urls: Vec<String> = sub
        .get_many::<String>("urls")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let as_json = sub.get_flag("json");
    let with_details = sub.get_flag("details");

    let history = ScanHistory::new(config.storage.history_path());
    let blocklist = Blocklist::new(config.storage.blocklist_path());
    let policy = BlockPolicy::from(&config.blocking);
    let stats = start_statistics(config);

    let mut results = Vec::with_capacity(urls.len());
    for url in urls {
        let result = engine.analyze_async(url).await;

        if config.storage.history_enabled {
            if let Err(e) = history.record(&result) {
                log::error!("Failed to save scan history: {e:#}");
            }
        }
        if let Some(stats) = &stats {
            stats.record_event(StatEvent::UrlScanned {
                risk_level: result.risk_level,
                threats: result.threats.clone(),
            });
        }

        if let Some(entry) = policy.evaluate(&result, BlockSource::AutomatedDetection) {
            match blocklist.add(&entry) {
                Ok(true) => {
                    if let Some(stats) = &stats {
                        stats.record_event(StatEvent::UrlBlocked);
                    }
                }
                Ok(false) => {}
                Err(e) => log::error!("Auto-block failed for {}: {e:#}", entry.url),
            }
        }

        if !as_json {
            println!("{}", output::render_analysis(&result, with_details));
        }
        results.push(result);
    }

    stop_statistics(stats).await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    Ok(())
}

async fn run_report(
    engine: &UrlRiskEngine,
    config: &Config,
    sub: &ArgMatches,
) -> anyhow::Result<()> {
    // Reports and blocks are keyed by URL, so stray whitespace is dropped.
    let url = sub
        .get_one::<String>("url")
        .map(|u| u.trim().to_string())
        .unwrap_or_default();
    let report_type: ReportType = sub
        .get_one::<String>("type")
        .map(String::as_str)
        .unwrap_or("other")
        .parse()?;
    let description = sub
        .get_one::<String>("description")
        .map(String::as_str)
        .unwrap_or("");
    let email = sub.get_one::<String>("email").map(String::as_str);

    let analysis = engine.analyze_async(url).await;
    let report = Report::new(&analysis, report_type, description, email)?;

    let reports = ReportStore::new(config.storage.reports_path());
    reports.submit(&report)?;
    println!(
        "Report received: {} ({}, risk score {})",
        report.url, report.report_type, report.risk_score
    );

    let stats = start_statistics(config);
    if let Some(stats) = &stats {
        stats.record_event(StatEvent::ReportSubmitted);
    }

    let policy = BlockPolicy::from(&config.blocking);
    if let Some(entry) = policy.evaluate(&analysis, BlockSource::UserReport) {
        let blocklist = Blocklist::new(config.storage.blocklist_path());
        if blocklist.add(&entry)? {
            reports.mark_blocked(&entry.url)?;
            if let Some(stats) = &stats {
                stats.record_event(StatEvent::UrlBlocked);
            }
            println!("High-risk URL blocked ({})", entry.block_reason);
        }
    }

    stop_statistics(stats).await;
    Ok(())
}

fn run_stats(config: &Config, sub: &ArgMatches) -> anyhow::Result<()> {
    let path = config.storage.statistics_path();

    if sub.get_flag("reset") {
        statistics::reset_counters(&path)?;
        println!("Statistics reset successfully");
        return Ok(());
    }

    if !config.statistics_enabled() {
        println!("Statistics are not enabled in configuration");
    }
    let counters = statistics::load_counters(&path)?;
    print!("{}", output::render_counters(&counters));
    Ok(())
}

fn run_history(config: &Config, sub: &ArgMatches) -> anyhow::Result<()> {
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(20);
    let history = ScanHistory::new(config.storage.history_path());

    let records = history.recent(limit)?;
    let summary = history.summary()?;
    print!("{}", output::render_history(&records, &summary));
    Ok(())
}

fn run_reports(config: &Config, sub: &ArgMatches) -> anyhow::Result<()> {
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(10);
    let reports = ReportStore::new(config.storage.reports_path());
    print!("{}", output::render_reports(&reports.recent(limit)?));
    Ok(())
}

fn run_review(config: &Config, sub: &ArgMatches) -> anyhow::Result<()> {
    let url = sub.get_one::<String>("url").map(|u| u.trim()).unwrap_or("");
    let status: ReportStatus = sub
        .get_one::<String>("status")
        .map(String::as_str)
        .unwrap_or("reviewing")
        .parse()?;
    if status == ReportStatus::Blocked {
        anyhow::bail!("Blocking goes through the block policy; use `report` or `unblock`");
    }
    let notes = sub.get_one::<String>("notes").map(String::as_str);

    let reports = ReportStore::new(config.storage.reports_path());
    match reports.review(url, status, notes)? {
        0 => println!("No open reports for {url}"),
        n => println!("{n} report(s) for {url} marked {status}"),
    }
    Ok(())
}

fn run_blocked(config: &Config) -> anyhow::Result<()> {
    let blocklist = Blocklist::new(config.storage.blocklist_path());
    print!("{}", output::render_blocklist(&blocklist.active()?));
    Ok(())
}

fn run_unblock(config: &Config, sub: &ArgMatches) -> anyhow::Result<()> {
    let url = sub.get_one::<String>("url").map(String::as_str).unwrap_or("");
    let blocklist = Blocklist::new(config.storage.blocklist_path());

    match blocklist.unblock(url)? {
        0 => println!("Not blocked: {url}"),
        n => println!("Unblocked {url} ({n} entr{})", if n == 1 { "y" } else { "ies" }),
    }
    Ok(())
}
