//! Command-line interface for sentex
//! Reads tab-separated reviews and prints scored sentiment excerpts, one record per line.
//!
//! Usage:
//!   sentex `<input>` [--vocab `<dir>`] [--domains `<a,b>`] [--format `<tsv|json>`]   - Extract excerpts
//!   sentex `<input>` --assess                                                   - Per-domain scores
//!
//! Input lines are `id<TAB>title<TAB>body`; an input of `-` reads standard input.
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use clap::{Arg, ArgAction, ArgMatches, Command};
use sentex_config::{ConfigError, Loader, SentexConfig};
use sentex_core::sentex::analyzer::SentimentAnalyzer;
use sentex_core::sentex::assessing::assess;
use sentex_core::sentex::collecting::FinalRecord;
use sentex_core::sentex::document::Document;
use sentex_core::sentex::statistics::ExtractionStatistics;
use sentex_core::sentex::vocabulary::DirectorySource;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let matches = Command::new("sentex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract scored sentiment excerpts from reviews")
        .arg_required_else_help(true)
        .arg(
            Arg::new("input")
                .help("Tab-separated reviews (id, title, body), or - for standard input")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("vocab")
                .long("vocab")
                .help("Vocabulary directory (default: vocabulary.directory from the configuration)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("domains")
                .long("domains")
                .short('d')
                .help("Comma-separated domains to analyze")
                .value_delimiter(','),
        )
        .arg(
            Arg::new("polite")
                .long("polite")
                .help("Drop excerpts whose sentence contains a taboo phrase")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .short('j')
                .help("Number of domain worker threads")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .help("Documents indexed together")
                .value_parser(clap::value_parser!(usize))
                .default_value("1000"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(["tsv", "json"])
                .default_value("tsv"),
        )
        .arg(
            Arg::new("assess")
                .long("assess")
                .help("Print aggregate per-domain scores instead of excerpts")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Log per-domain record counts when done")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = load_config(&matches);
    let domains: Vec<String> = match matches.get_many::<String>("domains") {
        Some(domains) => domains.cloned().collect(),
        None => config.vocabulary.domains.clone(),
    };
    let input = matches
        .get_one::<String>("input")
        .expect("input is a required argument");
    let format = matches
        .get_one::<String>("format")
        .expect("format has a default value");
    let batch_size = matches
        .get_one::<usize>("batch-size")
        .copied()
        .unwrap_or(1000)
        .max(1);

    handle_extract_command(
        &config,
        &domains,
        input,
        &Output {
            format,
            assess: matches.get_flag("assess"),
            stats: matches.get_flag("stats"),
            batch_size,
        },
    );
}

struct Output<'a> {
    format: &'a str,
    assess: bool,
    stats: bool,
    batch_size: usize,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn fail(message: impl Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

/// Layer the configuration file and command line flags over the defaults.
fn load_config(matches: &ArgMatches) -> SentexConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    apply_flags(loader, matches)
        .and_then(Loader::build)
        .unwrap_or_else(|e| fail(format!("Configuration error: {}", e)))
}

fn apply_flags(mut loader: Loader, matches: &ArgMatches) -> Result<Loader, ConfigError> {
    if matches.get_flag("polite") {
        loader = loader.polite()?;
    }
    if let Some(workers) = matches.get_one::<usize>("workers") {
        loader = loader.workers(*workers)?;
    }
    if let Some(vocab) = matches.get_one::<String>("vocab") {
        loader = loader.vocabulary_directory(vocab)?;
    }
    Ok(loader)
}

/// Handle the extraction, batch by batch
fn handle_extract_command(
    config: &SentexConfig,
    domains: &[String],
    input: &str,
    output: &Output,
) {
    let source = DirectorySource::new(&config.vocabulary.directory);
    let analyzer = SentimentAnalyzer::load(&source, domains, &config.settings())
        .unwrap_or_else(|e| fail(format!("Vocabulary error: {}", e)));
    for unavailable in analyzer.unavailable() {
        eprintln!("Skipping domain {}: {}", unavailable.domain, unavailable.error);
    }
    if analyzer.domains().is_empty() {
        fail(format!(
            "No domain vocabulary could be compiled from {}",
            config.vocabulary.directory.display()
        ));
    }

    let documents =
        read_documents(input).unwrap_or_else(|e| fail(format!("Error reading {}: {}", input, e)));
    let mut statistics = ExtractionStatistics::new(&analyzer.domains());
    let mut kept = Vec::new();

    for batch in documents.chunks(output.batch_size) {
        let records = analyzer
            .analyze(batch)
            .unwrap_or_else(|e| fail(format!("Extraction error: {}", e)))
            .final_records();
        statistics.record(batch.len(), &records);
        if output.assess {
            kept.extend(records);
        } else {
            print_records(&records, output.format);
        }
    }

    if output.assess {
        let scores = assess(&kept, &analyzer.domains(), &config.assessment);
        print_scores(&scores, output.format);
    }
    if output.stats {
        tracing::info!("extraction statistics\n{}", statistics);
    }
}

fn print_records(records: &[FinalRecord], format: &str) {
    for record in records {
        match format {
            "json" => {
                let line = serde_json::to_string(record)
                    .unwrap_or_else(|e| fail(format!("Error formatting record: {}", e)));
                println!("{}", line);
            }
            _ => println!("{}", record),
        }
    }
}

fn print_scores(scores: &BTreeMap<String, i32>, format: &str) {
    match format {
        "json" => {
            let text = serde_json::to_string_pretty(scores)
                .unwrap_or_else(|e| fail(format!("Error formatting scores: {}", e)));
            println!("{}", text);
        }
        _ => {
            for (domain, score) in scores {
                println!("{}\t{}", domain, score);
            }
        }
    }
}

fn read_documents(input: &str) -> io::Result<Vec<Document>> {
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(input)?))
    };

    let mut documents = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Some(document) => documents.push(document),
            None => tracing::warn!(line = index + 1, "skipping line without id, title and body"),
        }
    }
    tracing::info!(documents = documents.len(), "read input");
    Ok(documents)
}

fn parse_line(line: &str) -> Option<Document> {
    let mut fields = line.splitn(3, '\t');
    let id = fields.next()?;
    let title = fields.next()?;
    let body = fields.next()?;
    Some(Document::new(id, title, body))
}
