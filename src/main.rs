use clap::Parser;

use testledger::cli::{Cli, Command, PublishArgs, RecordsArgs, SummaryArgs};
use testledger::ingest;
use testledger::publisher::ResultPublisher;
use testledger::storage::{MemoryStore, ResultStore, SqliteStore};
use testledger::LedgerResult;

fn main() {
    testledger::logging::init();

    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run() -> LedgerResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Publish(args) => publish(&args),
        Command::Records(args) => records(&args),
        Command::Summary(args) => summary(&args),
    }
}

fn publish(args: &PublishArgs) -> LedgerResult<()> {
    let config = args.effective_config()?;
    let document = ingest::load_document(&args.input)?;

    let memory_store;
    let sqlite_store;
    let store: &dyn ResultStore = if args.dry_run {
        memory_store = MemoryStore::new();
        &memory_store
    } else {
        sqlite_store = SqliteStore::open(&config.db_path)?;
        &sqlite_store
    };

    let publisher = ResultPublisher::new(store, config);
    let summary = publisher.publish_document(&document)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "published {} record(s) across {} suite(s) ({} suppressed, {} suite error(s), {} record error(s))",
            summary.records_published,
            summary.suites_seen,
            summary.suites_suppressed,
            summary.suites_failed,
            summary.records_failed
        );
    }
    Ok(())
}

fn records(args: &RecordsArgs) -> LedgerResult<()> {
    let store = SqliteStore::open(&args.db)?;
    let records = store.list_recent(args.limit)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for stored in &records {
            println!(
                "{}  {}  {}/{} build {} [{}]  {}  {}ms",
                stored.recorded_at_rfc3339,
                stored.record.status,
                stored.record.component,
                stored.record.version,
                stored.record.build_number,
                stored.record.platform,
                stored.record.test_key,
                stored.record.duration_millis
            );
        }
    }
    Ok(())
}

fn summary(args: &SummaryArgs) -> LedgerResult<()> {
    let store = SqliteStore::open(&args.db)?;
    let counts = store.count_by_status(args.component.as_deref())?;

    if args.json {
        let value: serde_json::Map<String, serde_json::Value> = counts
            .into_iter()
            .map(|(status, count)| (status, serde_json::Value::from(count)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for (status, count) in &counts {
            println!("{status}: {count}");
        }
    }
    Ok(())
}
