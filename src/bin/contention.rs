//! dyntable Contention Driver
//!
//! Races several writers against one counter row of an in-memory table,
//! each applying optimistic read-increment-write updates, and reports how
//! many increments landed and how many writers ran out of retries.

use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;
use dyntable::{
    CompositePrimaryKey, CompositePrimaryKeyTable, InMemoryTable, MutationPatterns,
    StandardPrimaryKeyAttributes, TableConfig, TableError, TypedDatabaseItem,
};
use tracing_subscriber::{fmt, EnvFilter};

type CounterKey = CompositePrimaryKey<StandardPrimaryKeyAttributes>;
type CounterItem = TypedDatabaseItem<StandardPrimaryKeyAttributes, u64>;

/// dyntable Contention Driver
#[derive(Parser, Debug)]
#[command(name = "dyntable-contention")]
#[command(about = "Race optimistic writers against a single counter row")]
#[command(version)]
struct Args {
    /// Number of concurrent writer threads
    #[arg(short, long, default_value = "8")]
    writers: usize,

    /// Increments applied by each writer
    #[arg(short, long, default_value = "100")]
    increments: usize,

    /// Attempts per increment before a writer gives up on it
    #[arg(short, long, default_value_t = dyntable::DEFAULT_RETRIES)]
    retries: usize,

    /// Logical table name (shows up in log events)
    #[arg(short, long, default_value = "contention")]
    table_name: String,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dyntable=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("dyntable contention driver v{}", dyntable::VERSION);
    tracing::info!(
        "{} writers x {} increments, {} attempts each",
        args.writers,
        args.increments,
        args.retries
    );

    let config = TableConfig::builder()
        .table_name(&args.table_name)
        .retries(args.retries)
        .build();
    let retry = config.retry;
    let table = InMemoryTable::with_config(config);

    let key = CounterKey::new("counter", "value");
    if let Err(e) = table.insert_item(&CounterItem::new(key.clone(), 0)) {
        tracing::error!("Failed to seed counter row: {}", e);
        std::process::exit(1);
    }

    let applied = AtomicUsize::new(0);
    let exhausted = AtomicUsize::new(0);

    let outcome = crossbeam::scope(|s| {
        for writer in 0..args.writers {
            let (table, key, applied, exhausted) = (&table, &key, &applied, &exhausted);
            let increments = args.increments;

            s.spawn(move |_| {
                for _ in 0..increments {
                    let result: dyntable::Result<CounterItem> =
                        table.conditionally_update_item(key, retry, |count: &u64| Ok(count + 1));

                    match result {
                        Ok(_) => {
                            applied.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e @ TableError::ConditionalCheckFailed { .. }) => {
                            tracing::warn!("writer {} gave up on an increment: {}", writer, e);
                            exhausted.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            tracing::error!("writer {} failed: {}", writer, e);
                            return;
                        }
                    }
                }
            });
        }
    });

    if outcome.is_err() {
        tracing::error!("A writer thread panicked");
        std::process::exit(1);
    }

    let final_value = match table.get_item::<CounterItem>(&key) {
        Ok(Some(item)) => *item.row_value(),
        Ok(None) => {
            tracing::error!("Counter row disappeared");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("Failed to read counter row: {}", e);
            std::process::exit(1);
        }
    };

    let expected = args.writers * args.increments;
    let applied = applied.load(Ordering::Relaxed);
    let exhausted = exhausted.load(Ordering::Relaxed);

    println!("final value:          {}", final_value);
    println!("expected value:       {}", expected);
    println!("applied increments:   {}", applied);
    println!("exhausted increments: {}", exhausted);

    // Every applied increment must be visible; lost updates mean a broken version check.
    if final_value != applied as u64 {
        tracing::error!(
            "Lost updates: counter is {} but {} increments were applied",
            final_value,
            applied
        );
        std::process::exit(2);
    }
}
