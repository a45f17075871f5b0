use anyhow::{Context, Result};
use clap::Parser;
use keyed_slots::hash_table::{Employee, HashTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{info, Level};

#[derive(Debug, Parser)]
#[command(name = "keyed_slots", about = "Exercise a fixed-capacity slot table")]
struct Args {
    /// Number of slots in the benchmark table.
    #[arg(long, default_value_t = HashTable::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Lookup rounds measured by the benchmark.
    #[arg(long, default_value_t = 1000)]
    samples: usize,

    /// Seed for key generation; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args: Args = Args::parse();
    let level: Level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    scenario()?;
    benchmark(&args)
}

fn scenario() -> Result<()> {
    let staff: [(i64, Employee); 5] = [
        (101, Employee::new("Hopper", "Grace", "1944-07-01")),
        (102, Employee::new("Lovelace", "Ada", "1842-10-05")),
        (103, Employee::new("Knuth", "Donald", "1968-01-15")),
        (104, Employee::new("Liskov", "Barbara", "1972-09-01")),
        (105, Employee::new("Ritchie", "Dennis", "1967-06-12")),
    ];

    let mut table: HashTable = HashTable::default();
    for (key, employee) in staff {
        table
            .insert(key, employee)
            .with_context(|| format!("inserting employee {key}"))?;
    }
    info!(count = table.count(), "inserted employees");

    let found: &Employee = table.lookup(103).context("looking up employee 103")?;
    println!("103 -> {} {}, hired {}", found.first_name, found.last_name, found.hire_date);

    table.delete(102).context("deleting employee 102")?;
    match table.lookup(102) {
        Ok(_) => println!("102 still present"),
        Err(err) => println!("102 -> {err}"),
    }
    print!("{table}");
    Ok(())
}

fn benchmark(args: &Args) -> Result<()> {
    let mut rng: StdRng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut table: HashTable = HashTable::with_capacity(args.capacity);
    let mut keys: Vec<i64> = Vec::with_capacity(table.size());

    let now: Instant = Instant::now();
    while !table.is_full() {
        let key: i64 = rng.gen_range(0..i64::MAX);
        let employee: Employee = Employee::new(format!("Last{key}"), format!("First{key}"), "2024-01-01");
        if table.insert(key, employee)?.is_none() {
            keys.push(key);
        }
    }
    let elapsed: Duration = now.elapsed();

    println!("Capacity {} entries {}", table.size(), table.count());
    println!("Load factor {}", table.load_factor());
    println!("Avg time to insert {}", average_nanos(elapsed, keys.len()));

    if keys.is_empty() {
        return Ok(());
    }

    let samples: usize = args.samples;
    benchmarking::warm_up();
    let result = benchmarking::measure_function(move |measurer| {
        for i in 0..samples {
            let key: i64 = keys[i % keys.len()];
            measurer.measure(|| table.lookup(key).is_ok());
        }
    })
    .map_err(|err| anyhow::anyhow!("lookup benchmark failed: {err:?}"))?;

    println!("Avg time to lookup {:?}", result.elapsed());
    Ok(())
}

/// Mean nanoseconds per operation; zero operations count as one.
fn average_nanos(elapsed: Duration, operations: usize) -> f64 {
    elapsed.as_nanos() as f64 / operations.max(1) as f64
}
