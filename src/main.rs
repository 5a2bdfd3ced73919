//! strhash CLI - inspect and exercise the runtime string hash.
//!
//! This is the main entry point for the strhash command-line application.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use strhash::config::parse_seed;
use strhash::positions::{MIN_SAMPLED_ORDER, ORDERS};
use strhash::{Backend, Binding, Config, Seed, Tier};

/// strhash - tiered CRC32C string hash diagnostics
#[derive(Parser)]
#[command(name = "strhash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Hash backend: auto, portable or fallback
    #[arg(long, global = true, env = "STRHASH_BACKEND")]
    backend: Option<Backend>,

    /// Fixed position table seed (decimal or 0x hex)
    #[arg(long, global = true, env = "STRHASH_SEED", value_parser = parse_seed)]
    seed: Option<u32>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash strings given on the command line
    Hash {
        /// Strings to hash
        #[arg(required = true)]
        strings: Vec<String>,
    },

    /// Show the selected kernel and the random position table
    Info {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Hash every line of a file and report collisions
    Lines {
        /// Input file, one string per line
        #[arg(short, long)]
        input: PathBuf,

        /// Bucket count for the load report (rounded up to a power of two,
        /// 0 = one bucket per distinct line)
        #[arg(short, long, default_value_t = 0)]
        buckets: usize,
    },

    /// Measure how often a single bit flip changes the hash
    Sensitivity {
        /// String length in bytes
        #[arg(short, long, default_value_t = 256)]
        len: usize,

        /// Number of random trials
        #[arg(short, long, default_value_t = 10_000)]
        trials: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config {
        backend: cli.backend.unwrap_or_default(),
        seed: cli.seed.map(Seed::Fixed).unwrap_or_default(),
    };
    let binding = strhash::try_init(config).context("Failed to initialize string hash")?;

    match cli.command {
        Commands::Hash { strings } => {
            cmd_hash(binding, &strings);
        }
        Commands::Info { json } => {
            cmd_info(binding, json)?;
        }
        Commands::Lines { input, buckets } => {
            cmd_lines(binding, &input, buckets)?;
        }
        Commands::Sensitivity { len, trials } => {
            cmd_sensitivity(binding, len, trials)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_hash(binding: &Binding, strings: &[String]) {
    for s in strings {
        match binding.try_hash(s.as_bytes()) {
            Ok(hash) => {
                let tier = Tier::for_len(s.len());
                let sampled = if tier.is_some_and(Tier::is_randomized) { "*" } else { " " };
                let tier = tier.map_or("-", Tier::name);
                println!("0x{:08X} {:>8} {:<6}{} {}", hash, s.len(), tier, sampled, s);
            }
            Err(e) => eprintln!("Skipping {:?}: {}", s, e),
        }
    }
}

fn cmd_info(binding: &Binding, json: bool) -> Result<()> {
    if json {
        let info = serde_json::json!({
            "kernel": binding.kernel(),
            "kernel_name": binding.kernel().name(),
            "caps": binding.caps(),
            "positions": binding.positions(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let positions = binding.positions();
    println!("Kernel:      {}", binding.kernel());
    println!(
        "Hardware:    {}",
        binding
            .caps()
            .accelerated()
            .map_or("none".to_string(), |k| k.to_string())
    );
    println!("Randomized:  {}", binding.kernel().is_randomized());
    println!("Seed:        0x{:08X}", positions.seed());
    println!();
    println!("{:>5} {:>24} {:>12} {:>12}", "order", "chunk bytes", "pos1", "pos2");

    for order in MIN_SAMPLED_ORDER..ORDERS - 1 {
        let [pos1, pos2] = positions.get(order);
        let low = 1u64 << order;
        let chunk = format!("{}..{}", low, (low << 1) - 1);
        println!("{:>5} {:>24} {:>12} {:>12}", order, chunk, pos1, pos2);
    }

    Ok(())
}

fn cmd_lines(binding: &Binding, input: &Path, buckets: usize) -> Result<()> {
    println!("Reading lines: {}", input.display());

    let text = fs::read(input).context("Failed to read input file")?;
    let lines: Vec<&[u8]> = text
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        anyhow::bail!("Input file has no non-empty lines");
    }

    let pb = ProgressBar::new(lines.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let hashed: Vec<(&[u8], u32)> = lines
        .par_iter()
        .map(|&line| {
            let hash = binding.hash(line);
            pb.inc(1);
            (line, hash)
        })
        .collect();
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    // Distinct contents per hash value.
    let mut by_hash: HashMap<u32, HashSet<&[u8]>> = HashMap::new();
    for &(line, hash) in &hashed {
        by_hash.entry(hash).or_default().insert(line);
    }
    let distinct_lines: usize = by_hash.values().map(|set| set.len()).sum();
    let collisions: usize = by_hash.values().map(|set| set.len() - 1).sum();

    let buckets = bucket_count(buckets, distinct_lines)?;
    let mut load = vec![0usize; buckets];
    for (&hash, set) in &by_hash {
        load[hash as usize & (buckets - 1)] += set.len();
    }
    let max_load = load.iter().copied().max().unwrap_or(0);
    let empty = load.iter().filter(|&&n| n == 0).count();

    println!("Hashed {} lines in {:?} with {}", lines.len(), elapsed, binding.kernel());
    println!("Distinct lines:   {}", distinct_lines);
    println!("Distinct hashes:  {}", by_hash.len());
    println!("Hash collisions:  {}", collisions);
    println!(
        "Buckets:          {} ({} empty, max load {}, mean {:.2})",
        buckets,
        empty,
        max_load,
        distinct_lines as f64 / buckets as f64
    );

    Ok(())
}

/// Largest bucket table the load report allocates.
const MAX_BUCKETS: usize = 1 << 28;

/// Power-of-two bucket count; `0` means one bucket per distinct line.
fn bucket_count(requested: usize, distinct_lines: usize) -> Result<usize> {
    let wanted = if requested == 0 { distinct_lines } else { requested };
    if wanted > MAX_BUCKETS {
        anyhow::bail!("Bucket count {} exceeds the maximum of {}", wanted, MAX_BUCKETS);
    }
    Ok(wanted.next_power_of_two())
}

#[derive(Default)]
struct Tally {
    trials: usize,
    changed: usize,
}

impl Tally {
    fn record(&mut self, changed: bool) {
        self.trials += 1;
        if changed {
            self.changed += 1;
        }
    }

    fn rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.changed as f64 / self.trials as f64
    }
}

fn cmd_sensitivity(binding: &Binding, len: usize, trials: usize) -> Result<()> {
    if len == 0 {
        anyhow::bail!("Length must be at least 1");
    }

    println!(
        "Flipping one bit in {} random {}-byte strings ({} tier, {})",
        trials,
        len,
        Tier::for_len(len).map_or("-", Tier::name),
        binding.kernel()
    );

    let mut rng = rand::thread_rng();
    let mut endpoint = Tally::default();
    let mut interior = Tally::default();

    for _ in 0..trials {
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let index = rng.gen_range(0..len);
        let mut flipped = data.clone();
        flipped[index] ^= 1 << rng.gen_range(0..8);

        let changed = binding.hash(&data) != binding.hash(&flipped);
        if index < 8 || index >= len.saturating_sub(8) {
            endpoint.record(changed);
        } else {
            interior.record(changed);
        }
    }

    println!(
        "Endpoint flips:  {:>8} changed / {:>8} ({:.2}%)",
        endpoint.changed,
        endpoint.trials,
        endpoint.rate() * 100.0
    );
    println!(
        "Interior flips:  {:>8} changed / {:>8} ({:.2}%)",
        interior.changed,
        interior.trials,
        interior.rate() * 100.0
    );

    Ok(())
}
