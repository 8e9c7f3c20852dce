//! Print synthetic sump pump activity as JSON lines.
//!
//! Useful for feeding dashboards or other tools with realistic data
//! without hardware attached.

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use time::OffsetDateTime;

use sumpwatch::config::parse_event_count;
use sumpwatch::synthetic;

#[derive(Parser, Debug)]
#[command(name = "sumpwatch-gen")]
#[command(about = "Generate synthetic sump pump on/off events")]
struct Args {
    /// Number of events to generate
    #[arg(value_parser = parse_event_count)]
    length: usize,

    /// Random seed for a reproducible stream
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let events = synthetic::generate_with(&mut rng, OffsetDateTime::now_utc(), args.length);

    let mut out = io::stdout().lock();
    for event in &events {
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_is_capped() {
        assert!(Args::try_parse_from(["sumpwatch-gen", "18446744073709551615"]).is_err());
        assert_eq!(Args::try_parse_from(["sumpwatch-gen", "12"]).unwrap().length, 12);
    }
}
