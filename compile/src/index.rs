use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use suggest::description::{Driver, IndexDescription};
use suggest::{Dictionary, NGramIndex};

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    name = "index",
    about = "A program to build the n-gram indices of dictionaries."
)]
struct Args {
    /// JSON file holding an array of index descriptions.
    #[clap(short = 'c', long)]
    config_in: PathBuf,

    /// Builds only the index of this name.
    #[clap(short = 'n', long)]
    name: Option<String>,
}

/// Keeps the `DISC` descriptions, or only the one named `name`.
///
/// `RAM` indices are built when served, so there is nothing to persist.
fn select_disc(descriptions: Vec<IndexDescription>, name: Option<&str>) -> Vec<IndexDescription> {
    descriptions
        .into_iter()
        .filter(|d| name.map_or(true, |name| name == d.name))
        .filter(|d| {
            if d.driver == Driver::Ram {
                tracing::info!(name = d.name.as_str(), "skipping a RAM index");
                return false;
            }
            true
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let descriptions = IndexDescription::from_reader(BufReader::new(File::open(&args.config_in)?))?;
    let mut num_built = 0;
    for description in select_disc(descriptions, args.name.as_deref()) {
        eprintln!(
            "Building {} into {:?}...",
            description.name, description.output
        );
        let start = Instant::now();
        let index = NGramIndex::from_description(description)?;
        eprintln!(
            "{} seconds: {} documents, cardinalities up to {}",
            start.elapsed().as_secs_f64(),
            index.dictionary().size(),
            index.indices().max_cardinality(),
        );
        num_built += 1;
    }

    if num_built == 0 {
        return Err(format!("no DISC index description matches in {:?}", args.config_in).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTIONS: &str = r#"[
        {"driver": "DISC", "name": "cars", "nGramSize": 3, "source": "cars.txt",
         "output": "index", "alphabet": ["english"], "pad": "$", "wrap": ["$", "$"]},
        {"driver": "RAM", "name": "words", "nGramSize": 2, "source": "words.txt",
         "alphabet": ["english"], "pad": "$", "wrap": ["$", "$"]}
    ]"#;

    fn names(descriptions: &[IndexDescription]) -> Vec<&str> {
        descriptions.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_select_disc_skips_ram() {
        let descriptions = IndexDescription::from_reader(DESCRIPTIONS.as_bytes()).unwrap();
        assert_eq!(names(&select_disc(descriptions.clone(), None)), vec!["cars"]);
        assert_eq!(names(&select_disc(descriptions.clone(), Some("cars"))), vec!["cars"]);
        assert!(select_disc(descriptions, Some("words")).is_empty());
    }
}
