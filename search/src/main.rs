use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use suggest::description::IndexDescription;
use suggest::dictionary::InMemoryDictionary;
use suggest::{LanguageModel, Metric, SearchConfig, SpellChecker, SuggestService, Suggestion};

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Fuzzy search.
    Suggest,
    /// Prefix search.
    Autocomplete,
    /// Next-word prediction and correction with a language model.
    Spell,
}

#[derive(Parser, Debug)]
#[clap(name = "search", about = "A program to query indices line by line.")]
struct Args {
    /// JSON file holding an array of index descriptions.
    #[clap(short = 'c', long)]
    config_in: Option<PathBuf>,

    /// Name of the index to query. Defaults to the first description.
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// Kind of query.
    #[clap(short = 'M', long, value_enum, default_value = "suggest")]
    mode: Mode,

    /// Similarity metric of fuzzy search.
    #[clap(short = 'm', long, default_value = "jaccard")]
    metric: Metric,

    /// Minimum similarity of fuzzy search.
    #[clap(short = 's', long, default_value = "0.5")]
    similarity: f64,

    /// Maximum number of results.
    #[clap(short = 'k', long, default_value = "5")]
    top_k: usize,

    /// Binary language model, for the spell mode.
    #[clap(long)]
    lm_in: Option<PathBuf>,

    /// Vocabulary of the language model, for the spell mode.
    #[clap(long)]
    vocab_in: Option<PathBuf>,

    /// Prints each result list as a JSON line.
    #[clap(short = 'j', long)]
    json: bool,
}

fn print_suggestions(suggestions: &[Suggestion], json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string(suggestions)?);
    } else {
        for s in suggestions {
            println!("{}\t{}", s.value, s.score);
        }
        println!("EOS");
    }
    Ok(())
}

fn run_spell(args: &Args) -> Result<(), Box<dyn Error>> {
    let (Some(lm_in), Some(vocab_in)) = (&args.lm_in, &args.vocab_in) else {
        Args::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "--lm-in and --vocab-in must be specified in the spell mode.",
            )
            .exit();
    };

    eprintln!("Loading the language model...");
    let vocabulary = InMemoryDictionary::from_reader(BufReader::new(File::open(vocab_in)?))?;
    let model = LanguageModel::read(BufReader::new(File::open(lm_in)?), Arc::new(vocabulary))?;
    let checker = SpellChecker::from_model(model, 3)?;
    eprintln!("Ready to predict :)");

    #[allow(clippy::significant_drop_in_scrutinee)]
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let predictions: Vec<Suggestion> = checker
            .predict(&line, args.top_k, args.similarity)?
            .into_iter()
            .map(|(value, score)| Suggestion { score, value })
            .collect();
        print_suggestions(&predictions, args.json)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.mode == Mode::Spell {
        return run_spell(&args);
    }
    let Some(config_in) = &args.config_in else {
        Args::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "--config-in must be specified in the suggest and autocomplete modes.",
            )
            .exit();
    };

    eprintln!("Loading the indices...");
    let service = SuggestService::new();
    let descriptions = IndexDescription::from_reader(BufReader::new(File::open(config_in)?))?;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => descriptions
            .first()
            .map(|d| d.name.clone())
            .ok_or("no index description is given")?,
    };
    for description in descriptions {
        service.add_dictionary(description)?;
    }
    let index = service.index(&name)?;
    eprintln!("Ready to search {name} :)");

    #[allow(clippy::significant_drop_in_scrutinee)]
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let suggestions = match args.mode {
            Mode::Autocomplete => index.autocomplete(&line, args.top_k)?,
            _ => {
                let config = SearchConfig::new(line, args.top_k, args.metric, args.similarity)?;
                index.suggest(&config)?
            }
        };
        print_suggestions(&suggestions, args.json)?;
    }

    Ok(())
}
