use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use suggest::alphabet::{CompositeAlphabet, SimpleAlphabet};
use suggest::lm::{LanguageModelBuilder, SentenceRetriever};

use clap::{error::ErrorKind, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    name = "lm",
    about = "A program to build an n-gram language model."
)]
struct Args {
    /// Plain text corpus.
    #[clap(short = 't', long)]
    corpus_in: Option<PathBuf>,

    /// Directory of Google n-gram count files (1-gm, 2-gm, ...).
    ///
    /// Used when `--corpus-in` is not specified.
    #[clap(short = 'g', long)]
    google_in: Option<PathBuf>,

    /// Order of the model.
    #[clap(short = 'n', long, default_value = "3")]
    order: usize,

    /// Alphabets of word characters in the corpus.
    #[clap(short = 'a', long, default_values = ["english", "russian", "numbers"])]
    alphabet: Vec<String>,

    /// Characters ending a sentence in the corpus.
    #[clap(short = 's', long, default_value = ".!?")]
    separators: String,

    /// File to which the binary model is output.
    #[clap(short = 'o', long)]
    lm_out: PathBuf,

    /// File to which the vocabulary is output, one word per line.
    #[clap(short = 'v', long)]
    vocab_out: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    eprintln!("Counting n-grams...");
    let start = Instant::now();
    let builder = if let Some(corpus_in) = args.corpus_in {
        let retriever = SentenceRetriever::new(
            BufReader::new(File::open(corpus_in)?),
            Box::new(CompositeAlphabet::from_names(&args.alphabet[..])?),
            Box::new(SimpleAlphabet::new(&args.separators)),
        );
        LanguageModelBuilder::from_sentences(retriever, args.order)?
    } else if let Some(google_in) = args.google_in {
        LanguageModelBuilder::from_google_ngrams(google_in, args.order)?
    } else {
        Args::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "One of --corpus-in or --google-in must be specified.",
            )
            .exit();
    };
    let (model, vocabulary) = builder.build()?;
    eprintln!("{} seconds", start.elapsed().as_secs_f64());

    eprintln!("Writing the model...: {:?}", &args.lm_out);
    let mut wtr = BufWriter::new(File::create(args.lm_out)?);
    model.write(&mut wtr)?;
    wtr.flush()?;

    eprintln!("Writing the vocabulary...: {:?}", &args.vocab_out);
    let mut wtr = BufWriter::new(File::create(args.vocab_out)?);
    vocabulary.write(&mut wtr)?;
    wtr.flush()?;

    Ok(())
}
