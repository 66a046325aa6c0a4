use std::path::PathBuf;

use clap::Parser;
use taleweaver::{default_corpus, Category, Classifier, ModelStore, DEFAULT_MODEL_PATH};

#[derive(Parser, Debug)]
#[command(about = "A program to train the story category classifier.")]
struct Args {
    /// The file to write the trained model to
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading dataset...");
    let corpus = default_corpus();
    for c in Category::ALL {
        let n = corpus.iter().filter(|e| e.label() == c).count();
        eprintln!("# of examples ({c}): {n}");
    }
    eprintln!("# of examples: {}", corpus.len());

    eprintln!("Start training...");
    let classifier = Classifier::train(&corpus)?;
    eprintln!("Finish training.");

    eprintln!("Saving {:?} ...", args.model);
    let store = ModelStore::new(args.model);
    classifier.save(&store)?;
    log::info!("wrote {}", store.path().display());

    Ok(())
}
