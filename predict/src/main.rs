use std::io::{prelude::*, stdin};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use taleweaver::{ClassificationService, ModelStore, DEFAULT_MODEL_PATH};

#[derive(Parser, Debug)]
#[command(about = "A program to classify story requests.")]
struct Args {
    /// The model file to use when classifying text
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Print the score of each category to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let service = ClassificationService::new(ModelStore::new(args.model));
    let classifier = service.classifier()?;

    eprintln!("Start classification");
    let mut n_lines = 0;
    let start = Instant::now();
    for line in stdin().lock().lines() {
        let line = line?;
        let (category, scores) = classifier.classify_with_scores(&line)?;
        if args.verbose {
            for (c, score) in scores {
                eprintln!("{c}\t{score:.6}");
            }
        }
        println!("{category}\t{}", category.arc());
        n_lines += 1;
    }
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    log::debug!("classified {n_lines} lines");

    Ok(())
}
