mod agent;
mod llm;

use std::io::{prelude::*, stdin, stdout};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use taleweaver::errors::TaleweaverError;
use taleweaver::{ClassificationService, ModelStore, DEFAULT_MODEL_PATH};

use crate::agent::StoryAgent;
use crate::llm::{OpenAiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Parser, Debug)]
#[command(about = "A bedtime story agent for children aged 5-10.")]
struct Args {
    /// The classifier model file produced by `train`
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// The language model used to write and judge stories
    #[arg(long, env = "TALEWEAVER_LLM_MODEL", default_value = DEFAULT_MODEL)]
    llm_model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// API key of the text generation service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,
}

fn prompt(question: &str) -> Result<String> {
    print!("{question} ");
    stdout().flush()?;
    let mut line = String::new();
    stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn run(args: Args) -> Result<()> {
    let service = ClassificationService::new(ModelStore::new(args.model));
    // Load eagerly so a missing model is reported before asking for a story.
    service.classifier()?;

    let client = OpenAiClient::new(args.api_key, args.base_url, args.llm_model);
    let agent = StoryAgent::new(client, &service);

    let topic = prompt("What kind of story do you want to hear?")?;
    let story = agent.tell(&topic)?;
    if !story.passed_first_judgement {
        println!("Initial story did not pass the judge, regenerated once.");
    }

    println!("\n---- Here is your story ----\n");
    println!("{}", story.text);
    println!("-----------------------------\n");

    let feedback = prompt("Any feedback or changes? (Enter to finish)")?;
    if !feedback.is_empty() {
        let revised = agent.apply_feedback(&story.text, &feedback)?;
        println!("\n---- Revised Story ----\n");
        println!("{revised}");
        println!("------------------------\n");
    }

    drop(agent);
    service.close();
    Ok(())
}

fn main() -> ExitCode {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<TaleweaverError>() {
                Some(TaleweaverError::ModelNotFound(e)) => {
                    eprintln!(
                        "Error: no classifier model at {}. Run `train` first.",
                        e.path().display()
                    );
                }
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
