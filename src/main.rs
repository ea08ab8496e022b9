use anyhow::Result;
use clap::Parser;
use table_assistant::config::{init_logging, Settings};
use table_assistant::llm::GeneratorConfig;

#[derive(Parser)]
#[command(name = "ask")]
#[command(about = "Answer a question about the catalog tables")]
struct Args {
    /// The question in natural language
    #[arg(default_value = "Show total sales by shipping modes")]
    query: String,

    #[command(flatten)]
    settings: Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let args = Args::parse();
    let assistant = args.settings.build_assistant(&GeneratorConfig::from_env())?;

    let answer = assistant.answer(&args.query).await?;
    println!("{}", answer);

    Ok(())
}
