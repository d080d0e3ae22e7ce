use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use pipeline_generator::client::PipelineApiClient;
use pipeline_generator::models::{PipelineResponse, RepositoryInput};
use std::io::{self, Read};

#[derive(Clone, Copy, ValueEnum)]
enum Command {
    Generate,
    Analyze,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Summary,
}

#[derive(Parser)]
#[command(name = "pipeline-cli")]
#[command(about = "CLI client for the Test Pipeline Generator API")]
struct Cli {
    /// Operation to run against the server
    #[arg(value_enum, default_value = "generate")]
    command: Command,

    /// Server address (e.g., "http://localhost:8000")
    #[arg(short, long, default_value = "http://localhost:8000")]
    server: String,

    /// Input file path with a repository description (use "-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: Format,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "120")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Read input
    let input_json = if cli.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow!("Failed to read from stdin: {e}"))?;
        buffer
    } else {
        std::fs::read_to_string(&cli.input)
            .map_err(|e| anyhow!("Failed to read input file {}: {e}", cli.input))?
    };

    let input: RepositoryInput = serde_json::from_str(&input_json)
        .map_err(|e| anyhow!("Failed to parse input JSON: {e}"))?;

    let client = PipelineApiClient::new(cli.server.clone())?;
    let timeout = std::time::Duration::from_secs(cli.timeout);

    eprintln!("Calling {}...", cli.server);

    match cli.command {
        Command::Generate => {
            let pipeline = client.generate_pipeline_with_timeout(&input, timeout).await?;
            if cli.format == Format::Summary {
                print!("{}", render_summary(&pipeline));
            } else {
                println!("{}", serde_json::to_string_pretty(&pipeline)?);
            }
        }
        Command::Analyze => {
            let analysis = client.analyze_repository_with_timeout(&input, timeout).await?;
            if cli.format == Format::Summary {
                match analysis.as_object() {
                    Some(fields) => {
                        for (key, value) in fields {
                            println!("{key}: {value}");
                        }
                    }
                    None => println!("{analysis}"),
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            }
        }
    }

    Ok(())
}

fn render_summary(pipeline: &PipelineResponse) -> String {
    let mut out = String::new();
    for (idx, stage) in pipeline.stages.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} [{}] ~{}\n",
            idx + 1,
            stage.name,
            stage.stage_type,
            stage.estimated_duration
        ));
        for cmd in &stage.commands {
            out.push_str(&format!("     $ {cmd}\n"));
        }
    }
    out.push_str(&format!("\nSummary: {}\n", pipeline.summary));
    if !pipeline.recommendations.is_empty() {
        out.push_str("Recommendations:\n");
        for rec in &pipeline.recommendations {
            out.push_str(&format!("  - {rec}\n"));
        }
    }
    out
}
