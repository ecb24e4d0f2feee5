use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hydro_agents::BriefingAgent;
use hydro_core::BriefingInput;
use hydro_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "hydro-briefing")]
#[command(about = "Hydrology briefing assistant CLI")]
struct Cli {
    /// Output format for answers.
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Json,
        env = "HYDRO_BRIEFING_FORMAT"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer one question the way `POST /api/briefing` does.
    Ask {
        question: String,
        /// Use the extended local keyword table.
        #[arg(long)]
        local: bool,
    },
    /// Interactive question loop; `exit` or `quit` leaves.
    Chat,
    /// Render the markdown flood-warning briefing.
    Generate {
        /// JSON file with water_stations / rainfall / alerts / weather_info.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing("hydro_cli");
    let cli = Cli::parse();

    let agent = BriefingAgent::new(AppMetrics::shared());

    match cli.command {
        Command::Ask { question, local } => {
            if local {
                let reply = agent
                    .answer_local(Some(&question))
                    .context("question text must not be blank")?;
                match cli.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reply)?),
                    OutputFormat::Text => println!("{}", reply.reply),
                }
            } else {
                let reply = agent.answer(Some(&question));
                match cli.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reply)?),
                    OutputFormat::Text => println!("{}", reply.reply),
                }
            }
        }
        Command::Chat => run_chat(&agent)?,
        Command::Generate { input } => {
            let input = match input {
                Some(path) => read_briefing_input(&path)?,
                None => BriefingInput::default(),
            };
            let briefing = agent.generate(&input);
            println!("{}", briefing.markdown);
        }
    }

    Ok(())
}

fn run_chat(agent: &BriefingAgent) -> Result<()> {
    println!("水文简报问答模式，输入 exit 退出。");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = agent.answer(Some(message));
        println!("\n{}\n", reply.reply);
    }

    Ok(())
}

fn read_briefing_input(path: &Path) -> Result<BriefingInput> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading briefing input from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid briefing input in {}", path.display()))
}
