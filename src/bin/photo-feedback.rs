//! CLI for Photo Feedback - AI critique of photos.

use clap::{Args, Parser, Subcommand, ValueEnum};
use photo_feedback::prompt::analysis_prompt;
use photo_feedback::{
    AnalysisSession, FeedbackError, FeedbackResult, GeminiModel, GeminiProvider, ImageReference,
    Language, PathSelector,
};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "photo-feedback")]
#[command(about = "Get AI feedback on your photos (Gemini)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Google AI API key
    #[arg(long, global = true, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model identifier
    #[arg(long, global = true, env = "PHOTO_FEEDBACK_MODEL")]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a photo and print the feedback
    Analyze(AnalyzeArgs),

    /// Parse a saved model response (reads stdin when no file is given)
    Parse(ParseArgs),

    /// Print the prompt sent to the model
    Prompt(LanguageArgs),

    /// Select, analyze and retry interactively
    Interactive(LanguageArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Path to the photo
    image: PathBuf,

    /// Feedback language
    #[arg(short, long, value_enum, default_value = "en")]
    lang: LanguageArg,
}

#[derive(Args)]
struct ParseArgs {
    /// File containing the response text, or `-` for stdin
    file: Option<PathBuf>,
}

#[derive(Args)]
struct LanguageArgs {
    /// Feedback language
    #[arg(short, long, value_enum, default_value = "en")]
    lang: LanguageArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LanguageArg {
    En,
    He,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::En => Language::En,
            LanguageArg::He => Language::He,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Analyze(ref args) => {
            let provider = build_provider(&cli)?;
            analyze_once(provider, args, cli.json).await
        }
        Commands::Parse(ref args) => parse_response(args, cli.json),
        Commands::Prompt(ref args) => {
            println!("{}", analysis_prompt(args.lang.into()));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Interactive(ref args) => {
            let provider = build_provider(&cli)?;
            run_interactive(provider, args.lang.into(), cli.json).await
        }
    }
}

/// Directives used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "photo_feedback=debug,info"
    } else {
        "photo_feedback=info"
    }
}

fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

/// Builds the provider up front; a missing key stops the program here.
fn build_provider(cli: &Cli) -> anyhow::Result<GeminiProvider> {
    let mut builder = GeminiProvider::builder();
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(GeminiModel::from_id(model));
    }
    Ok(builder.build()?)
}

async fn analyze_once(
    provider: GeminiProvider,
    args: &AnalyzeArgs,
    json_output: bool,
) -> anyhow::Result<ExitCode> {
    let language: Language = args.lang.into();
    let session = AnalysisSession::new(provider, language);

    let mut selector = PathSelector::new();
    selector.choose(&args.image);
    if let Err(e) = session.select_with(&mut selector) {
        return Ok(report_failure(&e, language, json_output));
    }

    match session.analyze().await {
        Ok(feedback) => {
            print_feedback(&feedback, session.image().as_ref(), language, json_output)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_failure(&e, language, json_output)),
    }
}

fn parse_response(args: &ParseArgs, json_output: bool) -> anyhow::Result<ExitCode> {
    let text = match args.file {
        Some(ref path) if path.as_os_str() != "-" => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    match photo_feedback::parse(&text)
        .map_err(FeedbackError::from)
        .and_then(FeedbackResult::non_empty)
    {
        Ok(feedback) => {
            print_feedback(&feedback, None, Language::En, json_output)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if json_output {
                print_json_error(&e, Language::En);
            } else {
                eprintln!("{e}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_interactive(
    provider: GeminiProvider,
    language: Language,
    json_output: bool,
) -> anyhow::Result<ExitCode> {
    let session = AnalysisSession::new(provider, language);
    let mut selector = PathSelector::new();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    print_help();
    loop {
        print!("[{}] > ", session.language());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "select" | "open" => {
                if rest.trim().is_empty() {
                    println!("usage: select <path>");
                    continue;
                }
                selector.choose(rest.trim());
                match session.select_with(&mut selector) {
                    Ok(_) => {
                        if let Some(image) = session.image() {
                            println!("Selected {} ({}x{})", image.uri, image.width, image.height);
                        }
                    }
                    Err(e) => println!("{}", e.user_message(session.language())),
                }
            }
            "analyze" | "retry" => {
                println!("Analyzing...");
                match session.analyze().await {
                    Ok(feedback) => print_feedback(
                        &feedback,
                        session.image().as_ref(),
                        session.language(),
                        json_output,
                    )?,
                    Err(FeedbackError::NoImageSelected) => {
                        println!("Select a photo first: select <path>");
                    }
                    Err(e) => {
                        tracing::debug!("analysis error: {e}");
                        let message = session.error().unwrap_or_else(|| e.to_string());
                        println!("{message}  (type `retry` to try again)");
                    }
                }
            }
            "lang" => {
                let language = match rest.trim() {
                    "" => session.toggle_language(),
                    code => match code.parse::<Language>() {
                        Ok(language) => {
                            session.set_language(language);
                            language
                        }
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    },
                };
                println!("Language: {} ({})", language, language.direction());
            }
            "show" => match session.feedback() {
                Some(feedback) => print_feedback(
                    &feedback,
                    session.image().as_ref(),
                    session.language(),
                    json_output,
                )?,
                None => println!("No feedback yet."),
            },
            "help" | "?" => print_help(),
            "quit" | "exit" | "q" => break,
            other => println!("Unknown command: {other} (type `help`)"),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_help() {
    println!("Commands:");
    println!("  select <path>   choose a photo");
    println!("  analyze         get feedback on the selected photo (alias: retry)");
    println!("  lang [en|he]    switch feedback language");
    println!("  show            print the last feedback again");
    println!("  quit            leave");
}

fn print_feedback(
    feedback: &FeedbackResult,
    image: Option<&ImageReference>,
    language: Language,
    json_output: bool,
) -> anyhow::Result<()> {
    if json_output {
        let result = serde_json::json!({
            "success": true,
            "image": image,
            "language": language.code(),
            "direction": language.direction(),
            "positives": feedback.positives,
            "suggestions": feedback.suggestions,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}:", language.positives_title());
    for item in &feedback.positives {
        println!("  + {item}");
    }
    println!();
    println!("{}:", language.suggestions_title());
    for item in &feedback.suggestions {
        println!("  * {item}");
    }
    Ok(())
}

fn print_json_error(err: &FeedbackError, language: Language) {
    let result = serde_json::json!({
        "success": false,
        "kind": format!("{:?}", err.kind()),
        "error": err.to_string(),
        "message": err.user_message(language),
    });
    println!("{result}");
}

/// Turns a per-request failure into a retry prompt and a non-zero exit code.
fn report_failure(err: &FeedbackError, language: Language, json_output: bool) -> ExitCode {
    tracing::debug!("request failed: {err}");
    if json_output {
        print_json_error(err, language);
    } else {
        eprintln!("{}", err.user_message(language));
        eprintln!("({err})");
    }
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "photo_feedback=info");
        assert_eq!(default_filter(true), "photo_feedback=debug,info");
        assert!(EnvFilter::try_new(default_filter(false)).is_ok());
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["photo-feedback", "--verbose", "prompt"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Prompt(_)));
    }
}
