use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "tika-gateway-cli")]
#[command(about = "Command-line client for the Tika gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "TIKA_SECRET", default_value = "please-change-this-secret")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Html,
    Metadata,
}

impl Format {
    fn as_str(&self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Html => "html",
            Format::Metadata => "metadata",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text, HTML, or metadata from a document
    Parse {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
        /// Content-Type sent with the document
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Detect a document's MIME type
    Detect { file: PathBuf },
    /// Identify a document's language
    Language { file: PathBuf },
    /// List the formats the engine supports
    Types,
    /// Show gateway readiness
    Health,
    /// Show the engine version
    Version,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_str(&cli.key)?);

    let res = match cli.command {
        Commands::Parse {
            file,
            format,
            content_type,
        } => {
            let body = tokio::fs::read(&file).await?;
            let mut request = client
                .post(format!("{}/parse", base))
                .query(&[("format", format.as_str())])
                .headers(headers)
                .body(body);
            if let Some(ct) = content_type {
                request = request.header(CONTENT_TYPE, ct);
            }
            request.send().await?
        }
        Commands::Detect { file } => {
            let body = tokio::fs::read(&file).await?;
            client
                .post(format!("{}/detect", base))
                .headers(headers)
                .body(body)
                .send()
                .await?
        }
        Commands::Language { file } => {
            let body = tokio::fs::read(&file).await?;
            client
                .post(format!("{}/language", base))
                .headers(headers)
                .body(body)
                .send()
                .await?
        }
        Commands::Types => {
            client
                .get(format!("{}/types", base))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Version => client.get(format!("{}/version", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("{}", rendered);
        Ok(ExitCode::FAILURE)
    }
}
