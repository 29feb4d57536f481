use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "frontdoor-cli")]
#[command(about = "Operator CLI for the frontdoor gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway health
    Health,
    /// Show version, endpoints and service availability
    Info,
    /// Send a CORS preflight and print the granted headers
    Preflight {
        /// Origin to present
        #[arg(short, long)]
        origin: String,

        /// Path to preflight
        #[arg(short, long, default_value = "/api/health")]
        path: String,

        /// Method the browser would ask for
        #[arg(short, long, default_value = "POST")]
        method: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/api/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Info => {
            let res = client.get(format!("{}/", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Preflight { origin, path, method } => {
            let mut headers = HeaderMap::new();
            headers.insert(ORIGIN, HeaderValue::from_str(&origin)?);
            headers.insert(
                "access-control-request-method",
                HeaderValue::from_str(&method)?,
            );
            let res = client
                .request(Method::OPTIONS, format!("{}{}", cli.url, path))
                .headers(headers)
                .send()
                .await?;

            println!("Status: {}", res.status());
            for (name, value) in res.headers() {
                if name.as_str().starts_with("access-control-") {
                    println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
                }
            }
            if !res.status().is_success() {
                print_response(res).await?;
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("gateway returned status {}", status).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
