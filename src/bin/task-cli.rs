use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "task-cli")]
#[command(about = "Command-line client for the task API", long_about = None)]
struct Cli {
    #[arg(short, long, env = "TASK_API_URL", default_value = "http://127.0.0.1:3333")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks, optionally filtered by title/description
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Create a task
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: String,
        /// RFC 3339 completion timestamp
        #[arg(long)]
        completed_at: Option<String>,
    },
    /// Replace a task's title, description and completion
    Update {
        id: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        description: String,
        #[arg(long)]
        completed_at: Option<String>,
    },
    /// Mark a task as completed now
    Complete { id: String },
    /// Delete a task
    Delete { id: String },
    /// Import tasks from a CSV file with a header row
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::List { search } => {
            // The server does not percent-decode, so the term goes through as-is.
            let url = match search {
                Some(search) => format!("{base}/tasks?search={search}"),
                None => format!("{base}/tasks"),
            };
            client.get(url).send().await?
        }
        Commands::Create {
            title,
            description,
            completed_at,
        } => {
            let mut body = Map::new();
            body.insert("title".into(), Value::String(title));
            body.insert("description".into(), Value::String(description));
            if let Some(completed_at) = completed_at {
                body.insert("completed_at".into(), Value::String(completed_at));
            }
            client
                .post(format!("{base}/tasks"))
                .json(&body)
                .send()
                .await?
        }
        Commands::Update {
            id,
            title,
            description,
            completed_at,
        } => {
            client
                .put(format!("{base}/tasks/{id}"))
                .json(&json!({
                    "title": title,
                    "description": description,
                    "completed_at": completed_at,
                }))
                .send()
                .await?
        }
        Commands::Complete { id } => {
            client
                .patch(format!("{base}/tasks/{id}"))
                .json(&json!({ "completed_at": chrono::Utc::now().to_rfc3339() }))
                .send()
                .await?
        }
        Commands::Delete { id } => client.delete(format!("{base}/tasks/{id}")).send().await?,
        Commands::Import { file } => {
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "tasks.csv".to_string());
            let bytes = tokio::fs::read(&file).await?;
            let part = Part::bytes(bytes).file_name(file_name).mime_str("text/csv")?;
            client
                .post(format!("{base}/tasks/import"))
                .multipart(Form::new().part("file", part))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: task API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    println!("{}", status);
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) if !text.is_empty() => println!("{}", text),
        Err(_) => {}
    }
    Ok(())
}
