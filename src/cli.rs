use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::controller::Controller;
use crate::formatter;
use crate::models::AppConfig;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "blogforge",
    version,
    about = "Generate, preview and save AI-written blog posts"
)]
pub struct Cli {
    /// Base URL of the blog generator backend
    #[arg(long)]
    pub backend_url: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Format blog text from FILE (or stdin) as HTML
    Format {
        file: Option<PathBuf>,
    },
    /// Generate a blog for TOPIC and print it as HTML
    Generate {
        topic: String,
        /// Save the generated blog to the backend afterwards
        #[arg(long)]
        save: bool,
    },
    /// List blogs saved on the backend
    List,
}

impl Cli {
    /// Command-line flags override the config file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.backend_url {
            config.backend_url.clone_from(url);
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout = timeout;
        }
    }
}

pub fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub async fn run(command: Command, controller: &Controller) -> Result<()> {
    let mut out = std::io::stdout().lock();

    match command {
        Command::Format { file } => {
            let content = read_input(file.as_ref())?;
            writeln!(out, "{}", formatter::format(&content))?;
        }
        Command::Generate { topic, save } => {
            let blog = controller.generate(&topic).await?;
            writeln!(out, "{}", formatter::format(&blog.content))?;
            if save {
                let message = controller.save(Some(&blog)).await?;
                eprintln!("{message}");
            }
        }
        Command::List => {
            let blogs = controller.list_blogs().await?;
            if blogs.is_empty() {
                writeln!(out, "No saved blogs")?;
            }
            for blog in blogs {
                let created = blog
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                writeln!(out, "{:>5}  {:<16}  {}", blog.id, created, blog.topic)?;
            }
        }
    }

    Ok(())
}
