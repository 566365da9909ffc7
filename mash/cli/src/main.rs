//! Mash - command-line front end for the Mash agent
//!
//! Wires configuration, the inference client, the backend collaborator and
//! the orchestrator together for one-shot use from a shell.
//!
//! # Usage
//!
//! ```bash
//! # Ask the agent something
//! mash ask "what datasets do I have?"
//!
//! # Show the reasoning stages as well
//! mash ask --show-thinking "deploy my fine-tuned model"
//!
//! # Generate a component adapted to the request
//! mash generate "dark mode card, I use a screen reader" --template Card --kind react
//!
//! # Service status, installed models, available templates
//! mash status
//! mash models
//! mash templates
//!
//! # Verbose logging
//! RUST_LOG=mash_core=debug mash ask "hello"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use mash_core::orchestrator::RESPONSE_STEP;
use mash_core::{
    default_config_path, load_config_from_path, ActionCollaborator, ComponentRequest,
    ConfigOverrides, InferenceClient, MashConfig, OfflineCollaborator, ReasoningEngine,
    TaskOrchestrator, TemplateEngine, TemplateKind, UiGenerator,
};

/// Mash - reasoning agent for datasets, fine-tuning and deployments
#[derive(Parser, Debug)]
#[command(name = "mash")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "MASH_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "MASH_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Inference service host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Inference service port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Model to use
    #[arg(short = 'm', long, global = true)]
    model: Option<String>,

    /// Action backend base URL
    #[arg(long, value_name = "URL", global = true)]
    backend_url: Option<String>,

    /// Start in degraded mode without contacting any service
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message through the agent
    Ask {
        /// The message
        message: String,

        /// Print every reasoning stage before the answer
        #[arg(long)]
        show_thinking: bool,

        /// Print the whole task as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a component adapted to a requirement
    Generate {
        /// What the user needs, in plain words
        requirement: String,

        /// Template name (defaults to the configured template)
        #[arg(short = 't', long)]
        template: Option<String>,

        /// Template kind: react, nextjs, vue, angular, html, svelte
        #[arg(short = 'k', long)]
        kind: Option<String>,

        /// Print the whole result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the inference service and the backend
    Status,

    /// List models installed on the inference service
    Models,

    /// List the available templates
    Templates,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        overrides.host = self.host.clone();
        overrides.port = self.port;
        overrides.model = self.model.clone();
        overrides.backend_url = self.backend_url.clone();
        if self.offline {
            overrides = overrides.with_offline(true);
        }
        overrides
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("mash={level},mash_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load, override and validate the configuration
fn resolve_config(args: &Args) -> Result<MashConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path.clone())
        .with_context(|| format!("Failed to load configuration from {path:?}"))?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(source = %config.source(), model = %config.inference.model, "Configuration resolved");
    Ok(config)
}

fn client(config: &MashConfig) -> InferenceClient {
    InferenceClient::new(Arc::new(config.transport()))
        .with_settings(config.client_settings())
        .with_connectivity(config.connectivity())
}

fn collaborator(config: &MashConfig) -> Arc<dyn ActionCollaborator> {
    if config.inference.offline {
        Arc::new(OfflineCollaborator)
    } else {
        Arc::new(config.collaborator())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

async fn ask(config: &MashConfig, message: &str, show_thinking: bool, json: bool) -> Result<()> {
    let engine = ReasoningEngine::new(client(config));
    let orchestrator =
        TaskOrchestrator::new(engine, collaborator(config)).with_history_limit(config.history_limit);

    let task = orchestrator.process(message).await;
    debug!(task_id = %task.id(), status = %task.status(), "Task done");

    if json {
        return print_json(&task);
    }

    if show_thinking {
        for record in task.reasoning().iter().filter(|r| r.step != RESPONSE_STEP) {
            println!("[{}]\n{}\n", record.step, record.output.trim());
        }
        for call in task.calls() {
            let marker = if call.is_failure() { "failed" } else { "ok" };
            println!("call {} ({marker})", call.name);
        }
        if !task.calls().is_empty() {
            println!();
        }
    }

    println!("{}", task.response_text());
    Ok(())
}

async fn generate(
    config: &MashConfig,
    requirement: &str,
    template: Option<String>,
    kind: Option<String>,
    json: bool,
) -> Result<()> {
    let kind = match kind {
        Some(kind) => kind.parse::<TemplateKind>()?,
        None => config.default_kind,
    };
    let request = ComponentRequest::new(
        template.unwrap_or_else(|| config.default_template.clone()),
        kind,
    );

    let generator = UiGenerator::new(ReasoningEngine::new(client(config)));
    let ui = generator
        .generate_from_message(requirement, &request)
        .await
        .context("Generation failed")?;

    if json {
        return print_json(ui.as_ref());
    }

    for condition in &ui.conditions.conditions {
        println!(
            "condition {}: {} (priority {}, confidence {:.2})",
            condition.category, condition.value, condition.priority, condition.confidence
        );
    }
    for scored in &ui.artifacts {
        let artifact = &scored.artifact;
        println!(
            "\n== {} ({}) confidence {:.2}, {} modifications applied ==",
            artifact.name,
            artifact.kind,
            scored.confidence,
            artifact.applied_modifications.len()
        );
        println!("{}", artifact.code);
        if let Some(style) = &artifact.style {
            println!("\n-- style --\n{style}");
        }
        if let Some(script) = &artifact.script {
            println!("\n-- script --\n{script}");
        }
    }
    Ok(())
}

async fn status(config: &MashConfig) -> Result<()> {
    let client = client(config);
    let ai = client.check_connection(true).await;
    let backend = collaborator(config).check_backend_connection().await;

    println!(
        "inference  {}  {}",
        config.transport().base_url(),
        if ai.connected { "connected" } else { "unreachable" }
    );
    if let Some(latency) = ai.latency {
        println!("  latency  {} ms", latency.as_millis());
    }
    if let Some(error) = &ai.error {
        println!("  error    {error}");
    }
    println!("  mode     {}", client.connectivity().mode());

    match backend {
        Ok(true) => println!("backend    {}  connected", config.backend.url),
        Ok(false) => println!("backend    {}  unreachable", config.backend.url),
        Err(e) => println!("backend    {}  {e}", config.backend.url),
    }
    Ok(())
}

async fn models(config: &MashConfig) -> Result<()> {
    let models = client(config).list_models().await;
    if models.is_empty() {
        println!("No models available");
    }
    for model in models {
        match model.parameter_size {
            Some(size) => println!("{}  {size}", model.name),
            None => println!("{}", model.name),
        }
    }
    Ok(())
}

fn templates() {
    for template in TemplateEngine::default().available_templates() {
        println!("{:<12} {:<8} {}", template.name, template.kind.label(), template.description);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = resolve_config(&args)?;

    match args.command {
        Command::Ask {
            message,
            show_thinking,
            json,
        } => ask(&config, &message, show_thinking, json).await,
        Command::Generate {
            requirement,
            template,
            kind,
            json,
        } => generate(&config, &requirement, template, kind, json).await,
        Command::Status => status(&config).await,
        Command::Models => models(&config).await,
        Command::Templates => {
            templates();
            Ok(())
        }
    }
}
