//! Command-line interface definition and dispatch for modelgate.
//!
//! Uses [`clap`] derive macros. Every handler is a thin shell over the
//! library: the factory resolves clients, the prompt templates render system
//! messages.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use modelgate::config::{agent_model_kind, EnvSettings, ModelKind, YamlFile};
use modelgate::message::Message;
use modelgate::prompts::{PromptState, PromptTemplates};
use modelgate::ClientFactory;

/// Top-level CLI structure for modelgate.
#[derive(Parser)]
#[command(
    name = "modelgate",
    about = "Resolve logical model types into LLM clients"
)]
pub struct Cli {
    /// Configuration file (overrides MODELGATE_CONFIG and discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging when RUST_LOG is unset
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a one-shot question
    Ask {
        /// The question to ask
        prompt: Vec<String>,
        /// Logical model type (basic, reasoning, vision, code)
        #[arg(short, long, default_value = "basic", conflicts_with = "agent")]
        kind: String,
        /// Pick the model type used by this agent (planner, coder, ...)
        #[arg(short, long)]
        agent: Option<String>,
        /// Prompt template applied as the system message
        #[arg(short, long)]
        template: Option<String>,
    },
    /// Render a prompt template
    Render {
        /// Template name, without the .md extension
        name: String,
        /// Template variable as key=value (repeatable)
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        /// User message appended to the history (repeatable)
        #[arg(long = "message")]
        messages: Vec<String>,
    },
    /// Show which provider a model type resolves to, without connecting
    Resolve {
        kind: String,
    },
    /// Print the token limit configured for a model type
    TokenLimit {
        kind: String,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print the search backend selected by SEARCH_API
    SearchEngine,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the config path and its contents with credentials masked
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_var(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got `{s}`")),
    }
}

fn factory(config: Option<&PathBuf>) -> Result<ClientFactory> {
    let source = YamlFile::discover(config.map(PathBuf::as_path))?;
    tracing::debug!(path = %source.path().display(), "using configuration");
    Ok(ClientFactory::new(source, EnvSettings::from_env()))
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_ref();
    match cli.command {
        Commands::Ask {
            prompt,
            kind,
            agent,
            template,
        } => {
            let prompt = prompt.join(" ");
            if prompt.is_empty() {
                anyhow::bail!("No prompt provided. Usage: modelgate ask \"your question here\"");
            }
            let kind = match agent.as_deref() {
                Some(agent) => agent_model_kind(agent),
                None => ModelKind::from_str(&kind)?,
            };

            let factory = factory(config)?;
            let model = factory.get_client(kind).await?;

            println!(
                "{} [{} via {}: {}]",
                "modelgate".bold().cyan(),
                kind,
                model.provider(),
                model.model().yellow(),
            );
            println!();
            println!("{} {}", ">".green().bold(), prompt);
            println!();

            let history = vec![Message::user(&prompt)];
            let messages = match template {
                Some(name) => PromptTemplates::from_env().apply(&name, &PromptState::new(history))?,
                None => history,
            };

            let reply = model.complete(&messages).await?;
            if let Some(reasoning) = reply.reasoning.as_deref() {
                println!("{}", reasoning.dimmed());
                println!();
            }
            println!("{}", reply.text());
            Ok(())
        }
        Commands::Render {
            name,
            vars,
            messages,
        } => {
            let templates = PromptTemplates::from_env();
            if vars.is_empty() && messages.is_empty() {
                println!("{}", templates.render_standalone(&name)?);
                return Ok(());
            }
            let state = vars.into_iter().fold(
                PromptState::new(messages.into_iter().map(Message::user).collect()),
                |state, (key, value)| state.with_var(key, value),
            );
            let rendered = templates.apply(&name, &state)?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
            Ok(())
        }
        Commands::Resolve { kind } => {
            let kind = ModelKind::from_str(&kind)?;
            let request = factory(config)?.resolve(kind)?;
            println!("{} {}", "Kind:".bold(), kind);
            println!("{} {}", "Provider:".bold(), request.provider.to_string().green());
            println!(
                "{} {}",
                "TLS verification:".bold(),
                if request.transport.is_permissive() {
                    "disabled".red()
                } else {
                    "enabled".normal()
                }
            );
            println!();
            let block = Value::Object(modelgate::error::redact(&request.block));
            println!("{}", serde_json::to_string_pretty(&block)?);
            Ok(())
        }
        Commands::TokenLimit { kind } => {
            let kind = ModelKind::from_str(&kind)?;
            match factory(config)?.token_limit(kind)? {
                Some(limit) => println!("{limit}"),
                None => println!("{}", "unset".dimmed()),
            }
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let source = YamlFile::discover(config.map(PathBuf::as_path))?;
                let document = modelgate::config::ConfigSource::load(&source)?;
                println!("{} {}", "Config path:".bold(), source.path().display());
                println!();
                let yaml = serde_yaml::to_string(&document.redacted())
                    .context("failed to format configuration")?;
                println!("{yaml}");
                Ok(())
            }
        },
        Commands::SearchEngine => {
            println!("{}", EnvSettings::from_env().search_engine);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("locale=en-US").unwrap(),
            ("locale".to_string(), "en-US".to_string())
        );
        assert_eq!(parse_var("expr=a=b").unwrap().1, "a=b");
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_render_arguments() {
        let cli = Cli::try_parse_from([
            "modelgate",
            "render",
            "test",
            "--var",
            "locale=fr-FR",
            "--message",
            "hello",
            "--debug",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Commands::Render {
                name,
                vars,
                messages,
            } => {
                assert_eq!(name, "test");
                assert_eq!(vars, vec![("locale".to_string(), "fr-FR".to_string())]);
                assert_eq!(messages, vec!["hello".to_string()]);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_kind_conflicts_with_agent() {
        let parsed = Cli::try_parse_from([
            "modelgate", "ask", "--kind", "code", "--agent", "coder", "hi",
        ]);
        assert!(parsed.is_err());
    }
}
