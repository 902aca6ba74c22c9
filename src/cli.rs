//! Minimal CLI: node-types.json → (check | nodes)
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::classify::Classifier;
use crate::config::GenConfig;
use crate::schema::{load_schema, NodeDef};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile a tree-sitter node-types.json schema into typed AST source units
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// load and classify the schema, report what would be generated
    Check(CheckSettings),
    /// generate the typed AST units into an output directory
    Nodes(NodesSettings),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// path to the grammar's node-types.json
    #[arg(long, short)]
    schema: PathBuf,

    /// optional JSON config overriding the built-in operator and lexeme tables
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckSettings {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct NodesSettings {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output directory for the generated units (stdout dump if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> anyhow::Result<(Vec<NodeDef>, GenConfig)> {
        let schema_src = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("failed to read schema file {}", self.schema.display()))?;
        let schema = load_schema(&schema_src)?;
        let config = match self.config.as_ref() {
            Some(path) => {
                let config_src = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                GenConfig::load(&config_src)?
            }
            None => GenConfig::default(),
        };
        Ok((schema, config))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Check(target) => {
                let (schema, config) = target.input_settings.load()?;
                let cls = Classifier::new(&schema, &config);
                let named = schema.iter().filter(|d| d.named).count();
                let supertypes = schema
                    .iter()
                    .filter(|d| d.named && d.subtypes.is_some())
                    .count();
                let tokens = schema
                    .iter()
                    .filter(|d| !d.named && cls.is_token(&d.kind))
                    .count();
                let operators = cls.operators();

                println!("{} rules, {} named ({} supertypes), {} tokens", schema.len(), named, supertypes, tokens);
                println!("{} operator families:", operators.len());
                for (module, type_name, lexeme) in operators {
                    println!("  {lexeme:4} → operators/{module}.rs ({type_name})");
                }
                Ok(())
            }
            Command::Nodes(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let (schema, config) = target.input_settings.load()?;
                let units = crate::emit::generate(&schema, &config)?;
                if let Some(out) = target.out.as_ref() {
                    for unit in &units {
                        let path = out.join(&unit.path);
                        if let Some(parent) = path.parent() {
                            std::fs::create_dir_all(parent).with_context(|| {
                                format!("failed to create output directory {}", parent.display())
                            })?;
                        }
                        std::fs::write(&path, &unit.source)
                            .with_context(|| format!("failed to write {}", path.display()))?;
                    }
                    eprintln!("wrote {} units under {}", units.len(), out.display());
                } else {
                    for unit in &units {
                        println!("// {}", unit.path);
                        println!("{}", unit.source);
                    }
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
