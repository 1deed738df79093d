use std::fs;
use std::path::Path;
use std::process;

use clap::Parser as _;
use log::info;

use dbscaffold::ast::Database;
use dbscaffold::cli::{Cli, Command};
use dbscaffold::config::GeneratorConfig;
use dbscaffold::diff::compare_sources;
use dbscaffold::error::Result;
use dbscaffold::generator::{generate_project_zip, preview_project, preview_project_archive};
use dbscaffold::parser::{extract_fenced_dbml, parse_dbml};
use dbscaffold::tree::build_tree_from_archive;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    match cli.command {
        Command::Generate { schema, output } => {
            let db = read_schema(&schema)?;
            let bytes = generate_project_zip(&db, &config)?;
            fs::write(&output, &bytes)?;
            info!("wrote {} ({} bytes)", output.display(), bytes.len());
        }
        Command::Preview {
            schema,
            project,
            via_archive,
        } => {
            let db = read_schema(&schema)?;
            let project = project.as_deref().unwrap_or(&config.project_name);
            let tree = if via_archive {
                preview_project_archive(&db, &config, project)?
            } else {
                preview_project(&db, &config, project)?
            };
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Command::Tree { archive, project } => {
            let bytes = fs::read(&archive)?;
            let project = project.as_deref().unwrap_or(&config.project_name);
            let tree = build_tree_from_archive(&bytes, project)?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Command::Models { schema } => {
            let db = read_schema(&schema)?;
            let models = config.compiler()?.compile_schema(&db, &config.schema)?;
            println!("{}", serde_json::to_string_pretty(&models)?);
        }
        Command::Diff { old, new } => {
            let old = fs::read_to_string(&old)?;
            let new = fs::read_to_string(&new)?;
            let changes = compare_sources(&old, &new)?;
            println!("{}", serde_json::to_string_pretty(&changes)?);
        }
    }

    Ok(())
}

fn read_schema(path: &Path) -> Result<Database> {
    let input = fs::read_to_string(path)?;
    Ok(parse_dbml(extract_fenced_dbml(&input))?)
}
