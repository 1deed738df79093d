use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dbscaffold", version, about = "Generate Spring scaffolding from DBML schemas")]
pub struct Cli {
    /// YAML generator config.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the generated project as a zip archive.
    Generate {
        schema: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the generated project tree as JSON.
    Preview {
        schema: PathBuf,
        /// Root folder name, overrides the config.
        #[arg(short, long)]
        project: Option<String>,
        /// Build the tree from the packed archive.
        #[arg(long)]
        via_archive: bool,
    },
    /// Print the tree of an existing zip archive as JSON.
    Tree {
        archive: PathBuf,
        #[arg(short, long)]
        project: Option<String>,
    },
    /// Print every generation model as JSON.
    Models { schema: PathBuf },
    /// Print field changes between two source files as JSON.
    Diff { old: PathBuf, new: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn parses_generate() {
        let cli = Cli::parse_from(["dbscaffold", "generate", "shop.dbml", "-o", "out.zip"]);
        assert!(cli.config.is_none());
        match cli.command {
            Command::Generate { schema, output } => {
                assert_eq!(schema, Path::new("shop.dbml"));
                assert_eq!(output, Path::new("out.zip"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_preview_flags() {
        let cli = Cli::parse_from([
            "dbscaffold",
            "preview",
            "shop.dbml",
            "--project",
            "Shop",
            "--via-archive",
            "--config",
            "gen.yaml",
        ]);
        assert_eq!(cli.config.as_deref(), Some(Path::new("gen.yaml")));
        assert!(matches!(
            cli.command,
            Command::Preview { ref project, via_archive: true, .. } if project.as_deref() == Some("Shop")
        ));
    }

    #[test]
    fn parses_diff() {
        let cli = Cli::parse_from(["dbscaffold", "diff", "Old.java", "New.java"]);
        assert!(matches!(cli.command, Command::Diff { .. }));
    }

    #[test]
    fn generate_requires_output() {
        assert!(Cli::try_parse_from(["dbscaffold", "generate", "shop.dbml"]).is_err());
    }
}
