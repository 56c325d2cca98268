use catalog_gen::{config, generate, loader, output};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-gen")]
#[command(about = "Static site generator for an app catalog")]
#[command(long_about = "\
Static site generator for an app catalog

YAML records describe categories, authors and apps. Every record is checked
against a closed schema, apps are joined to their author and categories, and
the result is rendered as HTML pages plus JSON documents.

Data structure:

  data/
  ├── config.toml                  # Site config (optional)
  ├── categories.yaml              # group → slug → {name, icon}
  ├── authors/
  │   └── alice.yaml               # Author id is the file stem
  ├── apps/
  │   └── alice.snake.yaml         # <author>.<app>.yaml
  └── splash/
      └── alice.snake.png          # Optional splash image

The output directory is removed and rewritten on every build.

Run 'catalog-gen gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Data directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "public", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the data and write the site
    Build,
    /// Validate the data without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            println!(
                "==> Building {} → {}",
                cli.source.display(),
                cli.output.display()
            );
            let report = generate::generate(&cli.source, &cli.output)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site_config = config::load_config(&cli.source)?;
            let catalog = loader::load_catalog(&cli.source, &site_config)?;
            output::print_check_output(&catalog);
            println!("==> Catalog is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
