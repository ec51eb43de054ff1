use clap::{Parser, Subcommand};
use pagesmith::{config, generate, index, output, render};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(about = "Static documentation site generator")]
#[command(long_about = "\
Static documentation site generator

Each configured page tracks one markdown document, usually a users guide
kept in a GitHub repository. The document is fetched, split into sections
on '##' headings, and rendered into one themed HTML file per section. A
docs index page lists every configured page.

Config structure (config/pages.yaml):

  defaults:
    output_dir: public               # Where section files land
    filename_prefix: docs-           # docs-<section-slug>.html
    docs_index_output: public/docs.html
  layouts:                           # Shared section layouts, by slug
    getting-started:
      device: numbered_steps
      step_order: [Install, Configure]
  pages:
    netsuke:                         # Page key, also the default label
      repo: df12/netsuke             # Source: docs/users-guide.md at main
      language: rust                 # Adds a crates.io link to the index
      latest_release: v1.2.3         # Pins the source to the release tag
      layouts:
        usage:
          device: split_panel        # Prose beside one featured code block
          emphasized_code_block: 1

Sections render with one of three devices: 'default' prose, ordered
'numbered_steps' walkthroughs, or a 'split_panel' with code beside prose.
Relative links in the source are rewritten to GitHub blob URLs at the
page's release tag or branch.

Run 'pagesmith stylesheet' to print the syntax highlighting CSS for a
theme.")]
#[command(version = version_string())]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "config/pages.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Flags for the generate command.
#[derive(clap::Args, Clone)]
struct GenerateArgs {
    /// Page key to generate; omit to generate every configured page
    #[arg(long)]
    page: Option<String>,

    /// Fetch the markdown from this URL instead of the configured source
    #[arg(long)]
    source_url: Option<String>,

    /// Write section files here instead of the configured output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(clap::Args, Clone)]
struct StylesheetArgs {
    /// Highlighting theme name
    #[arg(long, default_value = render::DEFAULT_THEME)]
    style: String,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and render documentation pages
    Generate(GenerateArgs),
    /// Write the docs index listing every configured page
    Index,
    /// Generate every page, then the docs index
    Build,
    /// Print the syntax highlighting CSS for a theme
    Stylesheet(StylesheetArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => {
            let site = config::load_site_config(&cli.config)?;
            let options = generate::GenerateOptions {
                source_url: args.source_url,
                output_dir: args.output_dir,
            };
            match &args.page {
                Some(key) => {
                    let page = site.get_page(Some(key.as_str()))?;
                    let artifacts = generate::generate_page(page, &options)?;
                    output::print_generate_output(page, &artifacts);
                }
                None => {
                    if options.source_url.is_some() || options.output_dir.is_some() {
                        return Err(
                            "cannot override source_url or output_dir when generating multiple pages"
                                .into(),
                        );
                    }
                    for page in site.pages.values() {
                        let artifacts = generate::generate_page(page, &options)?;
                        output::print_generate_output(page, &artifacts);
                    }
                }
            }
        }
        Command::Index => {
            let site = config::load_site_config(&cli.config)?;
            let artifacts = index::write_docs_index(&site)?;
            output::print_index_output(&artifacts);
        }
        Command::Build => {
            let site = config::load_site_config(&cli.config)?;

            println!("==> Generating {} pages", site.pages.len());
            let options = generate::GenerateOptions::default();
            for page in site.pages.values() {
                let artifacts = generate::generate_page(page, &options)?;
                output::print_generate_output(page, &artifacts);
            }

            println!("==> Writing docs index");
            let artifacts = index::write_docs_index(&site)?;
            output::print_index_output(&artifacts);

            println!("==> Site complete");
        }
        Command::Stylesheet(args) => {
            let renderer = render::HtmlRenderer::new(&args.style);
            print!("{}", renderer.stylesheet());
        }
    }

    Ok(())
}
