use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use shutterbox::gallery::Gallery;
use shutterbox::{carousel, config, manifest, page};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shutterbox")]
#[command(about = "Manifest-driven photo gallery renderer")]
#[command(long_about = "\
Manifest-driven photo gallery renderer

A pre-built JSON manifest is the data source: its keys become sections,
its arrays become ordered image grids. Rendering degrades gracefully: a
missing or broken manifest produces pages with per-section empty-state
messages, never a failed build.

Site structure:

  site/
  ├── gallery.toml                 # Config (optional, defaults apply)
  ├── data/sections.json           # Manifest (see gen-config for the path)
  └── images/...                   # Image variants the manifest points at

Run 'shutterbox gen-config' to print a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Site root containing gallery.toml and the manifest
    #[arg(long, default_value = ".", global = true)]
    site: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render index.html and one page per section from the manifest
    Build(BuildArgs),
    /// Validate config and manifest without writing anything
    Check,
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

#[derive(clap::Args, Clone)]
struct BuildArgs {
    /// Deterministic seed for the mixed-carousel sample
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => build(&cli.site, &cli.output, args.seed)?,
        Command::Check => check(&cli.site)?,
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }
    Ok(())
}

fn build(
    site: &Path,
    output: &Path,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(&site.join("gallery.toml"))?;
    let manifest = manifest::load(&site.join(&config.manifest));

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let picks = carousel::mixed_picks(&manifest, config.carousel.sample_size, &mut rng);

    let mut gallery = Gallery::new(manifest, config);
    gallery.attach_carousel(&picks, Instant::now());

    std::fs::create_dir_all(output)?;

    let index = page::render_index(&gallery, &picks);
    std::fs::write(output.join("index.html"), index.into_string())?;
    println!("Generated index.html");

    for section in &gallery.manifest().sections {
        let html = page::render_section_page(&gallery, section);
        let filename = format!("{}.html", section.key);
        std::fs::write(output.join(&filename), html.into_string())?;
        println!("Generated {filename}");
    }

    println!("Site generated at {}", output.display());
    Ok(())
}

fn check(site: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(&site.join("gallery.toml"))?;
    let manifest_path = site.join(&config.manifest);
    println!("==> Checking {}", manifest_path.display());

    let manifest = manifest::load(&manifest_path);
    if manifest.is_empty() {
        println!("No sections found; pages would render empty-state messages");
        return Ok(());
    }

    for (idx, section) in manifest.sections.iter().enumerate() {
        let renderable = section.items.iter().filter(|i| i.is_renderable()).count();
        let skipped = section.items.len() - renderable;
        let detail = if skipped > 0 {
            format!("{renderable} photos, {skipped} without any usable source")
        } else {
            format!("{renderable} photos")
        };
        println!("{:0>3} {} ({detail})", idx + 1, section.label());
    }
    println!("==> Manifest is valid");
    Ok(())
}
