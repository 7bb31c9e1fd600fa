//! folio CLI - render and inspect blog posts

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use folio::render::{excerpt, to_text};
use folio::{
    deserialize, deserialize_or_placeholder, from_json, render, render_batch, serialize, slugify,
    to_json, ContentStats, ImporterRegistry, JsonFormat, RenderOptions, SlugPolicy, StoredDocument,
};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Render and inspect structured blog posts", long_about = None)]
struct Cli {
    /// Input post (.json stored document or .md)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file for the rendered markup
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Clone)]
struct RenderArgs {
    /// Reading speed for reading-time estimates
    #[arg(long, env = "FOLIO_WPM", default_value = "200", global = true)]
    wpm: u32,

    /// Keep duplicate heading anchors instead of numbering them
    #[arg(long, global = true)]
    preserve_slugs: bool,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        let policy = if self.preserve_slugs {
            SlugPolicy::Preserve
        } else {
            SlugPolicy::Deduplicate
        };
        RenderOptions::new()
            .with_words_per_minute(self.wpm)
            .with_slug_policy(policy)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render a post to HTML
    Render {
        /// Input post
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit the full render result (markup, headings, reading time) as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render every post in a directory
    RenderDir {
        /// Directory of .json / .md posts
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert a post to stored-document JSON
    Json {
        /// Input post
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Render a post to plain text
    Text {
        /// Input post
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only print an excerpt of at most this many characters
        #[arg(long, value_name = "CHARS")]
        excerpt: Option<usize>,
    },

    /// Show headings, reading time and content statistics
    Info {
        /// Input post
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Validate stored documents
    Check {
        /// Stored-document files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Print the slug of a title
    Slug {
        /// Title text
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let options = cli.render.options();

    let result = match cli.command {
        Some(Commands::Render {
            input,
            output,
            json,
        }) => cmd_render(&input, output.as_deref(), json, &options),
        Some(Commands::RenderDir { input, output }) => {
            cmd_render_dir(&input, output.as_deref(), &options)
        }
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        Some(Commands::Text { input, excerpt }) => cmd_text(&input, excerpt),
        Some(Commands::Info { input }) => cmd_info(&input, &options),
        Some(Commands::Check { inputs }) => cmd_check(&inputs),
        Some(Commands::Slug { text }) => {
            println!("{}", slugify(&text));
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_render(&input, cli.output.as_deref(), false, &options)
            } else {
                println!("{}", "Usage: folio <FILE> [OUTPUT]".yellow());
                println!("       folio --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Load a post as a stored document: JSON files as-is, anything else
/// through the importer registered for its extension.
fn load_stored(path: &Path) -> CliResult<StoredDocument> {
    log::debug!("Loading post from {}", path.display());
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        return Ok(from_json(&fs::read_to_string(path)?)?);
    }
    let doc = ImporterRegistry::with_defaults().import_file(path)?;
    Ok(serialize(&doc))
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    json: bool,
    options: &RenderOptions,
) -> CliResult {
    let doc = load_stored(input)?;
    let rendered = render(&doc, options);

    let content = if json {
        serde_json::to_string_pretty(&rendered)?
    } else {
        rendered.markup
    };
    write_or_print(output, &content)
}

fn cmd_render_dir(input: &Path, output: Option<&Path>, options: &RenderOptions) -> CliResult {
    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| {
        let name = input.file_name().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_html", name))
    });
    fs::create_dir_all(&output_dir)?;

    let registry = ImporterRegistry::with_defaults();
    let mut paths: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| registry.supports(e))
        })
        .collect();
    paths.sort();

    let pb = ProgressBar::new(paths.len() as u64 * 2);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Loading posts...");
    let mut names = Vec::with_capacity(paths.len());
    let mut docs = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_stored(path) {
            Ok(doc) => {
                names.push(path.file_stem().unwrap_or_default().to_string_lossy().to_string());
                docs.push(doc);
            }
            Err(e) => pb.println(format!("{} {}: {}", "Skipped".yellow(), path.display(), e)),
        }
        pb.inc(1);
    }

    pb.set_message("Rendering...");
    let rendered = render_batch(&docs, options);
    let mut degraded = 0;
    let mut totals = ContentStats::new();
    for (name, result) in names.iter().zip(&rendered) {
        if result.markup == options.fallback_markup {
            degraded += 1;
        }
        totals.merge(&result.stats);
        fs::write(output_dir.join(format!("{}.html", name)), &result.markup)?;
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} posts rendered to {}",
        "Done!".green().bold(),
        rendered.len(),
        output_dir.display()
    );
    println!(
        "  {} words, {} headings, {} images",
        totals.word_count, totals.heading_count, totals.image_count
    );
    if degraded > 0 {
        println!("{} {} posts fell back to placeholder markup", "Warning:".yellow(), degraded);
    }
    Ok(())
}

fn cmd_json(input: &Path, output: Option<&Path>, compact: bool) -> CliResult {
    let doc = load_stored(input)?;
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    write_or_print(output, &to_json(&doc, format)?)
}

fn cmd_text(input: &Path, max_chars: Option<usize>) -> CliResult {
    let tree = deserialize_or_placeholder(&load_stored(input)?);
    let text = match max_chars {
        Some(n) => excerpt(&tree, n),
        None => to_text(&tree),
    };
    println!("{}", text);
    Ok(())
}

fn cmd_info(input: &Path, options: &RenderOptions) -> CliResult {
    let doc = load_stored(input)?;
    let rendered = render(&doc, options);

    println!("{}", "Post Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {}",
        "Valid".bold(),
        if deserialize(&doc).is_ok() { "Yes" } else { "No" }
    );
    println!(
        "{}: {} min",
        "Reading time".bold(),
        rendered.estimated_read_minutes
    );

    if rendered.has_headings() {
        println!();
        println!("{}", "Table of Contents".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for heading in &rendered.headings {
            let indent = "  ".repeat(usize::from(heading.level.saturating_sub(1)));
            println!("{}{} {}", indent, heading.text, format!("#{}", heading.id).dimmed());
        }
    }

    let stats = &rendered.stats;
    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "Headings".bold(), stats.heading_count);
    println!("{}: {}", "List items".bold(), stats.list_item_count);
    println!("{}: {}", "Images".bold(), stats.image_count);
    println!("{}: {}", "Links".bold(), stats.link_count);
    println!("{}: {}", "Code blocks".bold(), stats.code_block_count);

    Ok(())
}

fn cmd_check(inputs: &[PathBuf]) -> CliResult {
    let mut failures = 0;
    for path in inputs {
        let result = fs::read_to_string(path)
            .map_err(folio::Error::from)
            .and_then(|text| from_json(&text))
            .and_then(|doc| deserialize(&doc));
        match result {
            Ok(_) => println!("{} {}", "ok".green(), path.display()),
            Err(e) => {
                failures += 1;
                println!("{} {}: {}", "FAIL".red().bold(), path.display(), e);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} documents invalid", failures, inputs.len()).into());
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "folio".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Structured blog post renderer");
    println!();
    println!("License: MIT");
}
