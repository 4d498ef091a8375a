use clap::{Parser, Subcommand};
use penwright::commands::{self, CommandError, CreateArgs, EditArgs, EditField};
use penwright::config::SiteConfig;
use penwright::context::Context;
use penwright::interact::{Interaction, Terminal};
use penwright::output;
use penwright::store::Document;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "penwright")]
#[command(about = "Static blog generator: posts in one JSON document, rendered to minified HTML")]
#[command(long_about = "\
Static blog generator: posts in one JSON document, rendered to minified HTML

All posts and site settings live in blog.json in the site root. Running any
command without it writes a stock blog.json to fill in.

Site layout:

  blog.json                 # Settings + posts (titles and bodies base64)
  .editorconfig             # Copied next to drafts when editing (optional)
  content/
  ├── styles.css            # → styles.min.css
  └── fonts/*.css           # → *.min.css
  index.html                # Home page, newest posts first
  b/<id>/index.html         # One page per post (blog-dir)
  manifest.json             # Web app manifest
  blog_json_hash.txt        # SHA-256 of blog.json

Markdown extras: top-level headings get anchor ids and permalinks, and
<#some-id> links to a heading of the same post.

Set CI to only print errors and write blog.json compactly.")]
#[command(version = version_string())]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Site(SiteCommand),
    /// Write a stock blog.json
    #[command(visible_alias = "defcfg")]
    GenConfig {
        /// Overwrite an existing blog.json without asking
        #[arg(long)]
        force: bool,
    },
}

/// Commands that work on an existing blog.json.
#[derive(Subcommand)]
enum SiteCommand {
    /// Write a new post
    #[command(visible_alias = "new")]
    Create {
        /// Post title (prompted for when omitted)
        #[arg(long)]
        title: Option<String>,
        /// Space separated keywords (prompted for when omitted)
        #[arg(long)]
        keywords: Option<String>,
        /// Take the content from a markdown file instead of the editor
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// List posts
    #[command(visible_alias = "ls")]
    List,
    /// Remove a post
    #[command(visible_alias = "rm")]
    Remove {
        /// Post id (picked with fzf when omitted)
        id: Option<String>,
    },
    /// Edit a post's title, keywords or content
    Edit {
        /// Post id (picked with fzf when omitted)
        id: Option<String>,
        /// What to edit (picked with fzf when omitted)
        #[arg(long, value_enum)]
        field: Option<EditField>,
        /// New value instead of the prompt or editor
        #[arg(long)]
        value: Option<String>,
    },
    /// Render every post and the home page
    Build,
    /// Minify the stylesheets
    Css,
    /// Remove generated files
    Clean,
    /// Generate manifest.json and the blog.json hash
    #[command(visible_alias = "generate-metadata")]
    Metadata,
    /// Run clean, css, build and metadata
    #[command(visible_alias = "build-everything")]
    Static,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = Context::from_env(cli.root);
    let started = Instant::now();

    let code: u8 = match run(&ctx, cli.command) {
        Ok(()) => 0,
        Err(err) => {
            ctx.log(output::ERROR, &err.to_string());
            1
        }
    };

    ctx.log(
        "TIME",
        &format!(
            "Finished in {:.3} seconds with code {code}",
            started.elapsed().as_secs_f64()
        ),
    );
    ExitCode::from(code)
}

fn run(ctx: &Context, command: Command) -> Result<(), CommandError> {
    match command {
        Command::GenConfig { force } => {
            let mut ui = terminal(ctx, &SiteConfig::default());
            commands::gen_config(ctx, &mut ui, force)?;
            Ok(())
        }
        Command::Site(command) => run_on_document(ctx, command),
    }
}

/// Load blog.json, run `command`, and write the document back.
fn run_on_document(ctx: &Context, command: SiteCommand) -> Result<(), CommandError> {
    let path = ctx.document_path();
    if !path.is_file() {
        ctx.log("INFO", "Making new config...");
        Document::stock().save(&path, !ctx.ci)?;
        return Err(CommandError::NotConfigured(path));
    }
    if !ctx.ci && !ctx.history_path().exists() {
        std::fs::write(ctx.history_path(), "")?;
    }

    let mut doc = Document::load(&path)?;
    let mut ui = terminal(ctx, &doc.config);
    let result = dispatch(ctx, &mut doc, &mut ui, command);

    if !doc.blogs.is_empty() {
        ctx.log("CLEANUP", "Sorting blogs by creation time...");
    }
    ctx.log("CONFIG", "Redumping config");
    let saved = doc.save(&path, !ctx.ci);

    result?;
    saved?;
    Ok(())
}

fn dispatch(
    ctx: &Context,
    doc: &mut Document,
    ui: &mut dyn Interaction,
    command: SiteCommand,
) -> Result<(), CommandError> {
    match command {
        SiteCommand::Create {
            title,
            keywords,
            content_file,
        } => {
            let args = CreateArgs {
                title,
                keywords,
                content_file,
            };
            commands::create(ctx, doc, ui, args)?;
        }
        SiteCommand::List => commands::list(doc)?,
        SiteCommand::Remove { id } => {
            commands::remove(ctx, doc, ui, id)?;
        }
        SiteCommand::Edit { id, field, value } => {
            commands::edit(ctx, doc, ui, EditArgs { id, field, value })?;
        }
        SiteCommand::Build => commands::build(ctx, doc)?,
        SiteCommand::Css => commands::css(ctx)?,
        SiteCommand::Clean => commands::clean(ctx, doc)?,
        SiteCommand::Metadata => commands::generate_metadata(ctx, doc)?,
        SiteCommand::Static => commands::static_site(ctx, doc)?,
    }
    Ok(())
}

/// The real terminal, editing with the configured editor command.
fn terminal(ctx: &Context, config: &SiteConfig) -> Terminal {
    let terminal =
        Terminal::new(config.editor_command.as_str()).with_editorconfig(ctx.path(".editorconfig"));
    if ctx.ci {
        terminal
    } else {
        terminal.with_history(ctx.history_path())
    }
}
