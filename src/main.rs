use anyhow::{bail, Context as _};
use cc_mirror::config::{default_bin_dir, default_root};
use cc_mirror::options::team_mode_request;
use cc_mirror::{
    list_variants, BuildResult, CommandStdio, Config, CreateOptions, ExecutionMode, ModelOverrides, Toolbox,
    UpdateOptions, VariantBuilder, VariantUpdater,
};
use clap::{Args, CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cc-mirror")]
#[command(author, version, about = "Create and update isolated Claude Code variants")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Variants root directory (default: ~/.cc-mirror)
    #[arg(long, global = true, env = "CC_MIRROR_ROOT")]
    root: Option<PathBuf>,

    /// Directory for generated launchers (default: ~/.local/bin)
    #[arg(long, global = true)]
    bin_dir: Option<PathBuf>,

    /// Debug logging on stderr; also shows tweakcc output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new variant
    Create(CreateArgs),

    /// Rebuild one variant, or all of them
    Update(UpdateArgs),

    /// List variants under the root
    List,

    /// Generate shell completions
    Completion {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Variant name, also the launcher command
    #[arg(long)]
    name: String,

    /// Provider key (mirror, zai, minimax, openrouter, ccrouter)
    #[arg(long)]
    provider: String,

    /// API key written into the variant's settings
    #[arg(long, env = "CC_MIRROR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the provider's base URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Variant to update; all variants when omitted
    name: Option<String>,

    /// Reinstall skills even when already present
    #[arg(long)]
    skill_update: bool,

    /// Rewrite settings and launcher only; keep the install tree
    #[arg(long)]
    settings_only: bool,

    #[command(flatten)]
    shared: SharedArgs,
}

/// Toggles accepted by both create and update
#[derive(Args, Debug)]
struct SharedArgs {
    /// npm package to install
    #[arg(long)]
    npm_package: Option<String>,

    /// Brand theme: auto, none, or a brand key
    #[arg(long)]
    brand: Option<String>,

    #[command(flatten)]
    models: ModelArgs,

    /// Skip tweakcc theming and prompt packs
    #[arg(long)]
    no_tweak: bool,

    /// Apply the provider prompt pack
    #[arg(long, conflicts_with = "no_prompt_pack")]
    prompt_pack: bool,

    /// Skip the provider prompt pack
    #[arg(long)]
    no_prompt_pack: bool,

    /// Install the provider's auxiliary skill
    #[arg(long, conflicts_with = "no_skill_install")]
    skill_install: bool,

    #[arg(long)]
    no_skill_install: bool,

    /// Export the API key from your shell profile
    #[arg(long, conflicts_with = "no_shell_env")]
    shell_env: bool,

    #[arg(long)]
    no_shell_env: bool,

    /// Patch cli.js to enable team mode
    #[arg(long)]
    enable_team_mode: bool,

    /// Undo the team mode patch and remove its skills
    #[arg(long)]
    disable_team_mode: bool,

    /// Where tweakcc output goes
    #[arg(long, value_enum)]
    theming_stdio: Option<CommandStdio>,

    /// Show a live progress spinner
    #[arg(long)]
    progress: bool,
}

#[derive(Args, Debug)]
struct ModelArgs {
    #[arg(long)]
    model_sonnet: Option<String>,
    #[arg(long)]
    model_opus: Option<String>,
    #[arg(long)]
    model_haiku: Option<String>,
    #[arg(long)]
    model_small_fast: Option<String>,
    /// Default model (ANTHROPIC_MODEL)
    #[arg(long)]
    model_default: Option<String>,
    #[arg(long)]
    model_subagent: Option<String>,
}

impl ModelArgs {
    fn overrides(&self) -> ModelOverrides {
        ModelOverrides {
            sonnet: self.model_sonnet.clone(),
            opus: self.model_opus.clone(),
            haiku: self.model_haiku.clone(),
            small_fast: self.model_small_fast.clone(),
            default_model: self.model_default.clone(),
            subagent_model: self.model_subagent.clone(),
        }
    }
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Values resolved from the command line, config.toml and built-in defaults
struct Settings {
    root: PathBuf,
    bin_dir: Option<PathBuf>,
    config: Config,
    verbose: bool,
}

impl Settings {
    fn resolve(cli: &Cli) -> Self {
        let root = cli.root.clone().unwrap_or_else(default_root);
        let config = Config::load(&root);
        Self {
            bin_dir: cli.bin_dir.clone().or_else(|| config.bin_dir()),
            root,
            config,
            verbose: cli.verbose,
        }
    }

    fn stdio(&self, arg: Option<CommandStdio>) -> CommandStdio {
        theming_stdio(arg, self.config.defaults.theming_stdio, self.verbose)
    }

    fn npm_package(&self, arg: &Option<String>) -> Option<String> {
        arg.clone().or_else(|| self.config.defaults.npm_package.clone())
    }

    fn toolbox(&self) -> Toolbox {
        Toolbox::system(&self.config.theming.version)
    }
}

/// `--verbose` always shows tweakcc output; otherwise flag, then config, then pipe
fn theming_stdio(arg: Option<CommandStdio>, configured: Option<CommandStdio>, verbose: bool) -> CommandStdio {
    if verbose {
        return CommandStdio::Inherit;
    }
    arg.or(configured).unwrap_or_default()
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "cc_mirror=debug" } else { "cc_mirror=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("CC_MIRROR_LOG").unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn mode_for(progress: bool) -> ExecutionMode {
    if progress {
        ExecutionMode::Cooperative
    } else {
        ExecutionMode::Blocking
    }
}

/// Drive a cooperative pipeline on a current-thread runtime next to a spinner.
/// The spinner redraws at every step boundary.
fn with_spinner<T>(label: Arc<Mutex<String>>, work: impl Future<Output = T>) -> anyhow::Result<T> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;

    Ok(runtime.block_on(async {
        let done = AtomicBool::new(false);
        let work = async {
            let out = work.await;
            done.store(true, Ordering::SeqCst);
            out
        };
        let spinner = async {
            const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            let mut frame = 0;
            while !done.load(Ordering::SeqCst) {
                let current = label.lock().map(|l| l.clone()).unwrap_or_default();
                eprint!("\r{} {:<60}", FRAMES[frame % FRAMES.len()].cyan(), current);
                let _ = std::io::stderr().flush();
                frame += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            eprint!("\r{:<64}\r", "");
        };
        let (out, ()) = tokio::join!(work, spinner);
        out
    }))
}

fn progress_printer() -> impl Fn(&str) + Send + Sync + 'static {
    |label: &str| eprintln!("   {} {}", "→".dimmed(), label)
}

fn progress_label() -> (Arc<Mutex<String>>, impl Fn(&str) + Send + Sync + 'static) {
    let label = Arc::new(Mutex::new(String::new()));
    let sink = label.clone();
    let update = move |step: &str| {
        if let Ok(mut current) = sink.lock() {
            *current = step.to_string();
        }
    };
    (label, update)
}

fn print_result(verb: &str, result: &BuildResult) {
    let meta = &result.meta;
    println!("\n{} {} ({})", verb.green().bold(), meta.name.bold(), meta.provider);
    if let Some(wrapper) = &result.wrapper_path {
        println!("   Launcher: {}", wrapper.display().to_string().cyan());
    }
    println!("   Config:   {}", meta.config_dir.display());
    println!("   Binary:   {}", meta.binary_path.display());
    if let Some(notes) = &result.notes {
        println!("\n   Notes:");
        for note in notes {
            if note.is_warning() {
                println!("   {} {}", "!".yellow(), note.to_string().yellow());
            } else {
                println!("   {} {}", "•".green(), note);
            }
        }
    }
    println!();
}

fn cmd_create(settings: &Settings, args: CreateArgs) -> anyhow::Result<()> {
    let shared = &args.shared;
    let opts = CreateOptions {
        name: args.name.clone(),
        provider: args.provider.clone(),
        api_key: args.api_key.clone(),
        base_url: args.base_url.clone(),
        root: settings.root.clone(),
        bin_dir: settings.bin_dir.clone().unwrap_or_else(default_bin_dir),
        npm_package: settings.npm_package(&shared.npm_package),
        brand: shared.brand.clone(),
        model_overrides: shared.models.overrides(),
        no_tweak: shared.no_tweak,
        prompt_pack: toggle(shared.prompt_pack, shared.no_prompt_pack),
        skill_install: toggle(shared.skill_install, shared.no_skill_install),
        shell_env: toggle(shared.shell_env, shared.no_shell_env),
        team_mode: team_mode_request(shared.enable_team_mode, shared.disable_team_mode)?,
        theming_stdio: settings.stdio(shared.theming_stdio),
    };

    println!("{}", format!("Creating variant {}...", opts.name).cyan().bold());
    let builder = VariantBuilder::new(mode_for(shared.progress), settings.toolbox());
    let result = if shared.progress {
        let (label, update) = progress_label();
        let builder = builder.with_progress(update);
        with_spinner(label, builder.create_async(&opts))??
    } else {
        builder.with_progress(progress_printer()).create(&opts)?
    };

    print_result("Created", &result);
    Ok(())
}

fn update_options(settings: &Settings, args: &UpdateArgs) -> anyhow::Result<UpdateOptions> {
    let shared = &args.shared;
    Ok(UpdateOptions {
        bin_dir: settings.bin_dir.clone(),
        npm_package: settings.npm_package(&shared.npm_package),
        brand: shared.brand.clone(),
        model_overrides: shared.models.overrides(),
        no_tweak: shared.no_tweak,
        settings_only: args.settings_only,
        prompt_pack: toggle(shared.prompt_pack, shared.no_prompt_pack),
        skill_install: toggle(shared.skill_install, shared.no_skill_install),
        shell_env: toggle(shared.shell_env, shared.no_shell_env),
        skill_update: args.skill_update,
        team_mode: team_mode_request(shared.enable_team_mode, shared.disable_team_mode)?,
        theming_stdio: settings.stdio(shared.theming_stdio),
    })
}

fn update_one(settings: &Settings, name: &str, opts: &UpdateOptions, progress: bool) -> anyhow::Result<BuildResult> {
    let updater = VariantUpdater::new(mode_for(progress), settings.toolbox());
    let result = if progress {
        let (label, update) = progress_label();
        let updater = updater.with_progress(update);
        with_spinner(label, updater.update_async(&settings.root, name, opts))??
    } else {
        updater
            .with_progress(progress_printer())
            .update(&settings.root, name, opts)?
    };
    Ok(result)
}

fn cmd_update(settings: &Settings, args: UpdateArgs) -> anyhow::Result<()> {
    let opts = update_options(settings, &args)?;
    let names: Vec<String> = match &args.name {
        Some(name) => vec![name.clone()],
        None => list_variants(&settings.root).into_iter().map(|v| v.name).collect(),
    };
    if names.is_empty() {
        println!("No variants found in {}", settings.root.display());
        return Ok(());
    }

    let mut failed = Vec::new();
    for name in &names {
        println!("{}", format!("Updating variant {}...", name).cyan().bold());
        match update_one(settings, name, &opts, args.shared.progress) {
            Ok(result) => print_result("Updated", &result),
            Err(e) if names.len() > 1 => {
                eprintln!("{} {}: {:#}", "Failed".red().bold(), name, e);
                failed.push(name.clone());
            }
            Err(e) => return Err(e),
        }
    }

    if !failed.is_empty() {
        bail!("{} of {} variants failed to update: {}", failed.len(), names.len(), failed.join(", "));
    }
    Ok(())
}

fn cmd_list(root: &Path) {
    let variants = list_variants(root);
    if variants.is_empty() {
        println!("No variants found in {}", root.display());
        return;
    }

    println!("{}", format!("Variants in {}", root.display()).cyan().bold());
    for entry in variants {
        let meta = &entry.meta;
        let team = if meta.team_mode_enabled == Some(true) {
            " [team]".green().to_string()
        } else {
            String::new()
        };
        println!("   {} ({}){}", entry.name.bold(), meta.provider, team);
        println!("      {}", meta.binary_path.display().to_string().dimmed());
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let settings = Settings::resolve(&cli);

    match cli.command {
        Command::Create(args) => cmd_create(&settings, args),
        Command::Update(args) => cmd_update(&settings, args),
        Command::List => {
            cmd_list(&settings.root);
            Ok(())
        }
        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "cc-mirror", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_forces_inherited_theming_output() {
        assert_eq!(theming_stdio(None, None, false), CommandStdio::Pipe);
        assert_eq!(theming_stdio(None, Some(CommandStdio::Inherit), false), CommandStdio::Inherit);
        assert_eq!(
            theming_stdio(Some(CommandStdio::Pipe), Some(CommandStdio::Inherit), false),
            CommandStdio::Pipe
        );
        assert_eq!(theming_stdio(Some(CommandStdio::Pipe), None, true), CommandStdio::Inherit);
    }

    #[test]
    fn test_verbose_flag_is_global() {
        let cli = Cli::try_parse_from(["cc-mirror", "update", "alpha", "--verbose", "--root", "/tmp/x"]).unwrap();
        assert!(cli.verbose);
        let settings = Settings::resolve(&cli);
        assert_eq!(settings.stdio(Some(CommandStdio::Pipe)), CommandStdio::Inherit);
    }
}
