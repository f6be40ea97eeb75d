use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dts_patcher::{probe_block_devices, DtsEditor, Patch};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dts-patcher")]
#[command(about = "Surgical device-tree-source patching", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply path/value patches to a dts file
    Apply {
        /// Input dts file
        input: PathBuf,

        /// Output path (defaults to <input>.out)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Inline patch as PATH=VALUE (repeatable); the value is inserted
        /// verbatim, so quote strings: --set '/k="v"'
        #[arg(long = "set", value_name = "PATH=VALUE")]
        set: Vec<String>,

        /// JSON file with a list of {"path": ..., "value": ...} patches
        #[arg(short, long)]
        patches: Option<PathBuf>,

        /// Dry run - render without writing the output file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Derive patches from sysfs block devices, then apply them
    Probe {
        /// Input dts file
        input: PathBuf,

        /// Output path (defaults to <input>.out)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Block-device directory to scan
        #[arg(long, default_value = "/sys/block")]
        sys_block: PathBuf,

        /// Dry run - render without writing the output file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// List every indexed path and its key-token index
    Paths {
        /// Input dts file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            input,
            output,
            set,
            patches,
            dry_run,
            diff,
        } => {
            let mut all = Vec::new();
            if let Some(path) = patches {
                all.extend(load_patch_file(&path)?);
            }
            for pair in &set {
                all.push(parse_set_pair(pair)?);
            }
            cmd_apply(&input, output, &all, dry_run, diff)
        }

        Commands::Probe {
            input,
            output,
            sys_block,
            dry_run,
            diff,
        } => {
            let report = probe_block_devices(&sys_block)
                .with_context(|| format!("probing {}", sys_block.display()))?;
            for note in &report.skipped {
                eprintln!("{} {}", "skip".yellow(), note);
            }
            cmd_apply(&input, output, &report.patches, dry_run, diff)
        }

        Commands::Paths { input } => cmd_paths(&input),
    }
}

fn cmd_apply(
    input: &Path,
    output: Option<PathBuf>,
    patches: &[Patch],
    dry_run: bool,
    diff: bool,
) -> Result<()> {
    let original = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let mut editor = DtsEditor::parse(&original)
        .with_context(|| format!("parsing {}", input.display()))?;

    let mut applied = 0usize;
    let mut failed = 0usize;
    for (path, outcome) in editor.apply(patches) {
        match outcome {
            Ok(()) => {
                applied += 1;
                println!("{} {}", "[ok]".green(), path);
            }
            Err(err) => {
                failed += 1;
                eprintln!("{} {}", "[err]".red(), err);
            }
        }
    }

    let rendered = editor.render().context("rendering patched document")?;

    if diff {
        print_diff(&original, &rendered);
    }

    if dry_run {
        println!("{} dry run, not writing output", "note".yellow());
    } else if failed > 0 && applied == 0 {
        // A batch where nothing applied leaves no output behind.
        eprintln!("{} no patches applied, not writing output", "note".yellow());
    } else {
        let out_path = output.unwrap_or_else(|| default_output(input));
        atomic_write(&out_path, rendered.as_bytes())
            .with_context(|| format!("writing {}", out_path.display()))?;
        println!("wrote {}", out_path.display());
    }

    if failed > 0 {
        bail!("{failed} patch(es) failed");
    }
    Ok(())
}

fn cmd_paths(input: &Path) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let editor = DtsEditor::parse(&content)
        .with_context(|| format!("parsing {}", input.display()))?;

    for (path, index) in editor.paths().sorted() {
        println!("{index:>6}  {path}");
    }
    Ok(())
}

fn load_patch_file(path: &Path) -> Result<Vec<Patch>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading patch file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing patch file {}", path.display()))
}

fn parse_set_pair(pair: &str) -> Result<Patch> {
    match pair.split_once('=') {
        Some((path, value)) if !path.is_empty() => Ok(Patch::new(path, value)),
        _ => bail!("invalid --set argument (expected PATH=VALUE): {pair}"),
    }
}

fn default_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".out");
    PathBuf::from(name)
}

fn print_diff(original: &str, rendered: &str) {
    let diff = TextDiff::from_lines(original, rendered);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => print!("{}{}", "-".red(), change.to_string().red()),
            ChangeTag::Insert => print!("{}{}", "+".green(), change.to_string().green()),
            ChangeTag::Equal => print!(" {change}"),
        }
    }
}

/// Atomic file write: tempfile + fsync + rename, so a crash never leaves a
/// half-written document behind.
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
