use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use bxlyt::{AnimDocument, LayoutDocument};

#[derive(Parser)]
#[command(name = "bxlyt", about = "Convert layout/animation binary containers to and from JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print header and content summary of a container.
    Info {
        /// Path to a layout or animation container.
        file: PathBuf,
    },
    /// Decode a container to JSON (written next to the input).
    Decode {
        /// Path to a layout or animation container.
        file: PathBuf,
        /// Output path; defaults to `<file>.json`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Encode a JSON document back to its binary container.
    Encode {
        /// Path to a `.json` file produced by `decode`.
        file: PathBuf,
        /// Output path; defaults to the input with `.json` stripped.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Info { file } => info(&file),
        Command::Decode { file, output } => decode(&file, output),
        Command::Encode { file, output } => encode(&file, output),
    }
}

fn info(path: &Path) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    if LayoutDocument::sniff(&data) {
        let doc = LayoutDocument::decode(&data)?;
        println!("layout container ({:?})", doc.header.variant);
        println!(
            "  version {}.{}.{}",
            doc.header.version.major, doc.header.version.minor, doc.header.version.micro
        );
        println!("  panes: {}", doc.panes().count());
        println!("  materials: {}", doc.materials.len());
        println!("  textures: {}", doc.texture_list.len());
        println!("  fonts: {}", doc.font_list.len());
        println!("  unsupported sections: {}", doc.unsupported.len());
        for diagnostic in &doc.diagnostics {
            println!("  warning: {diagnostic:?}");
        }
    } else if AnimDocument::sniff(&data) {
        let doc = AnimDocument::decode(&data)?;
        println!("animation container ({:?})", doc.header.variant);
        println!(
            "  version {}.{}.{}",
            doc.header.version.major, doc.header.version.minor, doc.header.version.micro
        );
        if let Some(tag) = &doc.tag_info {
            println!("  animation: {} ({}..{})", tag.name, tag.start_frame, tag.end_frame);
        }
        if let Some(anim) = &doc.animation {
            println!("  frame size: {}", anim.frame_size);
            println!("  groups: {}", anim.groups.len());
        }
        println!("  unsupported sections: {}", doc.unsupported.len());
    } else {
        bail!("{}: not a recognized container", path.display());
    }
    Ok(())
}

fn decode(path: &Path, output: Option<PathBuf>) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let json = if LayoutDocument::sniff(&data) {
        serde_json::to_string_pretty(&LayoutDocument::decode(&data)?)?
    } else if AnimDocument::sniff(&data) {
        serde_json::to_string_pretty(&AnimDocument::decode(&data)?)?
    } else {
        bail!("{}: not a recognized container", path.display());
    };

    let output = output.unwrap_or_else(|| {
        let mut out = path.as_os_str().to_owned();
        out.push(".json");
        PathBuf::from(out)
    });
    fs::write(&output, json).with_context(|| format!("writing {}", output.display()))?;
    println!("wrote {}", output.display());
    Ok(())
}

fn encode(path: &Path, output: Option<PathBuf>) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    // `foo.bflyt.json` keeps the original name in its stem; use it to pick
    // the family, falling back to trying both shapes.
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let bytes = if stem.ends_with("lyt") {
        serde_json::from_str::<LayoutDocument>(&text)?.encode()?
    } else if stem.ends_with("lan") {
        serde_json::from_str::<AnimDocument>(&text)?.encode()?
    } else if let Ok(doc) = serde_json::from_str::<LayoutDocument>(&text) {
        doc.encode()?
    } else {
        serde_json::from_str::<AnimDocument>(&text)
            .context("not a layout or animation JSON document")?
            .encode()?
    };

    let output = output.unwrap_or_else(|| {
        if path.extension().is_some_and(|ext| ext == "json") {
            path.with_extension("")
        } else {
            path.with_extension("bin")
        }
    });
    fs::write(&output, bytes).with_context(|| format!("writing {}", output.display()))?;
    println!("wrote {}", output.display());
    Ok(())
}
