use std::io::Read as _;
use std::path::PathBuf;

use clap::Parser;

use quotecard::{
    export, find_preset, CardRenderer, ExportFormat, ExportRequest, Theme, ThemePatch,
    CANVAS_PRESETS,
};

/// Render a quote card from the command line.
///
/// The theme can come from a persisted snapshot (JSON), a built-in preset,
/// or the defaults; individual size overrides apply on top.
#[derive(Parser, Debug)]
#[command(name = "quotecard", version, about = "Compose and export a quote card")]
struct Args {
    /// Quote text; read from stdin when omitted
    #[arg(long)]
    text: Option<String>,

    /// Path to a theme snapshot (JSON)
    #[arg(long, conflicts_with = "preset")]
    theme: Option<PathBuf>,

    /// Built-in theme preset id: clean, dark, colorful or professional
    #[arg(long)]
    preset: Option<String>,

    /// Canvas size preset, e.g. "Instagram Post" or "Twitter Post"
    #[arg(long)]
    size: Option<String>,

    /// Output format: png or jpeg
    #[arg(long, default_value = "png")]
    format: String,

    /// JPEG quality percent (1-100); ignored for png
    #[arg(long, default_value_t = 92)]
    quality: u8,

    /// Output file name without extension
    #[arg(long, default_value = "quote-image")]
    filename: String,

    /// Directory the image is written into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also copy the rendered card to the system clipboard
    #[arg(long)]
    clipboard: bool,
}

/// Strip characters that are unsafe in file names. The engine itself uses
/// the name verbatim; this boundary is where user input gets cleaned.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "quote-image".to_string()
    } else {
        trimmed.to_string()
    }
}

fn load_theme(args: &Args) -> Result<Theme, Box<dyn std::error::Error>> {
    let mut theme = if let Some(path) = &args.theme {
        let data = std::fs::read_to_string(path)?;
        let snapshot: Theme = serde_json::from_str(&data)?;
        snapshot.validate()?;
        snapshot
    } else if let Some(id) = &args.preset {
        find_preset(id)
            .ok_or_else(|| format!("unknown preset '{}'", id))?
            .theme
    } else {
        Theme::default()
    };

    if let Some(size) = &args.size {
        let preset = CANVAS_PRESETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(size))
            .ok_or_else(|| format!("unknown size preset '{}'", size))?;
        theme = theme.apply(&ThemePatch {
            canvas_width_px: Some(preset.width),
            canvas_height_px: Some(preset.height),
            ..Default::default()
        });
    }

    Ok(theme)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let text = match &args.text {
        Some(text) => text.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf.trim().to_string()
        }
    };
    if text.is_empty() {
        return Err("no quote text given (use --text or pipe via stdin)".into());
    }

    let theme = load_theme(&args)?;
    let format: ExportFormat = args.format.parse()?;
    let request = ExportRequest {
        format,
        quality_percent: args.quality.clamp(1, 100),
        filename: sanitize_filename(&args.filename),
    };

    let mut renderer = CardRenderer::new();
    let card = renderer.render(&theme, &text)?;
    let path = export::export_to_file(&card, &request, &args.out_dir)?;
    println!(
        "wrote {} ({}x{} px)",
        path.display(),
        card.width(),
        card.height()
    );

    if args.clipboard {
        if quotecard::copy_to_clipboard(&card) {
            println!("copied to clipboard");
        } else {
            eprintln!("clipboard copy failed; file export is unaffected");
        }
    }

    Ok(())
}
