//! Export demo - renders a quote card with each built-in preset

use quotecard::{builtin_presets, export, CardRenderer, ExportFormat, ExportRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Quotecard Engine - Export Demo\n");

    let quote = "Simplicity is the ultimate sophistication.";
    let mut renderer = CardRenderer::new();

    for preset in builtin_presets() {
        println!("Rendering preset: {}", preset.name);

        let card = renderer.render(&preset.theme, quote)?;
        let request = ExportRequest {
            format: ExportFormat::Png,
            quality_percent: 92,
            filename: format!("quote-{}", preset.id),
        };
        let path = export::export_to_file(&card, &request, std::path::Path::new("."))?;
        println!(
            "  wrote {} ({}x{} px)\n",
            path.display(),
            card.width(),
            card.height()
        );
    }

    println!("Done!");
    Ok(())
}
