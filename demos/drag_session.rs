//! Session demo - drives the async editor: drag the text block, then export

use quotecard::{Editor, ExportFormat, ExportRequest, PointerInput};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let editor = Editor::open(None)?;
    editor
        .set_text("Wherever you go, there you are.")
        .await?;

    // drag the block from the center toward the lower third
    editor
        .pointer_pressed(PointerInput::mouse(540.0, 540.0))
        .await?;
    for step in 1..=10 {
        let y = 540.0 + step as f32 * 20.0;
        if let Some(pos) = editor.pointer_moved(PointerInput::mouse(540.0, y)).await? {
            println!("position: ({:.1}%, {:.1}%)", pos.x(), pos.y());
        }
    }
    let final_pos = editor.pointer_released().await?;
    println!("final: {:?}", final_pos);

    let request = ExportRequest {
        format: ExportFormat::Jpeg,
        quality_percent: 90,
        filename: "dragged-quote".into(),
    };
    let path = editor.export_to_file(request, ".".into()).await?;
    println!("wrote {}", path.display());

    editor.close().await?;
    Ok(())
}
