use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;

use tokio::sync::oneshot;

use crate::drag::{ContainerSize, DragController, PointerInput};
use crate::export::ExportRequest;
use crate::rendering::{CardRenderer, RenderedCard};
use crate::theme::{Position, Theme, ThemePatch, ThemePreset};
use crate::{clipboard, export, Error, Result};

enum Command {
    SetText(String, oneshot::Sender<()>),
    ApplyPatch(ThemePatch, oneshot::Sender<Theme>),
    ApplyPreset(Box<ThemePreset>, oneshot::Sender<Theme>),
    Snapshot(oneshot::Sender<(Theme, String)>),

    // Drag gesture
    PointerPressed(PointerInput, oneshot::Sender<()>),
    PointerMoved(PointerInput, oneshot::Sender<Option<Position>>),
    PointerReleased(oneshot::Sender<Option<Position>>),

    // Rendering and delivery
    Render(oneshot::Sender<Result<RenderedCard>>),
    ExportToFile(ExportRequest, PathBuf, oneshot::Sender<Result<PathBuf>>),
    CopyToClipboard(oneshot::Sender<bool>),

    Close(oneshot::Sender<()>),
}

/// An async-friendly editor session backed by a dedicated worker thread.
///
/// The worker owns the live theme, the quote text and a `CardRenderer`, and
/// executes commands strictly in send order. That ordering is what callers
/// rely on: a render or export issued after a committed position update
/// always observes that update, and every render operates on the snapshot
/// taken when its command runs, never on state that mutates mid-render.
#[derive(Clone)]
pub struct Editor {
    cmd_tx: Sender<Command>,
}

struct SessionState {
    theme: Theme,
    text: String,
    renderer: CardRenderer,
    drag: Option<DragController>,
}

impl SessionState {
    fn commit_position(&mut self, position: Position) {
        self.theme = self.theme.apply(&ThemePatch {
            position: Some(position),
            ..Default::default()
        });
    }

    fn run(mut self, cmd_rx: mpsc::Receiver<Command>) {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                Command::SetText(text, resp) => {
                    self.text = text;
                    let _ = resp.send(());
                }
                Command::ApplyPatch(patch, resp) => {
                    self.theme = self.theme.apply(&patch);
                    let _ = resp.send(self.theme.clone());
                }
                Command::ApplyPreset(preset, resp) => {
                    // presets replace the model wholesale
                    self.theme = preset.theme;
                    let _ = resp.send(self.theme.clone());
                }
                Command::Snapshot(resp) => {
                    let _ = resp.send((self.theme.clone(), self.text.clone()));
                }
                Command::PointerPressed(input, resp) => {
                    let container = ContainerSize::new(
                        self.theme.canvas_width_px as f32,
                        self.theme.canvas_height_px as f32,
                    );
                    let mut drag = DragController::new(container, self.theme.position);
                    drag.press(input);
                    self.drag = Some(drag);
                    let _ = resp.send(());
                }
                Command::PointerMoved(input, resp) => {
                    let moved = self.drag.as_mut().and_then(|drag| drag.motion(input));
                    if let Some(position) = moved {
                        self.commit_position(position);
                    }
                    let _ = resp.send(moved);
                }
                Command::PointerReleased(resp) => {
                    let finished = self.drag.as_mut().and_then(|drag| drag.release());
                    if let Some(position) = finished {
                        // the final update is always committed, even when
                        // intermediate moves were coalesced upstream
                        self.commit_position(position);
                    }
                    self.drag = None;
                    let _ = resp.send(finished);
                }
                Command::Render(resp) => {
                    let _ = resp.send(self.renderer.render(&self.theme, &self.text));
                }
                Command::ExportToFile(request, dir, resp) => {
                    let result = self
                        .renderer
                        .render(&self.theme, &self.text)
                        .and_then(|card| export::export_to_file(&card, &request, &dir));
                    let _ = resp.send(result);
                }
                Command::CopyToClipboard(resp) => {
                    let ok = match self.renderer.render(&self.theme, &self.text) {
                        Ok(card) => clipboard::copy_to_clipboard(&card),
                        Err(e) => {
                            log::warn!("render for clipboard failed: {}", e);
                            false
                        }
                    };
                    let _ = resp.send(ok);
                }
                Command::Close(resp) => {
                    let _ = resp.send(());
                    break;
                }
            }
        }
    }
}

impl Editor {
    /// Open a session with the default theme, or with a previously persisted
    /// snapshot. Snapshots cross a trust boundary and are validated; a bad
    /// one is rejected here instead of failing at render time.
    pub fn open(snapshot: Option<Theme>) -> Result<Self> {
        let theme = match snapshot {
            Some(theme) => {
                theme.validate()?;
                theme
            }
            None => Theme::default(),
        };

        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        thread::spawn(move || {
            let state = SessionState {
                theme,
                text: String::new(),
                renderer: CardRenderer::new(),
                drag: None,
            };
            state.run(cmd_rx);
        });

        Ok(Self { cmd_tx })
    }

    async fn request<T>(
        &self,
        cmd: Command,
        rx: oneshot::Receiver<T>,
        what: &str,
    ) -> Result<T> {
        let _ = self.cmd_tx.send(cmd);
        rx.await
            .map_err(|e| Error::Session(format!("{} canceled: {}", what, e)))
    }

    /// Replace the quote text
    pub async fn set_text(&self, text: &str) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::SetText(text.to_string(), tx), rx, "SetText")
            .await
    }

    /// Apply a partial update; returns the resulting theme
    pub async fn apply_patch(&self, patch: ThemePatch) -> Result<Theme> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::ApplyPatch(patch, tx), rx, "ApplyPatch")
            .await
    }

    /// Replace the whole theme with a preset
    pub async fn apply_preset(&self, preset: ThemePreset) -> Result<Theme> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::ApplyPreset(Box::new(preset), tx), rx, "ApplyPreset")
            .await
    }

    /// Current theme and text, as an immutable snapshot
    pub async fn snapshot(&self) -> Result<(Theme, String)> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::Snapshot(tx), rx, "Snapshot").await
    }

    /// Begin a drag gesture at the given pointer location
    pub async fn pointer_pressed(&self, input: PointerInput) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::PointerPressed(input, tx), rx, "PointerPressed")
            .await
    }

    /// Continue a drag gesture; returns the committed position, or `None`
    /// when no drag is active
    pub async fn pointer_moved(&self, input: PointerInput) -> Result<Option<Position>> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::PointerMoved(input, tx), rx, "PointerMoved")
            .await
    }

    /// End the drag gesture; returns the final committed position
    pub async fn pointer_released(&self) -> Result<Option<Position>> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::PointerReleased(tx), rx, "PointerReleased")
            .await
    }

    /// Render the current snapshot into a supersampled bitmap
    pub async fn render(&self) -> Result<RenderedCard> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::Render(tx), rx, "Render").await?
    }

    /// Render and deliver `{filename}.{format}` inside `dir`
    pub async fn export_to_file(&self, request: ExportRequest, dir: PathBuf) -> Result<PathBuf> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::ExportToFile(request, dir, tx), rx, "ExportToFile")
            .await?
    }

    /// Render and write the result to the system clipboard. Best-effort:
    /// failures come back as `false`, never as an error.
    pub async fn copy_to_clipboard(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::CopyToClipboard(tx), rx, "CopyToClipboard")
            .await
    }

    /// Shut down the worker thread
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(Command::Close(tx), rx, "Close").await
    }
}
