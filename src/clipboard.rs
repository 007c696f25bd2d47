//! Best-effort delivery of a rendered card to the platform image clipboard.
//!
//! Clipboard access can fail for reasons the editor cannot fix (permission
//! denial, headless session, unsupported platform), so the public API
//! reports a boolean instead of an error and never disturbs editing state.
//! The file exporter stays fully available when the clipboard is not.

use crate::rendering::RenderedCard;

/// Write the card into the system clipboard's image slot.
///
/// Returns `true` on success. Failures are logged and reported as `false`.
pub fn copy_to_clipboard(card: &RenderedCard) -> bool {
    match write_image(card) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{}", e);
            false
        }
    }
}

#[cfg(all(
    feature = "clipboard",
    any(
        target_os = "windows",
        target_os = "macos",
        target_os = "linux",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    )
))]
fn write_image(card: &RenderedCard) -> crate::Result<()> {
    use std::borrow::Cow;

    use crate::error::Error;

    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    let image = arboard::ImageData {
        width: card.width() as usize,
        height: card.height() as usize,
        bytes: Cow::Borrowed(card.pixels().as_raw()),
    };
    clipboard
        .set_image(image)
        .map_err(|e| Error::Clipboard(e.to_string()))
}

#[cfg(not(all(
    feature = "clipboard",
    any(
        target_os = "windows",
        target_os = "macos",
        target_os = "linux",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    )
)))]
fn write_image(_card: &RenderedCard) -> crate::Result<()> {
    Err(crate::Error::Clipboard(
        "clipboard support not compiled into this build".into(),
    ))
}
