//! Image intake: the ordered collection of user-selected files and their
//! preview lifecycle, plus on-demand encoding for submission.

mod media;
mod tray;

pub use media::MediaKind;
pub use tray::{EncodedImage, ImageEntry, ImageTray, PreviewHandle};
