//! Text preview rendering: line model, viewport virtualization, partial
//! previews and the renderer that ties them to a content source.

mod error;
mod kind;
mod lines;
mod policy;
mod renderer;
mod surface;
mod viewport;

pub use error::PreviewError;
pub use kind::{PreviewKind, detect_language};
pub use lines::LineModel;
pub use policy::{PartialPreviewPolicy, format_file_size, group_thousands};
pub use renderer::{FetchedContent, RenderOptions, RenderOutcome, RenderTicket, TextRenderer};
pub use surface::{PreviewSurface, StandardView, SurfaceContent, SurfaceState, VirtualView};
pub use viewport::{FrameThrottle, RenderMode, ViewportPolicy, VirtualWindow};

pub use folio_fetch::{FetchError, FetchErrorKind, FetchMode, FileId};
pub use folio_search::{MatchCursor, SearchMatch};
