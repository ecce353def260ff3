//! Content classification for reassembled payloads.
//!
//! [`classify`] routes a payload by its declared MIME type:
//!
//! | MIME                          | Kind                    | View                            |
//! |-------------------------------|-------------------------|---------------------------------|
//! | `image/*`                     | [`ContentKind::Image`]  | [`DisplayHandle`]               |
//! | `text/*`, `application/json`  | [`ContentKind::Text`]   | text or [`EmbeddedDocument`]    |
//! | `video/*`                     | [`ContentKind::Video`]  | [`DisplayHandle`]               |
//! | anything else                 | [`ContentKind::Binary`] | raw bytes                       |
//!
//! Text payloads that look like structured bundles go through the
//! [`EmbeddedDocument`] fallback chain first. When every step fails the payload
//! is surfaced as raw bytes together with a [`BundleNotice::Skipped`], unless
//! it is valid JSON of another shape, which stays readable as text.

mod bundle;
mod classify;
mod handle;
mod kind;
mod options;

pub use bundle::{BundleError, BundleNotice, BundleStep, EmbeddedDocument};
pub use classify::{Classified, ContentView, classify, classify_record};
pub use handle::DisplayHandle;
pub use kind::ContentKind;
pub use options::{ClassifyOptions, ViewerConfig};
