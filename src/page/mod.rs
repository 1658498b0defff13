// src/page/mod.rs
// =============================================================================
// Everything we do with the bytes of one fetched page.
//
// Submodules:
// - text: visible text extraction (drops scripts, navigation, forms...)
// - quality: the content quality gate
// - links: outbound link extraction and resolution
//
// All three are stateless functions of their input, safe to call from any
// number of worker threads at once.
// =============================================================================

mod links;
mod quality;
mod text;

pub use links::extract_links;
pub use quality::{Assessment, GateRejection, QualityGate};
pub use text::{visible_text, visible_text_from_bytes};
