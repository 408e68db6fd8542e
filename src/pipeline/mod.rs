//! Pipeline stages for PDF-to-PPTX conversion.
//!
//! Each submodule implements one step; the assembler strings them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ geometry ──▶ encode ──▶ pptx
//! (path)    (pdfium)   (fit+centre)  (PNG)     (slide + package)
//! ```
//!
//! 1. [`input`]    — read a local path into validated PDF bytes
//! 2. [`render`]   — measure and rasterise pages behind the [`render::PageSource`] trait
//! 3. [`encode`]   — PNG-encode each raster for `ppt/media/`
//! 4. [`assemble`] — the sequential per-page loop and its state machine

pub mod assemble;
pub mod encode;
pub mod input;
pub mod render;
