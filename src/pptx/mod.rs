//! Minimal PresentationML writer.
//!
//! Only what a picture-per-slide deck needs: one master, one blank layout,
//! one theme, and N slides that each hold a single `p:pic`.
//!
//! ```text
//! Presentation ──SlideBuilder──▶ Vec<Slide> ──package──▶ .pptx bytes
//! ```

mod package;
mod parts;
pub mod presentation;
pub mod slide;

pub use package::write_package;
pub use presentation::{CoreProperties, Presentation};
pub use slide::{EmbeddedImage, PictureFrame, Slide, SlideBuilder};
