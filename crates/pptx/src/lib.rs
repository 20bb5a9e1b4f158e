//! PPTX (Office Open XML) backend for template-preserving translation.
//!
//! A .pptx file is a ZIP archive of XML parts. The package is loaded whole,
//! text containers are located and their formatting captured, and translated
//! text is written back with the same formatting before the archive is saved.

pub mod container;
pub mod dom;
pub mod extract;
pub mod locate;
pub mod package;
pub mod pipeline;
pub mod reconstruct;
pub mod slide;

#[cfg(test)]
mod fixtures;

pub use container::{Capabilities, ContainerKind, TextContainer, TextContainerMut};
pub use extract::extract_template;
pub use locate::{locate_units, LocateOutcome};
pub use package::PptxPackage;
pub use pipeline::{
    inspect_presentation, translate_package, translate_presentation, SlideUnits,
    TranslateOutcome,
};
pub use reconstruct::reconstruct;
pub use slide::Slide;
