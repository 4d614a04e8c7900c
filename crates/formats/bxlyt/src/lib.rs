//! Reader/writer for the `FLYT`/`CLYT`/`RLYT` UI layout and
//! `FLAN`/`CLAN`/`RLAN` animation binary containers.
//!
//! Three-layer architecture:
//! - **Layer 1** (`cursor`/`section`): endian-aware byte I/O, the
//!   `{tag, size}` section envelope, relative-offset back-patching
//! - **Layer 2** (`pane`/`group`/`material`/`anim`/...): typed codecs for
//!   individual section payloads across the three platform dialects
//! - **Layer 3** (`document`): whole-container decode/encode with pane and
//!   group tree assembly and verbatim passthrough of unknown sections
//!
//! Decoding then encoding a well-formed container reproduces it
//! byte-identically, including sections this crate does not understand.

pub mod anim;
pub mod color;
pub mod control;
pub mod cursor;
pub mod document;
pub mod error;
pub mod group;
pub mod header;
pub mod layout;
pub mod material;
pub mod pane;
pub mod section;
pub mod strings;
pub mod tree;
pub mod userdata;

pub use color::{Color, Color16};
pub use document::{AnimDocument, CaptureTextureLayer, LayoutDocument};
pub use error::{Error, Result};
pub use header::{Family, Header, Variant, Version};
pub use material::{Diagnostic, Material, MaterialTable};
pub use pane::{Pane, PaneKind};
pub use section::{SectionTag, UnsupportedSection};
