use crate::section::SectionTag;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unrecognized magic {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("expected a {expected} container, found a {found} container")]
    WrongFamily {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("invalid tag at offset {offset:#x}: expected {expected}, found {found}")]
    UnexpectedTag {
        offset: usize,
        expected: SectionTag,
        found: SectionTag,
    },

    #[error("string at offset {offset:#x} is not valid UTF-8")]
    InvalidString { offset: usize },

    #[error("string {value:?} is {len} bytes, larger than its {width}-byte slot")]
    StringTooLong {
        value: String,
        len: usize,
        width: usize,
    },

    #[error("tree start marker with no preceding node")]
    DanglingStartMarker,

    #[error("tree end marker with no open parent")]
    DanglingEndMarker,

    #[error("section stream assembled {found} roots, expected exactly one")]
    BadRootCount { found: usize },

    #[error("embedded pane section has non-pane tag {tag}")]
    NotAPane { tag: SectionTag },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
