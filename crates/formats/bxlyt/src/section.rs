//! Section envelope framing.
//!
//! Every payload in the container sits inside a `{4-byte tag, 4-byte size}`
//! envelope, where the size includes the 8-byte envelope itself. The reader
//! trusts the declared size: whatever a payload decoder actually consumed,
//! the cursor is re-seated at `start + size` before the next section.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cursor::{Reader, Writer};
use crate::error::Result;

/// A 4-byte ASCII section or container tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionTag(pub [u8; 4]);

impl SectionTag {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectionTag({})", self.as_str())
    }
}

impl Serialize for SectionTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match std::str::from_utf8(&self.0) {
            Ok(s) => serializer.serialize_str(s),
            Err(_) => self.0.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SectionTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error as _;
        let s = String::deserialize(deserializer)?;
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| D::Error::custom("section tag must be exactly 4 bytes"))?;
        Ok(SectionTag(bytes))
    }
}

/// Section tags of the layout family.
pub mod tags {
    use super::SectionTag;

    pub const LYT1: SectionTag = SectionTag(*b"lyt1");
    pub const TXL1: SectionTag = SectionTag(*b"txl1");
    pub const FNL1: SectionTag = SectionTag(*b"fnl1");
    pub const MAT1: SectionTag = SectionTag(*b"mat1");
    pub const USD1: SectionTag = SectionTag(*b"usd1");
    pub const CNT1: SectionTag = SectionTag(*b"cnt1");
    pub const CTL1: SectionTag = SectionTag(*b"ctl1");

    pub const PAN1: SectionTag = SectionTag(*b"pan1");
    pub const PIC1: SectionTag = SectionTag(*b"pic1");
    pub const TXT1: SectionTag = SectionTag(*b"txt1");
    pub const WND1: SectionTag = SectionTag(*b"wnd1");
    pub const PRT1: SectionTag = SectionTag(*b"prt1");
    pub const BND1: SectionTag = SectionTag(*b"bnd1");
    pub const SCR1: SectionTag = SectionTag(*b"scr1");
    pub const ALI1: SectionTag = SectionTag(*b"ali1");
    pub const PAS1: SectionTag = SectionTag(*b"pas1");
    pub const PAE1: SectionTag = SectionTag(*b"pae1");

    pub const GRP1: SectionTag = SectionTag(*b"grp1");
    pub const GRS1: SectionTag = SectionTag(*b"grs1");
    pub const GRE1: SectionTag = SectionTag(*b"gre1");

    pub const PAT1: SectionTag = SectionTag(*b"pat1");
    pub const PAI1: SectionTag = SectionTag(*b"pai1");
}

/// A well-framed section whose tag no decoder recognizes. The payload is
/// kept verbatim and re-emitted on encode, so files produced by newer tools
/// survive a round trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupportedSection {
    pub tag: SectionTag,
    pub data: Vec<u8>,
}

/// Iterate exactly `count` sections, handing each payload to `handle`.
///
/// `handle` is called with the cursor just past the envelope, the tag, and
/// the declared total size. Whatever it consumes, the cursor is re-seated at
/// the declared end before the next iteration.
pub fn read_sections<F>(r: &mut Reader<'_>, count: u16, mut handle: F) -> Result<()>
where
    F: FnMut(&mut Reader<'_>, SectionTag, u32) -> Result<()>,
{
    for _ in 0..count {
        let start = r.position();
        let tag = r.read_tag()?;
        let size = r.read_u32()?;
        // a declared size smaller than the envelope is corrupt framing
        if size < 8 {
            return Err(crate::error::Error::UnexpectedEof {
                offset: start,
                need: 8,
                have: size as usize,
            });
        }
        handle(r, tag, size)?;
        r.seek(start + size as usize)?;
    }
    Ok(())
}

/// Write one section: tag, placeholder size, payload, 4-byte alignment,
/// then back-patch the real size and bump the running section counter.
pub fn write_section<F>(w: &mut Writer, tag: SectionTag, count: &mut u16, payload: F) -> Result<()>
where
    F: FnOnce(&mut Writer) -> Result<()>,
{
    let start = w.position();
    w.write_tag(tag);
    let size_slot = w.reserve_u32();

    payload(w)?;

    w.align(4);
    w.patch_u32(size_slot, (w.position() - start) as u32);
    *count += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    #[test]
    fn size_is_backpatched_and_aligned() {
        let mut w = Writer::new(Endian::Big);
        let mut count = 0u16;
        write_section(&mut w, tags::LYT1, &mut count, |w| {
            w.write_u8(1);
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 1);

        let bytes = w.into_bytes();
        // 8-byte envelope + 1 payload byte padded to 4
        assert_eq!(bytes.len(), 12);
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_tag().unwrap(), tags::LYT1);
        assert_eq!(r.read_u32().unwrap(), 12);
    }

    #[test]
    fn declared_size_wins_over_consumption() {
        let mut w = Writer::new(Endian::Big);
        let mut count = 0u16;
        // A section whose payload the handler will not fully consume.
        write_section(&mut w, SectionTag(*b"zzzz"), &mut count, |w| {
            w.write_bytes(&[1, 2, 3, 4, 5, 6, 7, 8]);
            Ok(())
        })
        .unwrap();
        write_section(&mut w, tags::LYT1, &mut count, |_| Ok(())).unwrap();

        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let mut seen = Vec::new();
        read_sections(&mut r, 2, |r, tag, _size| {
            seen.push(tag);
            if tag == SectionTag(*b"zzzz") {
                // consume a single byte only
                r.read_u8()?;
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, [SectionTag(*b"zzzz"), tags::LYT1]);
        assert_eq!(r.position(), bytes.len());
    }
}
