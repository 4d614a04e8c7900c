//! Container header: magic, byte-order mark, version, platform variant.
//!
//! Two header layouts exist. The Rev family keeps the original 16-byte
//! header with a decimal-packed u16 version; the Cafe/Ctr families use a
//! 20-byte header with the version packed into a u32. One little-endian Rev
//! title stores every tag byte-reversed, which is detected from the magic
//! and carried through the whole file.

use serde::{Deserialize, Serialize};

use crate::cursor::{Endian, Reader, Writer};
use crate::error::{Error, Result};

pub const BOM_BIG: u16 = 0xFEFF;
pub const BOM_LITTLE: u16 = 0xFFFE;

/// Platform dialect, derived from the magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Wii U / Switch dialect (`FLYT` / `FLAN`).
    Cafe,
    /// 3DS dialect (`CLYT` / `CLAN`).
    Ctr,
    /// Wii dialect (`RLYT` / `RLAN`).
    Rev,
}

/// Which of the two container families a magic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Layout,
    Animation,
}

fn classify(magic: [u8; 4]) -> Option<(Variant, Family, bool)> {
    match &magic {
        b"FLYT" => Some((Variant::Cafe, Family::Layout, false)),
        b"CLYT" => Some((Variant::Ctr, Family::Layout, false)),
        b"RLYT" => Some((Variant::Rev, Family::Layout, false)),
        b"TYLR" => Some((Variant::Rev, Family::Layout, true)),
        b"FLAN" => Some((Variant::Cafe, Family::Animation, false)),
        b"CLAN" => Some((Variant::Ctr, Family::Animation, false)),
        b"RLAN" => Some((Variant::Rev, Family::Animation, false)),
        b"NALR" => Some((Variant::Rev, Family::Animation, true)),
        _ => None,
    }
}

/// Classify a byte source by peeking at its 4-byte magic, without
/// consuming anything.
pub fn sniff(data: &[u8]) -> Option<Family> {
    let magic: [u8; 4] = data.get(..4)?.try_into().ok()?;
    classify(magic).map(|(_, family, _)| family)
}

/// Version triple. The Rev family packs `major * 10 + minor` into a u16;
/// the others pack `major << 24 | minor << 16 | micro` into a u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub micro: u16,
}

impl Version {
    pub fn new(major: u8, minor: u8, micro: u16) -> Self {
        Self {
            major,
            minor,
            micro,
        }
    }

    pub fn from_decimal_u16(v: u16) -> Self {
        Self {
            major: (v / 10) as u8,
            minor: (v % 10) as u8,
            micro: 0,
        }
    }

    pub fn to_decimal_u16(self) -> u16 {
        self.major as u16 * 10 + self.minor as u16
    }

    pub fn from_packed_u32(v: u32) -> Self {
        Self {
            major: (v >> 24) as u8,
            minor: (v >> 16 & 0xFF) as u8,
            micro: (v & 0xFFFF) as u16,
        }
    }

    pub fn to_packed_u32(self) -> u32 {
        (self.major as u32) << 24 | (self.minor as u32) << 16 | self.micro as u32
    }
}

/// Decoded container header, shared by the layout and animation documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub variant: Variant,
    /// Byte-order mark as stored; `0xFEFF` selects big-endian fields.
    pub byte_order_mark: u16,
    pub version: Version,
    /// Tags stored byte-reversed (one little-endian Rev title does this).
    pub reversed_tags: bool,
    pub header_size: u16,
}

impl Header {
    pub fn big_endian(&self) -> bool {
        self.byte_order_mark == BOM_BIG
    }

    pub fn endian(&self) -> Endian {
        if self.big_endian() {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    fn magic(&self, family: Family) -> [u8; 4] {
        match (self.variant, family) {
            (Variant::Cafe, Family::Layout) => *b"FLYT",
            (Variant::Ctr, Family::Layout) => *b"CLYT",
            (Variant::Rev, Family::Layout) => *b"RLYT",
            (Variant::Cafe, Family::Animation) => *b"FLAN",
            (Variant::Ctr, Family::Animation) => *b"CLAN",
            (Variant::Rev, Family::Animation) => *b"RLAN",
        }
    }

    /// Decode the header, configure the cursor's endianness and tag
    /// reversal, and leave it positioned at the first section. Returns the
    /// header, its family, and the declared section count.
    pub fn read(r: &mut Reader<'_>) -> Result<(Header, Family, u16)> {
        r.set_endian(Endian::Big);
        let mut magic = [0u8; 4];
        magic.copy_from_slice(r.read_bytes(4)?);
        let (variant, family, reversed) =
            classify(magic).ok_or(Error::BadMagic { found: magic })?;
        r.set_reverse_tags(reversed);

        let byte_order_mark = r.read_u16()?;
        let endian = if byte_order_mark == BOM_BIG {
            Endian::Big
        } else {
            Endian::Little
        };
        r.set_endian(endian);

        let (version, header_size, section_count);
        if variant == Variant::Rev {
            version = Version::from_decimal_u16(r.read_u16()?);
            let _file_size = r.read_u32()?;
            header_size = r.read_u16()?;
            section_count = r.read_u16()?;
        } else {
            header_size = r.read_u16()?;
            version = Version::from_packed_u32(r.read_u32()?);
            let _file_size = r.read_u32()?;
            section_count = r.read_u16()?;
            let _padding = r.read_u16()?;
        }

        r.seek(header_size as usize)?;

        Ok((
            Header {
                variant,
                byte_order_mark,
                version,
                reversed_tags: reversed,
                header_size,
            },
            family,
            section_count,
        ))
    }

    /// Encode the header with placeholder file-size and section-count
    /// fields, leaving the writer at the first section position. Returns the
    /// slots to patch once every section has been written.
    pub fn write(&self, w: &mut Writer, family: Family) -> HeaderSlots {
        w.set_endian(Endian::Big);
        w.set_reverse_tags(self.reversed_tags);
        w.write_tag(crate::section::SectionTag(self.magic(family)));
        w.write_u16(self.byte_order_mark);
        w.set_endian(self.endian());

        let file_size_slot;
        let section_count_slot;
        let header_size;
        if self.variant == Variant::Rev {
            header_size = 16u16;
            w.write_u16(self.version.to_decimal_u16());
            file_size_slot = w.reserve_u32();
            w.write_u16(header_size);
            section_count_slot = w.position();
            w.write_u16(0);
        } else {
            header_size = 20u16;
            w.write_u16(header_size);
            w.write_u32(self.version.to_packed_u32());
            file_size_slot = w.reserve_u32();
            section_count_slot = w.position();
            w.write_u16(0);
            w.write_u16(0);
        }

        // Sections begin at the declared header size.
        let pad = header_size as usize - w.position();
        w.write_zeros(pad);

        HeaderSlots {
            file_size_slot,
            section_count_slot,
        }
    }
}

/// Back-patch positions produced by [`Header::write`].
pub struct HeaderSlots {
    pub file_size_slot: usize,
    pub section_count_slot: usize,
}

impl HeaderSlots {
    /// Record the final file size and section count.
    pub fn finish(self, w: &mut Writer, section_count: u16) {
        w.patch_u32(self.file_size_slot, w.position() as u32);
        w.patch_u16(self.section_count_slot, section_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_packings() {
        let v = Version::new(8, 6, 3);
        assert_eq!(Version::from_packed_u32(v.to_packed_u32()), v);
        assert_eq!(v.to_packed_u32(), 0x0806_0003);

        let r = Version::new(1, 0, 0);
        assert_eq!(r.to_decimal_u16(), 10);
        assert_eq!(Version::from_decimal_u16(10), r);
    }

    #[test]
    fn sniff_classifies_both_families() {
        assert_eq!(sniff(b"FLYT\xFE\xFF"), Some(Family::Layout));
        assert_eq!(sniff(b"CLAN\xFE\xFF"), Some(Family::Animation));
        assert_eq!(sniff(b"NALR\xFF\xFE"), Some(Family::Animation));
        assert_eq!(sniff(b"TYLR\xFF\xFE"), Some(Family::Layout));
        assert_eq!(sniff(b"FORM"), None);
        assert_eq!(sniff(b"FL"), None);
    }

    #[test]
    fn cafe_header_round_trip() {
        let header = Header {
            variant: Variant::Cafe,
            byte_order_mark: BOM_LITTLE,
            version: Version::new(8, 0, 0),
            reversed_tags: false,
            header_size: 20,
        };
        let mut w = Writer::new(Endian::Big);
        let slots = header.write(&mut w, Family::Layout);
        slots.finish(&mut w, 3);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[..4], b"FLYT");

        let mut r = Reader::new(&bytes);
        let (decoded, family, count) = Header::read(&mut r).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(family, Family::Layout);
        assert_eq!(count, 3);
        assert_eq!(r.position(), 20);
    }

    #[test]
    fn rev_header_round_trip() {
        let header = Header {
            variant: Variant::Rev,
            byte_order_mark: BOM_BIG,
            version: Version::new(1, 0, 0),
            reversed_tags: false,
            header_size: 16,
        };
        let mut w = Writer::new(Endian::Big);
        let slots = header.write(&mut w, Family::Animation);
        slots.finish(&mut w, 2);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..4], b"RLAN");

        let mut r = Reader::new(&bytes);
        let (decoded, family, count) = Header::read(&mut r).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(family, Family::Animation);
        assert_eq!(count, 2);
    }

    #[test]
    fn reversed_rev_magic_round_trip() {
        let header = Header {
            variant: Variant::Rev,
            byte_order_mark: BOM_LITTLE,
            version: Version::new(1, 0, 0),
            reversed_tags: true,
            header_size: 16,
        };
        let mut w = Writer::new(Endian::Big);
        header.write(&mut w, Family::Layout);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..4], b"TYLR");

        let mut r = Reader::new(&bytes);
        let (decoded, _, _) = Header::read(&mut r).unwrap();
        assert!(decoded.reversed_tags);
        assert_eq!(decoded.variant, Variant::Rev);
    }

    #[test]
    fn unknown_magic_is_fatal() {
        let mut r = Reader::new(b"XXXX\xFE\xFF\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00");
        assert!(matches!(
            Header::read(&mut r),
            Err(Error::BadMagic { found: [b'X', ..] })
        ));
    }
}
