//! Texture (`txl1`) and font (`fnl1`) name tables.
//!
//! Both are an offset table over zero-terminated names, anchored at the
//! table start. The Rev dialect pads each table entry to 8 bytes.

use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::header::Variant;

/// Read `count` offset-addressed zero-terminated strings; offsets are
/// relative to the table start (the cursor's position on entry).
pub(crate) fn read_string_offsets(r: &mut Reader<'_>, count: usize) -> Result<Vec<String>> {
    let table_start = r.position();
    let offsets = r.read_offsets(count)?;
    let mut values = Vec::with_capacity(count);
    for offset in offsets {
        values.push(r.at(table_start + offset as usize)?.read_cstr()?);
    }
    Ok(values)
}

/// Write an offset table over zero-terminated strings, 4-byte aligned.
pub(crate) fn write_string_offsets(w: &mut Writer, values: &[String]) {
    let table_start = w.reserve_u32_table(values.len());
    for (i, value) in values.iter().enumerate() {
        w.patch_offset_u32(table_start + i * 4, table_start);
        w.write_cstr(value);
    }
    w.align(4);
}

pub fn read_string_table(r: &mut Reader<'_>, variant: Variant) -> Result<Vec<String>> {
    let count = r.read_u16()? as usize;
    r.skip(2)?;

    let table_start = r.position();
    let stride = if variant == Variant::Rev { 8 } else { 4 };

    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        let mut slot = r.at(table_start + i * stride)?;
        let offset = slot.read_u32()? as usize;
        values.push(r.at(table_start + offset)?.read_cstr()?);
    }
    Ok(values)
}

pub fn write_string_table(w: &mut Writer, values: &[String], variant: Variant) -> Result<()> {
    w.write_u16(values.len() as u16);
    w.write_u16(0);

    let stride = if variant == Variant::Rev { 8 } else { 4 };
    let table_start = w.position();
    w.write_zeros(values.len() * stride);

    for (i, value) in values.iter().enumerate() {
        w.patch_offset_u32(table_start + i * stride, table_start);
        w.write_cstr(value);
    }
    w.align(4);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    fn round_trip(values: &[&str], variant: Variant) -> Vec<String> {
        let owned: Vec<String> = values.iter().map(|s| s.to_string()).collect();
        let mut w = Writer::new(Endian::Big);
        write_string_table(&mut w, &owned, variant).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        read_string_table(&mut r, variant).unwrap()
    }

    #[test]
    fn cafe_table_round_trip() {
        let names = ["cursor.bflim", "bg_main.bflim", "a"];
        assert_eq!(round_trip(&names, Variant::Cafe), names);
    }

    #[test]
    fn rev_table_uses_wide_entries() {
        let names = ["font00"];
        assert_eq!(round_trip(&names, Variant::Rev), names);

        let mut w = Writer::new(Endian::Big);
        write_string_table(&mut w, &["font00".into()], Variant::Rev).unwrap();
        let bytes = w.into_bytes();
        // header + one 8-byte table entry, name begins at 12
        assert_eq!(&bytes[4..8], &[0, 0, 0, 8]);
        assert_eq!(&bytes[12..18], b"font00");
    }

    #[test]
    fn empty_table() {
        assert!(round_trip(&[], Variant::Ctr).is_empty());
    }
}
