//! User data (`usd1`) blocks: free-form named values attached to the
//! document, to individual panes, to control sources, and to animation tags.

use serde::{Deserialize, Serialize};

use crate::cursor::{Reader, Writer};
use crate::error::Result;

/// Typed payload of one user-data entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UserDataValue {
    String(String),
    Ints(Vec<i32>),
    Floats(Vec<f32>),
    /// Structured system data; only partially understood, so the owning
    /// block is kept raw (see [`UserData::raw`]) and re-emitted verbatim.
    SystemData,
}

impl UserDataValue {
    fn type_tag(&self) -> u8 {
        match self {
            UserDataValue::String(_) => 0,
            UserDataValue::Ints(_) => 1,
            UserDataValue::Floats(_) => 2,
            UserDataValue::SystemData => 3,
        }
    }

    fn data_len(&self) -> u16 {
        match self {
            UserDataValue::String(s) => s.len() as u16,
            UserDataValue::Ints(v) => v.len() as u16,
            UserDataValue::Floats(v) => v.len() as u16,
            UserDataValue::SystemData => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDataEntry {
    pub name: String,
    pub value: UserDataValue,
    pub reserved: u8,
}

/// One `usd1` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserData {
    pub entries: Vec<UserDataEntry>,
    /// Verbatim payload capture, present whenever a SystemData entry was
    /// seen. Takes precedence over `entries` when encoding.
    pub raw: Option<Vec<u8>>,
}

impl UserData {
    /// Decode a `usd1` payload. `section_start` is the envelope position
    /// (8 bytes before the cursor).
    pub fn read(r: &mut Reader<'_>, section_start: usize) -> Result<UserData> {
        let mut usd = UserData::default();

        let count = r.read_u16()?;
        r.skip(2)?;

        for _ in 0..count {
            let entry = Self::read_entry(r)?;
            let system = matches!(entry.value, UserDataValue::SystemData);
            usd.entries.push(entry);
            if system {
                break;
            }
        }

        if usd
            .entries
            .iter()
            .any(|e| matches!(e.value, UserDataValue::SystemData))
        {
            let mut sub = r.at(section_start + 4)?;
            let size = sub.read_u32()? as usize;
            usd.raw = Some(sub.read_bytes(size.saturating_sub(8))?.to_vec());
        }

        Ok(usd)
    }

    fn read_entry(r: &mut Reader<'_>) -> Result<UserDataEntry> {
        let record_start = r.position();

        let name_offset = r.read_u32()?;
        let data_offset = r.read_u32()?;
        let length = r.read_u16()?;
        let type_tag = r.read_u8()?;
        let reserved = r.read_u8()?;

        let name = if name_offset != 0 {
            r.at(record_start + name_offset as usize)?.read_cstr()?
        } else {
            String::new()
        };

        let value = if data_offset != 0 || type_tag == 3 {
            let mut data = r.at(record_start + data_offset as usize)?;
            match type_tag {
                0 => UserDataValue::String(data.read_fixed_str(length as usize)?),
                1 => {
                    let mut ints = Vec::with_capacity(length as usize);
                    for _ in 0..length {
                        ints.push(data.read_i32()?);
                    }
                    UserDataValue::Ints(ints)
                }
                2 => {
                    let mut floats = Vec::with_capacity(length as usize);
                    for _ in 0..length {
                        floats.push(data.read_f32()?);
                    }
                    UserDataValue::Floats(floats)
                }
                _ => UserDataValue::SystemData,
            }
        } else {
            match type_tag {
                0 => UserDataValue::String(String::new()),
                1 => UserDataValue::Ints(Vec::new()),
                2 => UserDataValue::Floats(Vec::new()),
                _ => UserDataValue::SystemData,
            }
        };

        Ok(UserDataEntry {
            name,
            value,
            reserved,
        })
    }

    /// Encode a `usd1` payload. A raw capture wins outright.
    pub fn write(&self, w: &mut Writer) -> Result<()> {
        if let Some(raw) = &self.raw {
            w.write_bytes(raw);
            return Ok(());
        }

        w.write_u16(self.entries.len() as u16);
        w.write_u16(0);

        let mut record_starts = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            record_starts.push(w.position());
            w.write_u32(0); // name offset
            w.write_u32(0); // data offset
            w.write_u16(entry.value.data_len());
            w.write_u8(entry.value.type_tag());
            w.write_u8(entry.reserved);
        }

        // Numeric payloads first, each addressed from its own record.
        for (entry, &record_start) in self.entries.iter().zip(&record_starts) {
            match &entry.value {
                UserDataValue::Ints(ints) => {
                    w.patch_offset_u32(record_start + 4, record_start);
                    for &v in ints {
                        w.write_i32(v);
                    }
                }
                UserDataValue::Floats(floats) => {
                    w.patch_offset_u32(record_start + 4, record_start);
                    for &v in floats {
                        w.write_f32(v);
                    }
                }
                UserDataValue::String(_) | UserDataValue::SystemData => {}
            }
        }

        // Shared string table: names and string values, de-duplicated in
        // first-use order. Each occurrence patches its own slot relative to
        // its own record. The table is tiny; linear search keeps insertion
        // order.
        fn add<'a>(
            table: &mut Vec<(&'a str, Vec<(usize, usize)>)>,
            value: &'a str,
            slot: usize,
            anchor: usize,
        ) {
            if let Some((_, slots)) = table.iter_mut().find(|(s, _)| *s == value) {
                slots.push((slot, anchor));
            } else {
                table.push((value, vec![(slot, anchor)]));
            }
        }

        let mut table: Vec<(&str, Vec<(usize, usize)>)> = Vec::new();
        for (entry, &record_start) in self.entries.iter().zip(&record_starts) {
            if let UserDataValue::String(s) = &entry.value {
                add(&mut table, s, record_start + 4, record_start);
            }
            add(&mut table, &entry.name, record_start, record_start);
        }

        for (value, slots) in table {
            for (slot, anchor) in slots {
                w.patch_offset_u32(slot, anchor);
            }
            w.write_cstr(value);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    fn round_trip(usd: &UserData) -> UserData {
        let mut w = Writer::new(Endian::Big);
        // fake envelope so section_start arithmetic matches the real framing
        w.write_bytes(b"usd1");
        let size_slot = w.reserve_u32();
        usd.write(&mut w).unwrap();
        w.align(4);
        w.patch_u32(size_slot, w.position() as u32);

        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        r.seek(8).unwrap();
        UserData::read(&mut r, 0).unwrap()
    }

    #[test]
    fn typed_entries_round_trip() {
        let usd = UserData {
            entries: vec![
                UserDataEntry {
                    name: "tag".into(),
                    value: UserDataValue::String("button_ok".into()),
                    reserved: 0,
                },
                UserDataEntry {
                    name: "ids".into(),
                    value: UserDataValue::Ints(vec![1, -2, 3]),
                    reserved: 0,
                },
                UserDataEntry {
                    name: "weights".into(),
                    value: UserDataValue::Floats(vec![0.5, 2.0]),
                    reserved: 0,
                },
            ],
            raw: None,
        };
        assert_eq!(round_trip(&usd), usd);
    }

    #[test]
    fn shared_strings_are_deduplicated() {
        let usd = UserData {
            entries: vec![
                UserDataEntry {
                    name: "same".into(),
                    value: UserDataValue::String("same".into()),
                    reserved: 0,
                },
                UserDataEntry {
                    name: "same".into(),
                    value: UserDataValue::Ints(vec![7]),
                    reserved: 0,
                },
            ],
            raw: None,
        };
        let mut w = Writer::new(Endian::Big);
        usd.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        let occurrences = bytes.windows(5).filter(|win| win == b"same\0").count();
        assert_eq!(occurrences, 1);

        let decoded = {
            let mut outer = Writer::new(Endian::Big);
            outer.write_bytes(b"usd1");
            let slot = outer.reserve_u32();
            usd.write(&mut outer).unwrap();
            outer.patch_u32(slot, outer.position() as u32);
            let data = outer.into_bytes();
            let mut r = Reader::new(&data);
            r.seek(8).unwrap();
            UserData::read(&mut r, 0).unwrap()
        };
        assert_eq!(decoded, usd);
    }

    #[test]
    fn system_data_blocks_stay_raw() {
        // entry table: one entry typed SystemData, payload unparsed
        let mut w = Writer::new(Endian::Big);
        w.write_bytes(b"usd1");
        let size_slot = w.reserve_u32();
        w.write_u16(1);
        w.write_u16(0);
        let record = w.position();
        w.write_u32(0);
        w.write_u32(0);
        w.write_u16(0);
        w.write_u8(3); // SystemData
        w.write_u8(0);
        w.patch_offset_u32(record, record);
        w.write_cstr("sys");
        w.align(4);
        w.patch_u32(size_slot, w.position() as u32);

        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        r.seek(8).unwrap();
        let usd = UserData::read(&mut r, 0).unwrap();
        assert_eq!(usd.raw.as_deref(), Some(&bytes[8..]));

        // re-encode: the raw capture is emitted verbatim
        let mut w2 = Writer::new(Endian::Big);
        usd.write(&mut w2).unwrap();
        assert_eq!(w2.into_bytes(), &bytes[8..]);
    }
}
