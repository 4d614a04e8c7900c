//! Parts pane payload (`prt1`): an instance of another layout file with
//! per-property overrides.
//!
//! Each property may carry an override pane (a fully enveloped pane section
//! of any kind), a user-data block, and a basic transform override, each
//! behind its own offset anchored at the section envelope; an offset of 0
//! means the block is absent.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::{read_vec2, read_vec3, write_vec2, write_vec3, Pane};
use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::header::Header;
use crate::section::{tags, write_section};
use crate::userdata::UserData;

/// Transform override applied to a property of the referenced layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartsBasicInfo {
    pub user_name: String,
    pub translate: Vec3,
    pub rotate: Vec3,
    pub scale: Vec2,
    pub alpha: u8,
    pub reserved0: u8,
    pub reserved1: u8,
    pub reserved2: u8,
    pub reserved3: u32,
    pub reserved4: u32,
}

/// One named override slot of a parts pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartsProperty {
    pub name: String,
    pub usage_flag: u8,
    pub basic_usage_flag: u8,
    pub material_usage_flag: u8,
    pub reserved: u8,
    /// Raw value of the user-data offset slot. Small values are flags, not
    /// offsets; preserved verbatim and overwritten only when a real
    /// user-data block is written.
    pub flag: u32,
    pub pane: Option<Box<Pane>>,
    pub user_data: Option<UserData>,
    pub basic_info: Option<PartsBasicInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parts {
    pub magnify: Vec2,
    pub properties: Vec<PartsProperty>,
    /// Name of the referenced layout file.
    pub layout_file_name: String,
}

impl Parts {
    pub fn read(r: &mut Reader<'_>, header: &Header, section_start: usize) -> Result<Parts> {
        let count = r.read_u32()?;
        let magnify = read_vec2(r)?;

        let mut properties = Vec::with_capacity(count as usize);
        for _ in 0..count {
            properties.push(PartsProperty::read(r, header, section_start)?);
        }
        let layout_file_name = r.read_cstr()?;

        Ok(Parts {
            magnify,
            properties,
            layout_file_name,
        })
    }

    pub fn write(&self, w: &mut Writer, header: &Header, section_start: usize) -> Result<()> {
        w.write_u32(self.properties.len() as u32);
        write_vec2(w, self.magnify);

        let mut slots = Vec::with_capacity(self.properties.len());
        for property in &self.properties {
            w.write_fixed_str(&property.name, 0x18)?;
            w.write_u8(property.usage_flag);
            w.write_u8(property.basic_usage_flag);
            w.write_u8(property.material_usage_flag);
            w.write_u8(property.reserved);

            slots.push(w.position());
            w.write_u32(0); // pane offset
            w.write_u32(property.flag); // user data offset, or a bare flag
            w.write_u32(0); // basic info offset
        }
        w.align(4);

        w.write_cstr(&self.layout_file_name);
        w.align(4);

        for (property, &slot) in self.properties.iter().zip(&slots) {
            if let Some(pane) = &property.pane {
                w.patch_offset_u32(slot, section_start);
                pane.write_embedded(w, header)?;
            }
            if let Some(user_data) = &property.user_data {
                w.patch_offset_u32(slot + 4, section_start);
                let mut scratch_count = 0u16;
                write_section(w, tags::USD1, &mut scratch_count, |w| user_data.write(w))?;
            }
            if let Some(info) = &property.basic_info {
                w.patch_offset_u32(slot + 8, section_start);
                w.write_fixed_str(&info.user_name, 0x8)?;
                write_vec3(w, info.translate);
                write_vec3(w, info.rotate);
                write_vec2(w, info.scale);
                w.write_u8(info.alpha);
                w.write_u8(info.reserved0);
                w.write_u8(info.reserved1);
                w.write_u8(info.reserved2);
                w.write_u32(info.reserved3);
                w.write_u32(info.reserved4);
            }
        }
        Ok(())
    }
}

impl PartsProperty {
    fn read(r: &mut Reader<'_>, header: &Header, section_start: usize) -> Result<PartsProperty> {
        let name = r.read_fixed_str(0x18)?;
        let usage_flag = r.read_u8()?;
        let basic_usage_flag = r.read_u8()?;
        let material_usage_flag = r.read_u8()?;
        let reserved = r.read_u8()?;

        let pane_offset = r.read_u32()?;
        let user_data_offset = r.read_u32()?;
        let info_offset = r.read_u32()?;

        let pane = if pane_offset != 0 {
            let mut sub = r.at(section_start + pane_offset as usize)?;
            Some(Box::new(Pane::read_embedded(&mut sub, header)?))
        } else {
            None
        };

        // Small slot values are usage flags rather than offsets.
        let user_data = if user_data_offset > 10 {
            let block_start = section_start + user_data_offset as usize;
            let mut sub = r.at(block_start)?;
            sub.expect_tag(tags::USD1)?;
            let _size = sub.read_u32()?;
            Some(UserData::read(&mut sub, block_start)?)
        } else {
            None
        };

        let basic_info = if info_offset != 0 {
            let mut sub = r.at(section_start + info_offset as usize)?;
            Some(PartsBasicInfo {
                user_name: sub.read_fixed_str(0x8)?,
                translate: read_vec3(&mut sub)?,
                rotate: read_vec3(&mut sub)?,
                scale: read_vec2(&mut sub)?,
                alpha: sub.read_u8()?,
                reserved0: sub.read_u8()?,
                reserved1: sub.read_u8()?,
                reserved2: sub.read_u8()?,
                reserved3: sub.read_u32()?,
                reserved4: sub.read_u32()?,
            })
        } else {
            None
        };

        Ok(PartsProperty {
            name,
            usage_flag,
            basic_usage_flag,
            material_usage_flag,
            reserved,
            flag: user_data_offset,
            pane,
            user_data,
            basic_info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;
    use crate::header::{Variant, Version, BOM_BIG};
    use crate::pane::PaneKind;
    use crate::userdata::{UserDataEntry, UserDataValue};

    fn cafe_header() -> Header {
        Header {
            variant: Variant::Cafe,
            byte_order_mark: BOM_BIG,
            version: Version::new(8, 0, 0),
            reversed_tags: false,
            header_size: 20,
        }
    }

    fn round_trip(pane: &Pane, header: &Header) -> Pane {
        let mut w = Writer::new(Endian::Big);
        pane.write_embedded(&mut w, header).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        Pane::read_embedded(&mut r, header).unwrap()
    }

    #[test]
    fn absent_sub_blocks_stay_absent() {
        let parts = Parts {
            magnify: Vec2::ONE,
            properties: vec![PartsProperty {
                name: "P_Icon".into(),
                usage_flag: 1,
                basic_usage_flag: 0,
                material_usage_flag: 0,
                reserved: 0,
                flag: 2,
                pane: None,
                user_data: None,
                basic_info: None,
            }],
            layout_file_name: "common_icon.bflyt".into(),
        };
        let pane = Pane::new("P_Parts", PaneKind::Parts(parts));
        let header = cafe_header();
        let decoded = round_trip(&pane, &header);
        match &decoded.kind {
            PaneKind::Parts(p) => {
                assert!(p.properties[0].pane.is_none());
                assert!(p.properties[0].user_data.is_none());
                assert!(p.properties[0].basic_info.is_none());
                // the bare flag value survives the slot it rides in
                assert_eq!(p.properties[0].flag, 2);
            }
            _ => unreachable!(),
        }
        assert_eq!(decoded, pane);
    }

    #[test]
    fn embedded_pane_and_overrides_round_trip() {
        let mut override_pane = Pane::new("P_Override", PaneKind::Null);
        override_pane.width = 30.0;

        let parts = Parts {
            magnify: Vec2::new(1.0, 2.0),
            properties: vec![PartsProperty {
                name: "P_Body".into(),
                usage_flag: 0,
                basic_usage_flag: 1,
                material_usage_flag: 0,
                reserved: 0,
                flag: 0,
                pane: Some(Box::new(override_pane)),
                user_data: Some(UserData {
                    entries: vec![UserDataEntry {
                        name: "key".into(),
                        value: UserDataValue::Ints(vec![9]),
                        reserved: 0,
                    }],
                    raw: None,
                }),
                basic_info: Some(PartsBasicInfo {
                    user_name: "usr".into(),
                    translate: Vec3::new(5.0, 6.0, 7.0),
                    scale: Vec2::ONE,
                    alpha: 200,
                    ..PartsBasicInfo::default()
                }),
            }],
            layout_file_name: "button.bflyt".into(),
        };
        let pane = Pane::new("P_Parts", PaneKind::Parts(parts));
        let header = cafe_header();
        let mut decoded = round_trip(&pane, &header);

        // the user-data slot is rewritten with the real offset; normalize it
        // back before comparing the rest of the structure
        if let PaneKind::Parts(p) = &mut decoded.kind {
            assert!(p.properties[0].flag > 10);
            p.properties[0].flag = 0;
        }
        assert_eq!(decoded, pane);
    }
}
