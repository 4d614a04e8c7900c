//! Text pane payload (`txt1`).
//!
//! The two layout families diverge here more than anywhere else in the pane
//! section: the Cafe record carries shadow parameters, a text-box name and a
//! per-character transform block behind their own offsets, all anchored at
//! the section envelope. Text content is UTF-16 in the file's byte order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{read_vec2, write_vec2};
use crate::anim::AnimSubGroup;
use crate::color::Color;
use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::header::{Header, Variant};

/// Per-line alignment of rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineAlign {
    #[default]
    Unspecified,
    Left,
    Center,
    Right,
}

impl LineAlign {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => LineAlign::Left,
            2 => LineAlign::Center,
            3 => LineAlign::Right,
            _ => LineAlign::Unspecified,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            LineAlign::Unspecified => 0,
            LineAlign::Left => 1,
            LineAlign::Center => 2,
            LineAlign::Right => 3,
        }
    }
}

/// Animated per-character transform riding behind the Cafe text record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerCharacterTransform {
    pub curve_time_offset: f32,
    pub curve_width: f32,
    pub loop_type: u8,
    pub vertical_origin: u8,
    pub padding: u8,
    pub char_list: [u8; 20],
    /// Embedded animation curves, the same record the animation container
    /// uses for its sub-groups.
    pub anim: Option<AnimSubGroup>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    /// Byte length of the stored text buffer; kept as read, the buffer is
    /// padded out to it when the text itself is shorter.
    pub text_length: u16,
    pub max_text_length: u16,
    pub material_index: u16,
    pub font_index: u16,
    /// Packed horizontal (bits 0-1) and vertical (bits 2-3) alignment.
    pub alignment: u8,
    pub line_alignment: LineAlign,
    /// Bit 0: shadow, bit 1: restricted length, bit 4: per-char transform.
    pub flags: u8,
    pub unknown: u8,
    pub italic_tilt: f32,
    pub font_top_color: Color,
    pub font_bottom_color: Color,
    pub font_size: Vec2,
    pub character_space: f32,
    pub line_space: f32,
    pub text_box_name: String,
    pub shadow_offset: Vec2,
    pub shadow_scale: Vec2,
    pub shadow_fore_color: Color,
    pub shadow_back_color: Color,
    pub shadow_italic: f32,
    pub per_char_transform: Option<PerCharacterTransform>,
}

impl Text {
    pub fn horizontal_alignment(&self) -> super::OriginX {
        match self.alignment & 0x3 {
            1 => super::OriginX::Left,
            2 => super::OriginX::Right,
            _ => super::OriginX::Center,
        }
    }

    pub fn vertical_alignment(&self) -> super::OriginY {
        match self.alignment >> 2 & 0x3 {
            1 => super::OriginY::Top,
            2 => super::OriginY::Bottom,
            _ => super::OriginY::Center,
        }
    }

    pub fn shadow_enabled(&self) -> bool {
        self.flags & 0x1 != 0
    }

    pub fn restricted_length_enabled(&self) -> bool {
        self.flags & 0x2 != 0
    }

    pub fn per_char_transform_enabled(&self) -> bool {
        self.flags & 0x10 != 0
    }

    pub fn read(
        r: &mut Reader<'_>,
        header: &Header,
        section_start: usize,
        section_size: u32,
    ) -> Result<Text> {
        if header.variant == Variant::Cafe {
            Self::read_cafe(r, header, section_start)
        } else {
            Self::read_compact(r, section_start, section_size)
        }
    }

    pub fn write(&self, w: &mut Writer, header: &Header, section_start: usize) -> Result<()> {
        if header.variant == Variant::Cafe {
            self.write_cafe(w, header, section_start)
        } else {
            self.write_compact(w, section_start)
        }
    }

    fn read_compact(r: &mut Reader<'_>, section_start: usize, section_size: u32) -> Result<Text> {
        let mut text = Text {
            text_length: r.read_u16()?,
            max_text_length: r.read_u16()?,
            material_index: r.read_u16()?,
            font_index: r.read_u16()?,
            alignment: r.read_u8()?,
            line_alignment: LineAlign::from_u8(r.read_u8()?),
            flags: r.read_u8()?,
            unknown: r.read_u8()?,
            ..Text::default()
        };
        let text_offset = r.read_u32()?;
        text.font_top_color = Color::read_rgba32(r)?;
        text.font_bottom_color = Color::read_rgba32(r)?;
        text.font_size = read_vec2(r)?;
        text.character_space = r.read_f32()?;
        text.line_space = r.read_f32()?;

        // An offset equal to the section size marks empty text here.
        if text_offset != section_size && text.text_length > 0 {
            text.text = r.at(section_start + text_offset as usize)?.read_utf16_cstr()?;
        }
        Ok(text)
    }

    fn read_cafe(r: &mut Reader<'_>, header: &Header, section_start: usize) -> Result<Text> {
        let mut text = Text {
            text_length: r.read_u16()?,
            max_text_length: r.read_u16()?,
            material_index: r.read_u16()?,
            font_index: r.read_u16()?,
            alignment: r.read_u8()?,
            line_alignment: LineAlign::from_u8(r.read_u8()?),
            flags: r.read_u8()?,
            unknown: r.read_u8()?,
            italic_tilt: r.read_f32()?,
            ..Text::default()
        };
        let text_offset = r.read_u32()?;
        text.font_top_color = Color::read_rgba32(r)?;
        text.font_bottom_color = Color::read_rgba32(r)?;
        text.font_size = read_vec2(r)?;
        text.character_space = r.read_f32()?;
        text.line_space = r.read_f32()?;
        let name_offset = r.read_u32()?;
        text.shadow_offset = read_vec2(r)?;
        text.shadow_scale = read_vec2(r)?;
        text.shadow_fore_color = Color::read_rgba32(r)?;
        text.shadow_back_color = Color::read_rgba32(r)?;
        text.shadow_italic = r.read_f32()?;

        if header.version.major >= 8 {
            let _line_transform_offset = r.read_u32()?;
        }
        let per_char_offset = if header.version.major > 3 {
            r.read_u32()?
        } else {
            0
        };

        if text_offset != 0 && text.text_length > 0 {
            text.text = r.at(section_start + text_offset as usize)?.read_utf16_cstr()?;
        }
        if name_offset != 0 {
            text.text_box_name = r.at(section_start + name_offset as usize)?.read_cstr()?;
        }

        let per_char_enabled = text.flags & 0x10 != 0;
        if per_char_enabled && per_char_offset != 0 {
            let mut sub = r.at(section_start + per_char_offset as usize)?;
            let curve_time_offset = sub.read_f32()?;
            let curve_width = sub.read_f32()?;
            let loop_type = sub.read_u8()?;
            let vertical_origin = sub.read_u8()?;
            let has_anim = sub.read_u8()?;
            let padding = sub.read_u8()?;
            let mut char_list = [0u8; 20];
            char_list.copy_from_slice(sub.read_bytes(20)?);
            let anim = if has_anim != 0 {
                Some(AnimSubGroup::read(&mut sub)?)
            } else {
                None
            };
            text.per_char_transform = Some(PerCharacterTransform {
                curve_time_offset,
                curve_width,
                loop_type,
                vertical_origin,
                padding,
                char_list,
                anim,
            });
        }

        Ok(text)
    }

    fn write_compact(&self, w: &mut Writer, section_start: usize) -> Result<()> {
        w.write_u16(self.text_length);
        w.write_u16(self.max_text_length);
        w.write_u16(self.material_index);
        w.write_u16(self.font_index);
        w.write_u8(self.alignment);
        w.write_u8(self.line_alignment.as_u8());
        w.write_u8(self.flags);
        w.write_u8(self.unknown);
        let text_slot = w.reserve_u32();
        self.font_top_color.write_rgba32(w);
        self.font_bottom_color.write_rgba32(w);
        write_vec2(w, self.font_size);
        w.write_f32(self.character_space);
        w.write_f32(self.line_space);

        w.patch_offset_u32(text_slot, section_start);
        if !self.text.is_empty() {
            w.write_utf16(&self.text);
            w.write_u8(0);
            w.align(4);
        }
        Ok(())
    }

    fn write_cafe(&self, w: &mut Writer, header: &Header, section_start: usize) -> Result<()> {
        w.write_u16(self.text_length);
        w.write_u16(self.max_text_length);
        w.write_u16(self.material_index);
        w.write_u16(self.font_index);
        w.write_u8(self.alignment);
        w.write_u8(self.line_alignment.as_u8());
        w.write_u8(self.flags);
        w.write_u8(self.unknown);
        w.write_f32(self.italic_tilt);
        let text_slot = w.reserve_u32();
        self.font_top_color.write_rgba32(w);
        self.font_bottom_color.write_rgba32(w);
        write_vec2(w, self.font_size);
        w.write_f32(self.character_space);
        w.write_f32(self.line_space);
        let name_slot = w.reserve_u32();
        write_vec2(w, self.shadow_offset);
        write_vec2(w, self.shadow_scale);
        self.shadow_fore_color.write_rgba32(w);
        self.shadow_back_color.write_rgba32(w);
        w.write_f32(self.shadow_italic);

        if header.version.major >= 8 {
            // line transform blocks are never emitted
            w.write_u32(0);
        }
        let per_char_slot = if header.version.major > 3 {
            Some(w.reserve_u32())
        } else {
            None
        };
        w.align(4);

        w.patch_offset_u32(text_slot, section_start);
        if !self.text.is_empty() {
            w.write_utf16(&self.text);
            w.write_u8(0);
            w.align(4);
        } else if self.text_length > 0 {
            w.write_zeros(self.text_length as usize);
            w.align(4);
        }

        if !self.text_box_name.is_empty() {
            w.patch_offset_u32(name_slot, section_start);
            w.write_cstr(&self.text_box_name);
            w.align(4);
        }

        if let (Some(per_char), Some(slot)) = (&self.per_char_transform, per_char_slot) {
            w.patch_offset_u32(slot, section_start);
            w.write_f32(per_char.curve_time_offset);
            w.write_f32(per_char.curve_width);
            w.write_u8(per_char.loop_type);
            w.write_u8(per_char.vertical_origin);
            w.write_u8(per_char.anim.is_some() as u8);
            w.write_u8(per_char.padding);
            w.write_bytes(&per_char.char_list);
            w.align(4);
            if let Some(anim) = &per_char.anim {
                anim.write(w)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;
    use crate::header::{Version, BOM_BIG};
    use crate::pane::{Pane, PaneKind};

    fn header(variant: Variant, major: u8) -> Header {
        Header {
            variant,
            byte_order_mark: BOM_BIG,
            version: Version::new(major, 0, 0),
            reversed_tags: false,
            header_size: 20,
        }
    }

    fn text_pane(text: Text) -> Pane {
        Pane::new("T_Message", PaneKind::Text(Box::new(text)))
    }

    fn round_trip(pane: &Pane, header: &Header) -> Pane {
        let mut w = Writer::new(Endian::Big);
        pane.write_embedded(&mut w, header).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        Pane::read_embedded(&mut r, header).unwrap()
    }

    #[test]
    fn cafe_text_with_content_round_trips() {
        let text = Text {
            text: "Hello\nWorld".into(),
            text_length: 24,
            max_text_length: 24,
            material_index: 1,
            font_index: 0,
            alignment: 0x5,
            line_alignment: LineAlign::Center,
            flags: 0x1,
            italic_tilt: 0.25,
            font_size: Vec2::new(20.0, 20.0),
            character_space: -1.0,
            line_space: 2.0,
            text_box_name: "TextBox_00".into(),
            shadow_italic: 1.0,
            ..Text::default()
        };
        let pane = text_pane(text);
        assert_eq!(round_trip(&pane, &header(Variant::Cafe, 8)), pane);
    }

    #[test]
    fn compact_text_round_trips() {
        let text = Text {
            text: "OK".into(),
            text_length: 6,
            max_text_length: 6,
            line_alignment: LineAlign::Left,
            font_size: Vec2::new(16.0, 16.0),
            ..Text::default()
        };
        let pane = text_pane(text);
        for h in [header(Variant::Ctr, 2), header(Variant::Rev, 1)] {
            assert_eq!(round_trip(&pane, &h), pane);
        }
    }

    #[test]
    fn compact_empty_text_stays_empty() {
        let text = Text::default();
        let pane = text_pane(text);
        let decoded = round_trip(&pane, &header(Variant::Ctr, 2));
        match &decoded.kind {
            PaneKind::Text(t) => assert!(t.text.is_empty()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn per_char_transform_round_trips() {
        let text = Text {
            flags: 0x10,
            per_char_transform: Some(PerCharacterTransform {
                curve_time_offset: 0.5,
                curve_width: 3.0,
                loop_type: 1,
                vertical_origin: 0,
                padding: 0,
                char_list: [0xFF; 20],
                anim: None,
            }),
            ..Text::default()
        };
        let pane = text_pane(text);
        assert_eq!(round_trip(&pane, &header(Variant::Cafe, 9)), pane);
    }
}
