//! Window pane payload (`wnd1`): a stretchable frame built from corner
//! materials around a center content quad.
//!
//! Content and frames sit behind offsets anchored at the section envelope;
//! the frame table is an offset table over 4-byte frame records.

use serde::{Deserialize, Serialize};

use super::TexCoord;
use crate::color::Color;
use crate::cursor::{Reader, Writer};
use crate::error::Result;

/// How the window content region is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowKind {
    #[default]
    Around,
    Horizontal,
    HorizontalNoContent,
}

impl WindowKind {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => WindowKind::Horizontal,
            2 => WindowKind::HorizontalNoContent,
            _ => WindowKind::Around,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            WindowKind::Around => 0,
            WindowKind::Horizontal => 1,
            WindowKind::HorizontalNoContent => 2,
        }
    }
}

/// Frame texture flip applied to reuse one corner material on all corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowFrameTexFlip {
    #[default]
    None,
    FlipH,
    FlipV,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl WindowFrameTexFlip {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => WindowFrameTexFlip::FlipH,
            2 => WindowFrameTexFlip::FlipV,
            3 => WindowFrameTexFlip::Rotate90,
            4 => WindowFrameTexFlip::Rotate180,
            5 => WindowFrameTexFlip::Rotate270,
            _ => WindowFrameTexFlip::None,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            WindowFrameTexFlip::None => 0,
            WindowFrameTexFlip::FlipH => 1,
            WindowFrameTexFlip::FlipV => 2,
            WindowFrameTexFlip::Rotate90 => 3,
            WindowFrameTexFlip::Rotate180 => 4,
            WindowFrameTexFlip::Rotate270 => 5,
        }
    }
}

/// The center region of a window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowContent {
    pub color_top_left: Color,
    pub color_top_right: Color,
    pub color_bottom_left: Color,
    pub color_bottom_right: Color,
    pub material_index: u16,
    pub tex_coords: Vec<TexCoord>,
}

/// One frame corner/edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowFrame {
    pub material_index: u16,
    pub texture_flip: WindowFrameTexFlip,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Window {
    pub stretch_left: u16,
    pub stretch_right: u16,
    pub stretch_top: u16,
    pub stretch_bottom: u16,
    pub frame_element_left: u16,
    pub frame_element_right: u16,
    pub frame_element_top: u16,
    pub frame_element_bottom: u16,
    /// Raw flag byte; bits 2-3 mirror `kind` and are refreshed on encode.
    pub flag: u8,
    pub kind: WindowKind,
    pub content: WindowContent,
    pub frames: Vec<WindowFrame>,
}

impl Window {
    pub fn read(r: &mut Reader<'_>, section_start: usize) -> Result<Window> {
        let mut window = Window {
            stretch_left: r.read_u16()?,
            stretch_right: r.read_u16()?,
            stretch_top: r.read_u16()?,
            stretch_bottom: r.read_u16()?,
            frame_element_left: r.read_u16()?,
            frame_element_right: r.read_u16()?,
            frame_element_top: r.read_u16()?,
            frame_element_bottom: r.read_u16()?,
            ..Window::default()
        };
        let frame_count = r.read_u8()?;
        window.flag = r.read_u8()?;
        r.skip(2)?;
        let content_offset = r.read_u32()?;
        let frame_table_offset = r.read_u32()?;

        window.kind = WindowKind::from_u8(window.flag >> 2 & 3);

        let mut sub = r.at(section_start + content_offset as usize)?;
        let mut content = WindowContent {
            color_top_left: Color::read_rgba32(&mut sub)?,
            color_top_right: Color::read_rgba32(&mut sub)?,
            color_bottom_left: Color::read_rgba32(&mut sub)?,
            color_bottom_right: Color::read_rgba32(&mut sub)?,
            material_index: sub.read_u16()?,
            tex_coords: Vec::new(),
        };
        let uv_count = sub.read_u8()?;
        sub.skip(1)?;
        for _ in 0..uv_count {
            content.tex_coords.push(TexCoord::read(&mut sub)?);
        }
        window.content = content;

        let mut table = r.at(section_start + frame_table_offset as usize)?;
        let offsets = table.read_offsets(frame_count as usize)?;
        for offset in offsets {
            let mut frame = r.at(section_start + offset as usize)?;
            window.frames.push(WindowFrame {
                material_index: frame.read_u16()?,
                texture_flip: WindowFrameTexFlip::from_u8(frame.read_u8()?),
            });
        }

        Ok(window)
    }

    pub fn write(&self, w: &mut Writer, section_start: usize) -> Result<()> {
        let flag = self.flag & !0x0C | self.kind.as_u8() << 2;

        w.write_u16(self.stretch_left);
        w.write_u16(self.stretch_right);
        w.write_u16(self.stretch_top);
        w.write_u16(self.stretch_bottom);
        w.write_u16(self.frame_element_left);
        w.write_u16(self.frame_element_right);
        w.write_u16(self.frame_element_top);
        w.write_u16(self.frame_element_bottom);
        w.write_u8(self.frames.len() as u8);
        w.write_u8(flag);
        w.write_u16(0);

        let content_slot = w.reserve_u32();
        let frame_table_slot = w.reserve_u32();

        w.patch_offset_u32(content_slot, section_start);
        let content = &self.content;
        content.color_top_left.write_rgba32(w);
        content.color_top_right.write_rgba32(w);
        content.color_bottom_left.write_rgba32(w);
        content.color_bottom_right.write_rgba32(w);
        w.write_u16(content.material_index);
        w.write_u8(content.tex_coords.len() as u8);
        w.write_u8(0);
        for tex_coord in &content.tex_coords {
            tex_coord.write(w);
        }

        w.patch_offset_u32(frame_table_slot, section_start);
        let table_start = w.reserve_u32_table(self.frames.len());
        for (i, frame) in self.frames.iter().enumerate() {
            w.patch_offset_u32(table_start + i * 4, section_start);
            w.write_u16(frame.material_index);
            w.write_u8(frame.texture_flip.as_u8());
            w.write_u8(0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;
    use crate::header::{Header, Variant, Version, BOM_BIG};
    use crate::pane::{Pane, PaneKind};
    use glam::Vec2;

    #[test]
    fn window_round_trips_with_frames() {
        let window = Window {
            stretch_left: 1,
            stretch_right: 2,
            stretch_top: 3,
            stretch_bottom: 4,
            frame_element_left: 8,
            frame_element_right: 8,
            frame_element_top: 8,
            frame_element_bottom: 8,
            flag: WindowKind::Horizontal.as_u8() << 2,
            kind: WindowKind::Horizontal,
            content: WindowContent {
                material_index: 2,
                tex_coords: vec![TexCoord {
                    top_left: Vec2::ZERO,
                    top_right: Vec2::new(1.0, 0.0),
                    bottom_left: Vec2::new(0.0, 1.0),
                    bottom_right: Vec2::ONE,
                }],
                ..WindowContent::default()
            },
            frames: vec![
                WindowFrame {
                    material_index: 0,
                    texture_flip: WindowFrameTexFlip::None,
                },
                WindowFrame {
                    material_index: 0,
                    texture_flip: WindowFrameTexFlip::Rotate90,
                },
                WindowFrame {
                    material_index: 0,
                    texture_flip: WindowFrameTexFlip::Rotate180,
                },
                WindowFrame {
                    material_index: 0,
                    texture_flip: WindowFrameTexFlip::Rotate270,
                },
            ],
        };

        let header = Header {
            variant: Variant::Cafe,
            byte_order_mark: BOM_BIG,
            version: Version::new(8, 0, 0),
            reversed_tags: false,
            header_size: 20,
        };
        let pane = Pane::new("W_Dialog", PaneKind::Window(window));

        let mut w = Writer::new(Endian::Big);
        pane.write_embedded(&mut w, &header).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = Pane::read_embedded(&mut r, &header).unwrap();
        match (&decoded.kind, &pane.kind) {
            (PaneKind::Window(a), PaneKind::Window(b)) => assert_eq!(a, b),
            _ => unreachable!(),
        }
    }
}
