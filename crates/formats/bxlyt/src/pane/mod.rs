//! Pane tree nodes (`pan1` and friends).
//!
//! Every pane kind shares one common record (transform, size, origin,
//! visibility) followed by a kind-specific payload. The kind is the section
//! tag; in memory it is a closed enum so encode/decode dispatch stays in one
//! match per direction.

mod parts;
mod picture;
mod text;
mod window;

pub use parts::{Parts, PartsBasicInfo, PartsProperty};
pub use picture::Picture;
pub use text::{LineAlign, PerCharacterTransform, Text};
pub use window::{Window, WindowContent, WindowFrame, WindowFrameTexFlip, WindowKind};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::header::{Header, Variant};
use crate::section::{tags, SectionTag};
use crate::userdata::UserData;

/// Horizontal anchor of a pane's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OriginX {
    #[default]
    Center,
    Left,
    Right,
}

/// Vertical anchor of a pane's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OriginY {
    #[default]
    Center,
    Top,
    Bottom,
}

impl OriginX {
    fn from_index(v: u8) -> Self {
        match v {
            1 => OriginX::Left,
            2 => OriginX::Right,
            _ => OriginX::Center,
        }
    }

    fn index(self) -> u8 {
        match self {
            OriginX::Center => 0,
            OriginX::Left => 1,
            OriginX::Right => 2,
        }
    }
}

impl OriginY {
    fn from_index(v: u8) -> Self {
        match v {
            1 => OriginY::Top,
            2 => OriginY::Bottom,
            _ => OriginY::Center,
        }
    }

    fn index(self) -> u8 {
        match self {
            OriginY::Center => 0,
            OriginY::Top => 1,
            OriginY::Bottom => 2,
        }
    }
}

/// A 4-point quad of texture coordinates, used by picture panes and window
/// contents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TexCoord {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

impl TexCoord {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            top_left: read_vec2(r)?,
            top_right: read_vec2(r)?,
            bottom_left: read_vec2(r)?,
            bottom_right: read_vec2(r)?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        write_vec2(w, self.top_left);
        write_vec2(w, self.top_right);
        write_vec2(w, self.bottom_left);
        write_vec2(w, self.bottom_right);
    }
}

pub(crate) fn read_vec2(r: &mut Reader<'_>) -> Result<Vec2> {
    Ok(Vec2::new(r.read_f32()?, r.read_f32()?))
}

pub(crate) fn read_vec3(r: &mut Reader<'_>) -> Result<Vec3> {
    Ok(Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?))
}

pub(crate) fn write_vec2(w: &mut Writer, v: Vec2) {
    w.write_f32(v.x);
    w.write_f32(v.y);
}

pub(crate) fn write_vec3(w: &mut Writer, v: Vec3) {
    w.write_f32(v.x);
    w.write_f32(v.y);
    w.write_f32(v.z);
}

/// Kind-specific payload of a pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaneKind {
    /// Plain container (`pan1`).
    Null,
    /// Textured quad (`pic1`).
    Picture(Picture),
    /// Text box (`txt1`).
    Text(Box<Text>),
    /// Nine-patch window frame (`wnd1`).
    Window(Window),
    /// Embedded sub-layout reference (`prt1`).
    Parts(Parts),
    /// Hit-test bounds (`bnd1`).
    Bounds,
    /// Scissor region (`scr1`).
    Scissor,
    /// Child alignment hint (`ali1`).
    Alignment { value: Vec3 },
}

impl PaneKind {
    pub fn tag(&self) -> SectionTag {
        match self {
            PaneKind::Null => tags::PAN1,
            PaneKind::Picture(_) => tags::PIC1,
            PaneKind::Text(_) => tags::TXT1,
            PaneKind::Window(_) => tags::WND1,
            PaneKind::Parts(_) => tags::PRT1,
            PaneKind::Bounds => tags::BND1,
            PaneKind::Scissor => tags::SCR1,
            PaneKind::Alignment { .. } => tags::ALI1,
        }
    }

    pub fn is_pane_tag(tag: SectionTag) -> bool {
        matches!(
            tag,
            tags::PAN1
                | tags::PIC1
                | tags::TXT1
                | tags::WND1
                | tags::PRT1
                | tags::BND1
                | tags::SCR1
                | tags::ALI1
        )
    }
}

/// One node of the pane tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    pub name: String,
    /// Free-form tag consumed by tooling, stored next to the name.
    pub user_data_info: String,
    /// Bit 0: visible, bit 1: alpha influences children.
    pub flags: u8,
    pub origin_x: OriginX,
    pub origin_y: OriginY,
    pub parent_origin_x: OriginX,
    pub parent_origin_y: OriginY,
    pub alpha: u8,
    /// Magnification adjustment flags used by parts panes.
    pub mag_flags: u8,
    pub translate: Vec3,
    pub rotate: Vec3,
    pub scale: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: PaneKind,
    pub user_data: Option<UserData>,
    pub children: Vec<Pane>,
}

impl Pane {
    pub fn new(name: impl Into<String>, kind: PaneKind) -> Self {
        Pane {
            name: name.into(),
            user_data_info: String::new(),
            flags: 0x1,
            origin_x: OriginX::Center,
            origin_y: OriginY::Center,
            parent_origin_x: OriginX::Center,
            parent_origin_y: OriginY::Center,
            alpha: 255,
            mag_flags: 0,
            translate: Vec3::ZERO,
            rotate: Vec3::ZERO,
            scale: Vec2::ONE,
            width: 0.0,
            height: 0.0,
            kind,
            user_data: None,
            children: Vec::new(),
        }
    }

    pub fn visible(&self) -> bool {
        self.flags & 0x1 != 0
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.flags |= 0x1;
        } else {
            self.flags &= !0x1;
        }
    }

    pub fn influences_alpha(&self) -> bool {
        self.flags & 0x2 != 0
    }

    pub fn set_influences_alpha(&mut self, value: bool) {
        if value {
            self.flags |= 0x2;
        } else {
            self.flags &= !0x2;
        }
    }

    /// Depth-first iterator over this pane and all descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Pane> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let pane = stack.pop()?;
            stack.extend(pane.children.iter().rev());
            Some(pane)
        })
    }

    /// Find a descendant (or self) by name.
    pub fn find(&self, name: &str) -> Option<&Pane> {
        self.iter().find(|p| p.name == name)
    }

    /// Decode a pane payload. `section_start` is the envelope position and
    /// anchors every intra-section offset; `section_size` is the declared
    /// envelope size.
    pub fn read(
        r: &mut Reader<'_>,
        tag: SectionTag,
        header: &Header,
        section_start: usize,
        section_size: u32,
    ) -> Result<Pane> {
        let mut pane = Self::read_common(r, header)?;
        pane.kind = match tag {
            tags::PAN1 => PaneKind::Null,
            tags::BND1 => PaneKind::Bounds,
            tags::SCR1 => PaneKind::Scissor,
            tags::ALI1 => PaneKind::Alignment {
                value: read_vec3(r)?,
            },
            tags::PIC1 => PaneKind::Picture(Picture::read(r)?),
            tags::TXT1 => PaneKind::Text(Box::new(Text::read(
                r,
                header,
                section_start,
                section_size,
            )?)),
            tags::WND1 => PaneKind::Window(Window::read(r, section_start)?),
            tags::PRT1 => PaneKind::Parts(Parts::read(r, header, section_start)?),
            other => return Err(Error::NotAPane { tag: other }),
        };
        Ok(pane)
    }

    /// Encode the pane payload (without the envelope). `section_start` is
    /// the position of the already-written envelope.
    pub fn write(&self, w: &mut Writer, header: &Header, section_start: usize) -> Result<()> {
        self.write_common(w, header)?;
        match &self.kind {
            PaneKind::Null | PaneKind::Bounds | PaneKind::Scissor => Ok(()),
            PaneKind::Alignment { value } => {
                write_vec3(w, *value);
                Ok(())
            }
            PaneKind::Picture(picture) => picture.write(w),
            PaneKind::Text(text) => text.write(w, header, section_start),
            PaneKind::Window(window) => window.write(w, section_start),
            PaneKind::Parts(parts) => parts.write(w, header, section_start),
        }
    }

    /// Decode a pane wrapped in its own section envelope (used by parts
    /// properties, where panes are reached through offsets instead of the
    /// top-level section stream).
    pub fn read_embedded(r: &mut Reader<'_>, header: &Header) -> Result<Pane> {
        let section_start = r.position();
        let tag = r.read_tag()?;
        let size = r.read_u32()?;
        if !PaneKind::is_pane_tag(tag) {
            return Err(Error::NotAPane { tag });
        }
        Self::read(r, tag, header, section_start, size)
    }

    /// Encode a pane with its own envelope.
    pub fn write_embedded(&self, w: &mut Writer, header: &Header) -> Result<()> {
        let mut scratch_count = 0u16;
        let section_start = w.position();
        crate::section::write_section(w, self.kind.tag(), &mut scratch_count, |w| {
            self.write(w, header, section_start)
        })
    }

    fn read_common(r: &mut Reader<'_>, header: &Header) -> Result<Pane> {
        let flags = r.read_u8()?;
        let origin = r.read_u8()?;
        let alpha = r.read_u8()?;
        let mag_flags = r.read_u8()?;
        let name_width = if header.variant == Variant::Cafe {
            0x18
        } else {
            0x10
        };
        let name = r.read_fixed_str(name_width)?;
        let user_data_info = r.read_fixed_str(0x8)?;
        let translate = read_vec3(r)?;
        let rotate = read_vec3(r)?;
        let scale = read_vec2(r)?;
        let width = r.read_f32()?;
        let height = r.read_f32()?;

        let mut pane = Pane::new(name, PaneKind::Null);
        pane.flags = flags;
        pane.alpha = alpha;
        pane.mag_flags = mag_flags;
        pane.user_data_info = user_data_info;
        pane.translate = translate;
        pane.rotate = rotate;
        pane.scale = scale;
        pane.width = width;
        pane.height = height;

        if header.variant == Variant::Cafe {
            // own origin in the low nibble, parent origin in the high one,
            // both packed base 4
            let own = origin % 16;
            let parent = origin / 16;
            pane.origin_x = OriginX::from_index(own % 4);
            pane.origin_y = OriginY::from_index(own / 4);
            pane.parent_origin_x = OriginX::from_index(parent % 4);
            pane.parent_origin_y = OriginY::from_index(parent / 4);
        } else {
            // base-3 packing, Left/Top first; no parent origin on disk
            pane.origin_x = match origin % 3 {
                0 => OriginX::Left,
                1 => OriginX::Center,
                _ => OriginX::Right,
            };
            pane.origin_y = match origin / 3 {
                0 => OriginY::Top,
                1 => OriginY::Center,
                _ => OriginY::Bottom,
            };
        }

        Ok(pane)
    }

    fn write_common(&self, w: &mut Writer, header: &Header) -> Result<()> {
        let origin = if header.variant == Variant::Cafe {
            let own = self.origin_x.index() + self.origin_y.index() * 4;
            let parent = self.parent_origin_x.index() + self.parent_origin_y.index() * 4;
            own + parent * 16
        } else {
            let x = match self.origin_x {
                OriginX::Left => 0,
                OriginX::Center => 1,
                OriginX::Right => 2,
            };
            let y = match self.origin_y {
                OriginY::Top => 0,
                OriginY::Center => 1,
                OriginY::Bottom => 2,
            };
            x + y * 3
        };

        w.write_u8(self.flags);
        w.write_u8(origin);
        w.write_u8(self.alpha);
        w.write_u8(self.mag_flags);
        let name_width = if header.variant == Variant::Cafe {
            0x18
        } else {
            0x10
        };
        w.write_fixed_str(&self.name, name_width)?;
        w.write_fixed_str(&self.user_data_info, 0x8)?;
        write_vec3(w, self.translate);
        write_vec3(w, self.rotate);
        write_vec2(w, self.scale);
        w.write_f32(self.width);
        w.write_f32(self.height);
        Ok(())
    }
}
