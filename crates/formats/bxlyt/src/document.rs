//! Document roots: the layout container ([`LayoutDocument`]) and the
//! animation container ([`AnimDocument`]).
//!
//! Decoding walks the section stream once, dispatching each tag to its
//! codec and feeding the pane/group marker sections through the tree
//! assemblers; anything unrecognized is preserved verbatim. Encoding
//! regenerates the stream in the canonical section order and back-patches
//! the header's file size and section count.

use serde::{Deserialize, Serialize};

use crate::control::ControlSource;
use crate::cursor::{Endian, Reader, Writer};
use crate::error::{Error, Result};
use crate::group::Group;
use crate::header::{Family, Header};
use crate::layout::Layout;
use crate::material::{Diagnostic, MaterialTable};
use crate::anim::{AnimationInfo, TagInfo};
use crate::pane::Pane;
use crate::section::{read_sections, tags, write_section, UnsupportedSection};
use crate::strings::{read_string_table, write_string_table};
use crate::tree::TreeAssembler;
use crate::userdata::UserData;

/// Capture texture layer (`ctl1`), kept as an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureTextureLayer {
    pub data: Vec<u8>,
}

/// A decoded layout container (`FLYT`/`CLYT`/`RLYT`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub header: Header,
    pub layout: Option<Layout>,
    pub texture_list: Vec<String>,
    pub font_list: Vec<String>,
    /// Document-level user data blocks (not attached to any pane).
    pub user_data: Vec<UserData>,
    pub materials: MaterialTable,
    pub root: Option<Pane>,
    pub root_group: Option<Group>,
    pub capture_texture_layer: Option<CaptureTextureLayer>,
    pub control_source: Option<ControlSource>,
    /// Unrecognized sections, re-emitted verbatim in order.
    pub unsupported: Vec<UnsupportedSection>,
    /// Non-fatal findings from the last decode; not part of the document.
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl LayoutDocument {
    /// Whether `data` starts like a layout container.
    pub fn sniff(data: &[u8]) -> bool {
        crate::header::sniff(data) == Some(Family::Layout)
    }

    pub fn new(header: Header) -> Self {
        LayoutDocument {
            header,
            layout: None,
            texture_list: Vec::new(),
            font_list: Vec::new(),
            user_data: Vec::new(),
            materials: MaterialTable::default(),
            root: None,
            root_group: None,
            capture_texture_layer: None,
            control_source: None,
            unsupported: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn decode(data: &[u8]) -> Result<LayoutDocument> {
        let mut r = Reader::new(data);
        let (header, family, section_count) = Header::read(&mut r)?;
        if family != Family::Layout {
            return Err(Error::WrongFamily {
                expected: "layout",
                found: "animation",
            });
        }

        let mut doc = LayoutDocument::new(header);
        let mut panes: TreeAssembler<Pane> = TreeAssembler::new();
        let mut groups: TreeAssembler<Group> = TreeAssembler::new();

        let header = doc.header.clone();
        read_sections(&mut r, section_count, |r, tag, size| {
            let section_start = r.position() - 8;
            match tag {
                tags::LYT1 => doc.layout = Some(Layout::read(r, header.version)?),
                tags::TXL1 => doc.texture_list = read_string_table(r, header.variant)?,
                tags::FNL1 => doc.font_list = read_string_table(r, header.variant)?,
                tags::MAT1 => {
                    doc.materials =
                        MaterialTable::read(r, &header, section_start, size, &mut doc.diagnostics)?
                }
                tags::PAN1 | tags::PIC1 | tags::TXT1 | tags::WND1 | tags::PRT1 | tags::BND1
                | tags::SCR1 | tags::ALI1 => {
                    panes.emit(Pane::read(r, tag, &header, section_start, size)?)
                }
                tags::PAS1 => panes.descend()?,
                tags::PAE1 => panes.ascend()?,
                tags::GRP1 => groups.emit(Group::read(r, header.variant, header.version)?),
                tags::GRS1 => groups.descend()?,
                tags::GRE1 => groups.ascend()?,
                tags::CNT1 => doc.control_source = Some(ControlSource::read(r, section_start)?),
                tags::CTL1 => {
                    doc.capture_texture_layer = Some(CaptureTextureLayer {
                        data: r.read_bytes(size as usize - 8)?.to_vec(),
                    })
                }
                tags::USD1 => {
                    let usd = UserData::read(r, section_start)?;
                    if let Some(control) = &mut doc.control_source {
                        control.user_data = Some(usd);
                    } else if let Some(pane) = panes.current_mut() {
                        pane.user_data = Some(usd);
                    } else {
                        doc.user_data.push(usd);
                    }
                }
                _ => doc.unsupported.push(UnsupportedSection {
                    tag,
                    data: r.read_bytes(size as usize - 8)?.to_vec(),
                }),
            }
            Ok(())
        })?;

        doc.root = panes.finish(|parent, child| parent.children.push(child))?;
        doc.root_group = groups.finish(|parent, child| parent.children.push(child))?;

        Ok(doc)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new(Endian::Big);
        let slots = self.header.write(&mut w, Family::Layout);
        let mut count = 0u16;

        if let Some(layout) = &self.layout {
            write_section(&mut w, tags::LYT1, &mut count, |w| {
                layout.write(w, self.header.version)
            })?;
        }

        for usd in &self.user_data {
            write_section(&mut w, tags::USD1, &mut count, |w| usd.write(w))?;
        }

        if !self.texture_list.is_empty() {
            write_section(&mut w, tags::TXL1, &mut count, |w| {
                write_string_table(w, &self.texture_list, self.header.variant)
            })?;
        }
        if !self.font_list.is_empty() {
            write_section(&mut w, tags::FNL1, &mut count, |w| {
                write_string_table(w, &self.font_list, self.header.variant)
            })?;
        }

        if !self.materials.is_empty() {
            let section_start = w.position();
            write_section(&mut w, tags::MAT1, &mut count, |w| {
                self.materials.write(w, &self.header, section_start)
            })?;
        }

        if let Some(capture) = &self.capture_texture_layer {
            write_section(&mut w, tags::CTL1, &mut count, |w| {
                w.write_bytes(&capture.data);
                Ok(())
            })?;
        }

        if let Some(root) = &self.root {
            self.write_panes(&mut w, root, &mut count)?;
        }

        if let Some(root_group) = &self.root_group {
            self.write_groups(&mut w, root_group, &mut count)?;
        }

        if let Some(control) = &self.control_source {
            let section_start = w.position();
            write_section(&mut w, tags::CNT1, &mut count, |w| {
                control.write(w, section_start)
            })?;
            if let Some(usd) = &control.user_data {
                write_section(&mut w, tags::USD1, &mut count, |w| usd.write(w))?;
            }
        }

        for section in &self.unsupported {
            write_section(&mut w, section.tag, &mut count, |w| {
                w.write_bytes(&section.data);
                Ok(())
            })?;
        }

        slots.finish(&mut w, count);
        Ok(w.into_bytes())
    }

    fn write_panes(&self, w: &mut Writer, pane: &Pane, count: &mut u16) -> Result<()> {
        let section_start = w.position();
        write_section(w, pane.kind.tag(), count, |w| {
            pane.write(w, &self.header, section_start)
        })?;

        if let Some(usd) = &pane.user_data {
            write_section(w, tags::USD1, count, |w| usd.write(w))?;
        }

        if !pane.children.is_empty() {
            write_section(w, tags::PAS1, count, |_| Ok(()))?;
            for child in &pane.children {
                self.write_panes(w, child, count)?;
            }
            write_section(w, tags::PAE1, count, |_| Ok(()))?;
        }
        Ok(())
    }

    fn write_groups(&self, w: &mut Writer, group: &Group, count: &mut u16) -> Result<()> {
        write_section(w, tags::GRP1, count, |w| {
            group.write(w, self.header.variant, self.header.version)
        })?;

        if !group.children.is_empty() {
            write_section(w, tags::GRS1, count, |_| Ok(()))?;
            for child in &group.children {
                self.write_groups(w, child, count)?;
            }
            write_section(w, tags::GRE1, count, |_| Ok(()))?;
        }
        Ok(())
    }

    /// All panes in depth-first order, or an empty iterator without a root.
    pub fn panes(&self) -> impl Iterator<Item = &Pane> {
        self.root.iter().flat_map(|root| root.iter())
    }

    /// Find a pane by name anywhere in the tree.
    pub fn find_pane(&self, name: &str) -> Option<&Pane> {
        self.root.as_ref().and_then(|root| root.find(name))
    }
}

/// A decoded animation container (`FLAN`/`CLAN`/`RLAN`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimDocument {
    pub header: Header,
    pub tag_info: Option<TagInfo>,
    pub animation: Option<AnimationInfo>,
    pub unsupported: Vec<UnsupportedSection>,
}

impl AnimDocument {
    /// Whether `data` starts like an animation container.
    pub fn sniff(data: &[u8]) -> bool {
        crate::header::sniff(data) == Some(Family::Animation)
    }

    pub fn new(header: Header) -> Self {
        AnimDocument {
            header,
            tag_info: None,
            animation: None,
            unsupported: Vec::new(),
        }
    }

    pub fn decode(data: &[u8]) -> Result<AnimDocument> {
        let mut r = Reader::new(data);
        let (header, family, section_count) = Header::read(&mut r)?;
        if family != Family::Animation {
            return Err(Error::WrongFamily {
                expected: "animation",
                found: "layout",
            });
        }

        let mut doc = AnimDocument::new(header);
        let header = doc.header.clone();
        read_sections(&mut r, section_count, |r, tag, size| {
            let section_start = r.position() - 8;
            match tag {
                tags::PAT1 => doc.tag_info = Some(TagInfo::read(r, &header, section_start)?),
                tags::PAI1 => {
                    doc.animation = Some(AnimationInfo::read(r, &header, section_start)?)
                }
                _ => doc.unsupported.push(UnsupportedSection {
                    tag,
                    data: r.read_bytes(size as usize - 8)?.to_vec(),
                }),
            }
            Ok(())
        })?;

        Ok(doc)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new(Endian::Big);
        let slots = self.header.write(&mut w, Family::Animation);
        let mut count = 0u16;

        if let Some(tag_info) = &self.tag_info {
            let section_start = w.position();
            write_section(&mut w, tags::PAT1, &mut count, |w| {
                tag_info.write(w, &self.header, section_start)
            })?;
        }

        if let Some(animation) = &self.animation {
            let section_start = w.position();
            write_section(&mut w, tags::PAI1, &mut count, |w| {
                animation.write(w, &self.header, section_start)
            })?;
        }

        for section in &self.unsupported {
            write_section(&mut w, section.tag, &mut count, |w| {
                w.write_bytes(&section.data);
                Ok(())
            })?;
        }

        slots.finish(&mut w, count);
        Ok(w.into_bytes())
    }
}
