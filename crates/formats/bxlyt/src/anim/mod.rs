//! Animation container sections: tag info (`pat1`) and animation info
//! (`pai1`) with their groups, sub-groups, tracks and keyframes.
//!
//! Keyframe wire width depends on the track's interpolation kind and on
//! nothing else: Step packs a 16-bit value padded to 8 bytes, Hermite adds
//! a slope for 12, Constant is a plain frame/value pair of 8. The dispatch
//! is per track and applied identically on both directions.

pub mod targets;

use serde::{Deserialize, Serialize};

use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::header::Header;
use crate::section::{tags, SectionTag};
use crate::userdata::UserData;

/// What category of document object an animation group drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimTargetType {
    #[default]
    Pane,
    Material,
    User,
}

impl AnimTargetType {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => AnimTargetType::Material,
            2 => AnimTargetType::User,
            _ => AnimTargetType::Pane,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            AnimTargetType::Pane => 0,
            AnimTargetType::Material => 1,
            AnimTargetType::User => 2,
        }
    }
}

/// Keyframe interpolation kind; decides the on-wire keyframe width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveType {
    Constant,
    Step,
    #[default]
    Hermite,
}

impl CurveType {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => CurveType::Step,
            2 => CurveType::Hermite,
            _ => CurveType::Constant,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            CurveType::Constant => 0,
            CurveType::Step => 1,
            CurveType::Hermite => 2,
        }
    }
}

/// One keyframe. `slope` is meaningful for Hermite tracks only; Step tracks
/// quantize `value` to 16 bits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyFrame {
    pub frame: f32,
    pub value: f32,
    pub slope: f32,
}

/// A curve over one animatable field of one target.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimTrack {
    /// Index of the driven object (texture slot, color slot, ...).
    pub index: u8,
    /// Field selector; its meaning depends on the sub-group kind (see
    /// [`targets`]).
    pub target: u8,
    pub curve: CurveType,
    pub keys: Vec<KeyFrame>,
}

/// A run of tracks under one 4-character kind tag. The tag's first
/// character spells the platform family, the rest pick the target-field
/// enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimSubGroup {
    pub kind: SectionTag,
    pub tracks: Vec<AnimTrack>,
}

impl AnimSubGroup {
    pub fn read(r: &mut Reader<'_>) -> Result<AnimSubGroup> {
        let record_start = r.position();
        let kind = r.read_tag()?;
        let track_count = r.read_u8()?;
        r.skip(3)?;

        let offsets = r.read_offsets(track_count as usize)?;
        let mut tracks = Vec::with_capacity(track_count as usize);
        for offset in offsets {
            let target_start = record_start + offset as usize;
            let mut t = r.at(target_start)?;

            let index = t.read_u8()?;
            let target = t.read_u8()?;
            let curve = CurveType::from_u8(t.read_u8()?);
            t.skip(1)?;
            let key_count = t.read_u16()?;
            t.skip(2)?;
            let key_offset = t.read_u32()?;

            let mut k = r.at(target_start + key_offset as usize)?;
            let mut keys = Vec::with_capacity(key_count as usize);
            for _ in 0..key_count {
                keys.push(match curve {
                    CurveType::Step => {
                        let frame = k.read_f32()?;
                        let value = k.read_u16()? as f32;
                        k.skip(2)?;
                        KeyFrame {
                            frame,
                            value,
                            slope: 0.0,
                        }
                    }
                    CurveType::Hermite => KeyFrame {
                        frame: k.read_f32()?,
                        value: k.read_f32()?,
                        slope: k.read_f32()?,
                    },
                    CurveType::Constant => KeyFrame {
                        frame: k.read_f32()?,
                        value: k.read_f32()?,
                        slope: 0.0,
                    },
                });
            }
            // the cursor tracks the furthest record consumed so the caller
            // ends up past this sub-group
            r.seek(k.position().max(r.position()))?;

            tracks.push(AnimTrack {
                index,
                target,
                curve,
                keys,
            });
        }

        Ok(AnimSubGroup { kind, tracks })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        let record_start = w.position();
        w.write_tag(self.kind);
        w.write_u8(self.tracks.len() as u8);
        w.write_zeros(3);

        let table_start = w.reserve_u32_table(self.tracks.len());
        for (i, track) in self.tracks.iter().enumerate() {
            let target_start = w.position();
            w.patch_offset_u32(table_start + i * 4, record_start);

            w.write_u8(track.index);
            w.write_u8(track.target);
            w.write_u8(track.curve.as_u8());
            w.write_u8(0);
            w.write_u16(track.keys.len() as u16);
            w.write_u16(0);
            let key_slot = w.reserve_u32();

            w.patch_offset_u32(key_slot, target_start);
            for key in &track.keys {
                match track.curve {
                    CurveType::Step => {
                        w.write_f32(key.frame);
                        w.write_u16(key.value as u16);
                        w.write_u16(0);
                    }
                    CurveType::Hermite => {
                        w.write_f32(key.frame);
                        w.write_f32(key.value);
                        w.write_f32(key.slope);
                    }
                    CurveType::Constant => {
                        w.write_f32(key.frame);
                        w.write_f32(key.value);
                    }
                }
            }
        }
        Ok(())
    }
}

/// A named animation group targeting a pane, a material, or a user block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimGroup {
    /// Name of the targeted pane/material (fixed 20 bytes in v1 files,
    /// 28 from v2 on).
    pub name: String,
    pub target: AnimTargetType,
    pub sub_groups: Vec<AnimSubGroup>,
    /// User-target extension record (User groups only).
    pub user_value: u32,
    pub user_name: String,
}

impl Default for AnimGroup {
    fn default() -> Self {
        AnimGroup {
            name: String::new(),
            target: AnimTargetType::Pane,
            sub_groups: Vec::new(),
            user_value: 4,
            user_name: String::new(),
        }
    }
}

impl AnimGroup {
    fn name_width(header: &Header) -> usize {
        if header.version.major == 1 {
            20
        } else {
            28
        }
    }

    pub fn read(r: &mut Reader<'_>, header: &Header) -> Result<AnimGroup> {
        let record_start = r.position();
        let mut group = AnimGroup {
            name: r.read_fixed_str(Self::name_width(header))?,
            ..AnimGroup::default()
        };
        let tag_count = r.read_u8()?;
        group.target = AnimTargetType::from_u8(r.read_u8()?);
        r.skip(2)?;

        let offsets = r.read_offsets(tag_count as usize)?;

        if group.target == AnimTargetType::User {
            let user_offset = r.read_u32()?;
            let mut user = r.at(record_start + user_offset as usize)?;
            group.user_value = user.read_u32()?;
            group.user_name = user.read_fixed_str(16)?;
        }

        for offset in offsets {
            let mut sub = r.at(record_start + offset as usize)?;
            // user-target entries add one more indirection level
            if group.target == AnimTargetType::User {
                let tag_offset = sub.read_u32()?;
                sub = r.at(record_start + tag_offset as usize)?;
            }
            group.sub_groups.push(AnimSubGroup::read(&mut sub)?);
        }

        Ok(group)
    }

    pub fn write(&self, w: &mut Writer, header: &Header) -> Result<()> {
        let record_start = w.position();
        w.write_fixed_str(&self.name, Self::name_width(header))?;
        w.write_u8(self.sub_groups.len() as u8);
        w.write_u8(self.target.as_u8());
        w.write_u16(0);

        let table_start = w.reserve_u32_table(self.sub_groups.len());
        let user_slot = if self.target == AnimTargetType::User {
            Some(w.reserve_u32())
        } else {
            None
        };

        for (i, sub_group) in self.sub_groups.iter().enumerate() {
            w.patch_offset_u32(table_start + i * 4, record_start);
            if self.target == AnimTargetType::User {
                // indirection word pointing just past itself
                let offset = w.position() - record_start + 4;
                w.write_u32(offset as u32);
            }
            sub_group.write(w)?;
        }

        if let Some(slot) = user_slot {
            w.patch_offset_u32(slot, record_start);
            w.write_u32(self.user_value);
            w.write_fixed_str(&self.user_name, 16)?;
        }
        Ok(())
    }
}

/// The `pai1` section: frame range, referenced textures, and all groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationInfo {
    pub frame_size: u16,
    pub loops: bool,
    /// Texture names consumed by texture-pattern tracks.
    pub textures: Vec<String>,
    pub groups: Vec<AnimGroup>,
}

impl AnimationInfo {
    pub fn read(r: &mut Reader<'_>, header: &Header, section_start: usize) -> Result<AnimationInfo> {
        let mut info = AnimationInfo {
            frame_size: r.read_u16()?,
            loops: r.read_bool()?,
            ..AnimationInfo::default()
        };
        r.skip(1)?;
        let texture_count = r.read_u16()? as usize;
        let group_count = r.read_u16()? as usize;
        let group_table_offset = r.read_u32()?;

        let texture_table_start = r.position();
        let texture_offsets = r.read_offsets(texture_count)?;
        for offset in texture_offsets {
            info.textures
                .push(r.at(texture_table_start + offset as usize)?.read_cstr()?);
        }

        let mut table = r.at(section_start + group_table_offset as usize)?;
        let group_offsets = table.read_offsets(group_count)?;
        for offset in group_offsets {
            let mut sub = r.at(section_start + offset as usize)?;
            info.groups.push(AnimGroup::read(&mut sub, header)?);
        }

        Ok(info)
    }

    pub fn write(&self, w: &mut Writer, header: &Header, section_start: usize) -> Result<()> {
        w.write_u16(self.frame_size);
        w.write_bool(self.loops);
        w.write_u8(0);
        w.write_u16(self.textures.len() as u16);
        w.write_u16(self.groups.len() as u16);
        let group_table_slot = w.reserve_u32();

        if !self.textures.is_empty() {
            let table_start = w.reserve_u32_table(self.textures.len());
            for (i, texture) in self.textures.iter().enumerate() {
                w.patch_offset_u32(table_start + i * 4, table_start);
                w.write_cstr(texture);
            }
            w.align(4);
        }

        if !self.groups.is_empty() {
            w.patch_offset_u32(group_table_slot, section_start);
            let table_start = w.reserve_u32_table(self.groups.len());
            for (i, group) in self.groups.iter().enumerate() {
                w.patch_offset_u32(table_start + i * 4, section_start);
                group.write(w, header)?;
            }
        }
        Ok(())
    }
}

/// The `pat1` section: play order, frame range, and bound group names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TagInfo {
    pub order: u16,
    pub name: String,
    pub start_frame: i16,
    pub end_frame: i16,
    /// Propagate the animation to bound child layouts.
    pub child_binding: bool,
    pub unknown: [u8; 3],
    pub groups: Vec<String>,
    /// Attached user data (v8+ files only).
    pub user_data: Option<UserData>,
}

impl TagInfo {
    fn group_width(header: &Header) -> usize {
        match header.version.major {
            1 => 20,
            2..=7 => 28,
            _ => 36,
        }
    }

    pub fn read(r: &mut Reader<'_>, header: &Header, section_start: usize) -> Result<TagInfo> {
        let mut tag = TagInfo {
            order: r.read_u16()?,
            ..TagInfo::default()
        };
        let group_count = r.read_u16()? as usize;
        let name_offset = r.read_u32()?;
        let group_names_offset = r.read_u32()?;
        let user_data_offset = if header.version.major >= 8 {
            r.read_u32()?
        } else {
            0
        };
        tag.start_frame = r.read_i16()?;
        tag.end_frame = r.read_i16()?;
        tag.child_binding = r.read_bool()?;
        tag.unknown.copy_from_slice(r.read_bytes(3)?);

        tag.name = r.at(section_start + name_offset as usize)?.read_cstr()?;

        let width = Self::group_width(header);
        let mut names = r.at(section_start + group_names_offset as usize)?;
        for _ in 0..group_count {
            tag.groups.push(names.read_fixed_str(width)?);
        }

        if user_data_offset != 0 {
            let block_start = section_start + user_data_offset as usize;
            let mut sub = r.at(block_start)?;
            sub.expect_tag(tags::USD1)?;
            let _size = sub.read_u32()?;
            tag.user_data = Some(UserData::read(&mut sub, block_start)?);
        }

        Ok(tag)
    }

    pub fn write(&self, w: &mut Writer, header: &Header, section_start: usize) -> Result<()> {
        w.write_u16(self.order);
        w.write_u16(self.groups.len() as u16);
        let name_slot = w.reserve_u32();
        let group_names_slot = w.reserve_u32();
        let user_slot = if header.version.major >= 8 {
            Some(w.reserve_u32())
        } else {
            None
        };
        w.write_i16(self.start_frame);
        w.write_i16(self.end_frame);
        w.write_bool(self.child_binding);
        w.write_bytes(&self.unknown);

        w.patch_offset_u32(name_slot, section_start);
        w.write_cstr(&self.name);
        w.align(4);

        w.patch_offset_u32(group_names_slot, section_start);
        let width = Self::group_width(header);
        for group in &self.groups {
            w.write_fixed_str(group, width)?;
        }
        w.align(4);

        if let (Some(slot), Some(user_data)) = (user_slot, &self.user_data) {
            w.patch_offset_u32(slot, section_start);
            let usd_start = w.position();
            w.write_tag(tags::USD1);
            let size_slot = w.reserve_u32();
            user_data.write(w)?;
            w.align(4);
            w.patch_u32(size_slot, (w.position() - usd_start) as u32);
        }
        Ok(())
    }
}
