//! Cafe-dialect material records.
//!
//! Two generations share the dialect: up to v7 the record opens with two
//! packed colors and then the flag word; from v8 the flag word comes first,
//! followed by a variable color table whose per-entry encoding (packed u32
//! vs four floats) is chosen bit-by-bit from a color-type byte.

use serde::{Deserialize, Serialize};

use super::{
    AlphaCompare, BlendMode, Diagnostic, FontShadowParameter, IndirectParameter, MaterialFlags,
    ProjectionTexGen, TexCoordGen, TexGenMatrixType, TexGenType, TextureExtension, TextureMap,
    TextureSrt,
};
use crate::color::Color;
use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::header::Header;
use crate::material::{read_vec4, write_vec4};
use crate::pane::{read_vec2, write_vec2};
use glam::{Vec2, Vec4};

/// Fixed-function combiner stage, packed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TevCombiner {
    pub color_flags: u8,
    pub alpha_flags: u8,
    pub reserved1: u8,
    pub reserved2: u8,
}

/// Combiner program entry of the detailed combiner block (v8+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetailedCombinerEntry {
    pub color_flags: i32,
    pub alpha_flags: i32,
    pub unknown1: u32,
    pub unknown2: u32,
}

impl DetailedCombinerEntry {
    pub fn color_source(&self, stage: usize) -> u8 {
        (self.color_flags >> (stage * 4) & 0xF) as u8
    }

    pub fn color_op(&self, stage: usize) -> u8 {
        (self.color_flags >> (12 + stage * 4) & 0xF) as u8
    }

    pub fn color_mode(&self) -> u8 {
        (self.color_flags >> 24 & 0xF) as u8
    }

    pub fn color_scale(&self) -> u8 {
        (self.color_flags >> 28 & 0x7) as u8
    }

    pub fn alpha_source(&self, stage: usize) -> u8 {
        (self.alpha_flags >> (stage * 4) & 0xF) as u8
    }

    pub fn alpha_op(&self, stage: usize) -> u8 {
        (self.alpha_flags >> (12 + stage * 4) & 0xF) as u8
    }

    pub fn alpha_mode(&self) -> u8 {
        (self.alpha_flags >> 24 & 0xF) as u8
    }

    pub fn alpha_scale(&self) -> u8 {
        (self.alpha_flags >> 28 & 0x7) as u8
    }
}

/// Detailed combiner block (v8+): constants plus one entry per combiner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetailedCombiner {
    pub value: u32,
    pub colors: [Color; 6],
    pub entries: Vec<DetailedCombinerEntry>,
}

/// Named shader combiner with constant colors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserCombiner {
    pub name: String,
    pub colors: [Color; 5],
}

/// Brick-repeat shader parameters (v9+ titles).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BrickRepeatShaderInfo {
    pub scale1: Vec2,
    pub offset1: Vec2,
    pub scale2: Vec2,
    pub offset2: Vec2,
    pub unknown1: Vec4,
    pub unknown2: Vec2,
    pub rotation_range: Vec2,
    pub unknown3: Vec2,
    pub unknown4: Vec4,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialCafe {
    pub name: String,
    /// Whole flag word as stored; count and presence bits are refreshed
    /// from the lists below on encode.
    pub flags: MaterialFlags,
    /// Bit per color entry: 0 packs to a u32, 1 stores four floats (v8+).
    pub color_type: u8,
    pub colors: Vec<Color>,
    pub textures: Vec<TextureMap>,
    pub texture_extensions: Vec<TextureExtension>,
    pub texture_srts: Vec<TextureSrt>,
    pub tex_coord_gens: Vec<TexCoordGen>,
    pub tev_combiners: Vec<TevCombiner>,
    pub alpha_compares: Vec<AlphaCompare>,
    pub color_blend: Option<BlendMode>,
    pub alpha_blend: Option<BlendMode>,
    pub indirect_srts: Vec<IndirectParameter>,
    pub detailed_combiner: Option<DetailedCombiner>,
    pub projection_tex_gens: Vec<ProjectionTexGen>,
    pub user_combiners: Vec<UserCombiner>,
    pub font_shadow: Option<FontShadowParameter>,
    pub brick_repeat_infos: Vec<BrickRepeatShaderInfo>,
}

impl MaterialCafe {
    pub fn black_color(&self) -> Color {
        self.colors.first().copied().unwrap_or(Color::BLACK)
    }

    pub fn white_color(&self) -> Color {
        self.colors.get(1).copied().unwrap_or(Color::WHITE)
    }

    /// Flag word with every count and presence bit recomputed from the live
    /// lists. The stored word is never trusted at encode time.
    pub fn resynced_flags(&self) -> MaterialFlags {
        let mut flags = self.flags;
        flags.set_tex_map_count(self.textures.len() as u8);
        flags.set_tex_srt_count(self.texture_srts.len() as u8);
        flags.set_tex_coord_gen_count(self.tex_coord_gens.len() as u8);
        flags.set_tev_combiner_count(self.tev_combiners.len() as u8);
        flags.set_alpha_compare_count(self.alpha_compares.len() as u8);
        flags.set_projection_tex_gen_count(self.projection_tex_gens.len() as u8);
        flags.set_indirect_srt_count(self.indirect_srts.len() as u8);
        flags.set_user_combiner_count(self.user_combiners.len() as u8);
        flags.set_brick_repeat_shader_info_count(self.brick_repeat_infos.len() as u8);
        flags.set_has_color_blend(self.color_blend.is_some());
        flags.set_has_alpha_blend(self.alpha_blend.is_some());
        flags.set_has_font_shadow_params(self.font_shadow.is_some());
        flags.set_use_detailed_combiner(self.detailed_combiner.is_some());
        flags.set_has_texture_extensions(!self.texture_extensions.is_empty());
        flags
    }

    pub fn read(
        r: &mut Reader<'_>,
        header: &Header,
        size: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<MaterialCafe> {
        let record_start = r.position();
        let mut mat = MaterialCafe {
            name: r.read_fixed_str(0x1C)?,
            ..MaterialCafe::default()
        };

        if header.version.major >= 8 {
            mat.flags = MaterialFlags::new(r.read_u32()?);

            let color_table_start = r.position();
            mat.color_type = r.read_u8()?;
            let color_count = r.read_u8()?;
            let color_offsets = r.read_bytes(color_count as usize)?.to_vec();

            for (i, &offset) in color_offsets.iter().enumerate() {
                let mut sub = r.at(color_table_start + offset as usize)?;
                if mat.color_type >> i & 1 == 0 {
                    mat.colors.push(Color::read_rgba32(&mut sub)?);
                } else {
                    mat.colors.push(Color::read_floats(&mut sub)?);
                }
                // color data follows the offset bytes; keep consuming past it
                r.seek(sub.position().max(r.position()))?;
            }
        } else {
            mat.colors.push(Color::read_rgba32(r)?);
            mat.colors.push(Color::read_rgba32(r)?);
            mat.flags = MaterialFlags::new(r.read_u32()?);
        }

        for _ in 0..mat.flags.tex_map_count() {
            mat.textures.push(TextureMap::read(r)?);
        }

        if mat.flags.has_texture_extensions() {
            mat.texture_extensions.push(TextureExtension {
                flags: r.read_i32()?,
            });
        }

        for _ in 0..mat.flags.tex_srt_count() {
            mat.texture_srts.push(TextureSrt::read(r)?);
        }

        for _ in 0..mat.flags.tex_coord_gen_count() {
            let mut gen = TexCoordGen {
                matrix_type: TexGenMatrixType::from_u8(r.read_u8()?),
                source: TexGenType::from_u8(r.read_u8()?),
                unknown: r.read_u16()?,
                unknown2: r.read_u32()?,
                unknown3: 0,
            };
            if header.version.major >= 8 {
                gen.unknown3 = r.read_u64()?;
            }
            mat.tex_coord_gens.push(gen);
        }

        for _ in 0..mat.flags.tev_combiner_count() {
            mat.tev_combiners.push(TevCombiner {
                color_flags: r.read_u8()?,
                alpha_flags: r.read_u8()?,
                reserved1: r.read_u8()?,
                reserved2: r.read_u8()?,
            });
        }

        for _ in 0..mat.flags.alpha_compare_count() {
            mat.alpha_compares.push(AlphaCompare::read(r)?);
        }

        if mat.flags.has_color_blend() {
            mat.color_blend = Some(BlendMode::read(r)?);
        }
        if mat.flags.has_alpha_blend() {
            mat.alpha_blend = Some(BlendMode::read(r)?);
        }

        for _ in 0..mat.flags.indirect_srt_count() {
            mat.indirect_srts.push(IndirectParameter::read(r)?);
        }

        if mat.flags.use_detailed_combiner() {
            let mut combiner = DetailedCombiner {
                value: r.read_u32()?,
                ..DetailedCombiner::default()
            };
            for color in &mut combiner.colors {
                *color = Color::read_rgba32(r)?;
            }
            for _ in 0..mat.flags.tev_combiner_count() {
                combiner.entries.push(DetailedCombinerEntry {
                    color_flags: r.read_i32()?,
                    alpha_flags: r.read_i32()?,
                    unknown1: r.read_u32()?,
                    unknown2: r.read_u32()?,
                });
            }
            mat.detailed_combiner = Some(combiner);
        }

        for _ in 0..mat.flags.projection_tex_gen_count() {
            mat.projection_tex_gens.push(ProjectionTexGen::read(r)?);
        }

        for _ in 0..mat.flags.user_combiner_count() {
            let mut combiner = UserCombiner {
                name: r.read_fixed_str(0x60)?,
                ..UserCombiner::default()
            };
            for color in &mut combiner.colors {
                *color = Color::read_rgba32(r)?;
            }
            mat.user_combiners.push(combiner);
        }

        if mat.flags.has_font_shadow_params() {
            mat.font_shadow = Some(FontShadowParameter {
                black_color: Color::read_rgba32(r)?,
                white_color: Color::read_rgba32(r)?,
            });
        }

        for _ in 0..mat.flags.brick_repeat_shader_info_count() {
            mat.brick_repeat_infos.push(BrickRepeatShaderInfo {
                scale1: read_vec2(r)?,
                offset1: read_vec2(r)?,
                scale2: read_vec2(r)?,
                offset2: read_vec2(r)?,
                unknown1: read_vec4(r)?,
                unknown2: read_vec2(r)?,
                rotation_range: read_vec2(r)?,
                unknown3: read_vec2(r)?,
                unknown4: read_vec4(r)?,
            });
        }

        let end = record_start + size;
        let leftover = end.saturating_sub(r.position());
        if leftover != 0 {
            log::warn!(
                "material {:?}: {} bytes left after decode (flags {:#010x})",
                mat.name,
                leftover,
                mat.flags.bits()
            );
            diagnostics.push(Diagnostic::MaterialSlack {
                material: mat.name.clone(),
                leftover,
                flags: mat.flags.bits(),
            });
        }

        Ok(mat)
    }

    pub fn write(&self, w: &mut Writer, header: &Header) -> Result<()> {
        let flags = self.resynced_flags();

        w.write_fixed_str(&self.name, 0x1C)?;

        if header.version.major >= 8 {
            w.write_u32(flags.bits());

            let color_table_start = w.position();
            w.write_u8(self.color_type);
            w.write_u8(self.colors.len() as u8);
            w.write_zeros(self.colors.len());

            for (i, color) in self.colors.iter().enumerate() {
                w.patch_offset_u8(color_table_start + 2 + i, color_table_start);
                if self.color_type >> i & 1 == 0 {
                    color.write_rgba32(w);
                } else {
                    color.write_floats(w);
                }
            }
        } else {
            self.black_color().write_rgba32(w);
            self.white_color().write_rgba32(w);
            w.write_u32(flags.bits());
        }

        for texture in &self.textures {
            texture.write(w);
        }

        if flags.has_texture_extensions() {
            w.write_i32(self.texture_extensions[0].flags);
        }

        for srt in &self.texture_srts {
            srt.write(w);
        }

        for gen in &self.tex_coord_gens {
            w.write_u8(gen.matrix_type.as_u8());
            w.write_u8(gen.source.as_u8());
            w.write_u16(gen.unknown);
            w.write_u32(gen.unknown2);
            if header.version.major >= 8 {
                w.write_u64(gen.unknown3);
            }
        }

        for combiner in &self.tev_combiners {
            w.write_u8(combiner.color_flags);
            w.write_u8(combiner.alpha_flags);
            w.write_u8(combiner.reserved1);
            w.write_u8(combiner.reserved2);
        }

        for compare in &self.alpha_compares {
            compare.write(w);
        }

        if let Some(blend) = &self.color_blend {
            blend.write(w);
        }
        if let Some(blend) = &self.alpha_blend {
            blend.write(w);
        }

        for indirect in &self.indirect_srts {
            indirect.write(w);
        }

        if let Some(combiner) = &self.detailed_combiner {
            w.write_u32(combiner.value);
            for color in &combiner.colors {
                color.write_rgba32(w);
            }
            for entry in &combiner.entries {
                w.write_i32(entry.color_flags);
                w.write_i32(entry.alpha_flags);
                w.write_u32(entry.unknown1);
                w.write_u32(entry.unknown2);
            }
        }

        for gen in &self.projection_tex_gens {
            gen.write(w);
        }

        for combiner in &self.user_combiners {
            w.write_fixed_str(&combiner.name, 0x60)?;
            for color in &combiner.colors {
                color.write_rgba32(w);
            }
        }

        if let Some(shadow) = &self.font_shadow {
            shadow.black_color.write_rgba32(w);
            shadow.white_color.write_rgba32(w);
        }

        for info in &self.brick_repeat_infos {
            write_vec2(w, info.scale1);
            write_vec2(w, info.offset1);
            write_vec2(w, info.scale2);
            write_vec2(w, info.offset2);
            write_vec4(w, info.unknown1);
            write_vec2(w, info.unknown2);
            write_vec2(w, info.rotation_range);
            write_vec2(w, info.unknown3);
            write_vec4(w, info.unknown4);
        }

        Ok(())
    }
}
