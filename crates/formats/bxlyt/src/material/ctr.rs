//! Ctr-dialect material records.
//!
//! Fixed prologue of seven packed colors, then the shared flag-word-driven
//! field groups. Combiners carry their own packed stage words plus a
//! constant-color selector.

use serde::{Deserialize, Serialize};

use super::{
    AlphaCompare, BlendMode, Diagnostic, FontShadowParameter, IndirectParameter, MaterialFlags,
    ProjectionTexGen, TexCoordGen, TexGenMatrixType, TexGenType, TextureMap, TextureSrt,
};
use crate::color::Color;
use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::header::Header;

/// Combiner stage in the Ctr packing: two stage words plus constant colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TevCombinerCtr {
    pub color_flags: u32,
    pub alpha_flags: u32,
    pub const_colors: u32,
}

impl TevCombinerCtr {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            color_flags: r.read_u32()?,
            alpha_flags: r.read_u32()?,
            const_colors: r.read_u32()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u32(self.color_flags);
        w.write_u32(self.alpha_flags);
        w.write_u32(self.const_colors);
    }

    pub fn color_source(&self, stage: usize) -> u8 {
        (self.color_flags >> (stage * 4) & 0xF) as u8
    }

    pub fn color_operator(&self, stage: usize) -> u8 {
        (self.color_flags >> (12 + stage * 4) & 0xF) as u8
    }

    pub fn color_mode(&self) -> u8 {
        (self.color_flags >> 24 & 0xF) as u8
    }

    pub fn color_scale(&self) -> u8 {
        (self.color_flags >> 28 & 0x3) as u8
    }

    pub fn color_save_prev_reg(&self) -> bool {
        self.color_flags >> 30 & 0x1 != 0
    }

    pub fn alpha_source(&self, stage: usize) -> u8 {
        (self.alpha_flags >> (stage * 4) & 0xF) as u8
    }

    pub fn alpha_operator(&self, stage: usize) -> u8 {
        (self.alpha_flags >> (12 + stage * 4) & 0xF) as u8
    }

    pub fn alpha_mode(&self) -> u8 {
        (self.alpha_flags >> 24 & 0xF) as u8
    }

    pub fn alpha_scale(&self) -> u8 {
        (self.alpha_flags >> 28 & 0x3) as u8
    }

    pub fn alpha_save_prev_reg(&self) -> bool {
        self.alpha_flags >> 30 & 0x1 != 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialCtr {
    pub name: String,
    pub flags: MaterialFlags,
    pub black_color: Color,
    pub white_color: Color,
    pub tev_colors: [Color; 5],
    pub textures: Vec<TextureMap>,
    pub texture_srts: Vec<TextureSrt>,
    pub tex_coord_gens: Vec<TexCoordGen>,
    pub tev_combiners: Vec<TevCombinerCtr>,
    pub alpha_compares: Vec<AlphaCompare>,
    pub color_blend: Option<BlendMode>,
    pub alpha_blend: Option<BlendMode>,
    pub indirect_srts: Vec<IndirectParameter>,
    pub projection_tex_gens: Vec<ProjectionTexGen>,
    pub font_shadow: Option<FontShadowParameter>,
}

impl MaterialCtr {
    /// Flag word recomputed from the live lists; see the Cafe codec.
    pub fn resynced_flags(&self) -> MaterialFlags {
        let mut flags = self.flags;
        flags.set_tex_map_count(self.textures.len() as u8);
        flags.set_tex_srt_count(self.texture_srts.len() as u8);
        flags.set_tex_coord_gen_count(self.tex_coord_gens.len() as u8);
        flags.set_tev_combiner_count(self.tev_combiners.len() as u8);
        flags.set_alpha_compare_count(self.alpha_compares.len() as u8);
        flags.set_projection_tex_gen_count(self.projection_tex_gens.len() as u8);
        flags.set_indirect_srt_count(self.indirect_srts.len() as u8);
        flags.set_has_color_blend(self.color_blend.is_some());
        flags.set_has_alpha_blend(self.alpha_blend.is_some());
        flags.set_has_font_shadow_params(self.font_shadow.is_some());
        flags
    }

    pub fn read(
        r: &mut Reader<'_>,
        _header: &Header,
        size: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<MaterialCtr> {
        let record_start = r.position();

        let mut mat = MaterialCtr {
            name: r.read_fixed_str(0x14)?,
            black_color: Color::read_rgba32(r)?,
            white_color: Color::read_rgba32(r)?,
            ..MaterialCtr::default()
        };
        for color in &mut mat.tev_colors {
            *color = Color::read_rgba32(r)?;
        }
        mat.flags = MaterialFlags::new(r.read_u32()?);

        for _ in 0..mat.flags.tex_map_count() {
            mat.textures.push(TextureMap::read(r)?);
        }

        for _ in 0..mat.flags.tex_srt_count() {
            mat.texture_srts.push(TextureSrt::read(r)?);
        }

        for _ in 0..mat.flags.tex_coord_gen_count() {
            mat.tex_coord_gens.push(TexCoordGen {
                matrix_type: TexGenMatrixType::from_u8(r.read_u8()?),
                source: TexGenType::from_u8(r.read_u8()?),
                unknown: r.read_u16()?,
                unknown2: 0,
                unknown3: 0,
            });
        }

        for _ in 0..mat.flags.tev_combiner_count() {
            mat.tev_combiners.push(TevCombinerCtr::read(r)?);
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

        for _ in 0..mat.flags.projection_tex_gen_count() {
            mat.projection_tex_gens.push(ProjectionTexGen::read(r)?);
        }

        if mat.flags.has_font_shadow_params() {
            mat.font_shadow = Some(FontShadowParameter {
                black_color: Color::read_rgba32(r)?,
                white_color: Color::read_rgba32(r)?,
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

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        let flags = self.resynced_flags();

        w.write_fixed_str(&self.name, 0x14)?;
        self.black_color.write_rgba32(w);
        self.white_color.write_rgba32(w);
        for color in &self.tev_colors {
            color.write_rgba32(w);
        }
        w.write_u32(flags.bits());

        for texture in &self.textures {
            texture.write(w);
        }

        for srt in &self.texture_srts {
            srt.write(w);
        }

        for gen in &self.tex_coord_gens {
            w.write_u8(gen.matrix_type.as_u8());
            w.write_u8(gen.source.as_u8());
            w.write_u16(gen.unknown);
        }

        for combiner in &self.tev_combiners {
            combiner.write(w);
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

        for gen in &self.projection_tex_gens {
            gen.write(w);
        }

        if let Some(shadow) = &self.font_shadow {
            shadow.black_color.write_rgba32(w);
            shadow.white_color.write_rgba32(w);
        }

        Ok(())
    }
}
