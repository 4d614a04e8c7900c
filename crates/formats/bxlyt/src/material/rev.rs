//! Rev-dialect material records.
//!
//! The oldest dialect: wide 16-bit color registers, fixed-function TEV
//! stages packed bit-by-bit into 16-byte records, and its own flag-word
//! layout ([`RevMaterialFlags`]). Field groups still follow the flag word
//! in a fixed order with no tags.

use serde::{Deserialize, Serialize};

use super::{BlendMode, GfxAlphaFunction, GfxAlphaOp, RevMaterialFlags, TextureMap, TextureSrt};
use crate::color::{Color, Color16};
use crate::cursor::{Reader, Writer};
use crate::error::Result;

/// Texture coordinate generator, fixed 4-byte form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RevTexCoordGen {
    pub kind: u8,
    pub source: u8,
    pub matrix_source: u8,
    pub unknown: u8,
}

impl RevTexCoordGen {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            kind: r.read_u8()?,
            source: r.read_u8()?,
            matrix_source: r.read_u8()?,
            unknown: r.read_u8()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u8(self.kind);
        w.write_u8(self.source);
        w.write_u8(self.matrix_source);
        w.write_u8(self.unknown);
    }
}

/// Color/alpha channel material source selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChanCtrl {
    pub color_material_source: u8,
    pub alpha_material_source: u8,
}

impl ChanCtrl {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let ctrl = Self {
            color_material_source: r.read_u8()?,
            alpha_material_source: r.read_u8()?,
        };
        r.skip(2)?;
        Ok(ctrl)
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u8(self.color_material_source);
        w.write_u8(self.alpha_material_source);
        w.write_zeros(2);
    }
}

/// TEV channel swap table: four swap selections, one byte each, channels
/// packed two bits apiece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TevSwapModeTable {
    pub swaps: [TevSwap; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TevSwap {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl TevSwapModeTable {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let mut table = Self::default();
        for swap in &mut table.swaps {
            let packed = r.read_u8()?;
            swap.red = packed & 0x3;
            swap.green = packed >> 2 & 0x3;
            swap.blue = packed >> 4 & 0x3;
            swap.alpha = packed >> 6 & 0x3;
        }
        Ok(table)
    }

    pub fn write(&self, w: &mut Writer) {
        for swap in &self.swaps {
            w.write_u8(
                swap.red & 0x3 | (swap.green & 0x3) << 2 | (swap.blue & 0x3) << 4
                    | (swap.alpha & 0x3) << 6,
            );
        }
    }
}

/// Indirect stage order entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndirectStage {
    pub tex_coord: u8,
    pub tex_map: u8,
    pub scale_s: u8,
    pub scale_t: u8,
}

impl IndirectStage {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            tex_coord: r.read_u8()?,
            tex_map: r.read_u8()?,
            scale_s: r.read_u8()?,
            scale_t: r.read_u8()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u8(self.tex_coord);
        w.write_u8(self.tex_map);
        w.write_u8(self.scale_s);
        w.write_u8(self.scale_t);
    }
}

/// One fixed-function TEV stage, 16 bytes on the wire with sub-byte packing
/// throughout. Fields hold the unpacked selector values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TevStage {
    pub tex_coord: u8,
    pub color: u8,
    pub tex_map: u16,
    pub ras_sel: u8,
    pub tex_sel: u8,

    pub color_a: u8,
    pub color_b: u8,
    pub color_c: u8,
    pub color_d: u8,
    pub color_op: u8,
    pub color_bias: u8,
    pub color_scale: u8,
    pub color_clamp: bool,
    pub color_reg_id: u8,
    pub color_constant_sel: u8,

    pub alpha_a: u8,
    pub alpha_b: u8,
    pub alpha_c: u8,
    pub alpha_d: u8,
    pub alpha_op: u8,
    pub alpha_bias: u8,
    pub alpha_scale: u8,
    pub alpha_clamp: bool,
    pub alpha_reg_id: u8,
    pub alpha_constant_sel: u8,

    pub ind_tex_id: u8,
    pub ind_bias: u8,
    pub ind_matrix: u8,
    pub ind_wrap_s: u8,
    pub ind_wrap_t: u8,
    pub ind_format: u8,
    pub ind_use_previous_stage: u8,
    pub ind_unmodified_lod: u8,
    pub ind_alpha_sel: u8,
}

impl TevStage {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let mut stage = TevStage {
            tex_coord: r.read_u8()?,
            color: r.read_u8()?,
            ..TevStage::default()
        };

        let packed = r.read_u16()?;
        stage.tex_map = packed & 0x1FF;
        stage.ras_sel = ((packed & 0x7FF) >> 9) as u8;
        stage.tex_sel = (packed >> 11) as u8;

        let packed = r.read_u8()?;
        stage.color_a = packed & 0xF;
        stage.color_b = packed >> 4;
        let packed = r.read_u8()?;
        stage.color_c = packed & 0xF;
        stage.color_d = packed >> 4;
        let packed = r.read_u8()?;
        stage.color_op = packed & 0xF;
        stage.color_bias = (packed & 0x3F) >> 4;
        stage.color_scale = packed >> 6;
        let packed = r.read_u8()?;
        stage.color_clamp = packed & 0x1 != 0;
        stage.color_reg_id = (packed & 0x7) >> 1;
        stage.color_constant_sel = packed >> 3;

        let packed = r.read_u8()?;
        stage.alpha_a = packed & 0xF;
        stage.alpha_b = packed >> 4;
        let packed = r.read_u8()?;
        stage.alpha_c = packed & 0xF;
        stage.alpha_d = packed >> 4;
        let packed = r.read_u8()?;
        stage.alpha_op = packed & 0xF;
        stage.alpha_bias = (packed & 0x3F) >> 4;
        stage.alpha_scale = packed >> 6;
        let packed = r.read_u8()?;
        stage.alpha_clamp = packed & 0x1 != 0;
        stage.alpha_reg_id = (packed & 0x7) >> 1;
        stage.alpha_constant_sel = packed >> 3;

        let packed = r.read_u8()?;
        stage.ind_tex_id = packed & 0x3;
        let packed = r.read_u8()?;
        stage.ind_bias = packed & 0x7;
        stage.ind_matrix = (packed & 0x7F) >> 3;
        let packed = r.read_u8()?;
        stage.ind_wrap_s = packed & 0x7;
        stage.ind_wrap_t = (packed & 0x3F) >> 3;
        let packed = r.read_u8()?;
        stage.ind_format = packed & 0x3;
        stage.ind_use_previous_stage = (packed & 0x7) >> 2;
        stage.ind_unmodified_lod = (packed & 0xF) >> 3;
        stage.ind_alpha_sel = (packed & 0x3F) >> 4;

        Ok(stage)
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u8(self.tex_coord);
        w.write_u8(self.color);

        let packed = (self.tex_sel as u16 & 0x3F) << 11
            | (self.ras_sel as u16 & 0x7) << 9
            | self.tex_map & 0x1FF;
        w.write_u16(packed);

        w.write_u8((self.color_b & 0xF) << 4 | self.color_a & 0xF);
        w.write_u8((self.color_d & 0xF) << 4 | self.color_c & 0xF);
        w.write_u8((self.color_scale & 0x3) << 6 | (self.color_bias & 0x3) << 4 | self.color_op & 0xF);
        w.write_u8(
            (self.color_constant_sel & 0x1F) << 3
                | (self.color_reg_id & 0x7) << 1
                | self.color_clamp as u8,
        );

        w.write_u8((self.alpha_b & 0xF) << 4 | self.alpha_a & 0xF);
        w.write_u8((self.alpha_d & 0xF) << 4 | self.alpha_c & 0xF);
        w.write_u8((self.alpha_scale & 0x3) << 6 | (self.alpha_bias & 0x3) << 4 | self.alpha_op & 0xF);
        w.write_u8(
            (self.alpha_constant_sel & 0x1F) << 3
                | (self.alpha_reg_id & 0x7) << 1
                | self.alpha_clamp as u8,
        );

        w.write_u8(self.ind_tex_id & 0x3);
        w.write_u8((self.ind_matrix & 0x1F) << 3 | self.ind_bias & 0x7);
        w.write_u8((self.ind_wrap_t & 0x7) << 3 | self.ind_wrap_s & 0x7);
        w.write_u8(
            (self.ind_alpha_sel & 0xF) << 4
                | (self.ind_unmodified_lod & 0x1) << 3
                | (self.ind_use_previous_stage & 0x1) << 2
                | self.ind_format & 0x3,
        );
    }
}

/// Two-comparator alpha test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevAlphaCompare {
    pub comp0: GfxAlphaFunction,
    pub comp1: GfxAlphaFunction,
    pub op: GfxAlphaOp,
    pub ref0: u8,
    pub ref1: u8,
}

impl Default for RevAlphaCompare {
    fn default() -> Self {
        Self {
            comp0: GfxAlphaFunction::Always,
            comp1: GfxAlphaFunction::Always,
            op: GfxAlphaOp::And,
            ref0: 0,
            ref1: 0,
        }
    }
}

impl RevAlphaCompare {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let packed = r.read_u8()?;
        Ok(Self {
            comp0: GfxAlphaFunction::from_u8(packed & 0x7),
            comp1: GfxAlphaFunction::from_u8(packed >> 4 & 0x7),
            op: GfxAlphaOp::from_u8(r.read_u8()?),
            ref0: r.read_u8()?,
            ref1: r.read_u8()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u8((self.comp1.as_u8() & 0x7) << 4 | self.comp0.as_u8() & 0x7);
        w.write_u8(self.op.as_u8());
        w.write_u8(self.ref0);
        w.write_u8(self.ref1);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialRev {
    pub name: String,
    pub flags: RevMaterialFlags,
    pub black_color: Color16,
    pub white_color: Color16,
    pub color_register3: Color16,
    pub tev_colors: [Color; 4],
    pub material_color: Option<Color>,
    pub textures: Vec<TextureMap>,
    pub texture_srts: Vec<TextureSrt>,
    pub tex_coord_gens: Vec<RevTexCoordGen>,
    pub channel_control: Option<ChanCtrl>,
    pub tev_swap_table: Option<TevSwapModeTable>,
    pub indirect_tex_srts: Vec<TextureSrt>,
    pub indirect_stages: Vec<IndirectStage>,
    pub tev_stages: Vec<TevStage>,
    pub alpha_compare: Option<RevAlphaCompare>,
    pub blend_mode: Option<BlendMode>,
}

impl MaterialRev {
    /// Flag word recomputed from the live lists; see the Cafe codec.
    pub fn resynced_flags(&self) -> RevMaterialFlags {
        let mut flags = self.flags;
        flags.set_texture_count(self.textures.len() as u8);
        flags.set_tex_srt_count(self.texture_srts.len() as u8);
        flags.set_tex_coord_gen_count(self.tex_coord_gens.len() as u8);
        flags.set_indirect_srt_count(self.indirect_tex_srts.len() as u8);
        flags.set_indirect_stage_count(self.indirect_stages.len() as u8);
        flags.set_tev_stage_count(self.tev_stages.len() as u8);
        flags.set_has_material_color(self.material_color.is_some());
        flags.set_has_channel_control(self.channel_control.is_some());
        flags.set_has_tev_swap_table(self.tev_swap_table.is_some());
        flags.set_has_alpha_compare(self.alpha_compare.is_some());
        flags.set_has_blend_mode(self.blend_mode.is_some());
        flags
    }

    pub fn read(r: &mut Reader<'_>) -> Result<MaterialRev> {
        let mut mat = MaterialRev {
            name: r.read_fixed_str(0x14)?,
            black_color: Color16::read(r)?,
            white_color: Color16::read(r)?,
            color_register3: Color16::read(r)?,
            ..MaterialRev::default()
        };
        for color in &mut mat.tev_colors {
            *color = Color::read_rgba32(r)?;
        }
        mat.flags = RevMaterialFlags::new(r.read_u32()?);

        for _ in 0..mat.flags.texture_count() {
            mat.textures.push(TextureMap::read(r)?);
        }

        for _ in 0..mat.flags.tex_srt_count() {
            mat.texture_srts.push(TextureSrt::read(r)?);
        }

        for _ in 0..mat.flags.tex_coord_gen_count() {
            mat.tex_coord_gens.push(RevTexCoordGen::read(r)?);
        }

        if mat.flags.has_channel_control() {
            mat.channel_control = Some(ChanCtrl::read(r)?);
        }

        if mat.flags.has_material_color() {
            mat.material_color = Some(Color::read_rgba32(r)?);
        }

        if mat.flags.has_tev_swap_table() {
            mat.tev_swap_table = Some(TevSwapModeTable::read(r)?);
        }

        for _ in 0..mat.flags.indirect_srt_count() {
            mat.indirect_tex_srts.push(TextureSrt::read(r)?);
        }

        for _ in 0..mat.flags.indirect_stage_count() {
            mat.indirect_stages.push(IndirectStage::read(r)?);
        }

        for _ in 0..mat.flags.tev_stage_count() {
            mat.tev_stages.push(TevStage::read(r)?);
        }

        if mat.flags.has_alpha_compare() {
            mat.alpha_compare = Some(RevAlphaCompare::read(r)?);
        }

        if mat.flags.has_blend_mode() {
            mat.blend_mode = Some(BlendMode::read(r)?);
        }

        Ok(mat)
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        let flags = self.resynced_flags();

        w.write_fixed_str(&self.name, 0x14)?;
        self.black_color.write(w);
        self.white_color.write(w);
        self.color_register3.write(w);
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
            gen.write(w);
        }

        if let Some(ctrl) = &self.channel_control {
            ctrl.write(w);
        }

        if let Some(color) = &self.material_color {
            color.write_rgba32(w);
        }

        if let Some(table) = &self.tev_swap_table {
            table.write(w);
        }

        for srt in &self.indirect_tex_srts {
            srt.write(w);
        }

        for stage in &self.indirect_stages {
            stage.write(w);
        }

        for stage in &self.tev_stages {
            stage.write(w);
        }

        if let Some(compare) = &self.alpha_compare {
            compare.write(w);
        }

        if let Some(blend) = &self.blend_mode {
            blend.write(w);
        }

        Ok(())
    }
}
