//! Material table (`mat1`) and the per-dialect material codecs.
//!
//! The table is an offset table over variable-length material records; each
//! record's length is implied by the next offset (or the section end), and
//! its contents are governed entirely by a packed flag word. Field groups
//! follow the flag word in a fixed declared order with no per-group tags,
//! so the codecs must read and write them in exactly that order.

mod cafe;
mod ctr;
mod flags;
mod rev;

pub use cafe::{
    BrickRepeatShaderInfo, DetailedCombiner, DetailedCombinerEntry, MaterialCafe, TevCombiner,
    UserCombiner,
};
pub use ctr::{MaterialCtr, TevCombinerCtr};
pub use flags::{MaterialFlags, RevMaterialFlags};
pub use rev::{
    ChanCtrl, IndirectStage, MaterialRev, RevAlphaCompare, RevTexCoordGen, TevStage,
    TevSwap, TevSwapModeTable,
};

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::header::{Header, Variant};
use crate::pane::{read_vec2, write_vec2};

/// Non-fatal decode findings, collected on the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A material record declared more bytes than its flag word accounted
    /// for. Usually means an unanticipated version, not corruption.
    MaterialSlack {
        material: String,
        leftover: usize,
        flags: u32,
    },
}

macro_rules! byte_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$first_meta:meta])* $first:ident = $first_value:literal
            $(, $(#[$vmeta:meta])* $variant:ident = $value:literal)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            #[default]
            $(#[$first_meta])* $first = $first_value,
            $($(#[$vmeta])* $variant = $value,)*
        }

        impl $name {
            /// Decode, mapping out-of-range values to the first variant.
            pub fn from_u8(v: u8) -> Self {
                match v {
                    $($value => $name::$variant,)*
                    _ => $name::$first,
                }
            }

            /// Decode, rejecting out-of-range values.
            pub fn try_from_u8(v: u8) -> Option<Self> {
                match v {
                    $first_value => Some($name::$first),
                    $($value => Some($name::$variant),)*
                    _ => None,
                }
            }

            pub fn as_u8(self) -> u8 {
                self as u8
            }

            pub fn name(self) -> &'static str {
                match self {
                    $name::$first => stringify!($first),
                    $($name::$variant => stringify!($variant),)*
                }
            }
        }
    };
}
pub(crate) use byte_enum;

byte_enum! {
    pub enum TexGenMatrixType {
        Matrix2x4 = 0,
    }
}

byte_enum! {
    pub enum TexGenType {
        TextureCoord0 = 0,
        TextureCoord1 = 1,
        TextureCoord2 = 2,
        OrthographicProjection = 3,
        PaneBasedProjection = 4,
        PerspectiveProjection = 5,
        UnknownType6 = 6,
        BrickRepeat = 7,
    }
}

byte_enum! {
    pub enum WrapMode {
        Clamp = 0,
        Repeat = 1,
        Mirror = 2,
    }
}

byte_enum! {
    pub enum FilterMode {
        Near = 0,
        Linear = 1,
    }
}

byte_enum! {
    pub enum GfxBlendOp {
        Disable = 0,
        Add = 1,
        Subtract = 2,
        ReverseSubtract = 3,
        SelectMin = 4,
        SelectMax = 5,
    }
}

byte_enum! {
    pub enum GfxBlendFactor {
        Factor0 = 0,
        Factor1 = 1,
        DestColor = 2,
        DestInvColor = 3,
        SourceAlpha = 4,
        SourceInvAlpha = 5,
        DestAlpha = 6,
        DestInvAlpha = 7,
        SourceColor = 8,
        SourceInvColor = 9,
    }
}

byte_enum! {
    pub enum GfxLogicOp {
        Disable = 0,
        NoOp = 1,
        Clear = 2,
        Set = 3,
        Copy = 4,
        InvCopy = 5,
        Inv = 6,
        And = 7,
        Nand = 8,
        Or = 9,
        Nor = 10,
        Xor = 11,
        Equiv = 12,
        RevAnd = 13,
        InvAnd = 14,
        RevOr = 15,
        InvOr = 16,
    }
}

byte_enum! {
    pub enum GfxAlphaFunction {
        Never = 0,
        Less = 1,
        LessOrEqual = 2,
        Equal = 3,
        NotEqual = 4,
        GreaterOrEqual = 5,
        Greater = 6,
        Always = 7,
    }
}

byte_enum! {
    pub enum GfxAlphaOp {
        And = 0,
        Or = 1,
        Xor = 2,
        Nor = 3,
    }
}

pub(crate) fn read_vec4(r: &mut Reader<'_>) -> Result<Vec4> {
    Ok(Vec4::new(
        r.read_f32()?,
        r.read_f32()?,
        r.read_f32()?,
        r.read_f32()?,
    ))
}

pub(crate) fn write_vec4(w: &mut Writer, v: Vec4) {
    w.write_f32(v.x);
    w.write_f32(v.y);
    w.write_f32(v.z);
    w.write_f32(v.w);
}

/// One texture map binding: texture list index plus wrap/filter bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextureMap {
    pub texture_index: u16,
    pub flag1: u8,
    pub flag2: u8,
}

impl TextureMap {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            texture_index: r.read_u16()?,
            flag1: r.read_u8()?,
            flag2: r.read_u8()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u16(self.texture_index);
        w.write_u8(self.flag1);
        w.write_u8(self.flag2);
    }

    pub fn wrap_mode_u(&self) -> WrapMode {
        WrapMode::from_u8(self.flag1 & 0x3)
    }

    pub fn set_wrap_mode_u(&mut self, mode: WrapMode) {
        self.flag1 = self.flag1 & !0x3 | mode.as_u8();
    }

    pub fn min_filter(&self) -> FilterMode {
        FilterMode::from_u8(self.flag1 >> 2 & 0x3)
    }

    pub fn set_min_filter(&mut self, filter: FilterMode) {
        self.flag1 = self.flag1 & !0xC | filter.as_u8() << 2;
    }

    pub fn wrap_mode_v(&self) -> WrapMode {
        WrapMode::from_u8(self.flag2 & 0x3)
    }

    pub fn set_wrap_mode_v(&mut self, mode: WrapMode) {
        self.flag2 = self.flag2 & !0x3 | mode.as_u8();
    }

    pub fn mag_filter(&self) -> FilterMode {
        FilterMode::from_u8(self.flag2 >> 2 & 0x3)
    }

    pub fn set_mag_filter(&mut self, filter: FilterMode) {
        self.flag2 = self.flag2 & !0xC | filter.as_u8() << 2;
    }
}

/// Capture/vector texture marker attached to a texture map (v8+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextureExtension {
    pub flags: i32,
}

impl TextureExtension {
    pub fn is_capture(&self) -> bool {
        self.flags & 0x1 != 0
    }

    pub fn is_vector(&self) -> bool {
        self.flags & 0x2 != 0
    }
}

/// Texture-space transform.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextureSrt {
    pub translate: Vec2,
    pub rotate: f32,
    pub scale: Vec2,
}

impl TextureSrt {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            translate: read_vec2(r)?,
            rotate: r.read_f32()?,
            scale: read_vec2(r)?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        write_vec2(w, self.translate);
        w.write_f32(self.rotate);
        write_vec2(w, self.scale);
    }
}

/// Texture coordinate generator. The Ctr record stops after the first four
/// bytes; Cafe adds trailing words that grew again in v8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TexCoordGen {
    pub matrix_type: TexGenMatrixType,
    pub source: TexGenType,
    pub unknown: u16,
    pub unknown2: u32,
    pub unknown3: u64,
}

/// Projection parameters for projection-type tex-coord generators.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectionTexGen {
    pub position: Vec2,
    pub scale: Vec2,
    pub flags: u32,
}

impl ProjectionTexGen {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            position: read_vec2(r)?,
            scale: read_vec2(r)?,
            flags: r.read_u32()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        write_vec2(w, self.position);
        write_vec2(w, self.scale);
        w.write_u32(self.flags);
    }
}

/// Alpha test parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlphaCompare {
    pub mode: GfxAlphaFunction,
    pub value: f32,
}

impl AlphaCompare {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let mode = GfxAlphaFunction::from_u8(r.read_u8()?);
        r.skip(3)?;
        let value = r.read_f32()?;
        Ok(Self { mode, value })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u8(self.mode.as_u8());
        w.write_zeros(3);
        w.write_f32(self.value);
    }
}

/// Blend equation, used for both the color and alpha pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlendMode {
    pub op: GfxBlendOp,
    pub source_factor: GfxBlendFactor,
    pub dest_factor: GfxBlendFactor,
    pub logic_op: GfxLogicOp,
}

impl BlendMode {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            op: GfxBlendOp::from_u8(r.read_u8()?),
            source_factor: GfxBlendFactor::from_u8(r.read_u8()?),
            dest_factor: GfxBlendFactor::from_u8(r.read_u8()?),
            logic_op: GfxLogicOp::from_u8(r.read_u8()?),
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u8(self.op.as_u8());
        w.write_u8(self.source_factor.as_u8());
        w.write_u8(self.dest_factor.as_u8());
        w.write_u8(self.logic_op.as_u8());
    }
}

/// Indirect texture transform.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndirectParameter {
    pub rotation: f32,
    pub scale: Vec2,
}

impl IndirectParameter {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            rotation: r.read_f32()?,
            scale: read_vec2(r)?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_f32(self.rotation);
        write_vec2(w, self.scale);
    }
}

/// Font shadow interpolation colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontShadowParameter {
    pub black_color: crate::color::Color,
    pub white_color: crate::color::Color,
}

impl Default for FontShadowParameter {
    fn default() -> Self {
        Self {
            black_color: crate::color::Color::BLACK,
            white_color: crate::color::Color::WHITE,
        }
    }
}

/// A material in one of the three platform dialects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Material {
    Cafe(MaterialCafe),
    Ctr(MaterialCtr),
    Rev(MaterialRev),
}

impl Material {
    pub fn name(&self) -> &str {
        match self {
            Material::Cafe(m) => &m.name,
            Material::Ctr(m) => &m.name,
            Material::Rev(m) => &m.name,
        }
    }

    fn read(
        r: &mut Reader<'_>,
        header: &Header,
        size: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Material> {
        match header.variant {
            Variant::Cafe => Ok(Material::Cafe(MaterialCafe::read(
                r,
                header,
                size,
                diagnostics,
            )?)),
            Variant::Ctr => Ok(Material::Ctr(MaterialCtr::read(
                r,
                header,
                size,
                diagnostics,
            )?)),
            Variant::Rev => Ok(Material::Rev(MaterialRev::read(r)?)),
        }
    }

    fn write(&self, w: &mut Writer, header: &Header) -> Result<()> {
        match self {
            Material::Cafe(m) => m.write(w, header),
            Material::Ctr(m) => m.write(w),
            Material::Rev(m) => m.write(w),
        }
    }
}

/// The `mat1` section: every material of the document, indexed by panes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialTable {
    pub materials: Vec<Material>,
}

impl MaterialTable {
    pub fn read(
        r: &mut Reader<'_>,
        header: &Header,
        section_start: usize,
        section_size: u32,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<MaterialTable> {
        let count = r.read_u16()? as usize;
        r.skip(2)?;
        let offsets = r.read_offsets(count)?;

        let mut materials = Vec::with_capacity(count);
        for (i, &offset) in offsets.iter().enumerate() {
            // record length runs to the next record, or the section end
            let end = offsets
                .get(i + 1)
                .copied()
                .unwrap_or(section_size);
            let size = end.saturating_sub(offset) as usize;
            let mut sub = r.at(section_start + offset as usize)?;
            materials.push(Material::read(&mut sub, header, size, diagnostics)?);
        }
        Ok(MaterialTable { materials })
    }

    pub fn write(&self, w: &mut Writer, header: &Header, section_start: usize) -> Result<()> {
        w.write_u16(self.materials.len() as u16);
        w.write_u16(0);

        let table_start = w.reserve_u32_table(self.materials.len());
        for (i, material) in self.materials.iter().enumerate() {
            w.patch_offset_u32(table_start + i * 4, section_start);
            material.write(w, header)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, Color16};
    use crate::cursor::Endian;
    use crate::header::{Version, BOM_BIG};
    use crate::section::{tags, write_section};

    fn header(variant: Variant, major: u8) -> Header {
        Header {
            variant,
            byte_order_mark: BOM_BIG,
            version: Version::new(major, 0, 0),
            reversed_tags: false,
            header_size: if variant == Variant::Rev { 16 } else { 20 },
        }
    }

    fn round_trip(table: &MaterialTable, header: &Header) -> (MaterialTable, Vec<Diagnostic>) {
        let mut w = Writer::new(header.endian());
        let mut count = 0u16;
        let section_start = w.position();
        write_section(&mut w, tags::MAT1, &mut count, |w| {
            table.write(w, header, section_start)
        })
        .unwrap();

        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        r.set_endian(header.endian());
        r.seek(4).unwrap();
        let size = r.read_u32().unwrap();
        let mut diagnostics = Vec::new();
        let decoded =
            MaterialTable::read(&mut r, header, 0, size, &mut diagnostics).unwrap();
        (decoded, diagnostics)
    }

    fn cafe_material() -> MaterialCafe {
        MaterialCafe {
            name: "M_Button".into(),
            color_type: 0b10,
            colors: vec![Color::from_rgba32(0xFF102030), Color::new(0.5, 0.25, 1.0, 1.0)],
            textures: vec![TextureMap {
                texture_index: 0,
                flag1: 0x5,
                flag2: 0x5,
            }],
            texture_srts: vec![TextureSrt {
                translate: glam::Vec2::new(0.5, -0.5),
                rotate: 45.0,
                scale: glam::Vec2::ONE,
            }],
            tex_coord_gens: vec![TexCoordGen::default()],
            tev_combiners: vec![TevCombiner::default()],
            alpha_compares: vec![AlphaCompare {
                mode: GfxAlphaFunction::Greater,
                value: 0.5,
            }],
            color_blend: Some(BlendMode {
                op: GfxBlendOp::Add,
                source_factor: GfxBlendFactor::SourceAlpha,
                dest_factor: GfxBlendFactor::SourceInvAlpha,
                logic_op: GfxLogicOp::Disable,
            }),
            ..MaterialCafe::default()
        }
    }

    #[test]
    fn cafe_v8_round_trip() {
        let table = MaterialTable {
            materials: vec![Material::Cafe(cafe_material())],
        };
        let h = header(Variant::Cafe, 8);
        let (decoded, diagnostics) = round_trip(&table, &h);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        // counts come back from the resynced flag word
        match (&decoded.materials[0], &table.materials[0]) {
            (Material::Cafe(a), Material::Cafe(b)) => {
                let mut expect = b.clone();
                expect.flags = b.resynced_flags();
                assert_eq!(a, &expect);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn cafe_pre_v8_packs_two_colors() {
        let mut mat = cafe_material();
        mat.color_type = 0;
        mat.colors = vec![Color::BLACK, Color::WHITE];
        let table = MaterialTable {
            materials: vec![Material::Cafe(mat)],
        };
        let h = header(Variant::Cafe, 7);
        let (decoded, diagnostics) = round_trip(&table, &h);
        assert!(diagnostics.is_empty());
        match &decoded.materials[0] {
            Material::Cafe(m) => assert_eq!(m.colors, [Color::BLACK, Color::WHITE]),
            _ => unreachable!(),
        }
    }

    #[test]
    fn stale_counts_are_resynced_on_encode() {
        // decode, mutate the texture list, re-encode: the count field must
        // follow the list, not the stale flag word
        let table = MaterialTable {
            materials: vec![Material::Cafe(cafe_material())],
        };
        let h = header(Variant::Cafe, 8);
        let (mut decoded, _) = round_trip(&table, &h);
        match &mut decoded.materials[0] {
            Material::Cafe(m) => {
                m.textures.push(TextureMap {
                    texture_index: 1,
                    flag1: 0,
                    flag2: 0,
                });
                assert_eq!(m.flags.tex_map_count(), 1); // stale
            }
            _ => unreachable!(),
        }
        let (again, diagnostics) = round_trip(&decoded, &h);
        assert!(diagnostics.is_empty());
        match &again.materials[0] {
            Material::Cafe(m) => {
                assert_eq!(m.textures.len(), 2);
                assert_eq!(m.flags.tex_map_count(), 2);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn ctr_round_trip() {
        let mat = MaterialCtr {
            name: "M_Ctr".into(),
            black_color: Color::BLACK,
            white_color: Color::WHITE,
            tev_colors: [Color::WHITE; 5],
            textures: vec![TextureMap::default()],
            tex_coord_gens: vec![TexCoordGen::default()],
            tev_combiners: vec![TevCombinerCtr {
                color_flags: 0x1234_5678,
                alpha_flags: 0x0F0F_0F0F,
                const_colors: 7,
            }],
            alpha_blend: Some(BlendMode::default()),
            font_shadow: Some(FontShadowParameter::default()),
            ..MaterialCtr::default()
        };
        let table = MaterialTable {
            materials: vec![Material::Ctr(mat)],
        };
        let h = header(Variant::Ctr, 2);
        let (decoded, diagnostics) = round_trip(&table, &h);
        assert!(diagnostics.is_empty());
        match (&decoded.materials[0], &table.materials[0]) {
            (Material::Ctr(a), Material::Ctr(b)) => {
                let mut expect = b.clone();
                expect.flags = b.resynced_flags();
                assert_eq!(a, &expect);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn rev_round_trip() {
        let mat = MaterialRev {
            name: "M_Rev".into(),
            black_color: Color16::BLACK,
            white_color: Color16::WHITE,
            color_register3: Color16::WHITE,
            tev_colors: [Color::WHITE; 4],
            material_color: Some(Color::from_rgba32(0xAABBCCDD)),
            textures: vec![TextureMap {
                texture_index: 2,
                flag1: 1,
                flag2: 1,
            }],
            tex_coord_gens: vec![RevTexCoordGen {
                kind: 1,
                source: 4,
                matrix_source: 30,
                unknown: 0,
            }],
            channel_control: Some(ChanCtrl {
                color_material_source: 0,
                alpha_material_source: 1,
            }),
            tev_swap_table: Some(TevSwapModeTable {
                swaps: [
                    TevSwap {
                        red: 0,
                        green: 1,
                        blue: 2,
                        alpha: 3,
                    },
                    TevSwap::default(),
                    TevSwap::default(),
                    TevSwap::default(),
                ],
            }),
            tev_stages: vec![TevStage {
                tex_coord: 1,
                color: 255,
                tex_map: 0x1FF,
                ras_sel: 2,
                tex_sel: 1,
                color_a: 0xF,
                color_b: 8,
                color_op: 10,
                color_clamp: true,
                color_constant_sel: 0x1F,
                alpha_d: 4,
                alpha_scale: 3,
                ind_matrix: 5,
                ind_wrap_t: 3,
                ind_alpha_sel: 2,
                ..TevStage::default()
            }],
            alpha_compare: Some(RevAlphaCompare {
                comp0: GfxAlphaFunction::Greater,
                comp1: GfxAlphaFunction::Less,
                op: GfxAlphaOp::Xor,
                ref0: 128,
                ref1: 64,
            }),
            blend_mode: Some(BlendMode::default()),
            ..MaterialRev::default()
        };
        let table = MaterialTable {
            materials: vec![Material::Rev(mat)],
        };
        let h = header(Variant::Rev, 1);
        let (decoded, diagnostics) = round_trip(&table, &h);
        assert!(diagnostics.is_empty());
        match (&decoded.materials[0], &table.materials[0]) {
            (Material::Rev(a), Material::Rev(b)) => {
                let mut expect = b.clone();
                expect.flags = b.resynced_flags();
                assert_eq!(a, &expect);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn leftover_bytes_surface_as_diagnostic() {
        // hand-frame a mat1 with 4 slack bytes after a minimal material
        let h = header(Variant::Ctr, 2);
        let mut w = Writer::new(Endian::Big);
        let mut count = 0u16;
        write_section(&mut w, tags::MAT1, &mut count, |w| {
            w.write_u16(1);
            w.write_u16(0);
            let slot = w.reserve_u32();
            w.patch_offset_u32(slot, 0);
            w.write_fixed_str("M_Slack", 0x14)?;
            for _ in 0..7 {
                w.write_u32(0xFFFF_FFFF);
            }
            w.write_u32(0); // flag word: nothing follows
            w.write_u32(0xDEAD_BEEF); // slack the flag word cannot explain
            Ok(())
        })
        .unwrap();

        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        r.seek(4).unwrap();
        let size = r.read_u32().unwrap();
        let mut diagnostics = Vec::new();
        let table = MaterialTable::read(&mut r, &h, 0, size, &mut diagnostics).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MaterialSlack {
                material: "M_Slack".into(),
                leftover: 4,
                flags: 0,
            }]
        );
    }
}
