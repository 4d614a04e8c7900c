//! Packed material flag words.
//!
//! The flag word is the only thing that says which field groups follow a
//! material record and how many entries each has; there are no tags at that
//! level. The Cafe and Ctr dialects share one layout, Rev uses its own.
//! Count fields are cached derived state: encoders refresh every count from
//! the live list lengths before writing (see the per-variant codecs).

use bitfield::bitfield;
use serde::{Deserialize, Serialize};

bitfield! {
    /// Flag word of the Cafe/Ctr material record.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct MaterialFlags(u32);
    pub u8, tex_map_count, set_tex_map_count: 1, 0;
    pub u8, tex_srt_count, set_tex_srt_count: 3, 2;
    pub u8, tex_coord_gen_count, set_tex_coord_gen_count: 5, 4;
    pub u8, tev_combiner_count, set_tev_combiner_count: 8, 6;
    pub u8, alpha_compare_count, set_alpha_compare_count: 9, 9;
    pub has_color_blend, set_has_color_blend: 10;
    pub use_texture_only, set_use_texture_only: 11;
    pub has_alpha_blend, set_has_alpha_blend: 12;
    pub u8, reserve1, set_reserve1: 13, 13;
    pub u8, indirect_srt_count, set_indirect_srt_count: 14, 14;
    pub u8, projection_tex_gen_count, set_projection_tex_gen_count: 16, 15;
    pub has_font_shadow_params, set_has_font_shadow_params: 17;
    pub alpha_interpolation, set_alpha_interpolation: 18;
    pub use_detailed_combiner, set_use_detailed_combiner: 19;
    pub u8, user_combiner_count, set_user_combiner_count: 20, 20;
    pub has_texture_extensions, set_has_texture_extensions: 21;
    pub u8, vector_texture_info_count, set_vector_texture_info_count: 23, 22;
    pub u8, brick_repeat_shader_info_count, set_brick_repeat_shader_info_count: 25, 24;
    pub u8, reserve5, set_reserve5: 31, 26;
}

impl MaterialFlags {
    pub fn new(bits: u32) -> Self {
        MaterialFlags(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

bitfield! {
    /// Flag word of the Rev material record.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
    pub struct RevMaterialFlags(u32);
    pub u8, texture_count, set_texture_count: 3, 0;
    pub u8, tex_srt_count, set_tex_srt_count: 7, 4;
    pub u8, tex_coord_gen_count, set_tex_coord_gen_count: 11, 8;
    pub has_tev_swap_table, set_has_tev_swap_table: 12;
    pub u8, indirect_srt_count, set_indirect_srt_count: 14, 13;
    pub u8, indirect_stage_count, set_indirect_stage_count: 15, 15;
    pub u8, tev_stage_count, set_tev_stage_count: 22, 18;
    pub has_alpha_compare, set_has_alpha_compare: 23;
    pub has_blend_mode, set_has_blend_mode: 24;
    pub has_channel_control, set_has_channel_control: 25;
    pub has_material_color, set_has_material_color: 27;
    pub u8, reserved, set_reserved: 31, 28;
}

impl RevMaterialFlags {
    pub fn new(bits: u32) -> Self {
        RevMaterialFlags(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl Default for MaterialFlags {
    fn default() -> Self {
        MaterialFlags(0)
    }
}

impl Default for RevMaterialFlags {
    fn default() -> Self {
        RevMaterialFlags(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_pack_into_their_ranges() {
        let mut flags = MaterialFlags::new(0);
        flags.set_tex_map_count(3);
        flags.set_tev_combiner_count(5);
        flags.set_has_alpha_blend(true);
        flags.set_projection_tex_gen_count(2);
        assert_eq!(flags.tex_map_count(), 3);
        assert_eq!(flags.tev_combiner_count(), 5);
        assert!(flags.has_alpha_blend());
        assert_eq!(flags.projection_tex_gen_count(), 2);
        assert_eq!(flags.bits(), 3 | 5 << 6 | 1 << 12 | 2 << 15);
    }

    #[test]
    fn setting_one_field_leaves_the_rest() {
        let mut flags = MaterialFlags::new(u32::MAX);
        flags.set_tex_map_count(0);
        assert_eq!(flags.bits(), u32::MAX & !0x3);
    }

    #[test]
    fn rev_counts_live_in_the_low_nibbles() {
        let mut flags = RevMaterialFlags::new(0);
        flags.set_texture_count(2);
        flags.set_tex_srt_count(2);
        flags.set_tev_stage_count(9);
        flags.set_has_blend_mode(true);
        assert_eq!(flags.bits(), 2 | 2 << 4 | 9 << 18 | 1 << 24);
        assert_eq!(flags.texture_count(), 2);
        assert_eq!(flags.tev_stage_count(), 9);
    }
}
