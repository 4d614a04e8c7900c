//! Control source (`cnt1`): binds a named UI control to the panes and
//! animations implementing its states.

use serde::{Deserialize, Serialize};

use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::strings::{read_string_offsets, write_string_offsets};
use crate::userdata::UserData;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlSource {
    pub name: String,
    pub control_name: String,
    /// Panes driven by the control, fixed 24-byte name slots.
    pub panes: Vec<String>,
    pub animations: Vec<String>,
    /// State name per pane, parallel to `panes`.
    pub pane_states: Vec<String>,
    /// State name per animation, parallel to `animations`.
    pub animation_states: Vec<String>,
    /// Trailing `usd1` section attached to this control, if any.
    pub user_data: Option<UserData>,
}

impl ControlSource {
    pub fn read(r: &mut Reader<'_>, section_start: usize) -> Result<ControlSource> {
        let control_name_offset = r.read_u32()?;
        let pane_name_offset = r.read_u32()?;
        let pane_count = r.read_u16()? as usize;
        let anim_count = r.read_u16()? as usize;
        let pane_array_offset = r.read_u32()?;
        let anim_array_offset = r.read_u32()?;

        let mut control = ControlSource::default();

        // the control's own name sits directly after the fixed part
        control.name = r.at(section_start + 28)?.read_cstr()?;
        control.control_name = r
            .at(section_start + control_name_offset as usize)?
            .read_cstr()?;

        let mut names = r.at(section_start + pane_name_offset as usize)?;
        for _ in 0..pane_count {
            control.panes.push(names.read_fixed_str(24)?);
        }
        // the animation state table follows the pane names without its own
        // offset field
        control.animation_states = read_string_offsets(&mut names, anim_count)?;

        let mut states = r.at(section_start + pane_array_offset as usize)?;
        control.pane_states = read_string_offsets(&mut states, pane_count)?;

        let mut anims = r.at(section_start + anim_array_offset as usize)?;
        control.animations = read_string_offsets(&mut anims, anim_count)?;

        Ok(control)
    }

    pub fn write(&self, w: &mut Writer, section_start: usize) -> Result<()> {
        let control_name_slot = w.reserve_u32();
        let pane_name_slot = w.reserve_u32();
        w.write_u16(self.panes.len() as u16);
        w.write_u16(self.animations.len() as u16);
        let pane_array_slot = w.reserve_u32();
        let anim_array_slot = w.reserve_u32();

        w.write_cstr(&self.name);
        w.align(4);

        w.patch_offset_u32(control_name_slot, section_start);
        w.write_cstr(&self.control_name);
        w.align(4);

        w.patch_offset_u32(pane_name_slot, section_start);
        for pane in &self.panes {
            w.write_fixed_str(pane, 24)?;
        }
        write_string_offsets(w, &self.animation_states);

        w.patch_offset_u32(pane_array_slot, section_start);
        write_string_offsets(w, &self.pane_states);

        w.patch_offset_u32(anim_array_slot, section_start);
        write_string_offsets(w, &self.animations);

        w.align(4);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    #[test]
    fn control_round_trips() {
        let control = ControlSource {
            name: "DefaultButton".into(),
            control_name: "ButtonBase".into(),
            panes: vec!["N_Hit".into(), "N_Visual".into()],
            animations: vec!["anim_on".into()],
            pane_states: vec!["Hit".into(), "Visual".into()],
            animation_states: vec!["On".into()],
            user_data: None,
        };

        let mut w = Writer::new(Endian::Big);
        // fake envelope so the section-start anchor matches real framing
        w.write_bytes(b"cnt1");
        w.write_u32(0);
        control.write(&mut w, 0).unwrap();
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        r.seek(8).unwrap();
        let decoded = ControlSource::read(&mut r, 0).unwrap();
        assert_eq!(decoded, control);
    }

    #[test]
    fn empty_lists_round_trip() {
        let control = ControlSource {
            name: "n".into(),
            control_name: "c".into(),
            ..ControlSource::default()
        };
        let mut w = Writer::new(Endian::Big);
        w.write_bytes(b"cnt1");
        w.write_u32(0);
        control.write(&mut w, 0).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        r.seek(8).unwrap();
        assert_eq!(ControlSource::read(&mut r, 0).unwrap(), control);
    }
}
