//! Pane groups (`grp1`): named sets of pane references, arranged in their
//! own tree independent of the pane hierarchy.

use serde::{Deserialize, Serialize};

use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::header::{Variant, Version};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Pane names; references by name, not by position in the pane tree.
    pub panes: Vec<String>,
    pub children: Vec<Group>,
}

impl Group {
    pub fn read(r: &mut Reader<'_>, variant: Variant, version: Version) -> Result<Group> {
        match variant {
            Variant::Ctr | Variant::Rev => Self::read_compact(r),
            Variant::Cafe => Self::read_wide(r, version),
        }
    }

    pub fn write(&self, w: &mut Writer, variant: Variant, version: Version) -> Result<()> {
        match variant {
            Variant::Ctr | Variant::Rev => self.write_compact(w),
            Variant::Cafe => self.write_wide(w, version),
        }
    }

    fn read_compact(r: &mut Reader<'_>) -> Result<Group> {
        let name = r.read_fixed_str(0x10)?;
        let count = r.read_u16()?;
        r.skip(2)?;
        let mut panes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            panes.push(r.read_fixed_str(0x10)?);
        }
        Ok(Group {
            name,
            panes,
            children: Vec::new(),
        })
    }

    fn read_wide(r: &mut Reader<'_>, version: Version) -> Result<Group> {
        let (name, count);
        if version.major >= 5 {
            name = r.read_fixed_str(0x21)?;
            r.skip(1)?;
            count = r.read_u16()?;
        } else {
            name = r.read_fixed_str(0x18)?;
            count = r.read_u16()?;
            r.skip(2)?;
        }
        let mut panes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            panes.push(r.read_fixed_str(0x18)?);
        }
        Ok(Group {
            name,
            panes,
            children: Vec::new(),
        })
    }

    fn write_compact(&self, w: &mut Writer) -> Result<()> {
        w.write_fixed_str(&self.name, 0x10)?;
        w.write_u16(self.panes.len() as u16);
        w.write_u16(0);
        for pane in &self.panes {
            w.write_fixed_str(pane, 0x10)?;
        }
        Ok(())
    }

    fn write_wide(&self, w: &mut Writer, version: Version) -> Result<()> {
        if version.major >= 5 {
            w.write_fixed_str(&self.name, 0x21)?;
            w.write_u8(0);
            w.write_u16(self.panes.len() as u16);
        } else {
            w.write_fixed_str(&self.name, 0x18)?;
            w.write_u16(self.panes.len() as u16);
            w.write_u16(0);
        }
        for pane in &self.panes {
            w.write_fixed_str(pane, 0x18)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    fn round_trip(group: &Group, variant: Variant, version: Version) -> Group {
        let mut w = Writer::new(Endian::Big);
        group.write(&mut w, variant, version).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        Group::read(&mut r, variant, version).unwrap()
    }

    #[test]
    fn all_three_layouts_round_trip() {
        let group = Group {
            name: "G_Buttons".into(),
            panes: vec!["N_Ok".into(), "N_Cancel".into()],
            children: Vec::new(),
        };
        for (variant, version) in [
            (Variant::Ctr, Version::new(2, 0, 0)),
            (Variant::Rev, Version::new(1, 0, 0)),
            (Variant::Cafe, Version::new(4, 0, 0)),
            (Variant::Cafe, Version::new(8, 0, 0)),
        ] {
            assert_eq!(round_trip(&group, variant, version), group);
        }
    }

    #[test]
    fn wide_v5_record_width() {
        let group = Group {
            name: "g".into(),
            panes: vec!["p".into()],
            children: Vec::new(),
        };
        let mut w = Writer::new(Endian::Big);
        group.write(&mut w, Variant::Cafe, Version::new(5, 0, 0)).unwrap();
        // 0x21 name + pad + count + one 0x18 reference
        assert_eq!(w.into_bytes().len(), 0x21 + 1 + 2 + 0x18);
    }

    #[test]
    fn compact_name_width_is_enforced() {
        let group = Group {
            name: "a_name_longer_than_sixteen_bytes".into(),
            panes: Vec::new(),
            children: Vec::new(),
        };
        let mut w = Writer::new(Endian::Big);
        assert!(group.write(&mut w, Variant::Rev, Version::new(1, 0, 0)).is_err());
    }
}
