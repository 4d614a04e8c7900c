//! Layout metadata (`lyt1`): canvas size and drawing origin.

use serde::{Deserialize, Serialize};

use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::header::Version;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    /// Draw with the origin at the canvas center instead of a corner.
    pub draw_from_center: bool,
    pub width: f32,
    pub height: f32,
    pub max_parts_width: f32,
    pub max_parts_height: f32,
    pub name: String,
}

impl Layout {
    pub fn read(r: &mut Reader<'_>, version: Version) -> Result<Layout> {
        let draw_from_center = r.read_bool()?;
        r.skip(3)?;
        let width = r.read_f32()?;
        let height = r.read_f32()?;

        let mut layout = Layout {
            draw_from_center,
            width,
            height,
            ..Layout::default()
        };

        if version.major >= 3 {
            layout.max_parts_width = r.read_f32()?;
            layout.max_parts_height = r.read_f32()?;
            layout.name = r.read_cstr()?;
        }
        Ok(layout)
    }

    pub fn write(&self, w: &mut Writer, version: Version) -> Result<()> {
        w.write_bool(self.draw_from_center);
        w.write_zeros(3);
        w.write_f32(self.width);
        w.write_f32(self.height);

        if version.major >= 3 {
            w.write_f32(self.max_parts_width);
            w.write_f32(self.max_parts_height);
            w.write_cstr(&self.name);
            w.align(4);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    #[test]
    fn versioned_tail_round_trip() {
        let layout = Layout {
            draw_from_center: true,
            width: 1280.0,
            height: 720.0,
            max_parts_width: 1280.0,
            max_parts_height: 720.0,
            name: "RootLayout".into(),
        };

        let mut w = Writer::new(Endian::Big);
        layout.write(&mut w, Version::new(8, 0, 0)).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(Layout::read(&mut r, Version::new(8, 0, 0)).unwrap(), layout);

        // Old versions stop after the canvas size.
        let mut w = Writer::new(Endian::Big);
        layout.write(&mut w, Version::new(2, 0, 0)).unwrap();
        assert_eq!(w.into_bytes().len(), 12);
    }
}
