//! Picture pane payload (`pic1`): a material-mapped quad with per-corner
//! vertex colors.

use serde::{Deserialize, Serialize};

use super::TexCoord;
use crate::color::Color;
use crate::cursor::{Reader, Writer};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Picture {
    pub color_top_left: Color,
    pub color_top_right: Color,
    pub color_bottom_left: Color,
    pub color_bottom_right: Color,
    pub material_index: u16,
    pub is_shape: bool,
    /// One quad per texture coordinate set; which set a texture map uses is
    /// selected by its tex-coord generator.
    pub tex_coords: Vec<TexCoord>,
}

impl Picture {
    pub fn read(r: &mut Reader<'_>) -> Result<Picture> {
        let color_top_left = Color::read_rgba32(r)?;
        let color_top_right = Color::read_rgba32(r)?;
        let color_bottom_left = Color::read_rgba32(r)?;
        let color_bottom_right = Color::read_rgba32(r)?;
        let material_index = r.read_u16()?;
        let uv_count = r.read_u8()?;
        let is_shape = r.read_bool()?;

        let mut tex_coords = Vec::with_capacity(uv_count as usize);
        for _ in 0..uv_count {
            tex_coords.push(TexCoord::read(r)?);
        }

        Ok(Picture {
            color_top_left,
            color_top_right,
            color_bottom_left,
            color_bottom_right,
            material_index,
            is_shape,
            tex_coords,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        self.color_top_left.write_rgba32(w);
        self.color_top_right.write_rgba32(w);
        self.color_bottom_left.write_rgba32(w);
        self.color_bottom_right.write_rgba32(w);
        w.write_u16(self.material_index);
        w.write_u8(self.tex_coords.len() as u8);
        w.write_bool(self.is_shape);
        for tex_coord in &self.tex_coords {
            tex_coord.write(w);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;
    use glam::Vec2;

    #[test]
    fn payload_round_trip() {
        let picture = Picture {
            color_top_left: Color::from_rgba32(0xFF00FF00),
            color_bottom_right: Color::from_rgba32(0x11223344),
            material_index: 3,
            is_shape: true,
            tex_coords: vec![TexCoord {
                top_left: Vec2::ZERO,
                top_right: Vec2::new(1.0, 0.0),
                bottom_left: Vec2::new(0.0, 1.0),
                bottom_right: Vec2::ONE,
            }],
            ..Picture::default()
        };

        let mut w = Writer::new(Endian::Big);
        picture.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        // 4 colors + material + count + shape + one 32-byte quad
        assert_eq!(bytes.len(), 16 + 4 + 32);

        let mut r = Reader::new(&bytes);
        assert_eq!(Picture::read(&mut r).unwrap(), picture);
    }
}
