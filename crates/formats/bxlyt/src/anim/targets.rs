//! Target-field enumerations for animation sub-group kinds.
//!
//! A sub-group kind tag like `FLPA` splits into the platform letter (`F`,
//! `C` or `R`) and a 3-character curve category (`LPA`). Each category has
//! its own enumeration of animatable fields; a track's `target` byte
//! indexes into it. Material-color fields differ between the Rev dialect
//! and the other two.

use crate::material::byte_enum;
use crate::section::SectionTag;

byte_enum! {
    /// `LPA`: pane transform and size.
    pub enum PaneSrtField {
        TranslateX = 0,
        TranslateY = 1,
        TranslateZ = 2,
        RotateX = 3,
        RotateY = 4,
        RotateZ = 5,
        ScaleX = 6,
        ScaleY = 7,
        SizeX = 8,
        SizeY = 9,
    }
}

byte_enum! {
    /// `LVI`: pane visibility.
    pub enum VisibilityField {
        Visibility = 0,
    }
}

byte_enum! {
    /// `LTS`: texture SRT.
    pub enum TextureSrtField {
        TranslateS = 0,
        TranslateT = 1,
        Rotate = 2,
        ScaleS = 3,
        ScaleT = 4,
    }
}

byte_enum! {
    /// `LVC`: pane vertex colors.
    pub enum VertexColorField {
        LeftTopRed = 0,
        LeftTopGreen = 1,
        LeftTopBlue = 2,
        LeftTopAlpha = 3,
        RightTopRed = 4,
        RightTopGreen = 5,
        RightTopBlue = 6,
        RightTopAlpha = 7,
        LeftBottomRed = 8,
        LeftBottomGreen = 9,
        LeftBottomBlue = 10,
        LeftBottomAlpha = 11,
        RightBottomRed = 12,
        RightBottomGreen = 13,
        RightBottomBlue = 14,
        RightBottomAlpha = 15,
        PaneAlpha = 16,
    }
}

byte_enum! {
    /// `LMC` on Cafe/Ctr: material colors and constants.
    pub enum MaterialColorField {
        BlackColorRed = 0,
        BlackColorGreen = 1,
        BlackColorBlue = 2,
        BlackColorAlpha = 3,
        WhiteColorRed = 4,
        WhiteColorGreen = 5,
        WhiteColorBlue = 6,
        WhiteColorAlpha = 7,
        TextureColorBlendRatio = 8,
        TexColor0Red = 9,
        TexColor0Green = 10,
        TexColor0Blue = 11,
        TexColor0Alpha = 12,
        TexColor1Red = 13,
        TexColor1Green = 14,
        TexColor1Blue = 15,
        TexColor1Alpha = 16,
        TexColor2Red = 17,
        TexColor2Green = 18,
        TexColor2Blue = 19,
        TexColor2Alpha = 20,
        TevKonstantColor0Red = 21,
        TevKonstantColor0Green = 22,
        TevKonstantColor0Blue = 23,
        TevKonstantColor0Alpha = 24,
        TevKonstantColor1Red = 25,
        TevKonstantColor1Green = 26,
        TevKonstantColor1Blue = 27,
        TevKonstantColor1Alpha = 28,
        TevKonstantColor2Red = 29,
        TevKonstantColor2Green = 30,
        TevKonstantColor2Blue = 31,
        TevKonstantColor2Alpha = 32,
    }
}

byte_enum! {
    /// `LMC` on Rev: register and TEV constant colors.
    pub enum RevMaterialColorField {
        MatColorRed = 0,
        MatColorGreen = 1,
        MatColorBlue = 2,
        MatColorAlpha = 3,
        BlackColorRed = 4,
        BlackColorGreen = 5,
        BlackColorBlue = 6,
        BlackColorAlpha = 7,
        WhiteColorRed = 8,
        WhiteColorGreen = 9,
        WhiteColorBlue = 10,
        WhiteColorAlpha = 11,
        ColorReg3Red = 12,
        ColorReg3Green = 13,
        ColorReg3Blue = 14,
        ColorReg3Alpha = 15,
        TevColor1Red = 16,
        TevColor1Green = 17,
        TevColor1Blue = 18,
        TevColor1Alpha = 19,
        TevColor2Red = 20,
        TevColor2Green = 21,
        TevColor2Blue = 22,
        TevColor2Alpha = 23,
        TevColor3Red = 24,
        TevColor3Green = 25,
        TevColor3Blue = 26,
        TevColor3Alpha = 27,
        TevColor4Red = 28,
        TevColor4Green = 29,
        TevColor4Blue = 30,
        TevColor4Alpha = 31,
    }
}

byte_enum! {
    /// `LTP`: texture pattern image slots.
    pub enum TexturePatternField {
        Image1 = 0,
        Image2 = 1,
        Image3 = 2,
    }
}

byte_enum! {
    /// `LIM`: indirect texture SRT.
    pub enum IndirectSrtField {
        Rotation = 0,
        ScaleU = 1,
        ScaleV = 2,
    }
}

byte_enum! {
    /// `LCT`: font shadow colors.
    pub enum FontShadowField {
        BlackColorRed = 0,
        BlackColorGreen = 1,
        BlackColorBlue = 2,
        BlackColorAlpha = 3,
        WhiteColorRed = 4,
        WhiteColorGreen = 5,
        WhiteColorBlue = 6,
        WhiteColorAlpha = 7,
    }
}

/// Human-readable name of a sub-group kind, platform letter stripped.
pub fn kind_name(kind: SectionTag) -> Option<&'static str> {
    match &kind.0[1..] {
        b"LPA" => Some("PaneSRT"),
        b"LVI" => Some("Visibility"),
        b"LTS" => Some("TextureSRT"),
        b"LVC" => Some("VertexColor"),
        b"LMC" => Some("MaterialColor"),
        b"LTP" => Some("TexturePattern"),
        b"LIM" => Some("IndTextureSRT"),
        b"LAC" => Some("AlphaTest"),
        b"LCT" => Some("FontShadow"),
        b"LEU" => Some("UserData"),
        _ => None,
    }
}

/// Human-readable name of a track's target field, given its sub-group kind.
/// Unknown kinds and out-of-range values yield `None`.
pub fn target_field_name(kind: SectionTag, target: u8) -> Option<&'static str> {
    let rev = kind.0[0] == b'R';
    match &kind.0[1..] {
        b"LPA" => PaneSrtField::try_from_u8(target).map(PaneSrtField::name),
        b"LVI" => VisibilityField::try_from_u8(target).map(VisibilityField::name),
        b"LTS" => TextureSrtField::try_from_u8(target).map(TextureSrtField::name),
        b"LVC" => VertexColorField::try_from_u8(target).map(VertexColorField::name),
        b"LMC" if rev => {
            RevMaterialColorField::try_from_u8(target).map(RevMaterialColorField::name)
        }
        b"LMC" => MaterialColorField::try_from_u8(target).map(MaterialColorField::name),
        b"LTP" => TexturePatternField::try_from_u8(target).map(TexturePatternField::name),
        b"LIM" => IndirectSrtField::try_from_u8(target).map(IndirectSrtField::name),
        b"LCT" => FontShadowField::try_from_u8(target).map(FontShadowField::name),
        _ => None,
    }
}
