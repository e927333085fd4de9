//! Sentinel-2 Level-2A scene classification (SCL) codebook

use burned_area_core::{Error, Raster, Result};

/// Per-pixel content label from the SCL band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SceneClass {
    NoData = 0,
    SaturatedOrDefective = 1,
    DarkAreaPixels = 2,
    CloudShadows = 3,
    Vegetation = 4,
    NotVegetated = 5,
    Water = 6,
    Unclassified = 7,
    CloudMediumProbability = 8,
    CloudHighProbability = 9,
    ThinCirrus = 10,
    SnowIce = 11,
}

/// Classes whose pixels are reported as invalid regardless of index change.
///
/// `NotVegetated`, `Water` and `DarkAreaPixels` stay valid: such a pixel
/// cannot be flagged burned unless the other acquisition saw vegetation,
/// but it is not masked either.
pub const DEFAULT_INVALID_CLASSES: [SceneClass; 8] = [
    SceneClass::NoData,
    SceneClass::SaturatedOrDefective,
    SceneClass::CloudShadows,
    SceneClass::Unclassified,
    SceneClass::CloudMediumProbability,
    SceneClass::CloudHighProbability,
    SceneClass::ThinCirrus,
    SceneClass::SnowIce,
];

impl SceneClass {
    /// Raw SCL code
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            SceneClass::NoData => "no data",
            SceneClass::SaturatedOrDefective => "saturated or defective",
            SceneClass::DarkAreaPixels => "dark area pixels",
            SceneClass::CloudShadows => "cloud shadows",
            SceneClass::Vegetation => "vegetation",
            SceneClass::NotVegetated => "not vegetated",
            SceneClass::Water => "water",
            SceneClass::Unclassified => "unclassified",
            SceneClass::CloudMediumProbability => "cloud medium probability",
            SceneClass::CloudHighProbability => "cloud high probability",
            SceneClass::ThinCirrus => "thin cirrus",
            SceneClass::SnowIce => "snow or ice",
        }
    }
}

impl TryFrom<u8> for SceneClass {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        Ok(match code {
            0 => SceneClass::NoData,
            1 => SceneClass::SaturatedOrDefective,
            2 => SceneClass::DarkAreaPixels,
            3 => SceneClass::CloudShadows,
            4 => SceneClass::Vegetation,
            5 => SceneClass::NotVegetated,
            6 => SceneClass::Water,
            7 => SceneClass::Unclassified,
            8 => SceneClass::CloudMediumProbability,
            9 => SceneClass::CloudHighProbability,
            10 => SceneClass::ThinCirrus,
            11 => SceneClass::SnowIce,
            other => return Err(other),
        })
    }
}

/// Lookup table `code -> is in set` over the whole byte range
pub(crate) fn class_mask(classes: &[SceneClass]) -> [bool; 256] {
    let mut mask = [false; 256];
    for class in classes {
        mask[class.code() as usize] = true;
    }
    mask
}

/// Reject a scene classification raster holding any code outside the codebook.
///
/// Reports the first offending pixel in row-major order.
pub fn validate_scene_classes(scl: &Raster<u8>, name: &str) -> Result<()> {
    let cols = scl.cols();
    match scl
        .data()
        .iter()
        .position(|&code| SceneClass::try_from(code).is_err())
    {
        None => Ok(()),
        Some(idx) => {
            let (row, col) = (idx / cols, idx % cols);
            Err(Error::InvalidClassCode {
                name: name.to_string(),
                code: scl.data()[(row, col)],
                row,
                col,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        for code in 0u8..=11 {
            let class = SceneClass::try_from(code).unwrap();
            assert_eq!(class.code(), code);
        }
        assert_eq!(SceneClass::try_from(12), Err(12));
        assert_eq!(SceneClass::try_from(255), Err(255));
    }

    #[test]
    fn test_default_invalid_set() {
        let mask = class_mask(&DEFAULT_INVALID_CLASSES);
        let invalid: Vec<u8> = (0u8..=11).filter(|&c| mask[c as usize]).collect();
        assert_eq!(invalid, vec![0, 1, 3, 7, 8, 9, 10, 11]);
        assert!(!mask[SceneClass::Vegetation.code() as usize]);
        assert!(!mask[SceneClass::NotVegetated.code() as usize]);
        assert!(!mask[SceneClass::Water.code() as usize]);
    }

    #[test]
    fn test_validate_reports_first_bad_pixel() {
        let mut scl = Raster::filled(3, 4, 4u8);
        assert!(validate_scene_classes(&scl, "pre_scl").is_ok());

        scl.set(1, 2, 42).unwrap();
        scl.set(2, 0, 200).unwrap();
        match validate_scene_classes(&scl, "pre_scl") {
            Err(Error::InvalidClassCode { name, code, row, col }) => {
                assert_eq!(name, "pre_scl");
                assert_eq!((code, row, col), (42, 1, 2));
            }
            other => panic!("expected InvalidClassCode, got {:?}", other),
        }
    }
}
