//! Color spaces used for histogram scoring.

use crate::image::color::rgb_to_hsv;
use crate::image::{ColorImage, OwnedImage};

/// Value range of one histogram channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelRange {
    /// Smallest value the channel takes.
    pub lo: u8,
    /// Largest value the channel takes (inclusive).
    pub hi: u8,
    /// Bin count used when the channel is histogrammed alone.
    pub natural_bins: usize,
}

const FULL: ChannelRange = ChannelRange {
    lo: 0,
    hi: 255,
    natural_bins: 256,
};

const HUE: ChannelRange = ChannelRange {
    lo: 0,
    hi: 179,
    natural_bins: 180,
};

/// Channel selection for histogram scoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// BT.601 intensity.
    #[default]
    Gray,
    /// Red channel only.
    Red,
    /// Red, green and blue.
    Rgb,
    /// Hue only (8-bit convention, `0..180`).
    Hue,
    /// Hue and saturation.
    HueSaturation,
    /// Hue, saturation and value.
    Hsv,
}

impl ColorSpace {
    /// All color spaces, in declaration order.
    pub const ALL: [ColorSpace; 6] = [
        ColorSpace::Gray,
        ColorSpace::Red,
        ColorSpace::Rgb,
        ColorSpace::Hue,
        ColorSpace::HueSaturation,
        ColorSpace::Hsv,
    ];

    /// Returns the channel ranges, in extraction order.
    pub fn channels(self) -> &'static [ChannelRange] {
        match self {
            ColorSpace::Gray | ColorSpace::Red => &[FULL],
            ColorSpace::Rgb => &[FULL, FULL, FULL],
            ColorSpace::Hue => &[HUE],
            ColorSpace::HueSaturation => &[HUE, FULL],
            ColorSpace::Hsv => &[HUE, FULL, FULL],
        }
    }

    /// Splits `image` into one plane per channel.
    pub fn extract(self, image: &ColorImage) -> Vec<OwnedImage> {
        match self {
            ColorSpace::Gray => vec![image.to_gray()],
            ColorSpace::Red => vec![image.map_channel(|[r, _, _]| r)],
            ColorSpace::Rgb => (0..3)
                .map(|c| image.map_channel(move |px| px[c]))
                .collect(),
            ColorSpace::Hue => vec![image.map_channel(|[r, g, b]| rgb_to_hsv(r, g, b)[0])],
            ColorSpace::HueSaturation => (0..2)
                .map(|c| image.map_channel(move |[r, g, b]| rgb_to_hsv(r, g, b)[c]))
                .collect(),
            ColorSpace::Hsv => (0..3)
                .map(|c| image.map_channel(move |[r, g, b]| rgb_to_hsv(r, g, b)[c]))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ColorSpace;
    use crate::image::ColorImage;

    #[test]
    fn plane_count_matches_channels() {
        let img = ColorImage::new(vec![200, 30, 10, 0, 0, 255], 2, 1).unwrap();
        for space in ColorSpace::ALL {
            let planes = space.extract(&img);
            assert_eq!(planes.len(), space.channels().len(), "{space:?}");
            for (plane, range) in planes.iter().zip(space.channels()) {
                assert!(plane
                    .data()
                    .iter()
                    .all(|&v| v >= range.lo && v <= range.hi));
            }
        }
    }

    #[test]
    fn red_and_hue_planes() {
        let img = ColorImage::new(vec![200, 30, 10, 0, 0, 255], 2, 1).unwrap();
        assert_eq!(ColorSpace::Red.extract(&img)[0].data(), &[200, 0]);
        assert_eq!(ColorSpace::Hue.extract(&img)[0].data()[1], 120);
    }
}
