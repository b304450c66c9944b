use symbolscan::lowlevel::{ImagePyramid, OwnedImage};
use symbolscan::{ColorImage, ImageView, SymbolScanError};

#[test]
fn image_view_rejects_invalid_layouts() {
    let data = [0u8; 8];
    assert_eq!(
        ImageView::from_slice(&data, 0, 1).err().unwrap(),
        SymbolScanError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );
    assert_eq!(
        ImageView::new(&data, 4, 1, 3).err().unwrap(),
        SymbolScanError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );
    assert_eq!(
        ImageView::new(&data[..3], 2, 2, 2).err().unwrap(),
        SymbolScanError::BufferTooSmall { needed: 4, got: 3 }
    );
}

#[test]
fn window_roi_is_zero_copy_and_bounded() {
    let data: Vec<u8> = (0u8..20).collect();
    let view = ImageView::from_slice(&data, 5, 4).unwrap();

    let roi = view.roi(1, 2, 3, 2).unwrap();
    assert_eq!(roi.stride(), 5);
    assert_eq!(roi.row(0).unwrap(), &[11u8, 12, 13]);
    assert_eq!(roi.row(1).unwrap(), &[16u8, 17, 18]);
    assert!(std::ptr::eq(roi.as_slice().as_ptr(), &data[11]));
    assert_eq!(roi.to_owned_image().data(), &[11u8, 12, 13, 16, 17, 18]);

    assert_eq!(
        view.roi(3, 3, 3, 2).err().unwrap(),
        SymbolScanError::RoiOutOfBounds {
            x: 3,
            y: 3,
            width: 3,
            height: 2,
            img_width: 5,
            img_height: 4,
        }
    );
}

#[test]
fn color_image_validates_and_converts() {
    assert_eq!(
        ColorImage::new(vec![0; 5], 1, 2).err().unwrap(),
        SymbolScanError::BufferTooSmall { needed: 6, got: 5 }
    );

    let img = ColorImage::new(vec![10, 10, 10, 255, 0, 0], 2, 1).unwrap();
    assert_eq!(img.pixel(1, 0), Some([255, 0, 0]));
    assert_eq!(img.pixel(2, 0), None);
    assert_eq!(img.to_gray().data(), &[10, 76]);

    let gray = OwnedImage::new(vec![7u8, 9], 1, 2).unwrap();
    let replicated = ColorImage::from_gray(&gray);
    assert_eq!(replicated.data(), &[7, 7, 7, 9, 9, 9]);
    assert_eq!(replicated.to_gray(), gray);
}

#[test]
fn pyramid_levels_halve_until_min_side() {
    let data: Vec<u8> = (0u8..64).collect();
    let view = ImageView::from_slice(&data, 8, 8).unwrap();

    let pyramid = ImagePyramid::build_u8(view, 10, 2).unwrap();
    assert_eq!(pyramid.levels().len(), 3);
    let level1 = pyramid.level(1).unwrap();
    assert_eq!((level1.width(), level1.height()), (4, 4));
    // (0 + 1 + 8 + 9 + 2) / 4
    assert_eq!(level1.get(0, 0).copied(), Some(5));
    assert!(pyramid.level(3).is_none());
}
