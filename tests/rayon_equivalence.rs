#![cfg(feature = "rayon")]

use symbolscan::{run_scan, ColorImage, ScanConfig};

fn make_template(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (cx, cy) = ((x / 6) as u32, (y / 6) as u32);
            let h = cx.wrapping_mul(0x9E37_79B1) ^ cy.wrapping_mul(0x85EB_CA77);
            let h = (h ^ (h >> 15)).wrapping_mul(0x2C1B_3C6D);
            data.push(40 + ((h ^ (h >> 12)) % 200) as u8);
        }
    }
    data
}

fn to_color(gray: &[u8], width: usize, height: usize) -> ColorImage {
    let data = gray.iter().flat_map(|&v| [v, v, v]).collect();
    ColorImage::new(data, width, height).unwrap()
}

#[test]
fn parallel_scan_matches_sequential() {
    let (tw, th) = (48, 40);
    let tpl = make_template(tw, th);
    let (w, h) = (320, 260);
    let mut target = vec![0u8; w * h];
    for (x0, y0) in [(30, 20), (200, 150), (210, 30)] {
        for y in 0..th {
            let dst = (y0 + y) * w + x0;
            target[dst..dst + tw].copy_from_slice(&tpl[y * tw..(y + 1) * tw]);
        }
    }
    let template = to_color(&tpl, tw, th);
    let target = to_color(&target, w, h);

    let seq = run_scan(
        &template,
        &target,
        &ScanConfig {
            parallel: false,
            ..ScanConfig::default()
        },
    )
    .unwrap();
    let par = run_scan(
        &template,
        &target,
        &ScanConfig {
            parallel: true,
            ..ScanConfig::default()
        },
    )
    .unwrap();

    assert!(seq.windows_scanned > 0);
    assert_eq!(seq, par);
}
