use symbolscan::lowlevel::{best_match, ScoreMap};
use symbolscan::{ColorImage, ColorSpace, ComparisonMethod, Polarity, RegionScorer, ScoreConfig};

fn synthetic_map() -> ScoreMap {
    // Global maximum at (4, 1), global minimum at (1, 3).
    let (w, h) = (6usize, 5usize);
    let mut data = vec![0.5f32; w * h];
    data[w + 4] = 0.97;
    data[3 * w + 1] = 0.02;
    ScoreMap::new(data, w, h).unwrap()
}

#[test]
fn distance_methods_pick_the_minimum() {
    let map = synthetic_map();
    for method in [ComparisonMethod::ChiSquare, ComparisonMethod::Bhattacharyya] {
        assert_eq!(method.polarity(), Polarity::LowerIsBetter);
        let best = best_match(&map, method);
        assert_eq!((best.x, best.y, best.value), (1, 3, 0.02));
    }
}

#[test]
fn similarity_methods_pick_the_maximum() {
    let map = synthetic_map();
    for method in [ComparisonMethod::Correlation, ComparisonMethod::Intersection] {
        assert_eq!(method.polarity(), Polarity::HigherIsBetter);
        let best = best_match(&map, method);
        assert_eq!((best.x, best.y, best.value), (4, 1, 0.97));
    }
}

#[test]
fn every_method_locates_an_embedded_color_template() {
    let (w, h) = (30usize, 24usize);
    let (tw, th) = (7usize, 6usize);
    let (x0, y0) = (15usize, 11usize);
    let mut region = vec![0u8; w * h * 3];
    let mut tpl = Vec::with_capacity(tw * th * 3);
    for ty in 0..th {
        for tx in 0..tw {
            let px = [
                (60 + tx * 23) as u8,
                (200 - ty * 19) as u8,
                (90 + (tx * ty * 7) % 120) as u8,
            ];
            tpl.extend_from_slice(&px);
            let idx = ((y0 + ty) * w + x0 + tx) * 3;
            region[idx..idx + 3].copy_from_slice(&px);
        }
    }
    let template = ColorImage::new(tpl, tw, th).unwrap();
    let region = ColorImage::new(region, w, h).unwrap();

    for color_space in [ColorSpace::Rgb, ColorSpace::Hsv, ColorSpace::Gray] {
        for method in [
            ComparisonMethod::Correlation,
            ComparisonMethod::ChiSquare,
            ComparisonMethod::Intersection,
            ComparisonMethod::Bhattacharyya,
        ] {
            let scorer = RegionScorer::new(ScoreConfig {
                color_space,
                method,
                bins_per_channel: None,
            })
            .unwrap();
            let found = scorer.score(&template, &region).unwrap();
            assert_eq!((found.x, found.y), (x0, y0), "{color_space:?} {method:?}");
        }
    }
}
