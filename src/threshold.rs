use image::RgbaImage;

pub const NUMBER_OF_HISTOGRAM_BUCKETS: usize = 256;

/// Turn an image into a histogram of luma, or intensity.
///
/// Each of the 256 buckets counts the pixels in that range of intensity,
/// with luma = RGB * [.299, .587, .114] ( https://en.wikipedia.org/wiki/YUV#Conversion_to/from_RGB ).
pub fn luma_histogram(image: &RgbaImage) -> [u64; NUMBER_OF_HISTOGRAM_BUCKETS] {
    let mut histogram = [0u64; NUMBER_OF_HISTOGRAM_BUCKETS];

    for pixel in image.pixels() {
        // Integer arithmetic with a post-divisor, so the weights sum to 1000.
        let luma = (299 * pixel[0] as u32 + 587 * pixel[1] as u32 + 114 * pixel[2] as u32) / 1000;
        histogram[luma as usize] += 1;
    }

    histogram
}

/// Otsu's method: pick the cut through a roughly bimodal histogram that
/// separates foreground from background, returned as a normalized threshold
/// in [0, 1] ( https://en.wikipedia.org/wiki/Otsu%27s_method ).
///
/// This is the optimized form that maximizes inter-class variance rather than
/// minimizing intra-class variance. Ties resolve to the higher index.
pub fn otsu_threshold(histogram: &[u64; NUMBER_OF_HISTOGRAM_BUCKETS]) -> f32 {
    // omega0 and mu0_numerator accumulate as the cut moves up; omega1 and
    // mu1_numerator are derived from the grand totals computed once here.
    let sum_of_omegas: u64 = histogram.iter().sum();
    let sum_of_mu_numerators: u64 = histogram
        .iter()
        .enumerate()
        .map(|(index, &count)| index as u64 * count)
        .sum();

    let mut omega0 = 0u64;
    let mut mu0_numerator = 0u64;
    let mut maximum_inter_class_variance = 0.0f64;
    let mut best_cut = 0usize;

    for index in 0..NUMBER_OF_HISTOGRAM_BUCKETS {
        omega0 += histogram[index];
        let omega1 = sum_of_omegas - omega0;
        // Either class having zero weight leaves its mean undefined.
        if omega0 == 0 || omega1 == 0 {
            continue;
        }

        mu0_numerator += index as u64 * histogram[index];
        let mu1_numerator = sum_of_mu_numerators - mu0_numerator;
        let mu0 = mu0_numerator as f64 / omega0 as f64;
        let mu1 = mu1_numerator as f64 / omega1 as f64;
        // The weights are widened to f64 before multiplying; the product of
        // two pixel counts can overflow 32-bit arithmetic on large photos.
        let inter_class_variance = omega0 as f64 * omega1 as f64 * (mu0 - mu1).powi(2);

        if inter_class_variance >= maximum_inter_class_variance {
            maximum_inter_class_variance = inter_class_variance;
            best_cut = index;
        }
    }

    best_cut as f32 / (NUMBER_OF_HISTOGRAM_BUCKETS - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use image::Rgba;

    /// Straightforward reference computation of the best cut, for checking
    /// the incremental form against
    fn brute_force_best_cut(histogram: &[u64; NUMBER_OF_HISTOGRAM_BUCKETS]) -> usize {
        let mut best_cut = 0;
        let mut best_variance = 0.0f64;

        for cut in 0..NUMBER_OF_HISTOGRAM_BUCKETS {
            let omega0: u64 = histogram[..=cut].iter().sum();
            let omega1: u64 = histogram[cut + 1..].iter().sum();
            if omega0 == 0 || omega1 == 0 {
                continue;
            }

            let mu0 = histogram[..=cut]
                .iter()
                .enumerate()
                .map(|(i, &c)| (i as u64 * c) as f64)
                .sum::<f64>()
                / omega0 as f64;
            let mu1 = histogram[cut + 1..]
                .iter()
                .enumerate()
                .map(|(i, &c)| ((cut + 1 + i) as u64 * c) as f64)
                .sum::<f64>()
                / omega1 as f64;

            let variance = omega0 as f64 * omega1 as f64 * (mu0 - mu1).powi(2);
            if variance >= best_variance {
                best_variance = variance;
                best_cut = cut;
            }
        }

        best_cut
    }

    #[test]
    fn symmetric_two_spike_histogram_matches_reference() {
        let mut histogram = [0u64; NUMBER_OF_HISTOGRAM_BUCKETS];
        histogram[10] = 1000;
        histogram[200] = 1000;

        let threshold = otsu_threshold(&histogram);
        let expected_cut = brute_force_best_cut(&histogram);

        // Every cut between the spikes yields the same variance, and the
        // non-strict comparison resolves the tie to the highest index.
        assert_eq!(expected_cut, 199);
        assert_approx_eq!(threshold, 199.0 / 255.0, 1e-6);
    }

    #[test]
    fn asymmetric_histogram_matches_reference() {
        let mut histogram = [0u64; NUMBER_OF_HISTOGRAM_BUCKETS];
        histogram[30] = 500;
        histogram[35] = 200;
        histogram[180] = 900;
        histogram[220] = 50;

        let threshold = otsu_threshold(&histogram);
        let expected_cut = brute_force_best_cut(&histogram);

        assert_approx_eq!(threshold, expected_cut as f32 / 255.0, 1e-6);
    }

    #[test]
    fn empty_histogram_yields_zero() {
        let histogram = [0u64; NUMBER_OF_HISTOGRAM_BUCKETS];
        assert_approx_eq!(otsu_threshold(&histogram), 0.0, 1e-6);
    }

    #[test]
    fn single_spike_has_no_valid_cut() {
        let mut histogram = [0u64; NUMBER_OF_HISTOGRAM_BUCKETS];
        histogram[128] = 4000;

        // One class is always empty, so every position is skipped.
        assert_approx_eq!(otsu_threshold(&histogram), 0.0, 1e-6);
    }

    #[test]
    fn luma_histogram_buckets_by_intensity() {
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255])); // luma 0
        image.put_pixel(1, 0, Rgba([255, 255, 255, 255])); // luma 255
        image.put_pixel(0, 1, Rgba([255, 0, 0, 255])); // luma 76
        image.put_pixel(1, 1, Rgba([255, 0, 0, 255]));

        let histogram = luma_histogram(&image);

        assert_eq!(histogram[0], 1);
        assert_eq!(histogram[255], 1);
        assert_eq!(histogram[76], 2);
        assert_eq!(histogram.iter().sum::<u64>(), 4);
    }
}
