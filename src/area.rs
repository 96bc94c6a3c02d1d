use std::collections::HashSet;

use crate::drawing::DrawingSink;
use crate::errors::{LeafSegError, Result};
use crate::flood_fill::flood_fill;
use crate::labeling::{ConnectedComponentsInfo, BACKGROUND_LABEL};
use crate::pixels::{BooleanPixelSource, Point};

/// Relates a known physical length to its length in pixels, so pixel counts
/// can be converted to physical areas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    /// Length of the scale mark in pixels
    pub scale_mark_pixel_length: f64,
    /// Physical length the scale mark represents, in the caller's unit
    pub physical_length: f64,
}

impl Scale {
    /// Convert a pixel count to a physical area in squared units
    pub fn pixels_to_physical_area(&self, pixels: u64) -> f64 {
        (self.physical_length / self.scale_mark_pixel_length).powi(2) * pixels as f64
    }
}

/// Per-call inputs to the area calculation, passed explicitly rather than as
/// ambient configuration
#[derive(Debug, Clone, Default)]
pub struct AreaOptions {
    /// A caller-identified "this is the leaf" point; it must have been passed
    /// to the labeler as a point to identify
    pub leaf_point: Option<Point>,
    /// Empty labels the user marked as not being herbivory
    pub excluded_labels: HashSet<i32>,
    pub scale: Option<Scale>,
}

/// Outcome of the area calculation. A blank or solid image is an expected
/// empty result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaReport {
    NoLeafFound,
    Leaf(LeafMeasurements),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafMeasurements {
    pub leaf_label: i32,
    /// Empty labels that qualified as holes eaten out of the leaf
    pub hole_labels: Vec<i32>,
    pub leaf_area_pixels: u64,
    pub consumed_pixels: u64,
    pub percent_consumed: f64,
    leaf_area_physical: Option<f64>,
    consumed_area_physical: Option<f64>,
}

impl LeafMeasurements {
    /// Leaf area in physical squared units; requires a scale to have been
    /// supplied to the calculation
    pub fn physical_leaf_area(&self) -> Result<f64> {
        self.leaf_area_physical.ok_or(LeafSegError::MissingScale)
    }

    /// Consumed area in physical squared units; requires a scale to have been
    /// supplied to the calculation
    pub fn physical_consumed_area(&self) -> Result<f64> {
        self.consumed_area_physical.ok_or(LeafSegError::MissingScale)
    }
}

/// Turn labeled-component output into leaf area, consumed area, and the
/// percentage of the leaf that was eaten.
///
/// The leaf is the component at the identified leaf point, or failing that
/// the largest occupied component. A hole counts as consumed if it is not
/// part of the background, not excluded by the user, and borders the leaf.
/// User drawing on the leaf itself also counts as consumed: it marks
/// herbivory along the margin that thresholding restored.
pub fn analyze_consumed_area(
    info: &ConnectedComponentsInfo,
    options: &AreaOptions,
) -> Result<AreaReport> {
    let leaf_label = match select_leaf_label(info, options) {
        Some(label) => label,
        // A blank image has no occupied component at all.
        None => return Ok(AreaReport::NoLeafFound),
    };

    // A solid image has no empty component besides the outside of the image,
    // so there is no meaningful hole/background distinction either.
    let hole_candidates: Vec<i32> = info
        .label_to_size
        .keys()
        .copied()
        .filter(|&label| label < 0 && label != BACKGROUND_LABEL)
        .collect();
    if hole_candidates.is_empty() {
        return Ok(AreaReport::NoLeafFound);
    }

    // Adjacency sets still hold pre-consolidation occupied labels, so holes
    // are matched against the leaf's whole equivalence class.
    let leaf_class = info.equivalence_classes.get_elements_in_class_with(leaf_label)?;

    let mut hole_labels: Vec<i32> = hole_candidates
        .into_iter()
        .filter(|label| !options.excluded_labels.contains(label))
        .filter(|label| {
            info.empty_label_to_neighboring_occupied_labels
                .get(label)
                .map_or(false, |neighbors| !neighbors.is_disjoint(leaf_class))
        })
        .collect();
    hole_labels.sort();

    let leaf_size = info
        .label_to_size
        .get(&leaf_label)
        .ok_or(LeafSegError::UnknownLabel(leaf_label))?;

    let holes_pixels: u64 = hole_labels
        .iter()
        .filter_map(|label| info.label_to_size.get(label))
        .map(|size| size.standard_part)
        .sum();

    let consumed_pixels = leaf_size.drawing_part + holes_pixels;
    let leaf_area_pixels = leaf_size.standard_part + consumed_pixels;
    let percent_consumed = consumed_pixels as f64 / leaf_area_pixels as f64 * 100.0;

    let leaf_area_physical = options
        .scale
        .map(|scale| scale.pixels_to_physical_area(leaf_area_pixels));
    let consumed_area_physical = options
        .scale
        .map(|scale| scale.pixels_to_physical_area(consumed_pixels));

    Ok(AreaReport::Leaf(LeafMeasurements {
        leaf_label,
        hole_labels,
        leaf_area_pixels,
        consumed_pixels,
        percent_consumed,
        leaf_area_physical,
        consumed_area_physical,
    }))
}

/// Flood-fill every qualifying hole into the sink, rendering the consumed
/// region for display
pub fn fill_consumed_regions<I, S>(
    measurements: &LeafMeasurements,
    info: &ConnectedComponentsInfo,
    image: &I,
    sink: &mut S,
) -> Result<()>
where
    I: BooleanPixelSource,
    S: DrawingSink,
{
    for &hole_label in &measurements.hole_labels {
        let member_point = *info
            .label_to_member_point
            .get(&hole_label)
            .ok_or(LeafSegError::UnknownLabel(hole_label))?;
        flood_fill(image, member_point, sink);
    }

    Ok(())
}

/// The identified leaf point wins when it resolved to an occupied label;
/// otherwise the largest occupied component is assumed to be the leaf (the
/// runner-up is typically the scale mark)
fn select_leaf_label(info: &ConnectedComponentsInfo, options: &AreaOptions) -> Option<i32> {
    if let Some(point) = options.leaf_point {
        if let Some(&label) = info.labels_of_points_to_identify.get(&point) {
            if label > 0 {
                return Some(label);
            }
        }
    }

    info.label_to_size
        .iter()
        .filter(|(&label, _)| label > 0)
        .max_by_key(|(&label, size)| (size.total(), label))
        .map(|(&label, _)| label)
}
