use std::collections::{HashMap, HashSet};
use std::ops::AddAssign;

use crate::errors::{LeafSegError, Result};
use crate::pixels::{LayeredPixelSource, Occupancy, Point};
use crate::union_find::UnionFind;

/// Label for the area outside the image. Empty pixels on the image border are
/// merged into this class as they are scanned.
pub const BACKGROUND_LABEL: i32 = -1;

/// Layer index of the user-overlay correction drawing
pub const DRAWING_LAYER: usize = 1;

/// Pixel count of a component, split by where the pixels came from.
///
/// Keeping the user-drawing pixels separate lets drawn leaf corrections count
/// as consumed area without being conflated with holes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub standard_part: u64,
    pub drawing_part: u64,
}

impl Size {
    pub fn total(&self) -> u64 {
        self.standard_part + self.drawing_part
    }
}

impl AddAssign for Size {
    fn add_assign(&mut self, other: Size) {
        self.standard_part += other.standard_part;
        self.drawing_part += other.drawing_part;
    }
}

/// Everything the labeling scan produces.
///
/// Positive labels are occupied components, negative labels are empty ones.
/// All maps are keyed by consolidated (representative) labels.
#[derive(Debug)]
pub struct ConnectedComponentsInfo {
    /// One pixel inside each component, for reconstructing it later
    pub label_to_member_point: HashMap<i32, Point>,
    /// Which occupied components surround each empty component
    pub empty_label_to_neighboring_occupied_labels: HashMap<i32, HashSet<i32>>,
    /// Size of each component
    pub label_to_size: HashMap<i32, Size>,
    /// Which labels denote the same physical component
    pub equivalence_classes: UnionFind,
    /// Consolidated label of each requested query point
    pub labels_of_points_to_identify: HashMap<Point, i32>,
}

/// Find all the connected components in a layered occupancy image
/// ( https://en.wikipedia.org/wiki/Connected-component_labeling ).
///
/// "Occupied" refers to true values in the image and "empty" to false values:
/// the leaf and the scale mark are occupied components, while the holes in
/// the leaf are empty components. Layer 0 is the detected leaf, layer 1 the
/// user drawing. The consolidated label of every point in
/// `points_to_identify` is reported in the returned info.
///
/// Single top-to-bottom, left-to-right pass with 4-connectivity, O(w * h).
pub fn label_connected_components<I: LayeredPixelSource>(
    image: &I,
    points_to_identify: &[Point],
) -> Result<ConnectedComponentsInfo> {
    let width = image.width();
    let height = image.height();

    for point in points_to_identify {
        if point.x >= width || point.y >= height {
            return Err(LeafSegError::PointOutOfBounds {
                x: point.x,
                y: point.y,
                width,
                height,
            });
        }
    }

    let mut label_to_member_point: HashMap<i32, Point> = HashMap::new();
    let mut empty_label_to_neighboring_occupied_labels: HashMap<i32, HashSet<i32>> = HashMap::new();
    let mut label_to_size: HashMap<i32, Size> = HashMap::new();
    // A single blob may get partially marked with one label and partially
    // with another before the scan discovers they connect; this tracks which
    // labels are really the same component.
    let mut equivalence_classes = UnionFind::new();

    // Positive labels for occupied components, negative for empty ones.
    let mut next_occupied_label = 1;
    let mut next_empty_label = -2;

    equivalence_classes.create_subset_with(BACKGROUND_LABEL)?;
    empty_label_to_neighboring_occupied_labels.insert(BACKGROUND_LABEL, HashSet::new());
    label_to_size.insert(BACKGROUND_LABEL, Size::default());

    // Only west and north neighbors have been visited already, so the scan
    // keeps just the previous row's values and the previous pixel's values
    // instead of a full label image.
    let mut previous_row_occupied: Vec<bool> = Vec::new();
    let mut previous_row_labels: Vec<i32> = Vec::new();

    // Query points indexed by row, so each row can be checked cheaply.
    let mut query_xs_by_y: HashMap<u32, Vec<u32>> = HashMap::new();
    for point in points_to_identify {
        query_xs_by_y.entry(point.y).or_default().push(point.x);
    }
    // Indexed label -> points to make consolidation remapping easy.
    let mut labels_to_query_points: HashMap<i32, Vec<Point>> = HashMap::new();

    for y in 0..height {
        let mut current_row_occupied: Vec<bool> = Vec::with_capacity(width as usize);
        let mut current_row_labels: Vec<i32> = Vec::with_capacity(width as usize);

        let mut previous_x_occupied = false;
        let mut previous_x_label = 0;

        for x in 0..width {
            let occupancy = image.occupancy_and_layer(x, y);
            let is_occupied = occupancy.is_occupied();
            current_row_occupied.push(is_occupied);

            let west = (x > 0).then_some((previous_x_occupied, previous_x_label));
            let north = (y > 0).then(|| {
                (
                    previous_row_occupied[x as usize],
                    previous_row_labels[x as usize],
                )
            });

            let west_matches = west.map(|(occupied, _)| occupied) == Some(is_occupied);
            let north_matches = north.map(|(occupied, _)| occupied) == Some(is_occupied);

            let label = if west_matches {
                let (_, west_label) = west.unwrap_or_default();
                // Matching both west and north means those two labels belong
                // to the same component, connected through this pixel.
                if north_matches {
                    let (_, north_label) = north.unwrap_or_default();
                    equivalence_classes.combine_classes_containing(west_label, north_label)?;
                }
                west_label
            } else if north_matches {
                let (_, north_label) = north.unwrap_or_default();
                north_label
            } else {
                // Matches neither neighbor: a new component starts here.
                let label = if is_occupied {
                    next_occupied_label += 1;
                    next_occupied_label - 1
                } else {
                    next_empty_label -= 1;
                    next_empty_label + 1
                };

                label_to_member_point.insert(label, Point::new(x, y));
                empty_label_to_neighboring_occupied_labels.insert(label, HashSet::new());
                label_to_size.insert(label, Size::default());
                equivalence_classes.create_subset_with(label)?;

                label
            };

            // Pixels on the drawing layer are the user's correction strokes;
            // everything else counts as the base image.
            let size = label_to_size.entry(label).or_default();
            if occupancy == Occupancy::Occupied(DRAWING_LAYER) {
                size.drawing_part += 1;
            } else {
                size.standard_part += 1;
            }

            // Record empty/occupied adjacency in both scan directions.
            if is_occupied {
                if let Some((false, west_label)) = west {
                    empty_label_to_neighboring_occupied_labels
                        .entry(west_label)
                        .or_default()
                        .insert(label);
                }
                if let Some((false, north_label)) = north {
                    empty_label_to_neighboring_occupied_labels
                        .entry(north_label)
                        .or_default()
                        .insert(label);
                }
            } else {
                if let Some((true, west_label)) = west {
                    empty_label_to_neighboring_occupied_labels
                        .entry(label)
                        .or_default()
                        .insert(west_label);
                }
                if let Some((true, north_label)) = north {
                    empty_label_to_neighboring_occupied_labels
                        .entry(label)
                        .or_default()
                        .insert(north_label);
                }
            }

            // Empty border pixels belong to the outside of the image. They
            // are merged per pixel because border empties are not guaranteed
            // to be 4-connected to each other around occupied obstructions.
            if !is_occupied && (y == 0 || x == 0 || y == height - 1 || x == width - 1) {
                equivalence_classes.combine_classes_containing(label, BACKGROUND_LABEL)?;
            }

            previous_x_occupied = is_occupied;
            previous_x_label = label;
            current_row_labels.push(label);
        }

        // Record the pre-consolidation labels of this row's query points.
        if let Some(xs) = query_xs_by_y.get(&y) {
            for &x in xs {
                let label = current_row_labels[x as usize];
                labels_to_query_points
                    .entry(label)
                    .or_default()
                    .push(Point::new(x, y));
            }
        }

        previous_row_occupied = current_row_occupied;
        previous_row_labels = current_row_labels;
    }

    // The background sentinel has no real member point. Borrow one from
    // another member of its class, or drop the class entirely if nothing was
    // merged into it (it carries no information then).
    let background_class = equivalence_classes.get_class_of(BACKGROUND_LABEL)?;
    let background_member = equivalence_classes
        .get_elements_in_class_with(BACKGROUND_LABEL)?
        .iter()
        .copied()
        .find(|&label| label != BACKGROUND_LABEL);
    match background_member {
        Some(member) => {
            let point = *label_to_member_point
                .get(&member)
                .ok_or(LeafSegError::UnknownLabel(member))?;
            label_to_member_point.insert(BACKGROUND_LABEL, point);
        }
        None => {
            label_to_member_point.remove(&BACKGROUND_LABEL);
            empty_label_to_neighboring_occupied_labels.remove(&BACKGROUND_LABEL);
            label_to_size.remove(&BACKGROUND_LABEL);
            equivalence_classes.remove_class(background_class);
        }
    }

    let mut labels_of_points_to_identify: HashMap<Point, i32> = HashMap::new();

    // Consolidate equivalent labels into one surviving label per class.
    let class_member_sets: Vec<Vec<i32>> = equivalence_classes
        .classes()
        .map(|elements| elements.iter().copied().collect())
        .collect();
    for elements in class_member_sets {
        // Taking the numerically greatest label makes the background class
        // keep -1, the greatest among the negative labels merged into it.
        let representative = elements
            .iter()
            .copied()
            .max()
            .ok_or_else(|| LeafSegError::Other("empty equivalence class".to_string()))?;

        // The member point becomes the topmost point in the class, so the
        // leaf marker gets drawn where it is least likely to overlap the leaf.
        let mut topmost_member_point: Option<Point> = None;
        for &label in &elements {
            let point = *label_to_member_point
                .get(&label)
                .ok_or(LeafSegError::UnknownLabel(label))?;
            if topmost_member_point.map_or(true, |topmost| point.y < topmost.y) {
                topmost_member_point = Some(point);
            }
        }
        if let Some(point) = topmost_member_point {
            label_to_member_point.insert(representative, point);
        }

        for &label in &elements {
            // Labels recorded for query points are obsolete once the class
            // collapses; save off the canonical label instead.
            if let Some(points) = labels_to_query_points.get(&label) {
                for &point in points {
                    labels_of_points_to_identify.insert(point, representative);
                }
            }
        }

        for &label in &elements {
            if label == representative {
                continue;
            }

            if let Some(size) = label_to_size.remove(&label) {
                *label_to_size.entry(representative).or_default() += size;
            }
            if let Some(neighbors) = empty_label_to_neighboring_occupied_labels.remove(&label) {
                empty_label_to_neighboring_occupied_labels
                    .entry(representative)
                    .or_default()
                    .extend(neighbors);
            }
            label_to_member_point.remove(&label);
        }
    }

    Ok(ConnectedComponentsInfo {
        label_to_member_point,
        empty_label_to_neighboring_occupied_labels,
        label_to_size,
        equivalence_classes,
        labels_of_points_to_identify,
    })
}
