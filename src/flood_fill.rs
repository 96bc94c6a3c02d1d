use std::collections::{HashMap, VecDeque};

use crate::drawing::DrawingSink;
use crate::pixels::{BooleanPixelSource, Point};

/// Scanline flood fill ( https://en.wikipedia.org/wiki/Flood_fill ).
///
/// Paints the entire unoccupied region 4-connected to `starting_point`,
/// issuing one `draw_line` call per horizontal run. The starting point is
/// assumed to be unoccupied. Seeds for the rows above and below a run are only
/// enqueued at occupied-to-unoccupied transition boundaries, which keeps the
/// total work proportional to the filled area rather than area times
/// perimeter.
pub fn flood_fill<I, S>(image: &I, starting_point: Point, sink: &mut S)
where
    I: BooleanPixelSource,
    S: DrawingSink,
{
    let width = image.width();
    let height = image.height();

    // Maps a y coordinate to the x ranges already filled on that row.
    let mut filled_ranges: HashMap<u32, Vec<(u32, u32)>> = HashMap::new();
    let mut queue: VecDeque<Point> = VecDeque::from([starting_point]);

    while let Some(point) = queue.pop_front() {
        let (x, y) = (point.x, point.y);

        // If this point is already covered by a filled run, truncate here.
        if is_filled(x, y, &filled_ranges) {
            continue;
        }

        // Check whether the points directly below and above should seed.
        if y < height - 1 && !image.is_occupied(x, y + 1) && !is_filled(x, y + 1, &filled_ranges) {
            queue.push_back(Point::new(x, y + 1));
        }
        if y > 0 && !image.is_occupied(x, y - 1) && !is_filled(x, y - 1, &filled_ranges) {
            queue.push_back(Point::new(x, y - 1));
        }

        // While extending the run, the neighbor rows only need a new seed
        // after passing an occupied stretch; otherwise the seed above would be
        // part of a run that is already queued. Eligibility starts from the
        // occupancy of the pixels directly below and above the seed.
        let initial_eligible_below = y < height - 1 && image.is_occupied(x, y + 1);
        let initial_eligible_above = y > 0 && image.is_occupied(x, y - 1);

        // Move left as far as possible.
        let mut leftmost_x = x;
        let mut eligible_below = initial_eligible_below;
        let mut eligible_above = initial_eligible_above;
        while leftmost_x > 0 && !image.is_occupied(leftmost_x - 1, y) {
            leftmost_x -= 1;

            if y < height - 1 {
                check_neighbor_seed(
                    image,
                    leftmost_x,
                    y + 1,
                    &mut eligible_below,
                    &filled_ranges,
                    &mut queue,
                );
            }
            if y > 0 {
                check_neighbor_seed(
                    image,
                    leftmost_x,
                    y - 1,
                    &mut eligible_above,
                    &filled_ranges,
                    &mut queue,
                );
            }
        }

        // Move right as far as possible.
        let mut rightmost_x = x;
        eligible_below = initial_eligible_below;
        eligible_above = initial_eligible_above;
        while rightmost_x < width - 1 && !image.is_occupied(rightmost_x + 1, y) {
            rightmost_x += 1;

            if y < height - 1 {
                check_neighbor_seed(
                    image,
                    rightmost_x,
                    y + 1,
                    &mut eligible_below,
                    &filled_ranges,
                    &mut queue,
                );
            }
            if y > 0 {
                check_neighbor_seed(
                    image,
                    rightmost_x,
                    y - 1,
                    &mut eligible_above,
                    &filled_ranges,
                    &mut queue,
                );
            }
        }

        // Draw the whole horizontal run at once and remember it as filled.
        sink.draw_line(Point::new(leftmost_x, y), Point::new(rightmost_x, y));
        filled_ranges
            .entry(y)
            .or_default()
            .push((leftmost_x, rightmost_x));
    }
}

/// Enqueue a seed for the neighbor row at a transition boundary, updating the
/// eligibility flag as the run passes occupied and unoccupied stretches
fn check_neighbor_seed<I: BooleanPixelSource>(
    image: &I,
    x: u32,
    neighbor_y: u32,
    eligible: &mut bool,
    filled_ranges: &HashMap<u32, Vec<(u32, u32)>>,
    queue: &mut VecDeque<Point>,
) {
    if image.is_occupied(x, neighbor_y) {
        *eligible = true;
    } else if *eligible {
        if !is_filled(x, neighbor_y, filled_ranges) {
            queue.push_back(Point::new(x, neighbor_y));
        }
        *eligible = false;
    }
}

fn is_filled(x: u32, y: u32, filled_ranges: &HashMap<u32, Vec<(u32, u32)>>) -> bool {
    match filled_ranges.get(&y) {
        Some(ranges) => ranges.iter().any(|&(left, right)| x >= left && x <= right),
        None => false,
    }
}
