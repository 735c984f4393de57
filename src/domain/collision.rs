//! Collision resolution
//!
//! Finds the position closest to a proposal at which a rectangle, or a rigid
//! set of rectangles, keeps at least `spacing` distance to every obstacle.
//!
//! The nearest free position has each coordinate either equal to the
//! proposal's or placing some part so that it touches (at `spacing` distance)
//! an edge of some obstacle. Candidates are built from those coordinates and
//! the closest free one wins. Ties go to generation order: the proposal's own
//! coordinate first, then per part and obstacle in input order the
//! right/below slot before the left/above slot.

use tracing::{debug, trace};

use crate::domain::{Point, Positionable, Rect};

/// True when `rect` keeps `spacing` distance to every obstacle.
pub fn is_free(rect: &Rect, obstacles: &[Rect], spacing: f64) -> bool {
    !obstacles.iter().any(|o| rect.collides_with(o, spacing))
}

/// Resolve `candidate` against `obstacles`, ignoring any obstacle carrying the
/// candidate's own id. Returns the (unmargined) top-left corner to use.
pub fn resolve_collision<C, O>(candidate: &C, obstacles: &[O], spacing: f64) -> Point
where
    C: Positionable + ?Sized,
    O: Positionable,
{
    let proposal = candidate.rect();
    let rects: Vec<Rect> = obstacles
        .iter()
        .filter(|o| o.id() != candidate.id())
        .map(Positionable::rect)
        .collect();

    nearest_free(proposal.origin, &[proposal], &rects, spacing)
}

/// Resolve a rigid set of rectangles moved together by one translation.
///
/// `anchor` is the proposed position of the set's reference point and `parts`
/// are the rectangles at that proposal. Each part is tested on its own, so
/// empty space between parts may hold obstacles. Obstacles sharing an id with
/// any part are ignored. Returns the resolved anchor.
pub fn resolve_group<C, O>(anchor: Point, parts: &[C], obstacles: &[O], spacing: f64) -> Point
where
    C: Positionable,
    O: Positionable,
{
    let rects: Vec<Rect> = obstacles
        .iter()
        .filter(|o| !parts.iter().any(|p| p.id() == o.id()))
        .map(Positionable::rect)
        .collect();
    let parts: Vec<Rect> = parts.iter().map(Positionable::rect).collect();

    nearest_free(anchor, &parts, &rects, spacing)
}

fn fits(parts: &[Rect], shift: Point, obstacles: &[Rect], spacing: f64) -> bool {
    parts
        .iter()
        .all(|p| is_free(&p.with_origin(p.origin.translate(shift)), obstacles, spacing))
}

fn nearest_free(anchor: Point, parts: &[Rect], obstacles: &[Rect], spacing: f64) -> Point {
    if fits(parts, Point::new(0.0, 0.0), obstacles, spacing) {
        return anchor;
    }

    let mut xs = vec![anchor.x];
    let mut ys = vec![anchor.y];
    for part in parts {
        let offset = part.origin.offset_from(anchor);
        for o in obstacles {
            xs.push(o.right() + spacing - offset.x);
            xs.push(o.left() - spacing - part.size.width - offset.x);
            ys.push(o.bottom() + spacing - offset.y);
            ys.push(o.top() - spacing - part.size.height - offset.y);
        }
    }
    dedup_in_order(&mut xs);
    dedup_in_order(&mut ys);
    trace!(
        "nearest_free: {} parts, probing {}x{} candidates",
        parts.len(),
        xs.len(),
        ys.len()
    );

    // best-first: both axes sorted by displacement, so the scan stops as soon
    // as no remaining pair can beat the best free slot found so far
    let xs = by_displacement(&xs, anchor.x);
    let ys = by_displacement(&ys, anchor.y);

    let mut best: Option<(f64, (usize, usize), Point)> = None;
    for &(xi, dx, x) in &xs {
        if best.is_some_and(|(d, ..)| dx > d) {
            break;
        }
        for &(yi, dy, y) in &ys {
            let distance = dx + dy;
            match best {
                Some((d, ..)) if distance > d => break,
                Some((d, rank, _)) if distance == d && (xi, yi) >= rank => continue,
                _ => {}
            }
            let point = Point::new(x, y);
            if fits(parts, point.offset_from(anchor), obstacles, spacing) {
                best = Some((distance, (xi, yi), point));
            }
        }
    }

    match best {
        Some((_, _, point)) => {
            debug!("nearest_free: moved {} -> {}", anchor, point);
            point
        }
        None => {
            // unreachable in practice: right of the rightmost obstacle is a candidate
            let rightmost = obstacles
                .iter()
                .map(Rect::right)
                .fold(f64::NEG_INFINITY, f64::max);
            let leftmost_offset = parts
                .iter()
                .map(|p| p.left() - anchor.x)
                .fold(f64::INFINITY, f64::min);
            Point::new(rightmost + spacing - leftmost_offset, anchor.y)
        }
    }
}

/// Pair each value with its generation index and squared displacement from
/// `from`, closest first.
fn by_displacement(values: &[f64], from: f64) -> Vec<(usize, f64, f64)> {
    let mut sorted: Vec<(usize, f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i, (v - from) * (v - from), v))
        .collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    sorted
}

fn dedup_in_order(values: &mut Vec<f64>) {
    let mut seen: Vec<f64> = Vec::with_capacity(values.len());
    values.retain(|v| {
        if seen.iter().any(|s| s.to_bits() == v.to_bits()) {
            false
        } else {
            seen.push(*v);
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FrameId, Placed, Size};

    fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Placed {
        Placed::new(FrameId::new(id), Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn given_candidate_id_in_obstacles_when_resolving_then_own_rect_is_ignored() {
        let candidate = rect("a", 0.0, 0.0, 100.0, 100.0);
        let obstacles = vec![rect("a", 0.0, 0.0, 100.0, 100.0)];
        assert_eq!(
            resolve_collision(&candidate, &obstacles, 100.0),
            Point::new(0.0, 0.0)
        );
    }

    #[test]
    fn given_duplicate_values_when_deduplicating_then_order_is_kept() {
        let mut values = vec![3.0, 1.0, 3.0, 2.0, 1.0];
        dedup_in_order(&mut values);
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn given_equal_displacements_when_sorting_then_generation_order_breaks_ties() {
        let sorted = by_displacement(&[10.0, -10.0, 0.0, 10.0], 0.0);
        let order: Vec<usize> = sorted.iter().map(|(i, ..)| *i).collect();
        assert_eq!(order, vec![2, 0, 1, 3]);
    }
}
