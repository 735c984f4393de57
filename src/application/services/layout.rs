//! Position assignment
//!
//! Walks branch groups in reading order and places each one next to the
//! previous one, inside the workspace bounds and clear of every obstacle.
//! Placed groups become obstacles for the groups after them.

use tracing::debug;

use crate::domain::{
    resolve_group, Branch, BranchGroup, Direction, FrameId, Placed, Point, Rect, Size,
    WorkspaceBounds,
};

/// Primaries whose y differs by at most this much share a row.
pub const DEFAULT_ROW_TOLERANCE: f64 = 50.0;

/// Old and new position of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlacement {
    pub frame_id: FrameId,
    pub from: Point,
    pub to: Point,
    pub dimension: Size,
}

/// Final positions of every frame of one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlacement {
    pub branch: Branch,
    /// Primary frame first, then the rest in registry order
    pub frames: Vec<FramePlacement>,
}

impl GroupPlacement {
    fn new(group: &BranchGroup, placed: &[Placed]) -> Self {
        let frames = group
            .frames()
            .iter()
            .zip(placed)
            .map(|(frame, target)| FramePlacement {
                frame_id: frame.id.clone(),
                from: frame.position,
                to: target.position,
                dimension: frame.dimension,
            })
            .collect();
        Self {
            branch: group.branch().clone(),
            frames,
        }
    }

    pub fn primary(&self) -> Option<&FramePlacement> {
        self.frames.first()
    }
}

/// Sort groups top-to-bottom, then left-to-right within a row.
///
/// A row starts at the topmost remaining primary frame and takes every group
/// whose primary y is within `tolerance` of that first y.
pub fn sort_by_position(groups: &[BranchGroup], tolerance: f64) -> Vec<&BranchGroup> {
    let mut by_y: Vec<&BranchGroup> = groups.iter().collect();
    by_y.sort_by(|a, b| {
        let (pa, pb) = (a.primary().position, b.primary().position);
        pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
    });

    let mut rows: Vec<(f64, Vec<&BranchGroup>)> = Vec::new();
    for group in by_y {
        let y = group.primary().position.y;
        match rows.last_mut() {
            Some((row_top, row)) if y - *row_top <= tolerance => row.push(group),
            _ => rows.push((y, vec![group])),
        }
    }

    rows.into_iter()
        .flat_map(|(_, mut row)| {
            row.sort_by(|a, b| a.primary().position.x.total_cmp(&b.primary().position.x));
            row
        })
        .collect()
}

/// Layout parameters for one arrangement call.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub bounds: WorkspaceBounds,
    pub direction: Direction,
    pub spacing: f64,
    pub row_tolerance: f64,
}

impl Layout {
    /// Assign final positions to `groups`.
    ///
    /// With a reference the walk starts at the reference's primary frame and
    /// the reference itself never moves. Without one the first group in
    /// reading order is the anchor and only moves if it overlaps an obstacle.
    /// `obstacles` holds every frame that stays where it is.
    pub fn assign(
        &self,
        groups: &[BranchGroup],
        reference: Option<&BranchGroup>,
        mut obstacles: Vec<Placed>,
    ) -> Vec<GroupPlacement> {
        let mut cursor: Option<Rect> = reference.map(BranchGroup::primary_rect);
        let mut placements = Vec::new();

        for group in sort_by_position(groups, self.row_tolerance) {
            if reference.is_some_and(|r| r.branch().id == group.branch().id) {
                continue;
            }
            let primary = group.primary();

            let target = match cursor {
                Some(previous) => {
                    let proposed = self.bounds.clamp(
                        self.direction.next_to(&previous, self.spacing),
                        primary.dimension,
                    );
                    self.settle(group, proposed, &obstacles)
                }
                None => self.settle(group, primary.position, &obstacles),
            };
            debug!(
                "assign: branch={} primary {} -> {}",
                group.branch().name,
                primary.position,
                target
            );

            let placed = group.place_at(target);
            placements.push(GroupPlacement::new(group, &placed));
            obstacles.extend(placed);
            cursor = Some(Rect::new(target, primary.dimension));
        }

        placements
    }

    /// Collision-resolve a proposed primary position, then pull it back into
    /// bounds. Every frame of the group is tested at its own offset, so frames
    /// other than the primary stay clear of obstacles as well.
    fn settle(&self, group: &BranchGroup, proposed: Point, obstacles: &[Placed]) -> Point {
        let parts = group.place_at(proposed);
        let resolved = resolve_group(proposed, &parts, obstacles, self.spacing);
        self.bounds.clamp(resolved, group.primary().dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frame;

    fn group(id: &str, x: f64, y: f64) -> BranchGroup {
        let frame = Frame::new(
            format!("{id}-f"),
            id,
            Point::new(x, y),
            Size::new(100.0, 100.0),
        );
        BranchGroup::new(Branch::new(id, id), vec![frame]).unwrap()
    }

    #[test]
    fn given_groups_in_same_band_when_sorting_then_left_to_right() {
        let groups = vec![
            group("c", 0.0, 500.0),
            group("b", 300.0, 40.0),
            group("a", 600.0, 0.0),
            group("d", 0.0, 10.0),
        ];

        let order: Vec<&str> = sort_by_position(&groups, DEFAULT_ROW_TOLERANCE)
            .iter()
            .map(|g| g.branch().id.as_str())
            .collect();

        assert_eq!(order, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn given_chain_of_small_steps_when_sorting_then_rows_do_not_grow_unbounded() {
        // 0 -> 40 -> 80: the third group is more than 50 below the row start
        let groups = vec![
            group("a", 500.0, 0.0),
            group("b", 400.0, 40.0),
            group("c", 0.0, 80.0),
        ];

        let order: Vec<&str> = sort_by_position(&groups, DEFAULT_ROW_TOLERANCE)
            .iter()
            .map(|g| g.branch().id.as_str())
            .collect();

        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
