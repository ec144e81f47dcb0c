//! Pure geometry for separating agent pairs and clearing wall squares.

use glam::Vec2;
use gridswarm_core::{CellCoord, GridGeometry};

/// Centers closer than this are treated as coincident and left alone.
const PAIR_EPSILON: f32 = 0.01;
/// Minimum distance to a wall square's closest point for a directional push.
const WALL_EPSILON: f32 = 0.001;

/// Selected agents push their partner harder and give way less.
const SELECTED_SHARE: f32 = 0.2;
const UNSELECTED_SHARE: f32 = 0.8;

/// State of one agent that matters for pair separation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairBody {
    /// World-space center.
    pub position: Vec2,
    /// Whether the agent is selected.
    pub selected: bool,
}

/// Computes the displacement of both agents of an overlapping pair.
///
/// Returns `None` when the pair does not overlap, when the centers
/// coincide, or when neither agent can move without its center entering a
/// wall cell. An agent that would enter a wall is held in place and its
/// partner takes the full correction instead.
pub fn separate_pair<F>(
    first: PairBody,
    second: PairBody,
    radius: f32,
    geometry: GridGeometry,
    is_wall: &F,
) -> Option<(Vec2, Vec2)>
where
    F: Fn(CellCoord) -> bool,
{
    let diff = second.position - first.position;
    let distance = diff.length();
    let min_distance = 2.0 * radius;
    if distance >= min_distance || distance <= PAIR_EPSILON {
        return None;
    }

    let direction = diff / distance;
    let overlap = min_distance - distance;
    let (first_share, second_share) = match (first.selected, second.selected) {
        (true, false) => (SELECTED_SHARE, UNSELECTED_SHARE),
        (false, true) => (UNSELECTED_SHARE, SELECTED_SHARE),
        _ => (0.5, 0.5),
    };
    let first_push = -direction * overlap * first_share;
    let second_push = direction * overlap * second_share;

    let enters_wall = |position: Vec2| is_wall(geometry.cell_of(position));
    match (
        enters_wall(first.position + first_push),
        enters_wall(second.position + second_push),
    ) {
        (false, false) => Some((first_push, second_push)),
        (true, false) => {
            let full = direction * overlap;
            (!enters_wall(second.position + full)).then_some((Vec2::ZERO, full))
        }
        (false, true) => {
            let full = -direction * overlap;
            (!enters_wall(first.position + full)).then_some((full, Vec2::ZERO))
        }
        (true, true) => None,
    }
}

/// Pushes a circle of `radius` centered at `position` out of the square
/// spanning `origin..origin + size`.
///
/// A center within `WALL_EPSILON` of the square, including one buried inside
/// it, has no usable push direction. It is not skipped: it leaves through the
/// nearest face instead, with ties preferring left, right, top, then bottom.
#[must_use]
pub fn push_out_of_square(position: Vec2, origin: Vec2, size: f32, radius: f32) -> Vec2 {
    let max = origin + Vec2::splat(size);
    let closest = position.clamp(origin, max);
    let diff = position - closest;
    let distance_sq = diff.length_squared();
    if distance_sq >= radius * radius {
        return position;
    }

    let distance = distance_sq.sqrt();
    if distance > WALL_EPSILON {
        return position + diff / distance * (radius - distance);
    }

    let faces = [
        (position.x - origin.x, Vec2::new(origin.x - radius, position.y)),
        (max.x - position.x, Vec2::new(max.x + radius, position.y)),
        (position.y - origin.y, Vec2::new(position.x, origin.y - radius)),
        (max.y - position.y, Vec2::new(position.x, max.y + radius)),
    ];
    faces
        .into_iter()
        .reduce(|best, face| if face.0 < best.0 { face } else { best })
        .map_or(position, |(_, exit)| exit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIUS: f32 = 57.0;

    fn open(_: CellCoord) -> bool {
        false
    }

    fn at(x: f32, y: f32, selected: bool) -> PairBody {
        PairBody {
            position: Vec2::new(x, y),
            selected,
        }
    }

    #[test]
    fn unselected_pair_splits_overlap_evenly() {
        let geometry = GridGeometry::new(100.0);
        let (first, second) =
            separate_pair(at(0.0, 0.0, false), at(10.0, 0.0, false), RADIUS, geometry, &open)
                .expect("pair overlaps");
        assert_eq!(first, Vec2::new(-52.0, 0.0));
        assert_eq!(second, Vec2::new(52.0, 0.0));
    }

    #[test]
    fn selected_agent_gives_way_less() {
        let geometry = GridGeometry::new(100.0);
        let (first, second) =
            separate_pair(at(0.0, 0.0, true), at(100.0, 0.0, false), RADIUS, geometry, &open)
                .expect("pair overlaps");
        assert!((first.x + 2.8).abs() < 1e-4);
        assert!((second.x - 11.2).abs() < 1e-4);

        let (first, second) =
            separate_pair(at(0.0, 0.0, false), at(100.0, 0.0, true), RADIUS, geometry, &open)
                .expect("pair overlaps");
        assert!((first.x + 11.2).abs() < 1e-4);
        assert!((second.x - 2.8).abs() < 1e-4);
    }

    #[test]
    fn both_selected_split_evenly() {
        let geometry = GridGeometry::new(100.0);
        let (first, second) =
            separate_pair(at(0.0, 0.0, true), at(0.0, 100.0, true), RADIUS, geometry, &open)
                .expect("pair overlaps");
        assert_eq!(first, Vec2::new(0.0, -7.0));
        assert_eq!(second, Vec2::new(0.0, 7.0));
    }

    #[test]
    fn agent_pressed_against_wall_is_held_and_partner_absorbs() {
        let geometry = GridGeometry::new(100.0);
        let is_wall = |cell: CellCoord| cell.x() >= 3;
        let (first, second) = separate_pair(
            at(215.0, 50.0, false),
            at(295.0, 50.0, false),
            RADIUS,
            geometry,
            &is_wall,
        )
        .expect("first agent can absorb");
        assert_eq!(second, Vec2::ZERO);
        assert_eq!(first, Vec2::new(-34.0, 0.0));
    }

    #[test]
    fn pair_boxed_in_by_walls_is_skipped() {
        let geometry = GridGeometry::new(100.0);
        let is_wall = |cell: CellCoord| cell.x() != 2;
        assert_eq!(
            separate_pair(
                at(215.0, 50.0, false),
                at(285.0, 50.0, false),
                RADIUS,
                geometry,
                &is_wall,
            ),
            None
        );
    }

    #[test]
    fn non_overlapping_or_coincident_pairs_are_skipped() {
        let geometry = GridGeometry::new(100.0);
        assert_eq!(
            separate_pair(at(0.0, 0.0, false), at(114.0, 0.0, false), RADIUS, geometry, &open),
            None
        );
        assert_eq!(
            separate_pair(at(0.0, 0.0, false), at(0.005, 0.0, false), RADIUS, geometry, &open),
            None
        );
    }

    #[test]
    fn circle_near_face_is_pushed_to_radius() {
        let pushed =
            push_out_of_square(Vec2::new(280.0, 50.0), Vec2::new(300.0, 0.0), 100.0, RADIUS);
        assert!((pushed - Vec2::new(243.0, 50.0)).length() < 1e-3);
    }

    #[test]
    fn circle_near_corner_is_pushed_diagonally() {
        let pushed =
            push_out_of_square(Vec2::new(290.0, -10.0), Vec2::new(300.0, 0.0), 100.0, RADIUS);
        let corner = Vec2::new(300.0, 0.0);
        assert!((pushed.distance(corner) - RADIUS).abs() < 1e-3);
        assert!(pushed.x < 290.0 && pushed.y < -10.0);
    }

    #[test]
    fn distant_circle_is_untouched() {
        let position = Vec2::new(200.0, 50.0);
        assert_eq!(
            push_out_of_square(position, Vec2::new(300.0, 0.0), 100.0, RADIUS),
            position
        );
    }

    #[test]
    fn center_inside_square_exits_through_nearest_face() {
        let pushed =
            push_out_of_square(Vec2::new(310.0, 40.0), Vec2::new(300.0, 0.0), 100.0, RADIUS);
        assert_eq!(pushed, Vec2::new(243.0, 40.0));

        let pushed =
            push_out_of_square(Vec2::new(350.0, 95.0), Vec2::new(300.0, 0.0), 100.0, RADIUS);
        assert_eq!(pushed, Vec2::new(350.0, 157.0));
    }
}
