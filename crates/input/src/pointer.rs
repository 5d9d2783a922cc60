use glam::Mat4;
use std::collections::BTreeSet;
use std::sync::Arc;
use vitrine_common::{Ray, TriangleMesh};

/// Hover transition for one target, identified by its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// The pointer started hovering the target.
    Enter(usize),
    /// The pointer stopped hovering the target.
    Leave(usize),
}

/// Something the pointer can hover: a local triangle surface placed in the
/// world. Instances of one model share the surface.
#[derive(Debug, Clone)]
pub struct Pickable {
    pub index: usize,
    pub world: Mat4,
    pub surface: Arc<TriangleMesh>,
    /// When set, targets behind this one never see the pointer.
    pub stops_propagation: bool,
}

impl Pickable {
    /// Distance along `ray` to this target's surface, if hit.
    pub fn hit(&self, ray: &Ray) -> Option<f32> {
        if self.world.determinant() == 0.0 {
            return None;
        }
        let local = ray.transformed(&self.world.inverse());
        self.surface.intersect(&local)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub distance: f32,
}

/// All hits along `ray`, nearest first.
pub fn intersect_all(ray: &Ray, targets: &[Pickable]) -> Vec<Hit> {
    let mut hits: Vec<Hit> = targets
        .iter()
        .filter_map(|t| {
            t.hit(ray).map(|distance| Hit {
                index: t.index,
                distance,
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Tracks which targets are hovered and produces transitions per pointer move.
#[derive(Debug, Default)]
pub struct PointerRouter {
    hovered: BTreeSet<usize>,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> &BTreeSet<usize> {
        &self.hovered
    }

    /// Route a pointer position. `None` means the pointer left the surface.
    pub fn route(&mut self, ray: Option<&Ray>, targets: &[Pickable]) -> Vec<PointerEvent> {
        let mut now = BTreeSet::new();
        let mut entered = Vec::new();

        if let Some(ray) = ray {
            for hit in intersect_all(ray, targets) {
                now.insert(hit.index);
                if !self.hovered.contains(&hit.index) {
                    entered.push(PointerEvent::Enter(hit.index));
                }
                let stops = targets
                    .iter()
                    .find(|t| t.index == hit.index)
                    .is_some_and(|t| t.stops_propagation);
                if stops {
                    break;
                }
            }
        }

        let mut events: Vec<PointerEvent> = self
            .hovered
            .difference(&now)
            .map(|&i| PointerEvent::Leave(i))
            .collect();
        events.extend(entered);

        if !events.is_empty() {
            tracing::debug!(?events, "pointer transitions");
        }
        self.hovered = now;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Two triangles covering the unit square facing +Z.
    fn square() -> Arc<TriangleMesh> {
        let positions = [
            [-0.5, -0.5, 0.0],
            [0.5, -0.5, 0.0],
            [0.5, 0.5, 0.0],
            [-0.5, 0.5, 0.0],
        ];
        Arc::new(TriangleMesh::from_indexed(&positions, &[0, 1, 2, 0, 2, 3]).unwrap())
    }

    fn cube_at(index: usize, z: f32) -> Pickable {
        Pickable {
            index,
            world: Mat4::from_translation(Vec3::new(0.0, 0.0, z)),
            surface: square(),
            stops_propagation: true,
        }
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z)
    }

    #[test]
    fn hits_are_sorted_nearest_first() {
        let targets = [cube_at(0, -2.0), cube_at(1, 2.0), cube_at(2, 0.0)];
        let hits = intersect_all(&forward_ray(), &targets);
        let order: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn only_nearest_is_hovered_when_propagation_stops() {
        let targets = [cube_at(0, -2.0), cube_at(1, 2.0)];
        let mut router = PointerRouter::new();
        let events = router.route(Some(&forward_ray()), &targets);
        assert_eq!(events, vec![PointerEvent::Enter(1)]);
        assert_eq!(router.hovered().len(), 1);
    }

    #[test]
    fn propagating_targets_let_the_pointer_through() {
        let mut front = cube_at(1, 2.0);
        front.stops_propagation = false;
        let targets = [cube_at(0, -2.0), front];
        let mut router = PointerRouter::new();
        let events = router.route(Some(&forward_ray()), &targets);
        assert_eq!(events, vec![PointerEvent::Enter(1), PointerEvent::Enter(0)]);
    }

    #[test]
    fn staying_on_a_target_emits_nothing() {
        let targets = [cube_at(0, 0.0)];
        let mut router = PointerRouter::new();
        router.route(Some(&forward_ray()), &targets);
        assert!(router.route(Some(&forward_ray()), &targets).is_empty());
    }

    #[test]
    fn moving_between_targets_leaves_before_entering() {
        let targets = [
            Pickable {
                world: Mat4::from_translation(Vec3::new(-3.0, 0.0, 0.0)),
                ..cube_at(0, 0.0)
            },
            Pickable {
                world: Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)),
                ..cube_at(1, 0.0)
            },
        ];
        let mut router = PointerRouter::new();
        let left = Ray::new(Vec3::new(-3.0, 0.0, 10.0), Vec3::NEG_Z);
        let right = Ray::new(Vec3::new(3.0, 0.0, 10.0), Vec3::NEG_Z);
        assert_eq!(
            router.route(Some(&left), &targets),
            vec![PointerEvent::Enter(0)]
        );
        assert_eq!(
            router.route(Some(&right), &targets),
            vec![PointerEvent::Leave(0), PointerEvent::Enter(1)]
        );
    }

    #[test]
    fn pointer_leaving_surface_clears_hover() {
        let targets = [cube_at(4, 0.0)];
        let mut router = PointerRouter::new();
        router.route(Some(&forward_ray()), &targets);
        assert_eq!(router.route(None, &targets), vec![PointerEvent::Leave(4)]);
        assert!(router.hovered().is_empty());
    }

    #[test]
    fn empty_space_inside_the_bounds_is_not_hovered() {
        let corner = TriangleMesh::from_indexed(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[0, 1, 2],
        )
        .unwrap();
        let target = Pickable {
            index: 0,
            world: Mat4::IDENTITY,
            surface: Arc::new(corner),
            stops_propagation: true,
        };
        let mut router = PointerRouter::new();
        let off = Ray::new(Vec3::new(0.9, 0.9, 5.0), Vec3::NEG_Z);
        assert!(router.route(Some(&off), &[target.clone()]).is_empty());
        let on = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::NEG_Z);
        assert_eq!(router.route(Some(&on), &[target]), vec![PointerEvent::Enter(0)]);
    }

    #[test]
    fn surface_behind_is_reached_through_a_nearer_box_gap() {
        // The front target's bounds span the ray but its triangle does not.
        let sliver = TriangleMesh::from_indexed(
            &[[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [-1.0, 1.0, 0.0]],
            &[0, 1, 2],
        )
        .unwrap();
        let front = Pickable {
            index: 1,
            world: Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)),
            surface: Arc::new(sliver),
            stops_propagation: true,
        };
        let targets = [cube_at(0, -2.0), front];
        let ray = Ray::new(Vec3::new(0.4, 0.4, 10.0), Vec3::NEG_Z);
        let mut router = PointerRouter::new();
        assert_eq!(router.route(Some(&ray), &targets), vec![PointerEvent::Enter(0)]);
    }

    #[test]
    fn degenerate_transform_is_never_hit() {
        let target = Pickable {
            world: Mat4::from_scale(Vec3::ZERO),
            ..cube_at(0, 0.0)
        };
        assert!(target.hit(&forward_ray()).is_none());
    }
}
