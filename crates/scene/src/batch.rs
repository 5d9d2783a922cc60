//! The shoe field: a fixed pool of instances sharing one geometry.
//!
//! # Invariants
//! - The pool size is fixed at construction; nothing is added or removed.
//! - Every member animates each frame; only the first `range` are drawn and
//!   can be hovered.
//! - A member's world transform is `base * local`.

use crate::hover::{HoverTracker, SCALE_SMOOTHING};
use crate::motion::instance_pose;
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::sync::Arc;
use vitrine_common::{Color, Transform, TriangleMesh, lerp};
use vitrine_input::{Pickable, PointerEvent};
use vitrine_kernel::SceneRng;

/// Fixed per-instance data drawn once at setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceRecord {
    /// Uniform in `[0, 1)`; offsets the instance's clock.
    pub phase: f64,
    pub base_position: Vec3,
    pub base_rotation: Vec3,
    pub hover: HoverTracker,
}

impl InstanceRecord {
    /// Draw phase, then three position components, then three angles.
    pub fn generate(rng: &mut SceneRng, spread: f64) -> Self {
        let phase = rng.next_f64();
        let base_position = Vec3::new(
            rng.centered(spread) as f32,
            rng.centered(spread) as f32,
            rng.centered(spread) as f32,
        );
        let base_rotation = Vec3::new(
            rng.half_turn() as f32,
            rng.half_turn() as f32,
            rng.half_turn() as f32,
        );
        Self {
            phase,
            base_position,
            base_rotation,
            hover: HoverTracker::default(),
        }
    }

    /// The enclosing group transform.
    pub fn base_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.base_rotation.x,
            self.base_rotation.y,
            self.base_rotation.z,
        );
        Mat4::from_rotation_translation(rotation, self.base_position)
    }
}

/// Animated values of one instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceState {
    pub local: Transform,
    pub color: Color,
}

impl Default for InstanceState {
    fn default() -> Self {
        Self {
            local: Transform::default(),
            color: Color::WHITE,
        }
    }
}

impl InstanceState {
    /// One frame of the instance updater.
    ///
    /// Smoothing is applied once per call, independent of the frame delta.
    pub fn update(&mut self, t: f64, record: &InstanceRecord) {
        let pose = instance_pose(t, record.phase);
        self.local.rotation = pose.rotation;
        self.local.position.y = pose.y;

        let s = lerp(self.local.scale.z, record.hover.scale_target(), SCALE_SMOOTHING);
        self.local.set_uniform_scale(s);

        let (target, alpha) = record.hover.color_target();
        self.color.lerp_towards(target, alpha);
    }
}

/// What the renderer needs per drawn instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawnInstance {
    pub index: usize,
    pub world: Mat4,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct InstanceBatch {
    records: Box<[InstanceRecord]>,
    states: Box<[InstanceState]>,
    range: usize,
}

impl InstanceBatch {
    /// Generate `pool` records. `range` is clamped to the pool size.
    pub fn generate(pool: usize, range: usize, spread: f64, rng: &mut SceneRng) -> Self {
        let records: Box<[InstanceRecord]> = (0..pool)
            .map(|_| InstanceRecord::generate(rng, spread))
            .collect();
        let states = vec![InstanceState::default(); pool].into_boxed_slice();
        let range = range.min(pool);
        tracing::debug!(pool, range, seed = rng.seed(), "instance batch generated");
        Self {
            records,
            states,
            range,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of instances drawn.
    pub fn range(&self) -> usize {
        self.range
    }

    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    pub fn states(&self) -> &[InstanceState] {
        &self.states
    }

    pub fn record(&self, index: usize) -> Option<&InstanceRecord> {
        self.records.get(index)
    }

    pub fn state(&self, index: usize) -> Option<&InstanceState> {
        self.states.get(index)
    }

    /// Run the updater of one instance. Out-of-range indices are ignored.
    pub fn update(&mut self, index: usize, t: f64) {
        if let (Some(state), Some(record)) = (self.states.get_mut(index), self.records.get(index)) {
            state.update(t, record);
        }
    }

    pub fn update_all(&mut self, t: f64) {
        for (state, record) in self.states.iter_mut().zip(self.records.iter()) {
            state.update(t, record);
        }
    }

    pub fn world_matrix(&self, index: usize) -> Option<Mat4> {
        let record = self.records.get(index)?;
        let state = self.states.get(index)?;
        Some(record.base_matrix() * state.local.matrix())
    }

    pub fn drawn(&self) -> impl Iterator<Item = DrawnInstance> + '_ {
        self.records[..self.range]
            .iter()
            .zip(self.states[..self.range].iter())
            .enumerate()
            .map(|(index, (record, state))| DrawnInstance {
                index,
                world: record.base_matrix() * state.local.matrix(),
                color: state.color,
            })
    }

    /// Hover targets for the drawn instances. Every one stops propagation.
    pub fn pickables(&self, surface: &Arc<TriangleMesh>) -> Vec<Pickable> {
        self.drawn()
            .map(|d| Pickable {
                index: d.index,
                world: d.world,
                surface: Arc::clone(surface),
                stops_propagation: true,
            })
            .collect()
    }

    /// Set the hover flag of one instance. Returns whether it changed.
    pub fn set_hovered(&mut self, index: usize, hovered: bool) -> bool {
        let Some(record) = self.records.get_mut(index) else {
            return false;
        };
        let changed = record.hover.set(hovered);
        if changed {
            tracing::debug!(index, hovered, "instance hover changed");
        }
        changed
    }

    /// Apply routed pointer events. Returns the number of flags that changed.
    pub fn apply_pointer_events(&mut self, events: &[PointerEvent]) -> usize {
        events
            .iter()
            .filter(|event| match **event {
                PointerEvent::Enter(i) => self.set_hovered(i, true),
                PointerEvent::Leave(i) => self.set_hovered(i, false),
            })
            .count()
    }

    pub fn hovered(&self) -> impl Iterator<Item = usize> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.hover.is_hovered())
            .map(|(i, _)| i)
    }
}

/// Closed surface of the `[-0.5, 0.5]` cube.
#[cfg(test)]
pub(crate) fn cube_surface() -> Arc<TriangleMesh> {
    let corners: Vec<[f32; 3]> = (0..8)
        .map(|i| {
            let axis = |bit: u32| if i & (1 << bit) == 0 { -0.5 } else { 0.5 };
            [axis(0), axis(1), axis(2)]
        })
        .collect();
    #[rustfmt::skip]
    let indices = [
        0, 1, 3, 0, 3, 2, // -z
        4, 5, 7, 4, 7, 6, // +z
        0, 1, 5, 0, 5, 4, // -y
        2, 3, 7, 2, 7, 6, // +y
        0, 2, 6, 0, 6, 4, // -x
        1, 3, 7, 1, 7, 5, // +x
    ];
    Arc::new(TriangleMesh::from_indexed(&corners, &indices).expect("cube has triangles"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hover::{HOVER_SCALE, REST_SCALE};
    use vitrine_common::Ray;
    use vitrine_input::PointerRouter;

    fn batch(seed: u64) -> InstanceBatch {
        InstanceBatch::generate(50, 5, 3.0, &mut SceneRng::with_seed(seed))
    }

    #[test]
    fn same_seed_same_layout() {
        assert_eq!(batch(11).records(), batch(11).records());
        assert_ne!(batch(11).records(), batch(12).records());
    }

    #[test]
    fn records_are_in_range() {
        let b = batch(3);
        for r in b.records() {
            assert!((0.0..1.0).contains(&r.phase));
            assert!(r.base_position.abs().max_element() <= 1.5);
            assert!(r.base_rotation.min_element() >= 0.0);
            assert!(r.base_rotation.max_element() < std::f32::consts::PI + 1e-6);
            assert!(!r.hover.is_hovered());
        }
    }

    #[test]
    fn phases_are_distinct() {
        let b = batch(21);
        let mut phases: Vec<f64> = b.records().iter().map(|r| r.phase).collect();
        phases.sort_by(f64::total_cmp);
        phases.dedup();
        assert_eq!(phases.len(), 50);

        let mut b = b;
        b.update_all(3.0);
        assert_ne!(b.states()[0].local.rotation, b.states()[1].local.rotation);
    }

    #[test]
    fn range_is_clamped() {
        let b = InstanceBatch::generate(4, 10, 3.0, &mut SceneRng::with_seed(1));
        assert_eq!(b.range(), 4);
        assert_eq!(b.drawn().count(), 4);
    }

    #[test]
    fn size_is_invariant_across_frames() {
        let mut b = batch(5);
        for i in 0..120 {
            b.update_all(i as f64 / 60.0);
        }
        assert_eq!(b.len(), 50);
        assert_eq!(b.drawn().count(), 5);
    }

    #[test]
    fn scale_converges_without_overshoot() {
        let mut b = batch(8);
        b.set_hovered(0, true);
        let mut prev = b.state(0).unwrap().local.scale.z;
        assert_eq!(prev, 1.0);
        for i in 0..200 {
            b.update(0, i as f64 * 0.016);
            let s = b.state(0).unwrap().local.scale.z;
            assert!(s <= prev && s >= HOVER_SCALE);
            prev = s;
        }
        assert!((prev - HOVER_SCALE).abs() < 1e-4);

        b.set_hovered(0, false);
        for i in 0..200 {
            b.update(0, i as f64 * 0.016);
            let s = b.state(0).unwrap().local.scale.z;
            assert!(s <= prev && s >= REST_SCALE);
            prev = s;
        }
        assert!((prev - REST_SCALE).abs() < 1e-4);
    }

    #[test]
    fn hover_snaps_to_red_and_fades_back() {
        let mut b = batch(8);
        b.set_hovered(2, true);
        b.update(2, 0.0);
        assert_eq!(b.state(2).unwrap().color, Color::RED);

        b.set_hovered(2, false);
        b.update(2, 0.016);
        let c = b.state(2).unwrap().color;
        assert!((c.g - 0.1).abs() < 1e-6);
        assert_eq!(c.r, 1.0);
    }

    #[test]
    fn local_scale_is_uniform() {
        let mut b = batch(2);
        b.update(1, 1.0);
        let s = b.state(1).unwrap().local.scale;
        assert_eq!(s.x, s.y);
        assert_eq!(s.y, s.z);
    }

    #[test]
    fn world_is_base_times_local() {
        let mut b = batch(4);
        b.update(0, 2.0);
        let r = b.record(0).unwrap();
        let expected = Mat4::from_translation(r.base_position)
            * Mat4::from_quat(Quat::from_euler(
                EulerRot::XYZ,
                r.base_rotation.x,
                r.base_rotation.y,
                r.base_rotation.z,
            ))
            * b.state(0).unwrap().local.matrix();
        assert!(b.world_matrix(0).unwrap().abs_diff_eq(expected, 1e-5));
        assert!(b.world_matrix(50).is_none());
    }

    #[test]
    fn pointer_events_toggle_hover() {
        let mut b = batch(9);
        let changed = b.apply_pointer_events(&[PointerEvent::Enter(1), PointerEvent::Enter(1)]);
        assert_eq!(changed, 1);
        assert_eq!(b.hovered().collect::<Vec<_>>(), vec![1]);
        b.apply_pointer_events(&[PointerEvent::Leave(1)]);
        assert_eq!(b.hovered().count(), 0);
        assert!(!b.set_hovered(99, true));
    }

    #[test]
    fn only_drawn_instances_are_pickable() {
        let mut b = batch(10);
        b.update_all(0.0);
        let picks = b.pickables(&cube_surface());
        assert_eq!(picks.len(), 5);
        assert!(picks.iter().all(|p| p.index < 5 && p.stops_propagation));

        // Aim straight at the first drawn instance.
        let center = b.world_matrix(0).unwrap().transform_point3(Vec3::ZERO);
        let eye = center + Vec3::new(0.0, 0.0, 20.0);
        let ray = Ray::new(eye, center - eye);
        let mut router = PointerRouter::new();
        let events = router.route(Some(&ray), &picks);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PointerEvent::Enter(_)));
    }
}
