//! Path Renderer
//!
//! Draws the shortest path as one dashed segment per pair of consecutive
//! waypoints. Every refresh discards all previous segments first, so the
//! overlay only ever shows the most recently applied path.

use crate::device::{LatLng, Waypoint};
use crate::error::MapError;
use crate::layer::{LayerHandle, MapLayer, PolylineStyle};
use crate::sequence::SequenceGuard;

#[derive(Debug, Default)]
pub struct PathRenderer {
    segments: Vec<LayerHandle>,
    guard: SequenceGuard,
}

impl PathRenderer {
    pub fn new() -> Self {
        PathRenderer::default()
    }

    /// Handles of the segments currently on the map, in path order
    pub fn segments(&self) -> &[LayerHandle] {
        &self.segments
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.guard.applied()
    }

    /// Replace the overlay with the path fetched by request `sequence`
    ///
    /// Returns the number of segments drawn: `max(0, waypoints - 1)`.
    pub fn apply<L: MapLayer>(
        &mut self,
        sequence: u64,
        waypoints: &[Waypoint],
        layer: &mut L,
    ) -> Result<usize, MapError> {
        self.guard.check(sequence)?;
        self.guard.commit(sequence);
        self.clear(layer);

        let style = PolylineStyle::shortest_path();
        for pair in waypoints.windows(2) {
            let points: [LatLng; 2] = [pair[0].position(), pair[1].position()];
            self.segments.push(layer.add_polyline(&points, &style));
        }
        Ok(self.segments.len())
    }

    /// Request `sequence` failed: blank the overlay unless a newer path
    /// is already showing
    pub fn fail<L: MapLayer>(&mut self, sequence: u64, layer: &mut L) -> Result<(), MapError> {
        self.guard.check(sequence)?;
        self.guard.commit(sequence);
        self.clear(layer);
        Ok(())
    }

    fn clear<L: MapLayer>(&mut self, layer: &mut L) {
        for handle in self.segments.drain(..) {
            layer.remove(handle);
        }
    }

    pub fn teardown<L: MapLayer>(&mut self, layer: &mut L) {
        self.clear(layer);
        self.guard = SequenceGuard::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Primitive, Scene};

    fn path(points: &[(f64, f64)]) -> Vec<Waypoint> {
        points.iter().map(|(lat, long)| Waypoint::new(*lat, *long)).collect()
    }

    fn segment_points(scene: &Scene, handle: LayerHandle) -> Vec<LatLng> {
        match scene.get(handle) {
            Some(Primitive::Polyline { points, .. }) => points.clone(),
            other => panic!("expected polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_segment_count() {
        for k in 0..6 {
            let mut scene = Scene::new();
            let mut renderer = PathRenderer::new();
            let waypoints: Vec<Waypoint> = (0..k).map(|i| Waypoint::new(i as f64, 0.0)).collect();

            let drawn = renderer.apply(1, &waypoints, &mut scene).unwrap();

            assert_eq!(drawn, k.max(1) - 1);
            assert_eq!(scene.count("polyline"), k.max(1) - 1);
        }
    }

    #[test]
    fn test_segments_follow_waypoint_order() {
        let mut scene = Scene::new();
        let mut renderer = PathRenderer::new();
        let waypoints = path(&[(56.0, -14.0), (54.0, -16.0), (50.0, -20.0)]);

        renderer.apply(1, &waypoints, &mut scene).unwrap();

        let segments = renderer.segments();
        assert_eq!(
            segment_points(&scene, segments[0]),
            vec![LatLng::new(56.0, -14.0), LatLng::new(54.0, -16.0)]
        );
        assert_eq!(
            segment_points(&scene, segments[1]),
            vec![LatLng::new(54.0, -16.0), LatLng::new(50.0, -20.0)]
        );
        match scene.get(segments[0]) {
            Some(Primitive::Polyline { style, .. }) => {
                assert_eq!(style, &PolylineStyle::shortest_path())
            }
            other => panic!("expected polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_refresh_replaces_previous_segments() {
        let mut scene = Scene::new();
        let mut renderer = PathRenderer::new();
        let a = path(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let b = path(&[(10.0, 10.0), (11.0, 11.0)]);

        renderer.apply(1, &a, &mut scene).unwrap();
        let old: Vec<LayerHandle> = renderer.segments().to_vec();
        renderer.apply(2, &b, &mut scene).unwrap();

        assert_eq!(scene.count("polyline"), 1);
        assert!(old.iter().all(|h| !scene.contains(*h)));
        assert_eq!(
            segment_points(&scene, renderer.segments()[0]),
            vec![LatLng::new(10.0, 10.0), LatLng::new(11.0, 11.0)]
        );
    }

    #[test]
    fn test_empty_path_clears_overlay() {
        let mut scene = Scene::new();
        let mut renderer = PathRenderer::new();
        renderer
            .apply(1, &path(&[(0.0, 0.0), (1.0, 1.0)]), &mut scene)
            .unwrap();

        assert_eq!(renderer.apply(2, &[], &mut scene), Ok(0));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_failure_blanks_overlay() {
        let mut scene = Scene::new();
        let mut renderer = PathRenderer::new();
        renderer
            .apply(1, &path(&[(0.0, 0.0), (1.0, 1.0)]), &mut scene)
            .unwrap();

        renderer.fail(2, &mut scene).unwrap();

        assert!(renderer.segments().is_empty());
        assert!(scene.is_empty());
        assert_eq!(renderer.last_applied(), Some(2));
    }

    #[test]
    fn test_stale_path_and_stale_failure_are_ignored() {
        let mut scene = Scene::new();
        let mut renderer = PathRenderer::new();
        let current = path(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        renderer.apply(7, &current, &mut scene).unwrap();

        assert!(renderer
            .apply(6, &path(&[(5.0, 5.0), (6.0, 6.0)]), &mut scene)
            .is_err());
        assert!(renderer.fail(5, &mut scene).is_err());

        assert_eq!(renderer.segments().len(), 2);
        assert_eq!(scene.count("polyline"), 2);
    }
}
