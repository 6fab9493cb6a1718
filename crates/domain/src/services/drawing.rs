//! Shape drawing state machine.
//!
//! Turns a sequence of map clicks into a completed [`MapShape`]. Sessions are
//! plain values: every transition takes the current session by reference and
//! returns the next one, so the machine can be driven without a map.
//!
//! | Shape     | Clicks                                   | Completes              |
//! |-----------|------------------------------------------|------------------------|
//! | circle    | first click is the center                | after 1 click          |
//! | rectangle | first click is a corner, second opposite | after 2 clicks         |
//! | polygon   | every click appends a vertex             | on [`complete_polygon`] |

use tracing::{debug, warn};

use crate::errors::ValidationError;
use crate::models::geometry::{
    distinct_point_count, is_valid_polygon, MapShape, ShapeType, DEFAULT_CIRCLE_RADIUS_METERS,
};
use crate::models::MapCoordinate;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawingStage {
    Idle,
    Drawing,
    Completed(MapShape),
    Cancelled,
}

/// In-progress construction of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSession {
    shape_type: ShapeType,
    stage: DrawingStage,
    accumulated_points: Vec<MapCoordinate>,
    circle_radius_meters: f64,
}

impl DrawingSession {
    /// A session that is not collecting clicks yet.
    pub fn idle(shape_type: ShapeType) -> Self {
        Self {
            shape_type,
            stage: DrawingStage::Idle,
            accumulated_points: Vec::new(),
            circle_radius_meters: DEFAULT_CIRCLE_RADIUS_METERS,
        }
    }

    /// A fresh session ready for its first click.
    pub fn start(shape_type: ShapeType) -> Self {
        Self {
            stage: DrawingStage::Drawing,
            ..Self::idle(shape_type)
        }
    }

    /// Radius given to the circle this session produces.
    pub fn with_circle_radius(mut self, meters: f64) -> Self {
        self.circle_radius_meters = meters;
        self
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn stage(&self) -> &DrawingStage {
        &self.stage
    }

    pub fn accumulated_points(&self) -> &[MapCoordinate] {
        &self.accumulated_points
    }

    pub fn is_drawing(&self) -> bool {
        self.stage == DrawingStage::Drawing
    }

    pub fn completed_shape(&self) -> Option<&MapShape> {
        match &self.stage {
            DrawingStage::Completed(shape) => Some(shape),
            _ => None,
        }
    }

    fn complete(&self, shape: MapShape, points: Vec<MapCoordinate>) -> Self {
        debug!(shape_type = %self.shape_type, points = points.len(), "Shape completed");
        Self {
            shape_type: self.shape_type,
            stage: DrawingStage::Completed(shape),
            accumulated_points: points,
            circle_radius_meters: self.circle_radius_meters,
        }
    }

    fn with_points(&self, points: Vec<MapCoordinate>) -> Self {
        Self {
            accumulated_points: points,
            ..self.clone()
        }
    }
}

/// Applies one map click.
///
/// Clicks on a session that is not drawing are ignored.
pub fn apply_click(session: &DrawingSession, click: MapCoordinate) -> DrawingSession {
    if !session.is_drawing() {
        warn!(
            shape_type = %session.shape_type,
            stage = ?session.stage,
            "Ignoring map click outside of an active drawing session"
        );
        return session.clone();
    }

    let mut points = session.accumulated_points.clone();
    points.push(click);

    match session.shape_type {
        ShapeType::Circle => session.complete(
            MapShape::Circle {
                center: click,
                radius_meters: session.circle_radius_meters,
            },
            points,
        ),
        ShapeType::Rectangle => match points.as_slice() {
            [corner_a, corner_b] => {
                let shape = MapShape::rectangle_from_corners(*corner_a, *corner_b);
                session.complete(shape, points)
            }
            _ => {
                debug!(lat = click.lat, lng = click.lng, "Rectangle first corner placed");
                session.with_points(points)
            }
        },
        ShapeType::Polygon => {
            debug!(points = points.len(), "Polygon vertex added");
            session.with_points(points)
        }
    }
}

/// Finishes a polygon session.
///
/// With fewer than three distinct points the caller gets
/// [`ValidationError::IncompletePolygon`] and keeps its session, still
/// drawing, so the user can add more points.
pub fn complete_polygon(session: &DrawingSession) -> Result<DrawingSession, ValidationError> {
    debug_assert_eq!(
        session.shape_type,
        ShapeType::Polygon,
        "complete_polygon called on a {} session",
        session.shape_type
    );
    if session.shape_type != ShapeType::Polygon || !session.is_drawing() {
        return Ok(session.clone());
    }

    if !is_valid_polygon(&session.accumulated_points) {
        return Err(ValidationError::IncompletePolygon {
            points: distinct_point_count(&session.accumulated_points),
        });
    }

    let points = session.accumulated_points.clone();
    Ok(session.complete(
        MapShape::Polygon {
            points: points.clone(),
        },
        points,
    ))
}

/// Cancels the session from any stage, discarding collected points.
pub fn reset_drawing(session: &DrawingSession) -> DrawingSession {
    if !session.accumulated_points.is_empty() {
        debug!(
            discarded = session.accumulated_points.len(),
            "Drawing session cancelled"
        );
    }
    DrawingSession {
        shape_type: session.shape_type,
        stage: DrawingStage::Cancelled,
        accumulated_points: Vec::new(),
        circle_radius_meters: session.circle_radius_meters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_all(session: DrawingSession, clicks: &[(f64, f64)]) -> DrawingSession {
        clicks.iter().fold(session, |s, (lat, lng)| {
            apply_click(&s, MapCoordinate::new(*lat, *lng))
        })
    }

    #[test]
    fn test_start_is_drawing_with_no_points() {
        let session = DrawingSession::start(ShapeType::Polygon);
        assert!(session.is_drawing());
        assert!(session.accumulated_points().is_empty());
        assert_eq!(DrawingSession::idle(ShapeType::Circle).stage(), &DrawingStage::Idle);
    }

    #[test]
    fn test_circle_completes_on_first_click() {
        let session = DrawingSession::start(ShapeType::Circle).with_circle_radius(300.0);
        let next = apply_click(&session, MapCoordinate::new(10.0, 20.0));

        assert_eq!(
            next.completed_shape(),
            Some(&MapShape::Circle {
                center: MapCoordinate::new(10.0, 20.0),
                radius_meters: 300.0,
            })
        );
    }

    #[test]
    fn test_rectangle_needs_two_clicks() {
        let session = DrawingSession::start(ShapeType::Rectangle);
        let after_one = apply_click(&session, MapCoordinate::new(10.0, 20.0));
        assert!(after_one.is_drawing());
        assert_eq!(after_one.accumulated_points().len(), 1);
        assert!(after_one.completed_shape().is_none());

        let after_two = apply_click(&after_one, MapCoordinate::new(12.0, 22.0));
        assert_eq!(
            after_two.completed_shape(),
            Some(&MapShape::Rectangle {
                south_west: MapCoordinate::new(10.0, 20.0),
                north_east: MapCoordinate::new(12.0, 22.0),
            })
        );
    }

    #[test]
    fn test_polygon_never_completes_on_click() {
        let session = click_all(
            DrawingSession::start(ShapeType::Polygon),
            &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.5, -0.5)],
        );
        assert!(session.is_drawing());
        assert_eq!(session.accumulated_points().len(), 5);
    }

    #[test]
    fn test_polygon_points_keep_click_order() {
        let session = click_all(
            DrawingSession::start(ShapeType::Polygon),
            &[(3.0, 3.0), (1.0, 1.0), (2.0, 2.0)],
        );
        let lats: Vec<f64> = session.accumulated_points().iter().map(|p| p.lat).collect();
        assert_eq!(lats, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_complete_polygon_with_two_points_fails() {
        let session = click_all(
            DrawingSession::start(ShapeType::Polygon),
            &[(0.0, 0.0), (0.0, 1.0)],
        );
        let err = complete_polygon(&session).unwrap_err();
        assert_eq!(err, ValidationError::IncompletePolygon { points: 2 });
        assert!(session.is_drawing());
    }

    #[test]
    fn test_complete_polygon_with_three_points_succeeds() {
        let session = click_all(
            DrawingSession::start(ShapeType::Polygon),
            &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
        );
        let completed = complete_polygon(&session).unwrap();
        match completed.completed_shape() {
            Some(MapShape::Polygon { points }) => assert_eq!(points.len(), 3),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_complete_polygon_with_repeated_points_fails() {
        let session = click_all(
            DrawingSession::start(ShapeType::Polygon),
            &[(0.0, 0.0), (0.0, 1.0), (0.0, 0.0)],
        );
        assert_eq!(
            complete_polygon(&session).unwrap_err(),
            ValidationError::IncompletePolygon { points: 2 }
        );
    }

    #[test]
    fn test_failed_completion_allows_more_clicks() {
        let session = click_all(
            DrawingSession::start(ShapeType::Polygon),
            &[(0.0, 0.0), (0.0, 1.0)],
        );
        assert!(complete_polygon(&session).is_err());

        let session = apply_click(&session, MapCoordinate::new(1.0, 1.0));
        assert!(complete_polygon(&session).is_ok());
    }

    #[test]
    fn test_clicks_after_completion_are_ignored() {
        let session = apply_click(
            &DrawingSession::start(ShapeType::Circle),
            MapCoordinate::new(1.0, 1.0),
        );
        let again = apply_click(&session, MapCoordinate::new(5.0, 5.0));
        assert_eq!(again, session);
    }

    #[test]
    fn test_clicks_on_idle_session_are_ignored() {
        let idle = DrawingSession::idle(ShapeType::Polygon);
        let next = apply_click(&idle, MapCoordinate::new(1.0, 1.0));
        assert!(next.accumulated_points().is_empty());
        assert_eq!(next.stage(), &DrawingStage::Idle);
    }

    #[test]
    fn test_reset_drawing_from_any_stage() {
        let drawing = click_all(
            DrawingSession::start(ShapeType::Polygon),
            &[(0.0, 0.0), (0.0, 1.0)],
        );
        let completed = apply_click(
            &DrawingSession::start(ShapeType::Circle),
            MapCoordinate::new(1.0, 1.0),
        );

        for session in [drawing, completed, DrawingSession::idle(ShapeType::Rectangle)] {
            let reset = reset_drawing(&session);
            assert_eq!(reset.stage(), &DrawingStage::Cancelled);
            assert!(reset.accumulated_points().is_empty());
        }
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "complete_polygon called"))]
    fn test_complete_polygon_on_circle_is_a_programmer_error() {
        let session = DrawingSession::start(ShapeType::Circle);
        let unchanged = complete_polygon(&session).unwrap();
        assert_eq!(unchanged, session);
    }
}
