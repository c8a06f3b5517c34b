//! The widener's output: a set of closed outline figures stored as points
//! plus verb bytes.

use crate::math::Point;
use alloc::vec::Vec;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
enum Verb {
    Begin,
    LineTo,
    CubicTo,
    Close,
}

/// A set of closed figures, in the order they were produced.
///
/// The contours are raw geometry: whether a point is inside the shape is
/// decided by the non-zero winding rule, which is what makes the
/// doubled seam edge of a widened ring neutral.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Shape {
    points: Vec<Point>,
    verbs: Vec<Verb>,
    num_figures: u32,
}

/// An event yielded when iterating over a [`Shape`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeEvent {
    Begin {
        at: Point,
    },
    Line {
        from: Point,
        to: Point,
    },
    Cubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
    /// The end of a figure; `last` and `first` describe the implicit
    /// closing edge.
    End {
        last: Point,
        first: Point,
    },
}

impl Shape {
    pub fn new() -> Self {
        Shape::default()
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    pub fn num_figures(&self) -> u32 {
        self.num_figures
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.verbs.clear();
        self.num_figures = 0;
    }

    /// Start a new figure at `at`.
    pub fn begin(&mut self, at: Point) {
        self.points.push(at);
        self.verbs.push(Verb::Begin);
    }

    pub fn line_to(&mut self, to: Point) {
        self.points.push(to);
        self.verbs.push(Verb::LineTo);
    }

    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.points.push(ctrl1);
        self.points.push(ctrl2);
        self.points.push(to);
        self.verbs.push(Verb::CubicTo);
    }

    /// Close the current figure.
    pub fn close(&mut self) {
        self.verbs.push(Verb::Close);
        self.num_figures += 1;
    }

    pub fn iter(&self) -> ShapeEvents<'_> {
        ShapeEvents {
            shape: self,
            verb: 0,
            pt: 0,
            first: Point::zero(),
            current: Point::zero(),
        }
    }

    /// The smallest axis-aligned box containing every stored point
    /// (curve control points included), or `None` for an empty shape.
    pub fn fast_bounding_box(&self) -> Option<crate::math::Box2D> {
        let mut points = self.points.iter();
        let first = points.next()?;
        let mut min = *first;
        let mut max = *first;
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(crate::math::Box2D { min, max })
    }
}

/// Iterates over the events of every figure of a shape.
#[derive(Clone)]
pub struct ShapeEvents<'l> {
    shape: &'l Shape,
    verb: usize,
    pt: usize,
    first: Point,
    current: Point,
}

impl<'l> Iterator for ShapeEvents<'l> {
    type Item = ShapeEvent;

    fn next(&mut self) -> Option<ShapeEvent> {
        let verb = self.shape.verbs.get(self.verb)?;
        self.verb += 1;
        Some(match verb {
            Verb::Begin => {
                let at = self.shape.points[self.pt];
                self.pt += 1;
                self.first = at;
                self.current = at;
                ShapeEvent::Begin { at }
            }
            Verb::LineTo => {
                let from = self.current;
                let to = self.shape.points[self.pt];
                self.pt += 1;
                self.current = to;
                ShapeEvent::Line { from, to }
            }
            Verb::CubicTo => {
                let from = self.current;
                let ctrl1 = self.shape.points[self.pt];
                let ctrl2 = self.shape.points[self.pt + 1];
                let to = self.shape.points[self.pt + 2];
                self.pt += 3;
                self.current = to;
                ShapeEvent::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                }
            }
            Verb::Close => ShapeEvent::End {
                last: self.current,
                first: self.first,
            },
        })
    }
}

impl<'l> IntoIterator for &'l Shape {
    type Item = ShapeEvent;
    type IntoIter = ShapeEvents<'l>;

    fn into_iter(self) -> ShapeEvents<'l> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    #[test]
    fn events_round_trip() {
        let mut shape = Shape::new();
        shape.begin(point(0.0, 0.0));
        shape.line_to(point(1.0, 0.0));
        shape.cubic_to(point(2.0, 0.0), point(2.0, 1.0), point(2.0, 2.0));
        shape.close();

        let events: std::vec::Vec<_> = shape.iter().collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], ShapeEvent::Begin { at: point(0.0, 0.0) });
        assert_eq!(
            events[1],
            ShapeEvent::Line {
                from: point(0.0, 0.0),
                to: point(1.0, 0.0)
            }
        );
        assert_eq!(
            events[3],
            ShapeEvent::End {
                last: point(2.0, 2.0),
                first: point(0.0, 0.0)
            }
        );
        assert_eq!(shape.num_figures(), 1);
    }

    #[test]
    fn bounding_box_covers_all_points() {
        let mut shape = Shape::new();
        shape.begin(point(1.0, 1.0));
        shape.line_to(point(-2.0, 5.0));
        shape.close();
        let aabb = shape.fast_bounding_box().unwrap();
        assert_eq!(aabb.min, point(-2.0, 1.0));
        assert_eq!(aabb.max, point(1.0, 5.0));
    }
}
