//! One sub-path with per-segment stroke flags, and its builder.

use crate::math::Point;
use alloc::vec::Vec;

/// A segment of a figure, yielded during iteration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FigureSegment {
    Line {
        to: Point,
    },
    Cubic {
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
}

impl FigureSegment {
    /// The far endpoint of the segment.
    pub fn to(&self) -> Point {
        match self {
            FigureSegment::Line { to } => *to,
            FigureSegment::Cubic { to, .. } => *to,
        }
    }
}

/// A segment together with its stroke flags.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentView {
    pub segment: FigureSegment,
    /// The segment is an unstroked gap.
    pub is_gap: bool,
    /// The corner at the segment's start point is known to be smooth, so the
    /// widener does not need to construct join geometry there.
    pub is_smooth_join: bool,
}

const SEG_GAP: u8 = 1;
const SEG_SMOOTH: u8 = 2;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
enum SegmentKind {
    Line,
    Cubic,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
struct SegmentMeta {
    kind: SegmentKind,
    flags: u8,
}

/// One sub-path: a start point followed by line and cubic bézier segments.
///
/// Figures are immutable once built (see [`FigureBuilder`]); the widener
/// traverses them through the value-typed iterator returned by
/// [`segments`](Figure::segments), so no traversal state hides in the figure
/// itself.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Figure {
    start: Point,
    points: Vec<Point>,
    meta: Vec<SegmentMeta>,
    closed: bool,
    gaps: u32,
}

impl Figure {
    pub fn builder(start: Point) -> FigureBuilder {
        FigureBuilder {
            figure: Figure {
                start,
                points: Vec::new(),
                meta: Vec::new(),
                closed: false,
                gaps: 0,
            },
            next_is_smooth: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn has_gaps(&self) -> bool {
        self.gaps > 0
    }

    pub fn start_point(&self) -> Point {
        self.start
    }

    pub fn num_segments(&self) -> usize {
        self.meta.len()
    }

    /// Iterate over the segments in order.
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            figure: self,
            seg: 0,
            pt: 0,
        }
    }
}

/// The forward-iteration contract the widener consumes figures through.
///
/// Implemented by [`Figure`]; external path representations can implement it
/// to be widened without conversion.
pub trait FigureSource {
    type Segments<'l>: Iterator<Item = SegmentView>
    where
        Self: 'l;

    fn is_empty(&self) -> bool;
    fn is_closed(&self) -> bool;
    fn has_gaps(&self) -> bool;
    fn start_point(&self) -> Point;
    fn segments(&self) -> Self::Segments<'_>;
}

impl FigureSource for Figure {
    type Segments<'l> = Segments<'l> where Self: 'l;

    fn is_empty(&self) -> bool {
        self.is_empty()
    }

    fn is_closed(&self) -> bool {
        self.is_closed()
    }

    fn has_gaps(&self) -> bool {
        self.has_gaps()
    }

    fn start_point(&self) -> Point {
        self.start_point()
    }

    fn segments(&self) -> Segments<'_> {
        self.segments()
    }
}

/// An explicit cursor over a figure's segments.
#[derive(Clone)]
pub struct Segments<'l> {
    figure: &'l Figure,
    seg: usize,
    pt: usize,
}

impl<'l> Iterator for Segments<'l> {
    type Item = SegmentView;

    fn next(&mut self) -> Option<SegmentView> {
        let meta = self.figure.meta.get(self.seg)?;
        self.seg += 1;
        let segment = match meta.kind {
            SegmentKind::Line => {
                let to = self.figure.points[self.pt];
                self.pt += 1;
                FigureSegment::Line { to }
            }
            SegmentKind::Cubic => {
                let ctrl1 = self.figure.points[self.pt];
                let ctrl2 = self.figure.points[self.pt + 1];
                let to = self.figure.points[self.pt + 2];
                self.pt += 3;
                FigureSegment::Cubic { ctrl1, ctrl2, to }
            }
        };

        Some(SegmentView {
            segment,
            is_gap: meta.flags & SEG_GAP != 0,
            is_smooth_join: meta.flags & SEG_SMOOTH != 0,
        })
    }
}

/// Builds a [`Figure`].
pub struct FigureBuilder {
    figure: Figure,
    next_is_smooth: bool,
}

impl FigureBuilder {
    pub fn line_to(&mut self, to: Point) -> &mut Self {
        self.push(SegmentKind::Line, &[to], 0)
    }

    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) -> &mut Self {
        self.push(SegmentKind::Cubic, &[ctrl1, ctrl2, to], 0)
    }

    /// Add an unstroked gap ending at `to`.
    pub fn gap_to(&mut self, to: Point) -> &mut Self {
        self.figure.gaps += 1;
        self.push(SegmentKind::Line, &[to], SEG_GAP)
    }

    /// Mark the joint between the previous segment and the next one as
    /// smooth: the widener will skip join construction there.
    pub fn smooth(&mut self) -> &mut Self {
        self.next_is_smooth = true;
        self
    }

    /// Mark the figure as closed. The widener treats the run from the last
    /// endpoint back to the start point as part of the figure.
    pub fn close(&mut self) -> &mut Self {
        self.figure.closed = true;
        self
    }

    pub fn build(self) -> Figure {
        self.figure
    }

    /// An axis-aligned rectangle, as a closed four-segment figure.
    pub fn rectangle(min: Point, max: Point) -> Figure {
        let mut builder = Figure::builder(min);
        builder
            .line_to(Point::new(max.x, min.y))
            .line_to(max)
            .line_to(Point::new(min.x, max.y))
            .close();
        builder.build()
    }

    fn push(&mut self, kind: SegmentKind, points: &[Point], mut flags: u8) -> &mut Self {
        if core::mem::take(&mut self.next_is_smooth) {
            flags |= SEG_SMOOTH;
        }
        self.figure.points.extend_from_slice(points);
        self.figure.meta.push(SegmentMeta { kind, flags });
        self
    }
}
