use crate::geo::{distance_m, GeoPoint};

/// One traversable edge of a polyline with its cumulative-distance bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub length_m: f64,
    pub cumulative_start_m: f64,
    pub cumulative_end_m: f64,
}

/// Segments of a polyline, built once. Zero-length edges are skipped so that
/// every stored segment has a positive length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSegments {
    segments: Vec<Segment>,
}

impl RouteSegments {
    pub fn build(path: &[GeoPoint]) -> Self {
        let mut segments = Vec::with_capacity(path.len().saturating_sub(1));
        let mut acc = 0.0;
        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let length_m = distance_m(from, to);
            if length_m.is_nan() || length_m <= 0.0 {
                continue;
            }
            segments.push(Segment {
                from,
                to,
                length_m,
                cumulative_start_m: acc,
                cumulative_end_m: acc + length_m,
            });
            acc += length_m;
        }
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn total_length_m(&self) -> f64 {
        self.segments
            .last()
            .map(|s| s.cumulative_end_m)
            .unwrap_or(0.0)
    }

    /// Segment whose `[start, end]` range contains `distance_m`; the last
    /// segment when the distance is at or past the end.
    pub fn locate(&self, distance_m: f64) -> Option<&Segment> {
        let idx = self
            .segments
            .partition_point(|s| s.cumulative_end_m < distance_m);
        self.segments.get(idx).or_else(|| self.segments.last())
    }
}
