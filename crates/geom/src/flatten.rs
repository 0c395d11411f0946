use crate::scalar::Scalar;

/// Maximum subdivision depth supported by the flattening algorithms.
///
/// Larger `max_depth` values are clamped to this.
pub(crate) const MAX_FLATTENING_DEPTH: u32 = 24;

/// Capacity of the explicit subdivision stacks.
///
/// A depth-first subdivision keeps at most two pending items per level, plus the
/// items pushed by the current step.
pub(crate) const FLATTENING_STACK_SIZE: usize = (MAX_FLATTENING_DEPTH as usize + 2) * 2;

/// Outcome of testing a curve against the flattening thresholds.
pub(crate) enum FlatteningStep<P> {
    /// The curve is flat enough and is approximated by one point.
    Point(P),
    /// The curve is flat enough and is approximated by two points.
    Points(P, P),
    /// The curve degenerates into its own chord, nothing to emit.
    Skip,
    /// The curve must be subdivided.
    Split,
}

/// Thresholds controlling the adaptive flattening of curves.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FlatteningParams<S> {
    /// Maximum squared distance between the curve and its approximation.
    pub distance_error: S,
    /// Maximum turn angle (in radians) covered by a single approximated piece.
    ///
    /// Zero disables the angular criterion.
    pub angular_error: S,
    /// Maximum subdivision depth.
    pub max_depth: u32,
}

impl<S: Scalar> FlatteningParams<S> {
    pub const DEFAULT_MAX_DEPTH: u32 = 16;

    /// Parameters for a given tolerance (maximum distance to the curve),
    /// without angular criterion.
    pub fn with_tolerance(tolerance: S) -> Self {
        FlatteningParams {
            distance_error: tolerance * tolerance,
            angular_error: S::ZERO,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Parameters suitable for curves that will be offset by `line_width`.
    ///
    /// Wide lines amplify the flattening error, so the tolerance is divided by
    /// `log2(line_width)` when the width exceeds one. The angular criterion is enabled.
    pub fn for_stroke(tolerance: S, line_width: S) -> Self {
        let tolerance = if line_width > S::ONE {
            tolerance / line_width.log2()
        } else {
            tolerance
        };

        FlatteningParams {
            distance_error: tolerance * tolerance,
            angular_error: S::HALF,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    #[inline]
    pub fn with_angular_error(mut self, angular_error: S) -> Self {
        self.angular_error = angular_error;
        self
    }

    #[inline]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub(crate) fn depth_limit(&self) -> u32 {
        self.max_depth.min(MAX_FLATTENING_DEPTH)
    }

    #[inline]
    pub(crate) fn has_angular_error(&self) -> bool {
        self.angular_error >= S::EPSILON
    }
}

#[test]
fn stroke_params_scale_with_width() {
    let thin = FlatteningParams::for_stroke(1.0f32, 1.0);
    let wide = FlatteningParams::for_stroke(1.0f32, 8.0);

    assert_eq!(thin.distance_error, 1.0);
    // log2(8) = 3
    assert!((wide.distance_error - 1.0 / 9.0).abs() < 1e-6);
    assert_eq!(wide.angular_error, 0.5);

    let fill = FlatteningParams::with_tolerance(0.5f32);
    assert_eq!(fill.distance_error, 0.25);
    assert!(!fill.has_angular_error());
    assert_eq!(fill.with_max_depth(100).depth_limit(), MAX_FLATTENING_DEPTH);
}
