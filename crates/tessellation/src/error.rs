/// The tessellator's result type.
pub type TessellationResult = Result<(), TessellationError>;

/// An error that can happen while generating geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeometryBuilderError {
    InvalidVertex,
    TooManyVertices,
}

#[cfg(feature = "std")]
impl core::fmt::Display for GeometryBuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GeometryBuilderError::InvalidVertex => std::write!(f, "Invalid vertex"),
            GeometryBuilderError::TooManyVertices => std::write!(f, "Too many vertices"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GeometryBuilderError {}

/// Describes a topological failure of the sweep.
///
/// The mesh is left in an unspecified state, the tessellator must be cleared before
/// it can be used again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InternalError {
    /// A diagonal was requested between a vertex and itself.
    ConnectSameVertex,
    /// Merging two coincident vertices did not converge.
    MergeRotationOverflow,
    /// Merging two vertices left a vertex without edges.
    MergeEmptyVertex,
    /// An edge angle could not be computed (NaN coordinates or a zero length edge).
    InvalidEdgeAngle,
    /// An intersection could not be resolved.
    IntersectionFailed,
    /// `write` was called without a successful `prepare`.
    NotPrepared,
}

#[cfg(feature = "std")]
impl core::fmt::Display for InternalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InternalError::ConnectSameVertex => {
                std::write!(f, "Attempt to connect a vertex with itself")
            }
            InternalError::MergeRotationOverflow => {
                std::write!(f, "Vertex merge did not converge")
            }
            InternalError::MergeEmptyVertex => {
                std::write!(f, "Vertex merge left an empty vertex")
            }
            InternalError::InvalidEdgeAngle => std::write!(f, "Invalid edge angle"),
            InternalError::IntersectionFailed => {
                std::write!(f, "Failed to process an intersection")
            }
            InternalError::NotPrepared => {
                std::write!(f, "The tessellator was not successfully prepared")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InternalError {}

/// The tessellator's error enumeration.
#[derive(Clone, Debug, PartialEq)]
pub enum TessellationError {
    UnsupportedParameter(UnsupportedParameter),
    GeometryBuilder(GeometryBuilderError),
    Internal(InternalError),
}

#[cfg(feature = "std")]
impl core::fmt::Display for TessellationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TessellationError::UnsupportedParameter(e) => {
                std::write!(f, "Unsupported parameter: {e}")
            }
            TessellationError::GeometryBuilder(e) => {
                std::write!(f, "Geometry builder error: {e}")
            }
            TessellationError::Internal(e) => std::write!(f, "Internal error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TessellationError {}

impl core::convert::From<GeometryBuilderError> for TessellationError {
    fn from(value: GeometryBuilderError) -> Self {
        Self::GeometryBuilder(value)
    }
}

impl core::convert::From<InternalError> for TessellationError {
    fn from(value: InternalError) -> Self {
        Self::Internal(value)
    }
}

impl core::convert::From<UnsupportedParameter> for TessellationError {
    fn from(value: UnsupportedParameter) -> Self {
        Self::UnsupportedParameter(value)
    }
}

/// Input rejected by a cursor operation.
#[derive(Clone, Debug, PartialEq)]
pub enum UnsupportedParameter {
    PositionIsNaN,
    OffsetIsNaN,
    /// The contour was already closed.
    ContourIsClosed,
    /// Contours can't be added once the tessellator is prepared.
    AlreadyPrepared,
}

#[cfg(feature = "std")]
impl core::fmt::Display for UnsupportedParameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UnsupportedParameter::PositionIsNaN => std::write!(f, "Position is not a number"),
            UnsupportedParameter::OffsetIsNaN => std::write!(f, "Offset is not a number"),
            UnsupportedParameter::ContourIsClosed => std::write!(f, "The contour is closed"),
            UnsupportedParameter::AlreadyPrepared => {
                std::write!(f, "The tessellator is already prepared")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnsupportedParameter {}
