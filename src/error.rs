use crate::decimal::Dec;

pub type Result<T> = std::result::Result<T, GeometryError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A vector was built from no components.
    #[error("the coordinates must be nonempty")]
    EmptyCoordinates,

    /// Operands of a binary operation disagree in dimension, or an operation
    /// defined for one dimension only got another.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Normalization needs a nonzero magnitude to divide by.
    #[error("cannot normalize the zero vector")]
    ZeroVectorNormalization,

    /// Either operand of an angle computation is the zero vector.
    #[error("the angle with the zero vector is undefined")]
    ZeroVectorAngle,

    /// Projection onto the zero vector.
    #[error("no unique parallel component: the basis vector is zero")]
    NoUniqueParallelComponent,

    /// Orthogonal component relative to the zero vector.
    #[error("no unique orthogonal component: the basis vector is zero")]
    NoUniqueOrthogonalComponent,

    /// A normalized dot product left `[-1, 1]` by more than rounding noise.
    #[error("cosine {0} is outside of [-1, 1]")]
    CosineOutOfRange(Dec),

    /// An intermediate or final value left the representable decimal range
    /// (about ±7.9e28).
    #[error("decimal overflow in {0}")]
    Overflow(&'static str),

    /// Textual input that is not a decimal number.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] rust_decimal::Error),
}
