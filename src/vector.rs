use std::{
    f64::consts::PI,
    fmt,
    ops::{Index, Neg},
};

use approx::{AbsDiffEq, RelativeEq};
use itertools::Itertools;
use nalgebra::{DVector, Vector2, Vector3};
use num_traits::{One, Zero};

use crate::{
    decimal::{difference_of_products, Dec, ACOS_CLAMP_TOLERANCE},
    error::{GeometryError, Result},
};

/// Immutable n-dimensional vector of decimal components.
///
/// The dimension is fixed at construction and is never zero. Every
/// arithmetic operation returns a new vector; binary operations fail with
/// [`GeometryError::DimensionMismatch`] when the operands disagree.
#[derive(Clone, PartialEq, Eq)]
pub struct Vector {
    coordinates: DVector<Dec>,
}

impl Vector {
    pub fn new<T: Into<Dec>>(coordinates: impl IntoIterator<Item = T>) -> Result<Self> {
        let coordinates = coordinates.into_iter().map(Into::into).collect_vec();
        if coordinates.is_empty() {
            return Err(GeometryError::EmptyCoordinates);
        }
        Ok(Self {
            coordinates: DVector::from_vec(coordinates),
        })
    }

    /// Builds a vector from textual decimals such as `["8.462", "-5.975"]`.
    pub fn parse<S: AsRef<str>>(coordinates: impl IntoIterator<Item = S>) -> Result<Self> {
        let coordinates = coordinates
            .into_iter()
            .map(|c| c.as_ref().parse::<Dec>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::new(coordinates)
    }

    pub fn zero(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(GeometryError::EmptyCoordinates);
        }
        Ok(Self {
            coordinates: DVector::zeros(dimension),
        })
    }

    pub fn dimension(&self) -> usize {
        self.coordinates.len()
    }

    pub fn coordinates(&self) -> &[Dec] {
        self.coordinates.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dec> {
        self.coordinates.iter()
    }

    fn same_dimension(&self, other: &Self) -> Result<()> {
        if self.dimension() == other.dimension() {
            Ok(())
        } else {
            Err(GeometryError::DimensionMismatch {
                expected: self.dimension(),
                found: other.dimension(),
            })
        }
    }

    fn from_checked(
        coordinates: impl Iterator<Item = Option<Dec>>,
        operation: &'static str,
    ) -> Result<Self> {
        let coordinates = coordinates
            .collect::<Option<Vec<_>>>()
            .ok_or(GeometryError::Overflow(operation))?;
        Ok(Self {
            coordinates: DVector::from_vec(coordinates),
        })
    }

    pub fn plus(&self, other: &Self) -> Result<Self> {
        self.same_dimension(other)?;
        Self::from_checked(
            self.iter().zip(other).map(|(a, b)| a.checked_add(*b)),
            "vector sum",
        )
    }

    pub fn minus(&self, other: &Self) -> Result<Self> {
        self.same_dimension(other)?;
        Self::from_checked(
            self.iter().zip(other).map(|(a, b)| a.checked_sub(*b)),
            "vector difference",
        )
    }

    pub fn times_scalar(&self, c: impl Into<Dec>) -> Result<Self> {
        let c: Dec = c.into();
        Self::from_checked(self.iter().map(|x| x.checked_mul(c)), "scalar product")
    }

    /// The largest absolute component and every component divided by it,
    /// or `None` for the zero vector.
    fn reduced(&self) -> Option<(Dec, DVector<Dec>)> {
        let scale = self.iter().map(|c| c.abs()).max()?;
        if scale.is_zero() {
            return None;
        }
        Some((scale, self.coordinates.map(|c| c / scale)))
    }

    /// Euclidean norm, computed in decimal arithmetic.
    ///
    /// Components are divided by the largest absolute component before they
    /// are squared, so a norm that is itself representable never overflows
    /// or underflows along the way. Fails with [`GeometryError::Overflow`]
    /// only when the norm exceeds the decimal range.
    pub fn magnitude(&self) -> Result<Dec> {
        let Some((scale, reduced)) = self.reduced() else {
            return Ok(Dec::zero());
        };
        scale
            .checked_mul(unit_scale_norm(&reduced))
            .ok_or(GeometryError::Overflow("magnitude"))
    }

    /// Exact check with no tolerance: every component is zero, which is the
    /// same as a magnitude of exactly zero.
    pub fn is_zero(&self) -> bool {
        self.iter().all(|c| c.is_zero())
    }

    /// Unit vector in the same direction. Defined for every nonzero vector,
    /// including those whose magnitude would overflow.
    pub fn normalized(&self) -> Result<Self> {
        let (_, reduced) = self
            .reduced()
            .ok_or(GeometryError::ZeroVectorNormalization)?;
        let norm = unit_scale_norm(&reduced);
        Ok(Self {
            coordinates: reduced.map(|c| c / norm),
        })
    }

    /// Inner product. Exactly zero when either operand is the zero vector.
    pub fn dot(&self, other: &Self) -> Result<Dec> {
        self.same_dimension(other)?;
        if self.is_zero() || other.is_zero() {
            return Ok(Dec::zero());
        }
        self.iter()
            .zip(other)
            .try_fold(Dec::zero(), |sum, (a, b)| sum.checked_add(a.checked_mul(*b)?))
            .ok_or(GeometryError::Overflow("dot product"))
    }

    /// Angle between two vectors in radians.
    ///
    /// The cosine is computed in decimal from the normalized operands. If
    /// rounding pushed it outside `[-1, 1]` by less than
    /// [`ACOS_CLAMP_TOLERANCE`] it is clamped to the boundary; a larger
    /// overshoot is reported as [`GeometryError::CosineOutOfRange`]. The
    /// arccosine itself is evaluated in `f64`.
    pub fn angle_radians(&self, other: &Self) -> Result<f64> {
        self.same_dimension(other)?;
        let undefined_angle = |err: GeometryError| match err {
            GeometryError::ZeroVectorNormalization => GeometryError::ZeroVectorAngle,
            err => err,
        };
        let u1 = self.normalized().map_err(undefined_angle)?;
        let u2 = other.normalized().map_err(undefined_angle)?;

        let cosine = clamp_cosine(u1.dot(&u2)?)?;
        let cosine = cosine
            .to_f64()
            .ok_or(GeometryError::CosineOutOfRange(cosine))?;
        Ok(cosine.acos())
    }

    pub fn angle_degrees(&self, other: &Self) -> Result<f64> {
        Ok(self.angle_radians(other)? * 180.0 / PI)
    }

    /// `|a · b| < tolerance`. The zero vector is orthogonal to everything.
    pub fn is_orthogonal_to(&self, other: &Self, tolerance: Dec) -> Result<bool> {
        self.same_dimension(other)?;
        if self.is_zero() || other.is_zero() {
            return Ok(true);
        }
        Ok(self.dot(other)?.abs() < tolerance)
    }

    /// True when the angle between the vectors is exactly 0° or 180°. The zero
    /// vector is parallel to everything.
    ///
    /// There is no tolerance here; round the inputs first if one is needed.
    pub fn is_parallel_to(&self, other: &Self) -> Result<bool> {
        self.same_dimension(other)?;
        if self.is_zero() || other.is_zero() {
            return Ok(true);
        }
        let angle = self.angle_degrees(other)?;
        Ok(angle == 0.0 || angle == 180.0)
    }

    /// Component of `self` parallel to `basis`.
    pub fn project_onto(&self, basis: &Self) -> Result<Self> {
        self.same_dimension(basis)?;
        let unit = basis.normalized().map_err(|err| match err {
            GeometryError::ZeroVectorNormalization => GeometryError::NoUniqueParallelComponent,
            err => err,
        })?;
        let weight = self.dot(&unit)?;
        unit.times_scalar(weight)
    }

    /// Component of `self` orthogonal to `basis`.
    pub fn perpendicular_component(&self, basis: &Self) -> Result<Self> {
        let parallel = self.project_onto(basis).map_err(|err| match err {
            GeometryError::NoUniqueParallelComponent => {
                GeometryError::NoUniqueOrthogonalComponent
            }
            err => err,
        })?;
        self.minus(&parallel)
    }

    fn as_vector3(&self) -> Result<Vector3<Dec>> {
        if self.dimension() != 3 {
            return Err(GeometryError::DimensionMismatch {
                expected: 3,
                found: self.dimension(),
            });
        }
        Ok(Vector3::from_column_slice(self.coordinates()))
    }

    pub fn cross(&self, other: &Self) -> Result<Self> {
        let v = self.as_vector3()?;
        let w = other.as_vector3()?;
        let component = |a, b, c, d| {
            difference_of_products(a, b, c, d).ok_or(GeometryError::Overflow("cross product"))
        };
        Ok(Vector3::new(
            component(v.y, w.z, v.z, w.y)?,
            component(v.z, w.x, v.x, w.z)?,
            component(v.x, w.y, v.y, w.x)?,
        )
        .into())
    }

    pub fn parallelogram_area(&self, other: &Self) -> Result<Dec> {
        self.cross(other)?.magnitude()
    }

    pub fn triangle_area(&self, other: &Self) -> Result<Dec> {
        Ok(self.parallelogram_area(other)? / Dec::from(2))
    }
}

/// Norm of components already scaled into `[-1, 1]`, one of which is `±1`.
/// The sum of squares lies between one and the dimension, so the root
/// always exists.
fn unit_scale_norm(reduced: &DVector<Dec>) -> Dec {
    reduced
        .iter()
        .map(|r| *r * *r)
        .sum::<Dec>()
        .sqrt()
        .unwrap_or_else(Dec::one)
}

fn clamp_cosine(cosine: Dec) -> Result<Dec> {
    let one = Dec::one();
    let overshoot = if cosine > one {
        cosine - one
    } else if cosine < -one {
        -one - cosine
    } else {
        return Ok(cosine);
    };

    if overshoot < ACOS_CLAMP_TOLERANCE {
        tracing::trace!(%cosine, "clamping cosine back into [-1, 1]");
        Ok(if cosine.is_sign_negative() { -one } else { one })
    } else {
        Err(GeometryError::CosineOutOfRange(cosine))
    }
}

impl From<Vector2<Dec>> for Vector {
    fn from(value: Vector2<Dec>) -> Self {
        Self {
            coordinates: DVector::from_column_slice(value.as_slice()),
        }
    }
}

impl From<Vector3<Dec>> for Vector {
    fn from(value: Vector3<Dec>) -> Self {
        Self {
            coordinates: DVector::from_column_slice(value.as_slice()),
        }
    }
}

impl Index<usize> for Vector {
    type Output = Dec;

    fn index(&self, index: usize) -> &Self::Output {
        &self.coordinates[index]
    }
}

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector {
            coordinates: -&self.coordinates,
        }
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        -&self
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a Dec;
    type IntoIter = <&'a DVector<Dec> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.coordinates.iter()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector: ({})", self.iter().join(", "))
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl AbsDiffEq for Vector {
    type Epsilon = Dec;

    fn default_epsilon() -> Self::Epsilon {
        Dec::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.dimension() == other.dimension()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Vector {
    fn default_max_relative() -> Self::Epsilon {
        Dec::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.dimension() == other.dimension()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
