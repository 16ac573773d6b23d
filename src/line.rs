use std::fmt;

use itertools::Itertools;
use nalgebra::Vector2;
use num_traits::{One, Zero};

use crate::{
    decimal::{
        difference_of_products, first_nonzero_index, is_near_zero, Dec, DEFAULT_TOLERANCE,
        DISPLAY_DECIMAL_PLACES, NEAR_ZERO_EPSILON,
    },
    error::{GeometryError, Result},
    vector::Vector,
};

/// How two lines meet.
#[derive(Clone, Debug, PartialEq)]
pub enum Intersection {
    Point(Vector),
    /// Both lines describe the same set of points.
    Coincident(Line),
    /// Parallel and distinct.
    Parallel,
    /// At least one of the lines is degenerate, see [`Line::is_degenerate`].
    Degenerate,
}

impl Intersection {
    pub fn point(&self) -> Option<&Vector> {
        match self {
            Intersection::Point(point) => Some(point),
            _ => None,
        }
    }
}

/// A line in the plane: every `p` with `normal · p = constant`.
///
/// A zero normal vector is allowed and describes no geometric line; such a
/// line has no basepoint. The same holds for a normal whose components are
/// all below [`NEAR_ZERO_EPSILON`] in magnitude.
#[derive(Clone, Debug)]
pub struct Line {
    normal: Vector,
    constant: Dec,
    basepoint: Option<Vector>,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            normal: Vector2::<Dec>::zeros().into(),
            constant: Dec::zero(),
            basepoint: None,
        }
    }
}

impl Line {
    pub const DIMENSION: usize = 2;

    pub fn new(normal: Vector, constant: impl Into<Dec>) -> Result<Self> {
        if normal.dimension() != Self::DIMENSION {
            return Err(GeometryError::DimensionMismatch {
                expected: Self::DIMENSION,
                found: normal.dimension(),
            });
        }
        let constant = constant.into();
        let basepoint = solve_point(&normal, constant, Dec::zero())?;
        if basepoint.is_none() {
            tracing::debug!(%constant, "line has a zero normal vector, basepoint is undefined");
        }
        Ok(Self {
            normal,
            constant,
            basepoint,
        })
    }

    pub fn normal(&self) -> &Vector {
        &self.normal
    }

    pub fn constant(&self) -> Dec {
        self.constant
    }

    /// The point on the line whose non-pivot coordinate is zero, where the
    /// pivot is the first axis with a non-negligible normal component.
    pub fn basepoint(&self) -> Option<&Vector> {
        self.basepoint.as_ref()
    }

    /// The point on the line whose non-pivot coordinate equals `free`.
    ///
    /// Works for horizontal and vertical lines alike, since the solved
    /// coordinate is always one with a nonzero normal component.
    pub fn point_at(&self, free: impl Into<Dec>) -> Result<Option<Vector>> {
        solve_point(&self.normal, self.constant, free.into())
    }

    /// True when the normal has no component of magnitude
    /// [`NEAR_ZERO_EPSILON`] or more. Such a line has no basepoint and is
    /// handled as a zero-normal line by every relation below.
    pub fn is_degenerate(&self) -> bool {
        self.basepoint.is_none()
    }

    pub fn is_parallel_to(&self, other: &Self) -> bool {
        // normals are both two-dimensional, so only the answer can vary
        matches!(self.normal.is_parallel_to(&other.normal), Ok(true))
    }

    /// Whether both lines describe the same set of points.
    ///
    /// Two degenerate lines coincide when their constants are within
    /// [`NEAR_ZERO_EPSILON`]; a degenerate line never coincides with a proper
    /// one. Proper lines coincide when they are parallel and the offset
    /// between their basepoints is orthogonal to both normals.
    pub fn is_coincident_with(&self, other: &Self) -> bool {
        match (self.is_degenerate(), other.is_degenerate()) {
            (true, true) => self
                .constant
                .checked_sub(other.constant)
                .is_some_and(|difference| is_near_zero(difference, NEAR_ZERO_EPSILON)),
            (true, false) | (false, true) => false,
            (false, false) => {
                if !self.is_parallel_to(other) {
                    return false;
                }
                let (Some(p), Some(q)) = (&self.basepoint, &other.basepoint) else {
                    return false;
                };
                if p == q {
                    return true;
                }
                let Ok(offset) = q.minus(p) else {
                    return false;
                };
                [&self.normal, &other.normal]
                    .into_iter()
                    .all(|n| matches!(offset.is_orthogonal_to(n, DEFAULT_TOLERANCE), Ok(true)))
            }
        }
    }

    pub fn coincident(first: &Line, second: &Line) -> bool {
        first.is_coincident_with(second)
    }

    /// Solves the 2×2 system with Cramer's rule.
    ///
    /// Fails only with [`GeometryError::Overflow`], when the crossing point
    /// lies outside the decimal range.
    pub fn intersection_with(&self, other: &Self) -> Result<Intersection> {
        if self.is_degenerate() || other.is_degenerate() {
            return Ok(Intersection::Degenerate);
        }
        if self.is_parallel_to(other) {
            return Ok(self.no_unique_intersection(other));
        }

        let (a, b) = (self.normal[0], self.normal[1]);
        let (c, d) = (other.normal[0], other.normal[1]);
        let (k1, k2) = (self.constant, other.constant);
        let overflow = || GeometryError::Overflow("line intersection");

        let determinant = difference_of_products(a, d, b, c).ok_or_else(overflow)?;
        if determinant.is_zero() {
            tracing::debug!("determinant vanished for lines with a nonzero angle");
            return Ok(self.no_unique_intersection(other));
        }
        let x = difference_of_products(d, k1, b, k2)
            .and_then(|n| n.checked_div(determinant))
            .ok_or_else(overflow)?;
        let y = difference_of_products(a, k2, c, k1)
            .and_then(|n| n.checked_div(determinant))
            .ok_or_else(overflow)?;
        Ok(Intersection::Point(Vector2::new(x, y).into()))
    }

    fn no_unique_intersection(&self, other: &Self) -> Intersection {
        if self.is_coincident_with(other) {
            Intersection::Coincident(self.clone())
        } else {
            Intersection::Parallel
        }
    }
}

fn solve_point(normal: &Vector, constant: Dec, free: Dec) -> Result<Option<Vector>> {
    let Some(pivot) = first_nonzero_index(normal, NEAR_ZERO_EPSILON) else {
        return Ok(None);
    };
    let overflow = || GeometryError::Overflow("point on line");
    let rest = normal
        .iter()
        .enumerate()
        .filter(|(axis, _)| *axis != pivot)
        .try_fold(Dec::zero(), |sum, (_, n)| sum.checked_add(n.checked_mul(free)?))
        .ok_or_else(overflow)?;
    let solved = constant
        .checked_sub(rest)
        .and_then(|r| r.checked_div(normal[pivot]))
        .ok_or_else(overflow)?;
    let coordinates = (0..normal.dimension())
        .map(|axis| if axis == pivot { solved } else { free })
        .collect_vec();
    Vector::new(coordinates).map(Some)
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        self.is_coincident_with(other)
    }
}

/// Whole numbers print without a fraction, everything else with exactly
/// [`DISPLAY_DECIMAL_PLACES`] places. A rounded zero is never `-0`.
fn rounded(value: Dec) -> Dec {
    let value = value.round_dp(DISPLAY_DECIMAL_PLACES);
    if value.is_zero() {
        Dec::zero()
    } else if value.is_integer() {
        value.normalize()
    } else {
        value.rescale(DISPLAY_DECIMAL_PLACES)
    }
}

fn write_term(coefficient: Dec, axis: usize, is_initial: bool) -> String {
    let mut term = String::new();
    if coefficient.is_sign_negative() {
        term.push('-');
    } else if !is_initial {
        term.push('+');
    }
    if !is_initial {
        term.push(' ');
    }
    let magnitude = coefficient.abs();
    if !magnitude.is_one() {
        term.push_str(&magnitude.to_string());
    }
    term.push_str(&format!("x_{}", axis + 1));
    term
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = self
            .normal
            .iter()
            .map(|c| rounded(*c))
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .enumerate()
            .map(|(position, (axis, c))| write_term(c, axis, position == 0))
            .join(" ");
        let lhs = if terms.is_empty() {
            "0".to_string()
        } else {
            terms
        };
        write!(f, "{} = {}", lhs, rounded(self.constant))
    }
}
