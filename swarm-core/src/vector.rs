use core::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::Rng;

use crate::Error;

#[inline]
pub(crate) fn sqrt(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrtf(value)
    }
}

#[inline]
pub(crate) fn floor(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.floor()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::floorf(value)
    }
}

/// A point or direction in `D`-dimensional space (2 or 3 in practice)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const D: usize> {
    pub components: [f32; D],
}

pub type Vector2 = Vector<2>;
pub type Vector3 = Vector<3>;

impl Vector<2> {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { components: [x, y] }
    }
}

impl Vector<3> {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            components: [x, y, z],
        }
    }
}

impl<const D: usize> Vector<D> {
    pub const fn from_array(components: [f32; D]) -> Self {
        Self { components }
    }

    pub const fn zero() -> Self {
        Self {
            components: [0.0; D],
        }
    }

    pub const fn splat(value: f32) -> Self {
        Self {
            components: [value; D],
        }
    }

    /// Build a vector from a slice, failing when the length is not `D`.
    /// `index` identifies the offending point in error reports.
    pub fn try_from_slice(values: &[f32], index: usize) -> Result<Self, Error> {
        let components: [f32; D] = values.try_into().map_err(|_| Error::DimensionMismatch {
            expected: D,
            found: values.len(),
            index,
        })?;
        let vector = Self { components };
        if !vector.is_finite() {
            return Err(Error::NonFinite { index });
        }
        Ok(vector)
    }

    pub fn as_array(&self) -> &[f32; D] {
        &self.components
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.components
            .iter()
            .zip(other.components.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    pub fn magnitude_squared(&self) -> f32 {
        self.dot(self)
    }

    pub fn magnitude(&self) -> f32 {
        sqrt(self.magnitude_squared())
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            *self / mag
        } else {
            Self::zero()
        }
    }

    /// Clamp the magnitude to `max`, keeping the direction
    pub fn limit(&self, max: f32) -> Self {
        let mag = self.magnitude();
        if mag > max {
            self.normalize() * max
        } else {
            *self
        }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        (*self - *other).magnitude_squared()
    }

    pub fn distance(&self, other: &Self) -> f32 {
        sqrt(self.distance_squared(other))
    }

    pub fn is_finite(&self) -> bool {
        self.components.iter().all(|c| c.is_finite())
    }

    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            components: self.components.map(f),
        }
    }

    fn zip_with(mut self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        for (a, b) in self.components.iter_mut().zip(other.components) {
            *a = f(*a, b);
        }
        self
    }

    /// Uniform sample from the box `[-extent, extent)` per axis
    pub fn random_within<R: Rng + ?Sized>(rng: &mut R, extent: &Self) -> Self {
        let mut v = Self::zero();
        for (c, e) in v.components.iter_mut().zip(extent.components) {
            *c = if e > 0.0 { rng.gen_range(-e..e) } else { 0.0 };
        }
        v
    }

    /// Uniformly distributed unit direction (rejection sampling in the unit ball)
    pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if D == 0 {
            return Self::zero();
        }
        loop {
            let candidate = Self::random_within(rng, &Self::splat(1.0));
            let mag_sq = candidate.magnitude_squared();
            if mag_sq > 1e-6 && mag_sq <= 1.0 {
                return candidate / sqrt(mag_sq);
            }
        }
    }
}

impl<const D: usize> Default for Vector<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> From<[f32; D]> for Vector<D> {
    fn from(components: [f32; D]) -> Self {
        Self { components }
    }
}

impl<const D: usize> From<Vector<D>> for [f32; D] {
    fn from(v: Vector<D>) -> Self {
        v.components
    }
}

impl<const D: usize> Index<usize> for Vector<D> {
    type Output = f32;

    fn index(&self, axis: usize) -> &f32 {
        &self.components[axis]
    }
}

impl<const D: usize> IndexMut<usize> for Vector<D> {
    fn index_mut(&mut self, axis: usize) -> &mut f32 {
        &mut self.components[axis]
    }
}

impl<const D: usize> Add for Vector<D> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }
}

impl<const D: usize> Sub for Vector<D> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }
}

impl<const D: usize> Mul<f32> for Vector<D> {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        self.map(|c| c * scalar)
    }
}

impl<const D: usize> Div<f32> for Vector<D> {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        self.map(|c| c / scalar)
    }
}

impl<const D: usize> Neg for Vector<D> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|c| -c)
    }
}

impl<const D: usize> AddAssign for Vector<D> {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl<const D: usize> SubAssign for Vector<D> {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl<const D: usize> MulAssign<f32> for Vector<D> {
    fn mul_assign(&mut self, scalar: f32) {
        *self = *self * scalar;
    }
}

impl<const D: usize> DivAssign<f32> for Vector<D> {
    fn div_assign(&mut self, scalar: f32) {
        *self = *self / scalar;
    }
}

impl<const D: usize> core::iter::Sum for Vector<D> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, v| acc + v)
    }
}
