//! Fixed-dimension vectors.

use std::ops::{ Add, Sub, Mul, Neg, Index, IndexMut };
use num_traits::{ Float, Zero };

/// A fixed-dimension vector.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vector<const N: usize, T>(pub [T; N]);

/// Shorthand for points and directions in real space.
pub type Vec3 = Vector<3, f64>;

impl<const N: usize, T> From<[T; N]> for Vector<N, T> {
    fn from(data: [T; N]) -> Self { Self(data) }
}

impl<const N: usize, T: Zero + Copy> Vector<N, T> {
    /// Create a vector of all zeros.
    pub fn zeros() -> Self { Self([T::zero(); N]) }
}

impl<const N: usize, T: Copy> Vector<N, T> {
    /// Return an iterator over references to all elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> { self.0.iter() }

    /// Safe immutable indexing.
    pub fn get(&self, k: usize) -> Option<&T> { self.0.get(k) }

    /// Call a function on each element by value, returning results in a new
    /// vector.
    pub fn mapv<U, F>(&self, mut f: F) -> Vector<N, U>
    where F: FnMut(T) -> U
    {
        Vector(std::array::from_fn(|k| f(self.0[k])))
    }

    /// Combine two vectors elementwise.
    pub fn zip_with<U, V, F>(&self, rhs: &Vector<N, U>, mut f: F)
        -> Vector<N, V>
    where
        U: Copy,
        F: FnMut(T, U) -> V,
    {
        Vector(std::array::from_fn(|k| f(self.0[k], rhs.0[k])))
    }
}

impl<const N: usize, T: Float> Vector<N, T> {
    /// Return the dot product of two vectors.
    pub fn dot(&self, rhs: &Self) -> T {
        self.0.iter().zip(rhs.0.iter())
            .fold(T::zero(), |acc, (l, r)| acc + *l * *r)
    }

    /// Return the Euclidean length.
    pub fn norm(&self) -> T { self.dot(self).sqrt() }

    /// Return a unit vector in the same direction, or `None` if `self` has
    /// zero (or non-finite) length.
    pub fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        (n.is_finite() && n > T::zero()).then(|| self.mapv(|x| x / n))
    }

    /// Return `true` if every element is finite.
    pub fn is_finite(&self) -> bool { self.0.iter().all(|x| x.is_finite()) }
}

impl<const N: usize, T, I> Index<I> for Vector<N, T>
where [T; N]: Index<I>
{
    type Output = <[T; N] as Index<I>>::Output;

    fn index(&self, index: I) -> &Self::Output { &self.0[index] }
}

impl<const N: usize, T, I> IndexMut<I> for Vector<N, T>
where [T; N]: IndexMut<I>
{
    fn index_mut(&mut self, index: I) -> &mut Self::Output { &mut self.0[index] }
}

impl<const N: usize, T> Add for Vector<N, T>
where T: Add<Output = T> + Copy
{
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output { self.zip_with(&rhs, |l, r| l + r) }
}

impl<const N: usize, T> Sub for Vector<N, T>
where T: Sub<Output = T> + Copy
{
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output { self.zip_with(&rhs, |l, r| l - r) }
}

impl<const N: usize, T> Neg for Vector<N, T>
where T: Neg<Output = T> + Copy
{
    type Output = Self;

    fn neg(self) -> Self::Output { self.mapv(|x| -x) }
}

impl<const N: usize, T> Mul<T> for Vector<N, T>
where T: Mul<Output = T> + Copy
{
    type Output = Self;

    fn mul(self, rhs: T) -> Self::Output { self.mapv(|x| x * rhs) }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arithmetic() {
        let u: Vec3 = [1.0, 2.0, 2.0].into();
        let v: Vec3 = Vector::zeros();
        assert_eq!(u - v, u);
        assert_eq!((u + u) * 0.5, u);
        assert_eq!(-u + u, Vec3::zeros());
        assert_eq!(u.dot(&u), 9.0);
        assert_eq!(u.norm(), 3.0);
    }

    #[test]
    fn normalization() {
        let u: Vec3 = [0.0, 0.0, 4.0].into();
        assert_eq!(u.normalized(), Some([0.0, 0.0, 1.0].into()));
        assert_eq!(Vec3::zeros().normalized(), None);
        assert_eq!(Vec3::from([f64::NAN, 0.0, 1.0]).normalized(), None);
    }
}
