//! Reference distance kernels bound by the dispatcher.
//!
//! Each tier gets an L2-squared and an inner-product kernel over `f32`
//! slices. The SIMD variants use the `wide` crate, which lowers to the
//! widest instructions enabled for the build; the tier decides the lane
//! count we ask for.

use wide::{f32x4, f32x8};

/// Signature shared by all distance kernels.
pub type DistanceFn = fn(&[f32], &[f32]) -> f32;

#[inline]
fn check_lengths(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len(), "Vectors must have same length");
}

/// Scalar squared Euclidean distance.
pub fn l2_sqr_scalar(a: &[f32], b: &[f32]) -> f32 {
    check_lengths(a, b);
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Scalar inner product.
pub fn inner_product_scalar(a: &[f32], b: &[f32]) -> f32 {
    check_lengths(a, b);
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
fn load4(chunk: &[f32]) -> f32x4 {
    let mut lanes = [0.0f32; 4];
    lanes.copy_from_slice(chunk);
    f32x4::from(lanes)
}

#[inline]
fn load8(chunk: &[f32]) -> f32x8 {
    let mut lanes = [0.0f32; 8];
    lanes.copy_from_slice(chunk);
    f32x8::from(lanes)
}

/// 4-lane squared Euclidean distance.
pub fn l2_sqr_f32x4(a: &[f32], b: &[f32]) -> f32 {
    check_lengths(a, b);
    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let tail = l2_sqr_scalar(a_chunks.remainder(), b_chunks.remainder());

    let mut acc = f32x4::splat(0.0);
    for (ca, cb) in a_chunks.zip(b_chunks) {
        let d = load4(ca) - load4(cb);
        acc = d.mul_add(d, acc);
    }
    acc.reduce_add() + tail
}

/// 4-lane inner product.
pub fn inner_product_f32x4(a: &[f32], b: &[f32]) -> f32 {
    check_lengths(a, b);
    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let tail = inner_product_scalar(a_chunks.remainder(), b_chunks.remainder());

    let mut acc = f32x4::splat(0.0);
    for (ca, cb) in a_chunks.zip(b_chunks) {
        acc = load4(ca).mul_add(load4(cb), acc);
    }
    acc.reduce_add() + tail
}

/// 8-lane squared Euclidean distance.
pub fn l2_sqr_f32x8(a: &[f32], b: &[f32]) -> f32 {
    check_lengths(a, b);
    let a_chunks = a.chunks_exact(8);
    let b_chunks = b.chunks_exact(8);
    let tail = l2_sqr_f32x4(a_chunks.remainder(), b_chunks.remainder());

    let mut acc = f32x8::splat(0.0);
    for (ca, cb) in a_chunks.zip(b_chunks) {
        let d = load8(ca) - load8(cb);
        acc = d.mul_add(d, acc);
    }
    acc.reduce_add() + tail
}

/// 8-lane inner product.
pub fn inner_product_f32x8(a: &[f32], b: &[f32]) -> f32 {
    check_lengths(a, b);
    let a_chunks = a.chunks_exact(8);
    let b_chunks = b.chunks_exact(8);
    let tail = inner_product_f32x4(a_chunks.remainder(), b_chunks.remainder());

    let mut acc = f32x8::splat(0.0);
    for (ca, cb) in a_chunks.zip(b_chunks) {
        acc = load8(ca).mul_add(load8(cb), acc);
    }
    acc.reduce_add() + tail
}
