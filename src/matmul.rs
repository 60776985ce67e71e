//! Small GEMM wrapper used by `Matrix::matmul`.
//!
//! - default: a simple, safe triple-loop implementation
//! - optional: a faster backend via the `matrixmultiply` feature

/// Computes `c = a * b` for row-major, densely packed operands.
///
/// `a` is `(m, k)`, `b` is `(k, n)`, `c` is `(m, n)`. `c` is overwritten.
#[inline]
pub(crate) fn gemm_f64(m: usize, n: usize, k: usize, a: &[f64], b: &[f64], c: &mut [f64]) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        c.fill(0.0);
        return;
    }

    #[cfg(feature = "matrixmultiply")]
    {
        // Row-major packing: row stride = cols, column stride = 1.
        unsafe {
            matrixmultiply::dgemm(
                m,
                k,
                n,
                1.0,
                a.as_ptr(),
                k as isize,
                1,
                b.as_ptr(),
                n as isize,
                1,
                0.0,
                c.as_mut_ptr(),
                n as isize,
                1,
            );
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    for i in 0..m {
        let a_row = &a[i * k..(i + 1) * k];
        for j in 0..n {
            let mut acc = 0.0_f64;
            for (p, &av) in a_row.iter().enumerate() {
                acc += av * b[p * n + j];
            }
            c[i * n + j] = acc;
        }
    }
}
