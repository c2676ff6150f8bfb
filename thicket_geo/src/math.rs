// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating-point shims covering both math backends.
//!
//! Same scheme as `thicket_rtree`: the `std` feature uses the inherent `f64`
//! methods, otherwise the `libm` feature supplies the equivalents.

#[cfg(feature = "std")]
mod imp {
    #[inline(always)]
    pub(crate) fn sin(x: f64) -> f64 {
        x.sin()
    }

    #[inline(always)]
    pub(crate) fn cos(x: f64) -> f64 {
        x.cos()
    }

    #[inline(always)]
    pub(crate) fn sin_cos(x: f64) -> (f64, f64) {
        x.sin_cos()
    }

    #[inline(always)]
    pub(crate) fn tan(x: f64) -> f64 {
        x.tan()
    }

    #[inline(always)]
    pub(crate) fn asin(x: f64) -> f64 {
        x.asin()
    }

    #[inline(always)]
    pub(crate) fn sqrt(x: f64) -> f64 {
        x.sqrt()
    }
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
mod imp {
    #[inline(always)]
    pub(crate) fn sin(x: f64) -> f64 {
        libm::sin(x)
    }

    #[inline(always)]
    pub(crate) fn cos(x: f64) -> f64 {
        libm::cos(x)
    }

    #[inline(always)]
    pub(crate) fn sin_cos(x: f64) -> (f64, f64) {
        libm::sincos(x)
    }

    #[inline(always)]
    pub(crate) fn tan(x: f64) -> f64 {
        libm::tan(x)
    }

    #[inline(always)]
    pub(crate) fn asin(x: f64) -> f64 {
        libm::asin(x)
    }

    #[inline(always)]
    pub(crate) fn sqrt(x: f64) -> f64 {
        libm::sqrt(x)
    }
}

pub(crate) use imp::{asin, cos, sin, sin_cos, sqrt, tan};
