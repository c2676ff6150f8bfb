// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating-point shims covering both math backends.
//!
//! With the `std` feature the inherent `f64` methods are used; without it the
//! `libm` feature must be enabled and the equivalent `libm` functions are
//! called instead. Callers elsewhere in the crate go through these helpers so
//! no other module needs to know which backend is active.

#[cfg(feature = "std")]
mod imp {
    #[inline(always)]
    pub(crate) fn round(x: f64) -> f64 {
        x.round()
    }

    #[inline(always)]
    pub(crate) fn sqrt(x: f64) -> f64 {
        x.sqrt()
    }

    #[inline(always)]
    pub(crate) fn ln(x: f64) -> f64 {
        x.ln()
    }

    #[inline(always)]
    pub(crate) fn exp(x: f64) -> f64 {
        x.exp()
    }

    #[cfg(feature = "codec")]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "wire precision values are tiny; i32 is ample"
    )]
    #[inline(always)]
    pub(crate) fn pow10(p: u32) -> f64 {
        10_f64.powi(p as i32)
    }
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
mod imp {
    #[inline(always)]
    pub(crate) fn round(x: f64) -> f64 {
        libm::round(x)
    }

    #[inline(always)]
    pub(crate) fn sqrt(x: f64) -> f64 {
        libm::sqrt(x)
    }

    #[inline(always)]
    pub(crate) fn ln(x: f64) -> f64 {
        libm::log(x)
    }

    #[inline(always)]
    pub(crate) fn exp(x: f64) -> f64 {
        libm::exp(x)
    }

    #[cfg(feature = "codec")]
    #[inline(always)]
    pub(crate) fn pow10(p: u32) -> f64 {
        libm::pow(10.0, f64::from(p))
    }
}

#[cfg(feature = "codec")]
pub(crate) use imp::pow10;
pub(crate) use imp::{exp, ln, round, sqrt};
