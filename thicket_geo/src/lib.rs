// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=thicket_geo --heading-base-level=0

//! Thicket Geo: geodetic point-to-rectangle distance.
//!
//! [`geodetic_box_dist`] measures the great-circle distance in meters from a
//! longitude/latitude point to a box whose coordinates are degrees of
//! longitude (x) and latitude (y). It satisfies the lower-bound contract of
//! [`thicket_rtree::Tree::neighbors`]: the distance to a box never exceeds
//! the distance to anything inside it, so nearest-first traversal stays
//! correct on geographic data.
//!
//! The implementation is the case analysis of Schubert, Zimek & Kriegel,
//! "Geodetic Distance Queries on R-Trees for Indexing Geographic Data"
//! (SSTD 2013): the point lands in one of nine regions around the box
//! (inside, north, south, east, west, or one of the four corners); sides
//! aligned with meridians use a cross-track simplification, everything else
//! reduces to haversine against the nearest box corner or edge point.
//!
//! [`geodetic_point_dist`] exposes the haversine kernel for per-item
//! refinement (`item_dist`) when leaf boxes are points.
//!
//! # Example
//!
//! ```rust
//! use thicket_rtree::{Aabb, HilbertBuilder, DEFAULT_DEGREE};
//! use thicket_geo::geodetic_box_dist;
//!
//! let mut builder = HilbertBuilder::new();
//! // Phoenix city hall and a nearby park, as lon/lat boxes.
//! builder.add(0, Aabb::new(-112.0983, 33.4479, -112.0953, 33.4503));
//! builder.add(1, Aabb::new(-112.0770, 33.4635, -112.0720, 33.4675));
//! let tree = builder.finish(DEFAULT_DEGREE).unwrap();
//!
//! let mut order = Vec::new();
//! tree.neighbors(
//!     -112.0740, 33.4650,
//!     |item, _meters| {
//!         order.push(item);
//!         true
//!     },
//!     geodetic_box_dist,
//!     None,
//! );
//! assert_eq!(order, vec![1, 0]);
//! ```
//!
//! # Features
//!
//! - `std` (default): floating-point math from the standard library.
//! - `libm`: floating-point math from [`libm`] for `no_std` + `alloc`
//!   builds.
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("thicket_geo requires either the `std` or the `libm` feature");

use core::f64::consts::PI;

use thicket_rtree::Aabb;

mod math;

/// Mean Earth radius (IUGG R1), meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

const DEG_TO_RAD: f64 = PI / 180.0;
const HALF_PI: f64 = PI / 2.0;
const TWO_PI: f64 = 2.0 * PI;

/// Great-circle distance in meters from a point to a rectangle, both in
/// degrees with longitude as x and latitude as y.
///
/// Returns zero for points inside the box. Usable directly as the
/// `box_dist` argument of [`thicket_rtree::Tree::neighbors`]; pair it with
/// an `item_dist` in the same units (meters), such as one built on
/// [`geodetic_point_dist`].
pub fn geodetic_box_dist(p_lon: f64, p_lat: f64, rect: Aabb) -> f64 {
    EARTH_RADIUS_METERS
        * point_rect_dist_rad(
            p_lat * DEG_TO_RAD,
            p_lon * DEG_TO_RAD,
            rect.min_y * DEG_TO_RAD,
            rect.min_x * DEG_TO_RAD,
            rect.max_y * DEG_TO_RAD,
            rect.max_x * DEG_TO_RAD,
        )
}

/// Great-circle distance in meters between two lon/lat points, by the
/// haversine formula on the mean Earth radius.
pub fn geodetic_point_dist(a_lon: f64, a_lat: f64, b_lon: f64, b_lat: f64) -> f64 {
    EARTH_RADIUS_METERS
        * haversine_rad(
            a_lat * DEG_TO_RAD,
            a_lon * DEG_TO_RAD,
            b_lat * DEG_TO_RAD,
            b_lon * DEG_TO_RAD,
        )
}

/// Point-to-rectangle distance on the unit sphere, all inputs in radians.
fn point_rect_dist_rad(
    lat_q: f64,
    lon_q: f64,
    lat_lo: f64,
    lon_lo: f64,
    lat_hi: f64,
    lon_hi: f64,
) -> f64 {
    // Degenerate rect: a point (or inverted box treated as one).
    if lat_lo >= lat_hi && lon_lo >= lon_hi {
        return haversine_rad(lat_lo, lon_lo, lat_q, lon_q);
    }

    if lon_lo <= lon_q && lon_q <= lon_hi {
        // Between the bounding meridians: north, south, or inside. The
        // shortest path follows the query's own meridian, so the central
        // angle is just the latitude difference.
        if lat_lo <= lat_q && lat_q <= lat_hi {
            return 0.0;
        }
        if lat_q < lat_lo {
            return lat_lo - lat_q;
        }
        return lat_q - lat_hi;
    }

    // Pick the closer of the east/west edges, measuring longitudes around
    // the antimeridian.
    let mut d_lon_east = lon_lo - lon_q;
    if d_lon_east < 0.0 {
        d_lon_east += TWO_PI;
    }
    let mut d_lon_west = lon_q - lon_hi;
    if d_lon_west < 0.0 {
        d_lon_west += TWO_PI;
    }
    let (d_lon, lon_edge) = if d_lon_east <= d_lon_west {
        (d_lon_east, lon_lo)
    } else {
        (d_lon_west, lon_hi)
    };

    let (sin_d_lon, cos_d_lon) = math::sin_cos(d_lon);
    let tan_q = math::tan(lat_q);

    if d_lon >= HALF_PI {
        // More than a quarter turn away: one of the corners is closest.
        // Compare against the box's center line to pick north or south.
        let lat_mid = (lat_hi + lat_lo) / 2.0;
        if tan_q >= math::tan(lat_mid) * cos_d_lon {
            return haversine_rad(lat_q, lon_q, lat_hi, lon_edge);
        }
        return haversine_rad(lat_q, lon_q, lat_lo, lon_edge);
    }

    if tan_q >= math::tan(lat_hi) * cos_d_lon {
        return haversine_rad(lat_q, lon_q, lat_hi, lon_edge);
    }
    if tan_q <= math::tan(lat_lo) * cos_d_lon {
        return haversine_rad(lat_q, lon_q, lat_lo, lon_edge);
    }

    // Due east or west of the rect. Cross-track distance to the edge
    // meridian; the general formula simplifies because the track is a
    // meridian.
    math::asin(math::cos(lat_q) * sin_d_lon)
}

/// Central angle between two points on the unit sphere, haversine formula,
/// inputs in radians.
fn haversine_rad(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    if lat_a == lat_b && lon_a == lon_b {
        return 0.0;
    }

    let sin_half_lat = math::sin((lat_a - lat_b) / 2.0);
    let sin_half_lon = math::sin((lon_a - lon_b) / 2.0);

    2.0 * math::asin(math::sqrt(
        sin_half_lat * sin_half_lat
            + sin_half_lon * sin_half_lon * math::cos(lat_a) * math::cos(lat_b),
    ))
}
