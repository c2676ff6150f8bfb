// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=thicket_rtree --heading-base-level=0

//! Thicket R-tree: a bulk-loaded, flat 2D R-tree.
//!
//! Thicket R-tree is a reusable building block for spatial search over static
//! rectangle sets: geographic features, map tiles, glyph boxes, collision
//! proxies, or anything else with an axis-aligned bounding box and a 64-bit
//! reference.
//!
//! - Bulk-load once with one of two loaders (Hilbert-packed or
//!   overlap-minimizing top-down), then query without further allocation in
//!   the tree itself.
//! - Window search visits every item whose box intersects a query rectangle.
//! - [`Tree::neighbors`] walks items in ascending distance from a point with
//!   a pluggable point-to-rectangle metric and optional per-item refinement.
//! - The built tree is two dense arrays plus a count. It has no pointers, is
//!   freely shareable across threads for reads, and (with the `codec`
//!   feature) round-trips through a compact fixed-point wire format.
//!
//! There is no insert, update, or remove on a built tree. If your workload is
//! update-heavy you want a dynamic index instead; this crate trades all
//! mutability for build speed, memory density, and query locality.
//!
//! # Example
//!
//! ```rust
//! use thicket_rtree::{Aabb, HilbertBuilder, DEFAULT_DEGREE};
//!
//! let mut builder = HilbertBuilder::new();
//! builder.add(10, Aabb::new(0.0, 0.0, 10.0, 10.0));
//! builder.add(11, Aabb::new(20.0, 20.0, 30.0, 30.0));
//! builder.add(12, Aabb::new(5.0, 5.0, 25.0, 25.0));
//! let tree = builder.finish(DEFAULT_DEGREE).unwrap();
//!
//! // Collect everything touching a window. Returning `true` keeps going.
//! let mut hits = Vec::new();
//! tree.search(Aabb::new(8.0, 8.0, 12.0, 12.0), |item| {
//!     hits.push(item);
//!     true
//! });
//! hits.sort_unstable();
//! assert_eq!(hits, vec![10, 12]);
//!
//! // Walk items nearest-first from a point; stop after the closest one.
//! let mut nearest = None;
//! tree.neighbors(
//!     26.0, 26.0,
//!     |item, _dist| {
//!         nearest = Some(item);
//!         false
//!     },
//!     thicket_rtree::planar_box_dist,
//!     None,
//! );
//! assert_eq!(nearest, Some(11));
//! ```
//!
//! # Choosing a loader
//!
//! - [`HilbertBuilder`]: sorts items along a Hilbert space-filling curve and
//!   packs fixed-fanout nodes bottom-up. Fastest build, good locality on
//!   evenly spread data.
//! - [`OmtBuilder`]: recursive top-down tile partitioning via linear-time
//!   selection. Slightly slower build, less node overlap on clustered data.
//!
//! Both produce the identical tree layout; queries do not care which loader
//! ran.
//!
//! # Features
//!
//! - `std` (default): floating-point math from the standard library.
//! - `libm`: floating-point math from [`libm`] for `no_std` + `alloc` builds;
//!   typically used when integrating into embedded or `no_std` environments.
//! - `codec` (default): the [`serialize`]/[`deserialize`] wire codec and its
//!   `bytes` dependency.
//!
//! ## Float semantics
//!
//! This crate assumes no NaNs in coordinates. Debug builds may assert.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("thicket_rtree requires either the `std` or the `libm` feature");

mod builder;
mod dist;
mod error;
mod hilbert;
pub(crate) mod math;
mod omt;
pub(crate) mod select;
mod tree;
mod types;
#[cfg(feature = "codec")]
mod wire;

pub use builder::{Builder, DEFAULT_DEGREE};
pub use dist::planar_box_dist;
pub use error::{Error, Result};
pub use hilbert::HilbertBuilder;
pub use omt::OmtBuilder;
pub use tree::Tree;
pub use types::Aabb;
#[cfg(feature = "codec")]
pub use wire::{deserialize, serialize};

#[cfg(test)]
pub(crate) mod test_support;
