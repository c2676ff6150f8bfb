// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hilbert-packed bulk loading.
//!
//! Items are sorted by the Hilbert curve position of their box centroid and
//! packed bottom-up into full nodes. This is the fastest loader and the
//! curve ordering gives neighboring leaves neighboring storage, which is
//! what window queries want.

use alloc::vec::Vec;
use core::mem;

use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::math;
use crate::tree::Tree;
use crate::types::Aabb;

/// Side length of the Hilbert grid; centroids are scaled into
/// `[0, HILBERT_MAX]` per axis before encoding.
const HILBERT_MAX: f64 = ((1_u32 << 16) - 1) as f64;

/// Bulk loader that orders items along a Hilbert space-filling curve.
///
/// Every node except possibly the last of each level gets exactly `degree`
/// children.
///
/// # Example
///
/// ```rust
/// use thicket_rtree::{Aabb, HilbertBuilder, DEFAULT_DEGREE};
///
/// let mut builder = HilbertBuilder::new();
/// builder.add(7, Aabb::new(0.0, 0.0, 1.0, 1.0));
/// let tree = builder.finish(DEFAULT_DEGREE).unwrap();
/// assert_eq!(tree.count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct HilbertBuilder {
    count: usize,
    refs: Vec<i64>,
    boxes: Vec<f64>,
    bounds: Aabb,
    finished: bool,
}

impl Default for HilbertBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HilbertBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            count: 0,
            refs: Vec::new(),
            boxes: Vec::new(),
            bounds: Aabb::EMPTY,
            finished: false,
        }
    }

    /// Create an empty builder with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            count: 0,
            refs: Vec::with_capacity(capacity),
            boxes: Vec::with_capacity(capacity * 4),
            bounds: Aabb::EMPTY,
            finished: false,
        }
    }

    /// Record one item. See [`Builder::add`].
    pub fn add(&mut self, item: i64, aabb: Aabb) {
        self.count += 1;
        self.refs.push(item);
        self.boxes
            .extend_from_slice(&[aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y]);
        self.bounds = self.bounds.union(aabb);
    }

    /// Sort by centroid Hilbert value and pack into a [`Tree`]. See
    /// [`Builder::finish`].
    pub fn finish(&mut self, degree: usize) -> Result<Tree> {
        if degree < 2 {
            return Err(Error::InvalidDegree(degree));
        }
        if self.finished {
            return Err(Error::AlreadyFinished);
        }
        self.finished = true;

        if self.count == 0 {
            return Ok(Tree::default());
        }

        self.sort();
        self.pack(degree);

        Ok(Tree {
            count: self.count,
            refs: mem::take(&mut self.refs),
            boxes: mem::take(&mut self.boxes),
        })
    }

    /// Reorder items into ascending Hilbert order of their centroids.
    ///
    /// Centroids are scaled per axis into the 16-bit Hilbert grid; a zero
    /// extent collapses that axis to grid coordinate 0. Items with equal
    /// Hilbert value keep an unspecified relative order.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "scaled centroids land in [0, 65535] by construction"
    )]
    fn sort(&mut self) {
        let x_extent = self.bounds.max_x - self.bounds.min_x;
        let x_scale = if x_extent > 0.0 {
            HILBERT_MAX / x_extent
        } else {
            0.0
        };
        let y_extent = self.bounds.max_y - self.bounds.min_y;
        let y_scale = if y_extent > 0.0 {
            HILBERT_MAX / y_extent
        } else {
            0.0
        };

        let mut keyed: Vec<(u32, i64, [f64; 4])> = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let aabb = self.item_box(i);
            let (mid_x, mid_y) = aabb.centroid();
            let x = math::round(x_scale * (mid_x - self.bounds.min_x)) as u32;
            let y = math::round(y_scale * (mid_y - self.bounds.min_y)) as u32;
            keyed.push((
                hilbert_index(x, y),
                self.refs[i],
                [aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y],
            ));
        }

        keyed.sort_unstable_by_key(|&(value, _, _)| value);

        for (i, (_, item, coords)) in keyed.into_iter().enumerate() {
            self.refs[i] = item;
            self.boxes[i * 4..i * 4 + 4].copy_from_slice(&coords);
        }
    }

    /// Group consecutive nodes into chunks of `degree`, level by level, until
    /// a single root remains. Appends one interior box per chunk and the
    /// chunk end offsets to `refs` (leading with the leaf start offset 0).
    fn pack(&mut self, degree: usize) {
        let mut level_count = self.count;
        let mut num_nodes = self.count;
        let mut start = 0_usize;
        let mut end = self.boxes.len();

        self.refs.push(0);

        loop {
            while start < end {
                let mut node = Aabb::EMPTY;
                let mut fanout = 0;
                while fanout < degree && start < end {
                    node = node.union(Aabb::new(
                        self.boxes[start],
                        self.boxes[start + 1],
                        self.boxes[start + 2],
                        self.boxes[start + 3],
                    ));
                    start += 4;
                    fanout += 1;
                }
                self.refs.push(start as i64);
                self.boxes
                    .extend_from_slice(&[node.min_x, node.min_y, node.max_x, node.max_y]);
            }

            level_count = level_count.div_ceil(degree);
            num_nodes += level_count;
            end = num_nodes * 4;
            if level_count == 1 {
                break;
            }
        }
    }

    #[inline]
    fn item_box(&self, i: usize) -> Aabb {
        Aabb::new(
            self.boxes[i * 4],
            self.boxes[i * 4 + 1],
            self.boxes[i * 4 + 2],
            self.boxes[i * 4 + 3],
        )
    }
}

impl Builder for HilbertBuilder {
    fn add(&mut self, item: i64, aabb: Aabb) {
        Self::add(self, item, aabb);
    }

    fn finish(&mut self, degree: usize) -> Result<Tree> {
        Self::finish(self, degree)
    }
}

/// Map a point on the 16-bit grid to its 32-bit position along a Hilbert
/// curve of order 16.
///
/// Branch-free prefix-scan formulation, based on the public domain code at
/// <https://github.com/rawrunprotected/hilbert_curves>.
pub(crate) fn hilbert_index(x: u32, y: u32) -> u32 {
    debug_assert!(x <= 0xFFFF && y <= 0xFFFF, "inputs exceed the 16-bit grid");

    let a = x ^ y;
    let b = 0xFFFF ^ a;
    let c = 0xFFFF ^ (x | y);
    let d = x & (y ^ 0xFFFF);

    let mut aa = a | (b >> 1);
    let mut bb = (a >> 1) ^ a;
    let mut cc = ((c >> 1) ^ (b & (d >> 1))) ^ c;
    let mut dd = ((a & (c >> 1)) ^ (d >> 1)) ^ d;

    let (a, b, c, d) = (aa, bb, cc, dd);
    aa = (a & (a >> 2)) ^ (b & (b >> 2));
    bb = (a & (b >> 2)) ^ (b & ((a ^ b) >> 2));
    cc ^= (a & (c >> 2)) ^ (b & (d >> 2));
    dd ^= (b & (c >> 2)) ^ ((a ^ b) & (d >> 2));

    let (a, b, c, d) = (aa, bb, cc, dd);
    aa = (a & (a >> 4)) ^ (b & (b >> 4));
    bb = (a & (b >> 4)) ^ (b & ((a ^ b) >> 4));
    cc ^= (a & (c >> 4)) ^ (b & (d >> 4));
    dd ^= (b & (c >> 4)) ^ ((a ^ b) & (d >> 4));

    let (a, b, c, d) = (aa, bb, cc, dd);
    cc ^= (a & (c >> 8)) ^ (b & (d >> 8));
    dd ^= (b & (c >> 8)) ^ ((a ^ b) & (d >> 8));

    let a = cc ^ (cc >> 1);
    let b = dd ^ (dd >> 1);

    let i0 = x ^ y;
    let i1 = b | (0xFFFF ^ (i0 | a));

    (interleave(i1) << 1) | interleave(i0)
}

/// Spread the low 16 bits of `x` into the even bit positions.
#[inline]
fn interleave(mut x: u32) -> u32 {
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

#[cfg(test)]
mod tests {
    use super::{HilbertBuilder, hilbert_index};
    use crate::builder::DEFAULT_DEGREE;
    use crate::types::Aabb;

    #[test]
    fn hilbert_grid_corners() {
        assert_eq!(hilbert_index(0, 0), 0);
        assert_eq!(hilbert_index(0, 65535), 1431655765);
        assert_eq!(hilbert_index(65535, 0), 4294967295);
        assert_eq!(hilbert_index(65535, 65535), 2863311530);
    }

    #[test]
    fn hilbert_first_steps() {
        assert_eq!(hilbert_index(0, 0), 0);
        assert_eq!(hilbert_index(1, 0), 1);
        assert_eq!(hilbert_index(1, 1), 2);
        assert_eq!(hilbert_index(0, 1), 3);
        assert_eq!(hilbert_index(0, 2), 4);
        assert_eq!(hilbert_index(0, 3), 5);
        assert_eq!(hilbert_index(1, 3), 6);
        assert_eq!(hilbert_index(1, 2), 7);
    }

    #[test]
    fn hilbert_sample_points() {
        assert_eq!(hilbert_index(2971, 17497), 980776996);
        assert_eq!(hilbert_index(62026, 27915), 3277697163);
        assert_eq!(hilbert_index(13890, 60206), 1534664434);
        assert_eq!(hilbert_index(43827, 27885), 3525267956);
        assert_eq!(hilbert_index(2794, 32229), 1058908279);
        assert_eq!(hilbert_index(8443, 33752), 1141222447);
        assert_eq!(hilbert_index(13931, 24390), 876709497);
        assert_eq!(hilbert_index(63456, 10643), 4219223461);
        assert_eq!(hilbert_index(18084, 14710), 534213004);
        assert_eq!(hilbert_index(11890, 39641), 1194905159);
    }

    #[test]
    fn packs_full_fanout_except_last() {
        let mut builder = HilbertBuilder::new();
        for i in 0..23_i64 {
            let x = (i % 5) as f64;
            let y = (i / 5) as f64;
            builder.add(i, Aabb::new(x, y, x + 1.0, y + 1.0));
        }
        let tree = builder.finish(DEFAULT_DEGREE).unwrap();

        // 23 leaves -> 3 level-one nodes (10, 10, 3) -> 1 root.
        assert_eq!(tree.count(), 23);
        assert_eq!(tree.boxes.len() / 4, 23 + 3 + 1);
        assert_eq!(tree.refs.len(), 23 + 4 + 1);

        let first_level = &tree.refs[23..];
        assert_eq!(first_level[0], 0);
        assert_eq!(first_level[1], 40);
        assert_eq!(first_level[2], 80);
        assert_eq!(first_level[3], 92);
        // Root covers the three level-one nodes.
        assert_eq!(first_level[4], 104);
    }

    #[test]
    fn zero_extent_inputs_still_build() {
        // All centroids collapse to one grid cell; the sort must not care.
        let mut builder = HilbertBuilder::new();
        for i in 0..17_i64 {
            builder.add(i, Aabb::new(3.0, 4.0, 3.0, 4.0));
        }
        let tree = builder.finish(2).unwrap();
        assert_eq!(tree.count(), 17);

        let mut seen = 0;
        tree.search(Aabb::new(3.0, 4.0, 3.0, 4.0), |_| {
            seen += 1;
            true
        });
        assert_eq!(seen, 17);
    }
}
