// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap-minimizing top-down bulk loading.
//!
//! Instead of a global curve sort, this loader recursively carves the item
//! range into vertical slices by `min_x` and each slice into runs by
//! `min_y`, using bucketed selection rather than full sorts. Node boxes at
//! every level overlap less than Hilbert packing's on clustered data, at the
//! cost of a somewhat slower build and non-uniform fanout.

use alloc::vec;
use alloc::vec::Vec;
use core::mem;

use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::select::partition_into_buckets;
use crate::tree::Tree;
use crate::types::Aabb;

/// Bulk loader using overlap-minimizing top-down (OMT) partitioning.
///
/// Produces the same flat layout as
/// [`HilbertBuilder`](crate::HilbertBuilder); only item order and node
/// grouping differ.
#[derive(Clone, Debug, Default)]
pub struct OmtBuilder {
    count: usize,
    refs: Vec<i64>,
    boxes: Vec<f64>,
    finished: bool,
}

impl OmtBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            count: 0,
            refs: Vec::with_capacity(capacity),
            boxes: Vec::with_capacity(capacity * 4),
            finished: false,
        }
    }

    /// Record one item. See [`Builder::add`].
    pub fn add(&mut self, item: i64, aabb: Aabb) {
        self.count += 1;
        self.refs.push(item);
        self.boxes
            .extend_from_slice(&[aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y]);
    }

    /// Partition top-down and pack into a [`Tree`]. See [`Builder::finish`].
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

        let height = tree_height(self.count, degree);
        let mut levels: Vec<Vec<(usize, Aabb)>> = vec![Vec::new(); height];
        build_level(
            &mut self.refs,
            &mut self.boxes,
            degree,
            0,
            self.count,
            height - 1,
            &mut levels,
        );

        // Pack: leaves first, then each interior level bottom-up. Every node
        // contributes its end offset into `boxes` (in doubles) and its box;
        // the leading 0 marks the start of the leaves.
        self.refs.push(0);
        let mut offset: i64 = 0;
        for level in &levels {
            for &(size, mbr) in level {
                offset += (4 * size) as i64;
                self.refs.push(offset);
                self.boxes
                    .extend_from_slice(&[mbr.min_x, mbr.min_y, mbr.max_x, mbr.max_y]);
            }
        }

        Ok(Tree {
            count: self.count,
            refs: mem::take(&mut self.refs),
            boxes: mem::take(&mut self.boxes),
        })
    }
}

impl Builder for OmtBuilder {
    fn add(&mut self, item: i64, aabb: Aabb) {
        Self::add(self, item, aabb);
    }

    fn finish(&mut self, degree: usize) -> Result<Tree> {
        Self::finish(self, degree)
    }
}

/// `max(1, ceil(log_degree(count)))`, by integer arithmetic.
fn tree_height(count: usize, degree: usize) -> usize {
    let mut height = 1;
    let mut capacity = degree;
    while capacity < count {
        capacity = capacity.saturating_mul(degree);
        height += 1;
    }
    height
}

/// Arrange `[start, end)` into the subtree rooted at `level`, recording one
/// `(child count, box)` entry per node into `levels`, and return the MBR
/// over the whole range.
///
/// `level` counts interior strata from the bottom: level 0 nodes sit
/// directly above the leaves.
fn build_level(
    refs: &mut [i64],
    boxes: &mut [f64],
    degree: usize,
    start: usize,
    end: usize,
    level: usize,
    levels: &mut [Vec<(usize, Aabb)>],
) -> Aabb {
    let n = end - start;
    #[allow(
        clippy::cast_possible_truncation,
        reason = "level is bounded by the tree height, far below u32::MAX"
    )]
    let child_count = n.div_ceil(degree.pow(level as u32));

    // Leaf stratum: every child would be a single item, so this node takes
    // the whole range directly.
    if n <= child_count {
        let mut mbr = Aabb::EMPTY;
        for i in start..end {
            mbr = mbr.union(item_box(boxes, i));
        }
        levels[level].push((n, mbr));
        return mbr;
    }

    let node_capacity = n.div_ceil(child_count);
    let slice_capacity = node_capacity * isqrt_ceil(child_count);

    // Carve x-slices, then y-runs within each slice, and recurse per run.
    partition_into_buckets(
        &mut refs[start..end],
        &mut boxes[start * 4..end * 4],
        0,
        slice_capacity,
    );

    let mut mbr = Aabb::EMPTY;
    let mut node_size = 0;
    let mut slice_start = start;
    while slice_start < end {
        let slice_end = (slice_start + slice_capacity).min(end);

        partition_into_buckets(
            &mut refs[slice_start..slice_end],
            &mut boxes[slice_start * 4..slice_end * 4],
            1,
            node_capacity,
        );

        let mut child_start = slice_start;
        while child_start < slice_end {
            let child_end = (child_start + node_capacity).min(end);
            let child = build_level(refs, boxes, degree, child_start, child_end, level - 1, levels);
            mbr = mbr.union(child);
            node_size += 1;
            child_start = child_end;
        }

        slice_start = slice_end;
    }

    levels[level].push((node_size, mbr));
    mbr
}

#[inline]
fn item_box(boxes: &[f64], i: usize) -> Aabb {
    Aabb::new(
        boxes[i * 4],
        boxes[i * 4 + 1],
        boxes[i * 4 + 2],
        boxes[i * 4 + 3],
    )
}

/// Returns the square root of the number, rounded up.
#[inline]
const fn isqrt_ceil(num: usize) -> usize {
    let s = num.isqrt();

    // This multiplication cannot overflow because `s` is the rounded-down
    // square root of `num`, i.e., `s * s` is guaranteed to be less than or
    // equal to `num`.
    if s * s < num { s + 1 } else { s }
}
