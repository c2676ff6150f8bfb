// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bucketed selection over parallel ref/box arrays.
//!
//! [`partition_into_buckets`] rearranges items so that every consecutive run
//! of `bucket` items could appear in a full sort at exactly that run: each
//! bucket's keys are all `<=` the next bucket's keys, while the order inside
//! a bucket stays arbitrary. That is all the OMT loader needs from its x/y
//! slicing passes, and it is linear time where a sort would be `n log n`.
//!
//! The key of item `i` is `boxes[4 * i + axis]`, and every swap moves the
//! ref and the whole box quadruple together. Coordinates are assumed finite.

use alloc::vec;

use crate::math;

/// Floyd-Rivest kicks in its sampling refinement above this many elements;
/// below it, plain quickselect partitioning wins.
const SAMPLING_THRESHOLD: usize = 600;

/// Partition `refs`/`boxes` into key-ordered buckets of `bucket` items (the
/// final bucket may be short).
pub(crate) fn partition_into_buckets(
    refs: &mut [i64],
    boxes: &mut [f64],
    axis: usize,
    bucket: usize,
) {
    debug_assert_eq!(boxes.len(), refs.len() * 4);
    debug_assert!(bucket > 0, "bucket capacity must be positive");

    let len = refs.len();
    if len < 2 {
        return;
    }

    let mut items = Items { refs, boxes, axis };

    // Split ranges at bucket-aligned midpoints until every range spans a
    // single bucket. Each split is one selection of the midpoint element.
    let mut pending = vec![(0_usize, len - 1)];
    while let Some((left, right)) = pending.pop() {
        if right - left <= bucket {
            continue;
        }
        let mid = left + (right - left).div_ceil(2 * bucket) * bucket;
        floyd_rivest_select(&mut items, mid, left, right);
        pending.push((left, mid));
        pending.push((mid, right));
    }
}

/// Move the `k`-th smallest key (within `[left, right]`, inclusive) to
/// position `k`, with smaller keys left of it and larger keys right of it.
///
/// Classic Floyd-Rivest SELECT: for large ranges, first recurse on a sampled
/// subrange sized so that the `k`-th element lands inside it with high
/// probability, then partition around its key.
fn floyd_rivest_select(items: &mut Items<'_>, k: usize, mut left: usize, mut right: usize) {
    while right > left {
        if right - left > SAMPLING_THRESHOLD {
            let n = (right - left + 1) as f64;
            let i = (k - left + 1) as f64;
            let z = math::ln(n);
            let s = 0.5 * math::exp(2.0 * z / 3.0);
            let sign = if i < n / 2.0 { -1.0 } else { 1.0 };
            let sd = 0.5 * math::sqrt(z * s * (n - s) / n) * sign;
            let kf = k as f64;
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "negative estimates saturate to zero and are clamped to the range"
            )]
            let new_left = left.max((kf - i * s / n + sd) as usize);
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "oversized estimates are clamped to the range"
            )]
            let new_right = right.min((kf + (n - i) * s / n + sd) as usize);
            floyd_rivest_select(items, k, new_left, new_right);
        }

        let t = items.key(k);
        let mut i = left;
        let mut j = right;

        items.swap(left, k);
        if items.key(right) > t {
            items.swap(left, right);
        }

        while i < j {
            items.swap(i, j);
            i += 1;
            j -= 1;
            while items.key(i) < t {
                i += 1;
            }
            while items.key(j) > t {
                j -= 1;
            }
        }

        if items.key(left) == t {
            items.swap(left, j);
        } else {
            j += 1;
            items.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            if j == 0 {
                break;
            }
            right = j - 1;
        }
    }
}

/// View over the parallel arrays that keeps refs and box quadruples moving
/// in lockstep.
struct Items<'a> {
    refs: &'a mut [i64],
    boxes: &'a mut [f64],
    axis: usize,
}

impl Items<'_> {
    #[inline]
    fn key(&self, i: usize) -> f64 {
        self.boxes[i * 4 + self.axis]
    }

    #[inline]
    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.refs.swap(i, j);
        for c in 0..4 {
            self.boxes.swap(i * 4 + c, j * 4 + c);
        }
    }
}
