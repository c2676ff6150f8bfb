// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The loader seam shared by the two bulk loaders.

use crate::error::Result;
use crate::tree::Tree;
use crate::types::Aabb;

/// Default fanout handed to [`Builder::finish`] by callers without a tuned
/// value. Ten children per node is a reasonable middle ground between tree
/// depth and per-node scan cost for mixed query workloads.
pub const DEFAULT_DEGREE: usize = 10;

/// Bulk accumulation of items for one-shot tree construction.
///
/// Both loaders implement this trait so callers can pick a strategy at
/// runtime; they produce the identical flat layout and differ only in how
/// items are ordered and grouped into nodes.
///
/// A builder is single-owner scratch state. After a successful
/// [`finish`](Builder::finish) it is spent: further `finish` calls fail with
/// [`Error::AlreadyFinished`](crate::Error::AlreadyFinished). A *failed*
/// `finish` (for example with a degree below 2) leaves the builder untouched
/// and reusable.
pub trait Builder {
    /// Record one item: an opaque reference and its bounding box.
    ///
    /// References are not interpreted by the index; duplicates are fine.
    fn add(&mut self, item: i64, aabb: Aabb);

    /// Consume the accumulated items and produce an immutable [`Tree`] with
    /// at most `degree` children per node.
    ///
    /// A builder with no items yields the empty tree.
    fn finish(&mut self, degree: usize) -> Result<Tree>;
}

#[cfg(test)]
mod tests {
    use super::{Builder, DEFAULT_DEGREE};
    use crate::error::Error;
    use crate::hilbert::HilbertBuilder;
    use crate::omt::OmtBuilder;
    use crate::types::Aabb;
    use alloc::boxed::Box;
    use alloc::string::ToString;
    use alloc::vec;

    fn both() -> vec::Vec<(&'static str, Box<dyn Builder>)> {
        vec![
            ("hilbert", Box::new(HilbertBuilder::new()) as Box<dyn Builder>),
            ("omt", Box::new(OmtBuilder::new()) as Box<dyn Builder>),
        ]
    }

    #[test]
    fn invalid_degree_is_rejected() {
        for (name, mut builder) in both() {
            builder.add(0, Aabb::new(1.0, 1.0, 2.0, 2.0));
            for degree in [0, 1] {
                let err = builder.finish(degree).expect_err("degree below 2");
                assert_eq!(err, Error::InvalidDegree(degree), "{name}");
            }
        }
    }

    #[test]
    fn finish_twice_is_rejected_after_success() {
        for (name, mut builder) in both() {
            builder.add(0, Aabb::new(1.0, 1.0, 2.0, 2.0));

            // A failed finish does not spend the builder.
            assert!(builder.finish(0).is_err(), "{name}");

            let tree = builder.finish(DEFAULT_DEGREE).expect("first finish");
            assert_eq!(tree.count(), 1, "{name}");

            let err = builder.finish(DEFAULT_DEGREE).expect_err("second finish");
            assert!(err.to_string().contains("called more than once"), "{name}");
        }
    }

    #[test]
    fn finish_twice_is_rejected_even_when_empty() {
        for (name, mut builder) in both() {
            let tree = builder.finish(DEFAULT_DEGREE).expect("first finish");
            assert_eq!(tree.count(), 0, "{name}");
            let err = builder.finish(DEFAULT_DEGREE).expect_err("second finish");
            assert_eq!(err, Error::AlreadyFinished, "{name}");
        }
    }
}
