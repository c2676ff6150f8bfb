// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for unit tests: deterministic random item sets built into
//! trees by both loaders at a couple of fanouts.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::builder::{Builder, DEFAULT_DEGREE};
use crate::hilbert::HilbertBuilder;
use crate::omt::OmtBuilder;
use crate::tree::Tree;
use crate::types::Aabb;

pub(crate) struct Fixture {
    pub(crate) name: String,
    pub(crate) items: Vec<Aabb>,
    pub(crate) tree: Tree,
}

/// Deterministic boxes spread over a world roughly the size of lon/lat
/// space, with small non-uniform extents.
pub(crate) fn random_boxes(n: usize, seed: u64) -> Vec<Aabb> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let min_x: f64 = rng.gen_range(-180.0..180.0);
            let min_y: f64 = rng.gen_range(-90.0..90.0);
            let w: f64 = rng.gen_range(0.0..5.0);
            let h: f64 = rng.gen_range(0.0..5.0);
            Aabb::new(min_x, min_y, min_x + w, min_y + h)
        })
        .collect()
}

/// Degenerate boxes: pure points.
pub(crate) fn random_points(n: usize, seed: u64) -> Vec<Aabb> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x: f64 = rng.gen_range(-180.0..180.0);
            let y: f64 = rng.gen_range(-90.0..90.0);
            Aabb::new(x, y, x, y)
        })
        .collect()
}

pub(crate) fn build(items: &[Aabb], builder: &mut dyn Builder, degree: usize) -> Tree {
    for (i, aabb) in items.iter().enumerate() {
        builder.add(i as i64, *aabb);
    }
    builder.finish(degree).expect("fixture build should succeed")
}

/// Both loaders over several sizes and fanouts, including single-item and
/// deeper-than-one-level trees plus a pure-point set.
pub(crate) fn fixtures() -> Vec<Fixture> {
    let sets: Vec<(&str, Vec<Aabb>)> = alloc::vec![
        ("boxes-1", random_boxes(1, 7)),
        ("boxes-2", random_boxes(2, 11)),
        ("boxes-10", random_boxes(10, 13)),
        ("boxes-100", random_boxes(100, 17)),
        ("boxes-1000", random_boxes(1000, 19)),
        ("points-60", random_points(60, 23)),
    ];

    let mut out = Vec::new();
    for (set_name, items) in sets {
        for degree in [2, DEFAULT_DEGREE] {
            out.push(Fixture {
                name: format!("hilbert/{set_name}/degree-{degree}"),
                items: items.clone(),
                tree: build(&items, &mut HilbertBuilder::new(), degree),
            });
            out.push(Fixture {
                name: format!("omt/{set_name}/degree-{degree}"),
                items: items.clone(),
                tree: build(&items, &mut OmtBuilder::new(), degree),
            });
        }
    }
    out
}
