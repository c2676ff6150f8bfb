// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build a small index of lon/lat boxes, run a window query, then walk the
//! three nearest items from a point.

use thicket_rtree::{Aabb, DEFAULT_DEGREE, HilbertBuilder, planar_box_dist};

fn main() {
    // A handful of Phoenix-area parks as (name, lon/lat bounding box).
    let parks = [
        ("Encanto", Aabb::new(-112.0937, 33.4718, -112.0859, 33.4798)),
        ("Steele Indian School", Aabb::new(-112.0712, 33.4949, -112.0633, 33.4997)),
        ("Margaret T. Hance", Aabb::new(-112.0771, 33.4599, -112.0717, 33.4632)),
        ("Papago", Aabb::new(-111.9600, 33.4455, -111.9339, 33.4633)),
        ("South Mountain", Aabb::new(-112.1073, 33.3204, -112.0229, 33.3835)),
    ];

    let mut builder = HilbertBuilder::with_capacity(parks.len());
    for (i, (_, rect)) in parks.iter().enumerate() {
        builder.add(i as i64, *rect);
    }
    let tree = builder.finish(DEFAULT_DEGREE).expect("bulk build");

    println!("indexed {} parks", tree.count());

    // Everything intersecting a window over central Phoenix.
    let window = Aabb::new(-112.10, 33.45, -112.06, 33.50);
    tree.search(window, |item| {
        println!("in window: {}", parks[item as usize].0);
        true
    });

    // The three nearest parks to a downtown point, by box distance in
    // squared degrees.
    let (x, y) = (-112.0740, 33.4484);
    let mut remaining = 3;
    tree.neighbors(
        x,
        y,
        |item, dist| {
            println!("near: {} (d^2 = {dist:.6})", parks[item as usize].0);
            remaining -= 1;
            remaining > 0
        },
        planar_box_dist,
        None,
    );
}
