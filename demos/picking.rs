//! Builds a BVH over a small triangulated terrain, renders it as ASCII art by casting
//! one ray per character, and picks the triangle under the center of the view.
//!
//! Run with `cargo run --example picking`. Build statistics are logged at debug level.

use sahbvh::bvh::{BuildOptions, Bvh, SplitStrategy};
use sahbvh::ray::Ray;
use sahbvh::shapes::Triangle;
use sahbvh::{Point3, Real, Vector3};

const GRID: usize = 24;
const WIDTH: usize = 64;
const HEIGHT: usize = 28;

fn height(x: Real, z: Real) -> Real {
    (x * 0.35).sin() * (z * 0.25).cos() * 2.0
}

/// Two triangles per grid cell of a height field centered on the origin.
fn terrain() -> Vec<Triangle> {
    let offset = GRID as Real / 2.0;
    let vertex = |i: usize, j: usize| {
        let x = i as Real - offset;
        let z = j as Real - offset;
        Point3::new(x, height(x, z), z)
    };

    let mut triangles = Vec::with_capacity(GRID * GRID * 2);
    for i in 0..GRID {
        for j in 0..GRID {
            let (a, b, c, d) = (vertex(i, j), vertex(i + 1, j), vertex(i + 1, j + 1), vertex(i, j + 1));
            triangles.push(Triangle::new(a, b, c));
            triangles.push(Triangle::new(c, d, a));
        }
    }
    triangles
}

/// A pinhole camera at `eye` looking at the origin.
fn camera_ray(eye: Point3, column: usize, row: usize) -> Ray {
    let forward = (Point3::origin() - eye).normalize();
    let right = forward.cross(&Vector3::y()).normalize();
    let up = right.cross(&forward);

    // Characters are about twice as tall as they are wide.
    let u = (column as Real + 0.5) / WIDTH as Real - 0.5;
    let v = 0.5 - (row as Real + 0.5) / HEIGHT as Real;
    Ray::new(eye, forward + right * u * 1.2 + up * v * 1.0)
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let triangles = terrain();
    let bvh = Bvh::build_with(
        &triangles,
        BuildOptions::default().with_strategy(SplitStrategy::Sah),
    );
    bvh.assert_consistent();
    println!(
        "{} triangles, {} nodes, {} leaves, depth {}",
        triangles.len(),
        bvh.nodes().len(),
        bvh.leaf_count(),
        bvh.depth()
    );

    let eye = Point3::new(0.0, 14.0, -22.0);
    let shades = [b'@', b'#', b'*', b'+', b'=', b'-', b':', b'.'];
    for row in 0..HEIGHT {
        let line: String = (0..WIDTH)
            .map(|column| {
                let ray = camera_ray(eye, column, row);
                match bvh.closest_hit(&ray) {
                    Some(hit) => {
                        let point = ray.at(hit.distance);
                        let level = ((point.y + 2.0) / 4.0 * shades.len() as Real) as usize;
                        shades[level.min(shades.len() - 1)] as char
                    }
                    None => ' ',
                }
            })
            .collect();
        println!("{}", line);
    }

    let center = camera_ray(eye, WIDTH / 2, HEIGHT / 2);
    match bvh.closest_hit(&center) {
        Some(hit) => {
            let triangle = &triangles[hit.primitive_index];
            println!(
                "picked triangle {} at distance {:.3}, centroid {:.2}",
                hit.primitive_index,
                hit.distance,
                triangle.centroid()
            );
        }
        None => println!("nothing under the cursor"),
    }
}
