use std::{hint::black_box, time::Instant};

use clap::{Parser, ValueEnum};
use rand::{rng, Rng};
use sahbvh::{
    bvh::{BuildOptions, Bvh, SplitStrategy},
    ray::Ray,
    shapes::Triangle,
    Point3, Real, Vector3,
};

#[derive(Copy, Clone, ValueEnum)]
enum Strategy {
    Sah,
    Midpoint,
}

impl From<Strategy> for SplitStrategy {
    fn from(strategy: Strategy) -> SplitStrategy {
        match strategy {
            Strategy::Sah => SplitStrategy::Sah,
            Strategy::Midpoint => SplitStrategy::Midpoint,
        }
    }
}

/// Measures how much faster nearest-hit queries through a BVH are than testing every
/// triangle, including the time to build the tree. Prints the median speedup.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(long)]
    rays: usize,
    #[arg(long)]
    triangles: usize,
    #[arg(long)]
    samples: usize,
    #[arg(long, value_enum, default_value_t = Strategy::Sah)]
    strategy: Strategy,
}

fn random_vector(rng: &mut impl Rng, extent: Real) -> Vector3 {
    Vector3::new(
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
    )
}

fn main() {
    let cli = Cli::parse();
    let mut rng = rng();
    let options = BuildOptions::default().with_strategy(cli.strategy.into());

    let mut samples = Vec::new();
    let mut rays = Vec::new();
    let mut triangles = Vec::new();

    for i in 0..cli.samples {
        rays.clear();
        triangles.clear();

        for _ in 0..cli.rays {
            let origin = Point3::from(random_vector(&mut rng, 1.0));
            rays.push(Ray::new(origin, random_vector(&mut rng, 1.0)));
        }

        for _ in 0..cli.triangles {
            let center = Point3::from(random_vector(&mut rng, 1000.0));
            triangles.push(Triangle::new(
                center + random_vector(&mut rng, 1.0),
                center + random_vector(&mut rng, 1.0),
                center + random_vector(&mut rng, 1.0),
            ));
        }

        let mut brute_force_duration = f64::NAN;
        let mut bvh_duration = f64::NAN;

        let mut measure_brute_force = |triangles: &[Triangle]| {
            let start_brute_force = Instant::now();
            for ray in &rays {
                let mut t = Real::INFINITY;
                for triangle in black_box(triangles) {
                    ray.intersects_triangle(&triangle.a, &triangle.b, &triangle.c, Some(&mut t));
                }
                black_box(t);
            }
            brute_force_duration = start_brute_force.elapsed().as_secs_f64();
        };

        let mut measure_bvh = |triangles: &[Triangle]| {
            let start_bvh = Instant::now();
            let bvh = Bvh::build_with(black_box(triangles), options);
            for ray in &rays {
                black_box(bvh.closest_hit(black_box(ray)));
            }
            bvh_duration = start_bvh.elapsed().as_secs_f64();
        };

        // Flip order to minimize bias due to caching.
        if i % 2 == 0 {
            measure_bvh(&triangles);
            measure_brute_force(&triangles);
        } else {
            measure_brute_force(&triangles);
            measure_bvh(&triangles);
        }

        samples.push(brute_force_duration / bvh_duration);
    }

    if samples.is_empty() {
        return;
    }
    samples.sort_by(|a, b| a.total_cmp(b));

    // Median.
    println!("{}", samples[samples.len() / 2]);
}
