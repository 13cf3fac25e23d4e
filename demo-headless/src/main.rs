use clap::Parser;
use nalgebra::{Rotation3, Translation3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxel_wind_core::{
    GlobalWindEmitter, GridConfig, LocalWindEmitter, LocalWindKind, ObstacleId, SourceAggregator, SphereObstacle,
    TickOutcome, Vec3, VoxelWindZone,
};

/// Voxel wind field demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "voxel-wind-demo")]
#[command(about = "Headless voxel wind field simulation", long_about = None)]
struct Args {
    /// Grid extent along x, y and z in meters
    #[arg(long, num_args = 3, default_values_t = [32.0, 8.0, 32.0])]
    extent: Vec<f32>,

    /// Cell edge length in meters
    #[arg(short, long, default_value_t = 1.0)]
    edge: f32,

    /// Grid rotation about the vertical axis in degrees
    #[arg(long, default_value_t = 0.0)]
    yaw: f32,

    /// Number of simulation steps
    #[arg(short, long, default_value_t = 120)]
    steps: u32,

    /// Time step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Global wind strength
    #[arg(short, long, default_value_t = 1.0)]
    wind: f32,

    /// Wind heading in degrees around the vertical axis (0 = +x)
    #[arg(long, default_value_t = 0.0)]
    heading: f32,

    /// Add a turbulent gust layer on top of the directional wind
    #[arg(short, long)]
    turbulent: bool,

    /// Add a vortex at the grid centre
    #[arg(long)]
    vortex: bool,

    /// Number of moving spherical obstacles
    #[arg(short, long, default_value_t = 3)]
    obstacles: u32,

    /// Seed for obstacle placement
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Print field statistics every N steps
    #[arg(short, long, default_value_t = 20)]
    report_interval: u32,
}

/// Obstacle that orbits its anchor point.
struct Orbiter {
    id: ObstacleId,
    anchor: Vec3,
    radius: f32,
    angular_speed: f32,
    phase: f32,
}

impl Orbiter {
    fn position(&self, time: f32) -> Vec3 {
        let angle = self.phase + self.angular_speed * time;
        self.anchor + Vec3::new(angle.cos(), 0.0, angle.sin()) * self.radius
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    println!("=== Voxel Wind Demo ===\n");

    let extent = Vec3::new(args.extent[0], args.extent[1], args.extent[2]);
    let transform = Translation3::new(0.0, extent.y * 0.5, 0.0).to_homogeneous()
        * Rotation3::from_axis_angle(&Vec3::y_axis(), args.yaw.to_radians()).to_homogeneous();
    let config = GridConfig::new(args.edge, extent).with_transform(transform);

    let density = match config.validate() {
        Ok(validated) => validated.density,
        Err(err) => {
            eprintln!("Invalid grid: {err}");
            std::process::exit(1);
        }
    };
    println!(
        "Grid: {}x{}x{} cells ({} total), edge {:.2}m, yaw {:.0} deg",
        density.x,
        density.y,
        density.z,
        density.count(),
        args.edge,
        args.yaw
    );

    let mut zone = VoxelWindZone::new(config);
    let mut sources = SourceAggregator::new();

    let heading = args.heading.to_radians();
    let forward = Vec3::new(heading.cos(), 0.0, heading.sin());
    sources.add_global(GlobalWindEmitter::directional(forward, args.wind, 1.0));
    if args.turbulent {
        sources.add_global(GlobalWindEmitter::turbulent(forward, args.wind * 0.5, 2.0, 0.15));
    }
    if args.vortex {
        let centre = Vec3::new(0.0, extent.y * 0.5, 0.0);
        sources.add_local(LocalWindEmitter::new(
            LocalWindKind::Vortex,
            centre,
            Vec3::y(),
            args.wind * 2.0,
            extent.x.min(extent.z) * 0.25,
        ));
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let orbiters: Vec<Orbiter> = (0..args.obstacles)
        .map(|_| {
            let anchor = Vec3::new(
                rng.random_range(-0.3..=0.3) * extent.x,
                rng.random_range(0.2..=0.8) * extent.y,
                rng.random_range(-0.3..=0.3) * extent.z,
            );
            let orbit_radius = rng.random_range(1.0..=4.0);
            let phase = rng.random_range(0.0..std::f32::consts::TAU);
            let mut obstacle = SphereObstacle::new(anchor, rng.random_range(0.5..=1.5));
            obstacle.push_strength = 0.1;
            let id = sources.add_obstacle(obstacle);
            Orbiter {
                id,
                anchor,
                radius: orbit_radius,
                angular_speed: rng.random_range(0.5..=2.0),
                phase,
            }
        })
        .collect();

    let (globals, locals, obstacles) = sources.len();
    println!("Sources: {globals} global, {locals} local, {obstacles} obstacles\n");

    println!("  Step |   Time(s) | Active | Max speed | Mean speed | Tick(ms)");
    println!("-------|-----------|--------|-----------|------------|---------");

    let report_interval = args.report_interval.max(1);
    let mut time = 0.0_f32;
    for step in 0..args.steps {
        for orbiter in &orbiters {
            if let Some(obstacle) = sources.obstacle_mut(orbiter.id) {
                obstacle.set_position(orbiter.position(time));
            }
        }

        let snapshot = sources.snapshot(args.dt);
        match zone.tick(&snapshot, time, args.dt) {
            Ok(TickOutcome::Rebuilt) => info!("Grid built at step {}", step),
            Ok(TickOutcome::Updated) => {}
            Err(err) => {
                eprintln!("Tick failed: {err}");
                std::process::exit(1);
            }
        }
        time += args.dt;

        if step % report_interval == 0 || step + 1 == args.steps {
            let stats = zone.stats();
            println!(
                "{:6} | {:9.3} | {:6} | {:9.3} | {:10.3} | {:8.3}",
                step,
                time,
                stats.active_cells,
                stats.max_speed,
                stats.mean_speed,
                zone.frame_timer().last_frame_time_ms()
            );
        }
    }

    println!("\n=== Simulation Complete ===");
    println!("Updater: {}", zone.updater_name());
    println!("Average tick: {:.3} ms", zone.frame_timer().average_frame_time_ms());

    let probe = Vec3::new(0.0, extent.y * 0.5, 0.0);
    let wind = zone.sample(&probe);
    println!(
        "Wind at grid centre: ({:.3}, {:.3}, {:.3}), {:.3} m/s",
        wind.x,
        wind.y,
        wind.z,
        wind.norm()
    );
}
