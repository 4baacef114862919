use planar_delaunay::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), DelaunayError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let points = vec![
        Point2::new(0.0, 0.0),
        Point2::new(4.0, 0.5),
        Point2::new(2.0, 3.0),
        Point2::new(-1.0, 2.5),
        Point2::new(1.5, 1.2),
        Point2::new(3.5, 2.8),
    ];

    let triangles = Triangulator::new(points).triangulate()?;

    for triangle in &triangles {
        let circle = triangle.circumcircle()?;
        let [a, b, c] = triangle.points();
        println!(
            "{a} {b} {c}  center {} radius {:.4}",
            circle.center, circle.radius
        );
    }

    Ok(())
}
