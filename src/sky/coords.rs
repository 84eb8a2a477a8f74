use nalgebra::Point3;

/// Catalog angles use the physics convention with y up: `phi` is the polar
/// angle measured from +y, `theta` the azimuth around y measured from +z.
pub fn spherical_to_cartesian(distance: f32, phi: f32, theta: f32) -> Point3<f32> {
    let sin_phi = phi.sin();
    Point3::new(
        distance * sin_phi * theta.sin(),
        distance * phi.cos(),
        distance * sin_phi * theta.cos(),
    )
}

/// Inverse of `spherical_to_cartesian`. Returns `(distance, phi, theta)`.
pub fn cartesian_to_spherical(p: &Point3<f32>) -> (f32, f32, f32) {
    let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
    if r == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let phi = (p.y / r).clamp(-1.0, 1.0).acos();
    let theta = p.x.atan2(p.z);
    (r, phi, theta)
}

/// Drops the point onto the ecliptic plane. Anchor of the distance pole.
pub fn ground_projection(p: &Point3<f32>) -> Point3<f32> {
    Point3::new(p.x, 0.0, p.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn round_trips_through_cartesian() {
        let cases = [
            (1.0, 0.3, 0.7),
            (12.5, PI / 2.0, -2.1),
            (50.0, 2.9, 3.0),
            (0.01, 1.0, 0.0),
        ];
        for (r, phi, theta) in cases {
            let p = spherical_to_cartesian(r, phi, theta);
            let (r2, phi2, theta2) = cartesian_to_spherical(&p);
            assert_relative_eq!(r, r2, max_relative = 1e-5);
            assert_relative_eq!(phi, phi2, epsilon = 1e-5);
            assert_relative_eq!(theta, theta2, epsilon = 1e-5);
        }
    }

    #[test]
    fn zero_distance_is_origin() {
        let p = spherical_to_cartesian(0.0, 1.2, -0.4);
        assert_eq!(p, Point3::origin());
        assert_eq!(cartesian_to_spherical(&p), (0.0, 0.0, 0.0));
    }

    #[test]
    fn ground_projection_zeroes_y() {
        let p = spherical_to_cartesian(7.0, 0.4, 1.3);
        let g = ground_projection(&p);
        assert_eq!(g.y, 0.0);
        assert_eq!(g.x, p.x);
        assert_eq!(g.z, p.z);
    }

    #[test]
    fn polar_axis_maps_to_y() {
        let p = spherical_to_cartesian(5.0, 0.0, 1.0);
        assert_relative_eq!(p.y, 5.0, epsilon = 1e-6);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-6);
    }
}
