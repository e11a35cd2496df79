//! Gauss quadrature on the reference triangle and on edges
//!
//! Weights include the reference-element measure: the triangle weights of a
//! rule sum to 1/2 (the reference triangle area), so a physical integral is
//! `sum_q w_q f(x_q) * 2A`.

/// A quadrature point on the reference triangle
#[derive(Debug, Clone, Copy)]
pub struct QuadraturePoint {
    pub xi: f64,
    pub eta: f64,
    pub weight: f64,
}

/// Symmetric Gauss rules on the reference triangle
///
/// `order` is the highest polynomial degree integrated exactly.
pub fn triangle_rule(order: usize) -> Vec<QuadraturePoint> {
    match order {
        0 | 1 => vec![QuadraturePoint {
            xi: 1.0 / 3.0,
            eta: 1.0 / 3.0,
            weight: 0.5,
        }],
        2 => {
            // Three-point rule at edge midpoints
            let w = 1.0 / 6.0;
            vec![
                QuadraturePoint {
                    xi: 0.5,
                    eta: 0.0,
                    weight: w,
                },
                QuadraturePoint {
                    xi: 0.5,
                    eta: 0.5,
                    weight: w,
                },
                QuadraturePoint {
                    xi: 0.0,
                    eta: 0.5,
                    weight: w,
                },
            ]
        }
        _ => {
            // Four-point degree-3 rule (negative centroid weight)
            let w_interior = 25.0 / 96.0;
            vec![
                QuadraturePoint {
                    xi: 1.0 / 3.0,
                    eta: 1.0 / 3.0,
                    weight: -9.0 / 32.0,
                },
                QuadraturePoint {
                    xi: 0.6,
                    eta: 0.2,
                    weight: w_interior,
                },
                QuadraturePoint {
                    xi: 0.2,
                    eta: 0.6,
                    weight: w_interior,
                },
                QuadraturePoint {
                    xi: 0.2,
                    eta: 0.2,
                    weight: w_interior,
                },
            ]
        }
    }
}

/// Two-point Gauss rule on the reference edge t ∈ [-1, 1]
///
/// Returns (t, weight) pairs; a physical edge integral is
/// `sum_q w_q f(x(t_q)) * L/2` for edge length L.
pub fn edge_rule() -> [(f64, f64); 2] {
    let t = 1.0 / 3.0_f64.sqrt();
    [(-t, 1.0), (t, 1.0)]
}
