//! Derivative-free minimization.

/// Result of a minimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the simplex collapsed below the tolerance.
    pub converged: bool,
}

/// Settings for [`nelder_mead`].
#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    /// Offset of the initial simplex vertices along each axis.
    pub initial_step: f64,
    /// Stop when the spread of objective values drops below this.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            initial_step: 0.25,
            tolerance: 1e-10,
            max_iterations: 1_000,
        }
    }
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimize `objective` starting from `start` with the Nelder–Mead simplex method.
///
/// NaN objective values are treated as `+inf`, so the search walks away from
/// regions where the objective is undefined.
pub fn nelder_mead<F>(objective: F, start: &[f64], settings: NelderMead) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    let dims = start.len();
    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dims + 1);
    simplex.push((start.to_vec(), eval(start)));
    for axis in 0..dims {
        let mut vertex = start.to_vec();
        vertex[axis] += settings.initial_step;
        let value = eval(vertex.as_slice());
        simplex.push((vertex, value));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < settings.max_iterations {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let best = simplex[0].1;
        let worst = simplex[dims].1;
        if (worst - best).abs() <= settings.tolerance {
            converged = true;
            break;
        }
        iterations += 1;

        let centroid: Vec<f64> = (0..dims)
            .map(|i| simplex[..dims].iter().map(|(x, _)| x[i]).sum::<f64>() / dims as f64)
            .collect();
        let toward = |from: &[f64], coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(from)
                .map(|(c, x)| c + coef * (x - c))
                .collect()
        };

        let reflected = toward(simplex[dims].0.as_slice(), -REFLECT);
        let reflected_value = eval(reflected.as_slice());
        let second_worst = simplex[dims - 1].1;

        if reflected_value < best {
            let expanded = toward(reflected.as_slice(), EXPAND);
            let expanded_value = eval(expanded.as_slice());
            simplex[dims] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < second_worst {
            simplex[dims] = (reflected, reflected_value);
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < worst {
            let point = toward(reflected.as_slice(), CONTRACT);
            let value = eval(point.as_slice());
            (point, value)
        } else {
            let point = toward(simplex[dims].0.as_slice(), CONTRACT);
            let value = eval(point.as_slice());
            (point, value)
        };

        if contracted_value < reflected_value.min(worst) {
            simplex[dims] = (contracted, contracted_value);
            continue;
        }

        let anchor = simplex[0].0.clone();
        for (vertex, value) in simplex.iter_mut().skip(1) {
            for (x, a) in vertex.iter_mut().zip(&anchor) {
                *x = a + SHRINK * (*x - a);
            }
            *value = eval(vertex.as_slice());
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (point, value) = simplex.swap_remove(0);

    Minimum {
        point,
        value,
        iterations,
        converged,
    }
}
