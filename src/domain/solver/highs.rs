//! HiGHS solver implementation via good_lp.
//!
//! HiGHS is a high-performance open-source linear programming solver.
//! This implementation wraps it using the good_lp crate for ergonomic
//! Rust usage.

use good_lp::solvers::highs::highs;
use good_lp::{constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel};

use super::{ConstraintSense, LpProblem, LpSolution, SolutionStatus, Solver};
use crate::error::{Error, Result};

/// HiGHS-based LP solver.
#[derive(Debug, Default, Clone)]
pub struct HighsSolver;

impl HighsSolver {
    /// Create a new HiGHS solver instance.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve_lp(&self, problem: &LpProblem) -> Result<LpSolution> {
        solve_with_good_lp(problem)
    }
}

/// Internal solver implementation using good_lp.
fn solve_with_good_lp(problem: &LpProblem) -> Result<LpSolution> {
    let n = problem.num_vars();

    // Handle empty problem
    if n == 0 {
        return Ok(LpSolution {
            values: vec![],
            objective: 0.0,
            status: SolutionStatus::Optimal,
        });
    }

    // Create variables
    let mut vars = variables!();
    let mut var_list = Vec::with_capacity(n);

    for bounds in &problem.bounds {
        let mut v = variable();

        if let Some(lb) = bounds.lower {
            v = v.min(lb);
        }
        if let Some(ub) = bounds.upper {
            v = v.max(ub);
        }

        var_list.push(vars.add(v));
    }

    // Build objective function
    let objective: Expression = var_list
        .iter()
        .zip(problem.objective.iter())
        .map(|(v, c)| *c * *v)
        .sum();

    let mut model = vars.minimise(&objective).using(highs);

    // Add constraints
    for constr in &problem.constraints {
        let lhs: Expression = var_list
            .iter()
            .zip(constr.coefficients.iter())
            .map(|(v, c)| *c * *v)
            .sum();

        match constr.sense {
            ConstraintSense::GreaterEqual => {
                model = model.with(constraint!(lhs >= constr.rhs));
            }
            ConstraintSense::LessEqual => {
                model = model.with(constraint!(lhs <= constr.rhs));
            }
            ConstraintSense::Equal => {
                model = model.with(constraint!(lhs == constr.rhs));
            }
        }
    }

    match model.solve() {
        Ok(solution) => {
            let values: Vec<f64> = var_list.iter().map(|v| solution.value(*v)).collect();

            // Re-evaluate objective with the solved values
            let obj_value: f64 = values
                .iter()
                .zip(problem.objective.iter())
                .map(|(v, c)| v * c)
                .sum();

            Ok(LpSolution {
                values,
                objective: obj_value,
                status: SolutionStatus::Optimal,
            })
        }
        // Infeasible and unbounded are ordinary outcomes; anything else
        // is a backend failure.
        Err(ResolutionError::Infeasible) => Ok(LpSolution {
            values: vec![],
            objective: 0.0,
            status: SolutionStatus::Infeasible,
        }),
        Err(ResolutionError::Unbounded) => Ok(LpSolution {
            values: vec![],
            objective: 0.0,
            status: SolutionStatus::Unbounded,
        }),
        Err(e) => Err(Error::Solver(e.to_string())),
    }
}
