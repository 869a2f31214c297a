//! Dual LP construction and result extraction for the NDDF model.
//!
//! For each target DMU the dual of the non-radial directional distance
//! function envelopment program is built over the whole panel: one dual
//! price variable per configured column, an optional free ζ under VRS,
//! and one feasibility constraint per reference DMU. By strong duality
//! the minimized objective equals the primal directional-distance
//! efficiency score, and the variable values are the shadow prices.

use std::collections::BTreeMap;

use tracing::debug;

use super::model::ModelConfig;
use super::panel::Panel;
use super::result::ComputeResult;
use super::solver::{Constraint, LpProblem, LpSolution, Solver, VariableBounds};

/// Directional components at or below this threshold are treated as
/// inactive: the corresponding dual variable gets a lower bound of 0
/// instead of `weight / gradient`. Guards the bound derivation against
/// division by a near-zero gradient.
pub const GRADIENT_FLOOR: f64 = 1e-6;

/// Added to the numeraire price in the MAC denominator so an exactly
/// zero shadow price cannot produce a division by zero.
pub const MAC_DENOMINATOR_GUARD: f64 = 1e-12;

/// Dual variable layout: inputs, then desirable outputs, then undesired
/// outputs, then (iff VRS) the free ζ in the last slot.
fn num_vars(config: &ModelConfig) -> usize {
    let priced = config.num_inputs() + config.num_outputs() + config.num_undesired();
    priced + usize::from(config.returns_to_scale().has_zeta())
}

/// Lower bound of one dual price variable: `weight / g` when the
/// directional component `g = direction * value` is active, else 0.
fn price_floor(direction: f64, weight: f64, value: f64) -> f64 {
    let g = direction * value;
    if g > GRADIENT_FLOOR {
        weight / g
    } else {
        0.0
    }
}

/// Build the dual LP for the panel row `target`.
///
/// Constraints cover every panel row including the target itself:
/// `ζ + Σ u·X[n] − Σ v·Y[n] + Σ z·B[n] >= 0`. The objective is the same
/// expression evaluated at the target's own vectors, minimized.
pub fn build_dual_lp(panel: &Panel, target: usize, config: &ModelConfig) -> LpProblem {
    let kx = config.num_inputs();
    let ky = config.num_outputs();
    let has_zeta = config.returns_to_scale().has_zeta();
    let n_vars = num_vars(config);

    let mut problem = LpProblem::new(n_vars);

    let x0 = &panel.x[target];
    let y0 = &panel.y[target];
    let b0 = &panel.b[target];

    for (i, col) in config.input_cols.iter().enumerate() {
        problem.bounds[i] = VariableBounds::at_least(price_floor(col.direction, col.weight, x0[i]));
    }
    for (m, col) in config.output_cols.iter().enumerate() {
        problem.bounds[kx + m] =
            VariableBounds::at_least(price_floor(col.direction, col.weight, y0[m]));
    }
    for (q, col) in config.undesired_cols.iter().enumerate() {
        problem.bounds[kx + ky + q] =
            VariableBounds::at_least(price_floor(col.direction, col.weight, b0[q]));
    }
    if has_zeta {
        problem.bounds[n_vars - 1] = VariableBounds::free();
    }

    // Dual feasibility with respect to each reference DMU.
    for n in 0..panel.len() {
        problem.constraints.push(Constraint::geq(
            row_coefficients(&panel.x[n], &panel.y[n], &panel.b[n], n_vars, has_zeta),
            0.0,
        ));
    }

    problem.objective = row_coefficients(x0, y0, b0, n_vars, has_zeta);

    problem
}

/// Coefficient vector `[+x | −y | +b | (+1 for ζ)]` shared by the
/// constraints and the objective.
fn row_coefficients(x: &[f64], y: &[f64], b: &[f64], n_vars: usize, has_zeta: bool) -> Vec<f64> {
    let mut coeffs = Vec::with_capacity(n_vars);
    coeffs.extend(x.iter().copied());
    coeffs.extend(y.iter().map(|v| -v));
    coeffs.extend(b.iter().copied());
    if has_zeta {
        coeffs.push(1.0);
    }
    coeffs
}

/// Turn a solved dual LP into the public result shape.
///
/// MAC normalizes every undesired column's shadow price by the price of
/// the first declared desirable output; that numeraire choice is a
/// modeling convention, not configurable.
pub fn extract_result(
    panel: &Panel,
    target: usize,
    config: &ModelConfig,
    solution: &LpSolution,
) -> ComputeResult {
    let kx = config.num_inputs();
    let ky = config.num_outputs();

    let mut prices = BTreeMap::new();
    for (i, col) in config.all_columns().enumerate() {
        prices.insert(col.name.clone(), solution.values[i]);
    }

    // Without any desirable output there is no numeraire price; fall
    // back to 1 so MAC degrades to the raw shadow price.
    let numeraire = if ky > 0 { solution.values[kx] } else { 1.0 };
    let mut mac = BTreeMap::new();
    for (q, col) in config.undesired_cols.iter().enumerate() {
        mac.insert(
            col.name.clone(),
            solution.values[kx + ky + q] / (numeraire + MAC_DENOMINATOR_GUARD),
        );
    }

    let zeta = if config.returns_to_scale().has_zeta() {
        solution.values[solution.values.len() - 1]
    } else {
        0.0
    };

    ComputeResult {
        id: panel.ids[target].clone(),
        year: panel.years[target].clone(),
        efficiency_nddf: solution.objective,
        zeta,
        prices,
        mac,
    }
}

/// Build and solve the dual LP for one DMU.
///
/// Any non-optimal status or backend failure yields `None`; that is the
/// normal per-DMU drop, never a batch error.
pub fn solve_dmu(
    panel: &Panel,
    target: usize,
    config: &ModelConfig,
    solver: &dyn Solver,
) -> Option<ComputeResult> {
    let problem = build_dual_lp(panel, target, config);

    match solver.solve_lp(&problem) {
        Ok(solution) if solution.is_optimal() => {
            Some(extract_result(panel, target, config, &solution))
        }
        Ok(solution) => {
            debug!(target, status = ?solution.status, "dropping DMU: non-optimal LP");
            None
        }
        Err(e) => {
            debug!(target, error = %e, "dropping DMU: solver failure");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::column::ColumnSpec;
    use crate::domain::panel::DmuRecord;
    use crate::domain::solver::HighsSolver;
    use serde_json::json;

    fn config(is_vrs: bool) -> ModelConfig {
        ModelConfig {
            input_cols: vec![ColumnSpec::new("L", 1.0, 1.0)],
            output_cols: vec![ColumnSpec::new("Y", 1.0, 1.0)],
            undesired_cols: vec![ColumnSpec::new("C", 1.0, 1.0)],
            id_col: "id".into(),
            year_col: "year".into(),
            is_vrs,
        }
    }

    fn record(id: &str, l: f64, y: f64, c: f64) -> DmuRecord {
        let mut r = DmuRecord::new();
        r.insert("id".into(), json!(id));
        r.insert("year".into(), json!(2020));
        r.insert("L".into(), json!(l));
        r.insert("Y".into(), json!(y));
        r.insert("C".into(), json!(c));
        r
    }

    fn panel(is_vrs: bool) -> (Panel, ModelConfig) {
        let cfg = config(is_vrs);
        let records = vec![
            record("R1", 10.0, 5.0, 2.0),
            record("R2", 8.0, 6.0, 1.0),
        ];
        (Panel::from_records(&records, &cfg), cfg)
    }

    #[test]
    fn crs_problem_has_no_zeta_variable() {
        let (panel, cfg) = panel(false);
        let problem = build_dual_lp(&panel, 0, &cfg);
        assert_eq!(problem.num_vars(), 3);
        assert_eq!(problem.constraints.len(), 2);
    }

    #[test]
    fn vrs_appends_free_zeta() {
        let (panel, cfg) = panel(true);
        let problem = build_dual_lp(&panel, 0, &cfg);
        assert_eq!(problem.num_vars(), 4);
        assert!(problem.bounds[3].lower.is_none());
        assert!(problem.bounds[3].upper.is_none());
        // ζ enters every constraint and the objective with coefficient 1
        assert_eq!(problem.constraints[0].coefficients[3], 1.0);
        assert_eq!(problem.objective[3], 1.0);
    }

    #[test]
    fn bounds_follow_weight_over_gradient() {
        let (panel, cfg) = panel(false);
        let problem = build_dual_lp(&panel, 0, &cfg);
        // target R1: L=10, Y=5, C=2, all direction 1 weight 1
        assert_eq!(problem.bounds[0].lower, Some(0.1));
        assert_eq!(problem.bounds[1].lower, Some(0.2));
        assert_eq!(problem.bounds[2].lower, Some(0.5));
    }

    #[test]
    fn zero_direction_column_gets_zero_floor() {
        let mut cfg = config(false);
        cfg.undesired_cols.push(ColumnSpec::new("P", 0.0, 0.0));
        let mut records = vec![record("R1", 10.0, 5.0, 2.0)];
        records[0].insert("P".into(), json!(3.0));
        let panel = Panel::from_records(&records, &cfg);

        let problem = build_dual_lp(&panel, 0, &cfg);
        assert_eq!(problem.bounds[3].lower, Some(0.0));
    }

    #[test]
    fn constraint_signs_are_plus_minus_plus() {
        let (panel, cfg) = panel(false);
        let problem = build_dual_lp(&panel, 0, &cfg);
        assert_eq!(problem.constraints[0].coefficients, vec![10.0, -5.0, 2.0]);
        assert_eq!(problem.constraints[1].coefficients, vec![8.0, -6.0, 1.0]);
        assert_eq!(problem.objective, vec![10.0, -5.0, 2.0]);
    }

    #[test]
    fn crs_scenario_matches_hand_solution() {
        // With u and z at their floors and the second constraint tight,
        // the R1 objective works out to 11/12.
        let (panel, cfg) = panel(false);
        let solver = HighsSolver::new();

        let result = solve_dmu(&panel, 0, &cfg, &solver).unwrap();
        assert!((result.efficiency_nddf - 11.0 / 12.0).abs() < 1e-6);
        assert_eq!(result.zeta, 0.0);
        assert_eq!(result.id, json!("R1"));
    }

    #[test]
    fn vrs_scenario_shifts_the_score() {
        let (panel, cfg) = panel(true);
        let solver = HighsSolver::new();

        // Hand solution: floors 2u+v+z = 0.9 with ζ = -0.1.
        let result = solve_dmu(&panel, 0, &cfg, &solver).unwrap();
        assert!((result.efficiency_nddf - 0.9).abs() < 1e-6);
        assert!(result.zeta.abs() > 1e-9);
    }

    #[test]
    fn mac_divides_by_first_output_price() {
        let (panel, cfg) = panel(false);
        let solver = HighsSolver::new();

        let result = solve_dmu(&panel, 0, &cfg, &solver).unwrap();
        let expected = result.prices["C"] / (result.prices["Y"] + MAC_DENOMINATOR_GUARD);
        assert_eq!(result.mac["C"], expected);
    }

    #[test]
    fn missing_outputs_use_unit_numeraire() {
        // Deliberately bypasses config validation: solve_dmu must not
        // index past the price vector when no output column exists.
        let mut cfg = config(false);
        cfg.output_cols.clear();
        let mut records = vec![record("R1", 10.0, 5.0, 2.0)];
        records[0].remove("Y");
        let panel = Panel::from_records(&records, &cfg);
        let solver = HighsSolver::new();

        let result = solve_dmu(&panel, 0, &cfg, &solver).unwrap();
        let expected = result.prices["C"] / (1.0 + MAC_DENOMINATOR_GUARD);
        assert_eq!(result.mac["C"], expected);
    }

    struct BrokenSolver;

    impl Solver for BrokenSolver {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn solve_lp(&self, _: &LpProblem) -> crate::error::Result<LpSolution> {
            Err(crate::error::Error::Solver("backend exploded".into()))
        }
    }

    #[test]
    fn backend_failure_drops_the_dmu() {
        let (panel, cfg) = panel(false);
        assert!(solve_dmu(&panel, 0, &cfg, &BrokenSolver).is_none());
    }

    #[test]
    fn price_mapping_covers_all_categories() {
        let (panel, cfg) = panel(false);
        let solver = HighsSolver::new();

        let result = solve_dmu(&panel, 1, &cfg, &solver).unwrap();
        let keys: Vec<&str> = result.prices.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["C", "L", "Y"]);
        let mac_keys: Vec<&str> = result.mac.keys().map(String::as_str).collect();
        assert_eq!(mac_keys, vec!["C"]);
    }
}
