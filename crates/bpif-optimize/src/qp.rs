//! Dense quadratic programs solved with Clarabel.
//!
//! Problems are stated as `min 1/2 x' P x` subject to linear equalities and
//! `<=` inequalities, then handed to Clarabel in its conic form
//! `A x + s = b` with `s` in `ZeroCone x NonnegativeCone`.

use std::ops::Range;
use std::time::Duration;

use clarabel::algebra::*;
use clarabel::solver::*;
use ndarray::{Array1, Array2};

use crate::config::SolverConfig;

/// Why Clarabel stopped without an optimum.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum QpFailure {
    /// The constraints admit no point.
    Infeasible,
    /// Iteration cap reached after this many iterations.
    IterationLimit(usize),
    /// Time limit reached after this long.
    TimeLimit(Duration),
    /// Any other solver status or a setup error.
    Numerical(String),
}

#[derive(Debug, Clone)]
struct Row {
    coefficients: Array1<f64>,
    bound: f64,
}

/// A long-only portfolio QP under construction.
#[derive(Debug, Clone)]
pub(crate) struct QuadraticProgram {
    objective: Array2<f64>,
    equalities: Vec<Row>,
    inequalities: Vec<Row>,
}

impl QuadraticProgram {
    /// Minimise `1/2 x' objective x`; `objective` must be square.
    pub(crate) const fn new(objective: Array2<f64>) -> Self {
        Self {
            objective,
            equalities: Vec::new(),
            inequalities: Vec::new(),
        }
    }

    /// Add `coefficients . x = bound`.
    pub(crate) fn equal(mut self, coefficients: Array1<f64>, bound: f64) -> Self {
        self.equalities.push(Row {
            coefficients,
            bound,
        });
        self
    }

    /// Add `coefficients . x <= bound`.
    pub(crate) fn at_most(mut self, coefficients: Array1<f64>, bound: f64) -> Self {
        self.inequalities.push(Row {
            coefficients,
            bound,
        });
        self
    }

    /// Add `lower <= x_i <= upper` for every variable in `range`.
    pub(crate) fn bounded(mut self, range: Range<usize>, lower: f64, upper: f64) -> Self {
        let n = self.objective.nrows();
        for i in range {
            let mut unit = Array1::zeros(n);
            unit[i] = -1.0;
            self = self.at_most(unit.clone(), -lower);
            unit[i] = 1.0;
            self = self.at_most(unit, upper);
        }
        self
    }

    /// Solve with the iteration cap and tolerances of `config`.
    ///
    /// `time_left` bounds the interior-point iterations only.
    pub(crate) fn solve(
        &self,
        config: &SolverConfig,
        time_left: Option<Duration>,
    ) -> Result<Vec<f64>, QpFailure> {
        let n = self.objective.nrows();
        let p = upper_triangle(&self.objective);
        let q = vec![0.0; n];

        let rows: Vec<&Row> = self.equalities.iter().chain(&self.inequalities).collect();
        let a = stack_rows(&rows, n);
        let b: Vec<f64> = rows.iter().map(|row| row.bound).collect();
        let cones = [
            ZeroConeT(self.equalities.len()),
            NonnegativeConeT(self.inequalities.len()),
        ];

        let settings = DefaultSettingsBuilder::default()
            .max_iter(u32::try_from(config.max_iterations).unwrap_or(u32::MAX))
            .time_limit(time_left.map_or(f64::INFINITY, |d| d.as_secs_f64()))
            .tol_gap_abs(config.tolerance)
            .tol_gap_rel(config.tolerance)
            .tol_feas(config.tolerance)
            .verbose(false)
            .build()
            .map_err(|e| QpFailure::Numerical(format!("invalid solver settings: {e}")))?;

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings)
            .map_err(|e| QpFailure::Numerical(format!("failed to create solver: {e:?}")))?;
        solver.solve();

        match solver.solution.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                Ok(std::mem::take(&mut solver.solution.x))
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                Err(QpFailure::Infeasible)
            }
            SolverStatus::MaxIterations => {
                Err(QpFailure::IterationLimit(solver.info.iterations as usize))
            }
            SolverStatus::MaxTime => Err(QpFailure::TimeLimit(
                Duration::try_from_secs_f64(solver.info.solve_time).unwrap_or_default(),
            )),
            status => Err(QpFailure::Numerical(format!("solver stopped with {status:?}"))),
        }
    }
}

/// Upper triangle of a square matrix in compressed-column form.
fn upper_triangle(matrix: &Array2<f64>) -> CscMatrix<f64> {
    let n = matrix.nrows();
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..n {
        for i in 0..=j {
            let value = matrix[[i, j]];
            if value != 0.0 {
                rowval.push(i);
                nzval.push(value);
            }
        }
        colptr.push(nzval.len());
    }

    CscMatrix::new(n, n, colptr, rowval, nzval)
}

/// Constraint rows stacked into a compressed-column matrix.
fn stack_rows(rows: &[&Row], n: usize) -> CscMatrix<f64> {
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..n {
        for (i, row) in rows.iter().enumerate() {
            let value = row.coefficients[j];
            if value != 0.0 {
                rowval.push(i);
                nzval.push(value);
            }
        }
        colptr.push(nzval.len());
    }

    CscMatrix::new(rows.len(), n, colptr, rowval, nzval)
}
