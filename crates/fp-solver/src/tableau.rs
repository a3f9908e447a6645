//! Dense simplex tableau over exact rationals.
//!
//! Layout: one row per constraint, one column per structural, slack/surplus and
//! artificial variable, plus a final right-hand-side column. Structural
//! variables always occupy columns `0..n`. Zero tests are exact; there is no
//! tolerance anywhere.

use fp_core::Rational;
use nalgebra::DMatrix;

use crate::error::{SolverError, SolverResult};
use crate::problem::{Constraint, LinearProgram, Objective, Relation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Column {
    Structural(usize),
    Slack,
    Artificial,
}

/// Outcome of one optimization run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Optimal,
    /// The objective grows without limit along this entering column.
    Unbounded(usize),
}

/// Counts improving pivots against an optional limit.
#[derive(Debug)]
pub(crate) struct PivotBudget {
    limit: Option<usize>,
    used: usize,
}

impl PivotBudget {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }

    fn spend(&mut self) -> SolverResult<()> {
        if let Some(limit) = self.limit {
            if self.used >= limit {
                return Err(SolverError::PivotLimit { limit });
            }
        }
        self.used += 1;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Tableau {
    matrix: DMatrix<Rational>,
    basis: Vec<usize>,
    columns: Vec<Column>,
    labels: Vec<String>,
}

struct Row<'a> {
    label: &'a str,
    coeffs: Vec<Rational>,
    relation: Relation,
    rhs: Rational,
}

impl Tableau {
    /// Standard-form tableau for the problem's constraints, its variable upper
    /// bounds, and `extra`. Returns `None` if a constraint without variables is
    /// violated.
    pub(crate) fn build(problem: &LinearProgram, extra: &[Constraint]) -> Option<Self> {
        let n = problem.num_variables();
        let bounds: Vec<Constraint> = problem
            .variables
            .iter()
            .enumerate()
            .filter_map(|(j, var)| {
                var.upper.as_ref().map(|upper| {
                    Constraint::new(
                        format!("{} upper", var.name),
                        vec![(j, Rational::one())],
                        Relation::Le,
                        upper.clone(),
                    )
                })
            })
            .collect();

        let mut rows = Vec::new();
        for c in problem.constraints.iter().chain(&bounds).chain(extra) {
            let mut coeffs = vec![Rational::zero(); n];
            for (j, a) in &c.coeffs {
                coeffs[*j] += a;
            }
            let (mut relation, mut rhs) = (c.relation, c.rhs.clone());

            if coeffs.iter().all(Rational::is_zero) {
                if relation.holds(&Rational::zero(), &rhs) {
                    continue;
                }
                return None;
            }
            if rhs.is_negative() || (rhs.is_zero() && relation == Relation::Ge) {
                coeffs.iter_mut().for_each(|a| *a = -&*a);
                rhs = -rhs;
                relation = relation.flipped();
            }
            rows.push(Row {
                label: &c.label,
                coeffs,
                relation,
                rhs,
            });
        }

        let mut columns: Vec<Column> = (0..n).map(Column::Structural).collect();
        let mut labels: Vec<String> = problem.variables.iter().map(|v| v.name.clone()).collect();

        // Le rows start with their slack basic, Ge and Eq rows with an artificial.
        let mut basis = vec![0; rows.len()];
        let mut slack_col = vec![None; rows.len()];
        for (i, row) in rows.iter().enumerate() {
            if row.relation != Relation::Eq {
                slack_col[i] = Some(columns.len());
                basis[i] = columns.len();
                columns.push(Column::Slack);
                labels.push(format!("slack[{}]", row.label));
            }
        }
        let mut artificial_col = vec![None; rows.len()];
        for (i, row) in rows.iter().enumerate() {
            if row.relation != Relation::Le {
                artificial_col[i] = Some(columns.len());
                basis[i] = columns.len();
                columns.push(Column::Artificial);
                labels.push(format!("artificial[{}]", row.label));
            }
        }

        let rhs_col = columns.len();
        let mut matrix = DMatrix::from_element(rows.len(), rhs_col + 1, Rational::zero());
        for (i, row) in rows.into_iter().enumerate() {
            for (j, a) in row.coeffs.into_iter().enumerate() {
                matrix[(i, j)] = a;
            }
            if let Some(s) = slack_col[i] {
                matrix[(i, s)] = match row.relation {
                    Relation::Ge => -Rational::one(),
                    _ => Rational::one(),
                };
            }
            if let Some(a) = artificial_col[i] {
                matrix[(i, a)] = Rational::one();
            }
            matrix[(i, rhs_col)] = row.rhs;
        }

        Some(Self {
            matrix,
            basis,
            columns,
            labels,
        })
    }

    pub(crate) fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn num_rows(&self) -> usize {
        self.basis.len()
    }

    fn rhs(&self, row: usize) -> &Rational {
        &self.matrix[(row, self.columns.len())]
    }

    pub(crate) fn label(&self, col: usize) -> &str {
        &self.labels[col]
    }

    /// Column costs for a structural objective.
    pub(crate) fn cost_for(&self, objective: &Objective) -> Vec<Rational> {
        let mut cost = vec![Rational::zero(); self.columns.len()];
        for (j, c) in &objective.coeffs {
            cost[*j] += c;
        }
        cost
    }

    /// Objective value at the current basic solution.
    pub(crate) fn objective_value(&self, cost: &[Rational]) -> Rational {
        self.basis
            .iter()
            .enumerate()
            .filter(|(_, b)| !cost[**b].is_zero())
            .map(|(i, b)| &cost[*b] * self.rhs(i))
            .sum()
    }

    /// `z_j - c_j` for every column; negative entries can still improve a maximization.
    pub(crate) fn reduced_costs(&self, cost: &[Rational]) -> Vec<Rational> {
        let mut d: Vec<Rational> = cost.iter().map(|c| -c).collect();
        for (i, b) in self.basis.iter().enumerate() {
            let cb = &cost[*b];
            if cb.is_zero() {
                continue;
            }
            for (j, dj) in d.iter_mut().enumerate() {
                let a = &self.matrix[(i, j)];
                if !a.is_zero() {
                    *dj += cb * a;
                }
            }
        }
        d
    }

    /// Row that leaves when `col` enters: minimum ratio, lowest row on ties.
    fn ratio_row(&self, col: usize) -> Option<usize> {
        let mut best: Option<(usize, Rational)> = None;
        for i in 0..self.num_rows() {
            let a = &self.matrix[(i, col)];
            if !a.is_positive() {
                continue;
            }
            let ratio = self.rhs(i) / a;
            if best.as_ref().is_none_or(|(_, b)| ratio < *b) {
                best = Some((i, ratio));
            }
        }
        best.map(|(i, _)| i)
    }

    /// How far `col` can enter before a basic variable hits zero; `None` if
    /// nothing limits it.
    fn step_length(&self, col: usize) -> Option<Rational> {
        self.ratio_row(col)
            .map(|i| self.rhs(i) / &self.matrix[(i, col)])
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let width = self.matrix.ncols();
        let p = self.matrix[(row, col)].clone();
        for j in 0..width {
            let v = &self.matrix[(row, j)] / &p;
            self.matrix[(row, j)] = v;
        }
        for i in 0..self.num_rows() {
            if i == row {
                continue;
            }
            let factor = self.matrix[(i, col)].clone();
            if factor.is_zero() {
                continue;
            }
            for j in 0..width {
                let delta = &factor * &self.matrix[(row, j)];
                self.matrix[(i, j)] -= delta;
            }
        }
        self.basis[row] = col;
    }

    /// Primal simplex with Dantzig's rule: most negative reduced cost enters,
    /// lowest column on ties. No anti-cycling rule is applied.
    pub(crate) fn optimize(
        &mut self,
        cost: &[Rational],
        budget: &mut PivotBudget,
    ) -> SolverResult<Step> {
        loop {
            let d = self.reduced_costs(cost);
            let entering = d
                .iter()
                .enumerate()
                .filter(|(_, dj)| dj.is_negative())
                .min_by(|(_, a), (_, b)| a.cmp(b))
                .map(|(j, _)| j);

            let Some(col) = entering else {
                return Ok(Step::Optimal);
            };
            let Some(row) = self.ratio_row(col) else {
                return Ok(Step::Unbounded(col));
            };
            budget.spend()?;
            self.pivot(row, col);
        }
    }

    /// Phase 1: minimize the artificial sum, then drive zero-valued artificials
    /// out of the basis, drop redundant rows and remove the artificial columns.
    /// Returns `false` when the constraints cannot all be met.
    pub(crate) fn phase_one(&mut self, budget: &mut PivotBudget) -> SolverResult<bool> {
        if !self.columns.contains(&Column::Artificial) {
            return Ok(true);
        }

        let cost: Vec<Rational> = self
            .columns
            .iter()
            .map(|c| match c {
                Column::Artificial => -Rational::one(),
                _ => Rational::zero(),
            })
            .collect();

        if let Step::Unbounded(_) = self.optimize(&cost, budget)? {
            return Err(SolverError::Numeric {
                what: "phase one objective is bounded by zero".to_string(),
            });
        }
        if self.objective_value(&cost).is_negative() {
            return Ok(false);
        }

        let mut redundant = Vec::new();
        for i in 0..self.num_rows() {
            if self.columns[self.basis[i]] != Column::Artificial {
                continue;
            }
            let replacement = (0..self.columns.len())
                .find(|&j| self.columns[j] != Column::Artificial && !self.matrix[(i, j)].is_zero());
            match replacement {
                Some(j) => self.pivot(i, j),
                None => redundant.push(i),
            }
        }

        self.compact(&redundant);
        Ok(true)
    }

    fn compact(&mut self, drop_rows: &[usize]) {
        let keep_rows: Vec<usize> = (0..self.num_rows())
            .filter(|i| !drop_rows.contains(i))
            .collect();
        let keep_cols: Vec<usize> = (0..self.columns.len())
            .filter(|&j| self.columns[j] != Column::Artificial)
            .collect();

        let mut new_index = vec![usize::MAX; self.columns.len()];
        for (new, &old) in keep_cols.iter().enumerate() {
            new_index[old] = new;
        }

        let rhs_col = self.columns.len();
        let source = &self.matrix;
        let matrix = DMatrix::from_fn(keep_rows.len(), keep_cols.len() + 1, |i, j| {
            let col = keep_cols.get(j).copied().unwrap_or(rhs_col);
            source[(keep_rows[i], col)].clone()
        });

        self.basis = keep_rows.iter().map(|&i| new_index[self.basis[i]]).collect();
        self.columns = keep_cols.iter().map(|&j| self.columns[j]).collect();
        self.labels = keep_cols.iter().map(|&j| self.labels[j].clone()).collect();
        self.matrix = matrix;
    }

    /// Values of the structural variables at the current basis.
    pub(crate) fn values(&self, n: usize) -> Vec<Rational> {
        let mut x = vec![Rational::zero(); n];
        for (i, &b) in self.basis.iter().enumerate() {
            if let Column::Structural(k) = self.columns[b] {
                x[k] = self.rhs(i).clone();
            }
        }
        x
    }

    /// Non-basic columns with zero reduced cost that can actually move: each one
    /// witnesses another optimal solution.
    pub(crate) fn alternates(&self, cost: &[Rational]) -> Vec<usize> {
        let d = self.reduced_costs(cost);
        (0..self.columns.len())
            .filter(|j| !self.basis.contains(j))
            .filter(|&j| d[j].is_zero())
            .filter(|&j| self.step_length(j).is_none_or(|s| s.is_positive()))
            .collect()
    }

    /// Structural variables that grow along the unbounded ray of `col`.
    pub(crate) fn ray_variables(&self, col: usize) -> Vec<usize> {
        let mut out = Vec::new();
        if let Column::Structural(k) = self.columns[col] {
            out.push(k);
        }
        for (i, &b) in self.basis.iter().enumerate() {
            if let Column::Structural(k) = self.columns[b] {
                if self.matrix[(i, col)].is_negative() {
                    out.push(k);
                }
            }
        }
        out
    }
}
