//! KCL and KVL equation assembly.
//!
//! Every row has one coefficient per branch, in the circuit's canonical
//! branch order. The stacked system is:
//!
//! ```text
//! [ KCL: one row per node except the reference ]         [ 0 ]
//! [ KVL: one row per fundamental loop             ] I  =  [ e ]
//! [ constraint: one row per fixed-current branch  ]       [ j ]
//! ```

use std::fmt;

use crate::circuit::{Branch, BranchId, Circuit, NodeId};
use crate::error::{KirchhoffError, Result};
use crate::topology::{FundamentalLoop, Topology};

/// What a row of the equation system expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Current conservation at a node
    Node(NodeId),
    /// Voltage law around the loop closed by a co-tree branch
    Loop(BranchId),
    /// Externally fixed current of a branch
    Constraint(BranchId),
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKind::Node(n) => write!(f, "KCL {}", n),
            RowKind::Loop(b) => write!(f, "KVL {}", b),
            RowKind::Constraint(b) => write!(f, "FIX {}", b),
        }
    }
}

/// A block of linear equations over branch currents.
#[derive(Debug, Clone, PartialEq)]
pub struct EquationRows {
    /// Coefficient rows, each `columns` wide
    pub coefficients: Vec<Vec<f64>>,
    /// Right-hand side per row
    pub rhs: Vec<f64>,
    /// Meaning of each row
    pub kinds: Vec<RowKind>,
    /// Number of unknowns (branches)
    pub columns: usize,
}

impl EquationRows {
    /// Create an empty block over `columns` unknowns.
    pub fn new(columns: usize) -> Self {
        Self {
            coefficients: Vec::new(),
            rhs: Vec::new(),
            kinds: Vec::new(),
            columns,
        }
    }

    /// Append one row.
    pub fn push(&mut self, kind: RowKind, row: Vec<f64>, rhs: f64) {
        debug_assert_eq!(row.len(), self.columns);
        self.coefficients.push(row);
        self.rhs.push(rhs);
        self.kinds.push(kind);
    }

    /// Stack `other` below this block.
    pub fn stack(mut self, other: EquationRows) -> Self {
        self.coefficients.extend(other.coefficients);
        self.rhs.extend(other.rhs);
        self.kinds.extend(other.kinds);
        self
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Check if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Check if the block is square.
    pub fn is_square(&self) -> bool {
        self.len() == self.columns
    }
}

impl fmt::Display for EquationRows {
    /// One line per row: label, coefficients, then `| rhs`. The format
    /// precision (default 3) applies to every number.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(3);
        for ((row, rhs), kind) in self.coefficients.iter().zip(&self.rhs).zip(&self.kinds) {
            write!(f, "{:<8}", kind.to_string())?;
            for value in row {
                write!(f, " {:>9.*}", precision, value)?;
            }
            writeln!(f, " | {:>9.*}", precision, rhs)?;
        }
        Ok(())
    }
}

/// Build the KCL rows: one per node except `reference`.
///
/// Entry is -1 where the node is the branch's first endpoint, +1 where it is
/// the second, 0 otherwise. A self-loop contributes 0, its current leaving
/// and re-entering the same node.
pub fn kcl_rows(circuit: &Circuit, reference: NodeId) -> EquationRows {
    let mut rows = EquationRows::new(circuit.branch_count());
    for node in circuit.nodes().into_iter().filter(|n| *n != reference) {
        let row = circuit
            .branches()
            .iter()
            .map(|b| {
                if b.is_self_loop() {
                    0.0
                } else if b.first() == node {
                    -1.0
                } else if b.second() == node {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        rows.push(RowKind::Node(node), row, 0.0);
    }
    rows
}

/// Build the KVL rows (one per fundamental loop) followed by one constraint
/// row per branch with an externally fixed current.
pub fn kvl_rows(circuit: &Circuit, topology: &Topology) -> Result<EquationRows> {
    let columns = circuit.branch_count();
    let mut rows = EquationRows::new(columns);

    for fundamental in &topology.loops {
        let (row, rhs) = loop_row(circuit, fundamental)?;
        let defining = circuit.branches()[fundamental.defining_branch()].id;
        rows.push(RowKind::Loop(defining), row, rhs);
    }

    for &idx in &topology.constrained {
        let branch = &circuit.branches()[idx];
        let fixed = branch.fixed_current().unwrap_or(0.0);
        let mut row = vec![0.0; columns];
        row[idx] = 1.0;
        rows.push(RowKind::Constraint(branch.id), row, fixed);
    }

    Ok(rows)
}

/// Signed-resistance row and source right-hand side of one loop.
///
/// The traversal sign of branch `j` comes from the node it shares with
/// branch `j + 1` (wrapping): arriving at its first endpoint means it is
/// walked against its orientation, so its resistance enters positive and its
/// source voltage is subtracted; the second endpoint flips both. Two-branch
/// loops share both nodes and are compared endpoint for endpoint instead.
fn loop_row(circuit: &Circuit, fundamental: &FundamentalLoop) -> Result<(Vec<f64>, f64)> {
    let branches = circuit.branches();
    let mut row = vec![0.0; branches.len()];
    let mut rhs = 0.0;

    let mut accumulate = |idx: usize, sign: f64| {
        let branch = &branches[idx];
        row[idx] += sign * branch.resistance();
        rhs -= sign * branch.source_voltage();
    };

    let members = &fundamental.branches;
    if members.len() == 2 {
        let (a, b) = (&branches[members[0]], &branches[members[1]]);
        let opposing = a.nodes == b.nodes;
        accumulate(members[0], 1.0);
        accumulate(members[1], if opposing { -1.0 } else { 1.0 });
    } else {
        for (j, &idx) in members.iter().enumerate() {
            let this = &branches[idx];
            let next = &branches[members[(j + 1) % members.len()]];
            let common = shared_node(this, next).ok_or_else(|| {
                KirchhoffError::topology(format!("loop branches {} and {} are not adjacent", this.id, next.id))
            })?;
            accumulate(idx, if common == this.first() { 1.0 } else { -1.0 });
        }
    }

    Ok((row, rhs))
}

fn shared_node(this: &Branch, next: &Branch) -> Option<NodeId> {
    if next.touches(this.first()) {
        Some(this.first())
    } else if next.touches(this.second()) {
        Some(this.second())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Circuit {
        let mut c = Circuit::new();
        c.add_resistor(1.0, NodeId(1), NodeId(2)).unwrap();
        c.add_resistor(1.0, NodeId(2), NodeId(3)).unwrap();
        c.add_resistor(1.0, NodeId(3), NodeId(1)).unwrap();
        c
    }

    #[test]
    fn test_kcl_rows_match_degree() {
        let mut c = triangle();
        c.add_resistor(2.0, NodeId(2), NodeId(4)).unwrap();
        c.add_resistor(2.0, NodeId(4), NodeId(1)).unwrap();

        let kcl = kcl_rows(&c, NodeId(1));
        assert_eq!(kcl.len(), c.node_count() - 1);
        for (row, kind) in kcl.coefficients.iter().zip(&kcl.kinds) {
            let RowKind::Node(node) = *kind else {
                panic!("unexpected row kind {:?}", kind);
            };
            let nonzero = row.iter().filter(|v| **v != 0.0).count();
            assert_eq!(nonzero, c.degree(node));
            assert!(row.iter().all(|v| [-1.0, 0.0, 1.0].contains(v)));
        }
    }

    #[test]
    fn test_kcl_columns_sum_to_zero_with_reference() {
        let c = triangle();
        let all_rows: Vec<Vec<f64>> = c
            .nodes()
            .iter()
            .map(|n| {
                c.branches()
                    .iter()
                    .map(|b| {
                        if b.first() == *n {
                            -1.0
                        } else if b.second() == *n {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();
        for col in 0..c.branch_count() {
            let sum: f64 = all_rows.iter().map(|r| r[col]).sum();
            assert_eq!(sum, 0.0);
        }
        // Dropping the reference removes exactly that redundant row
        let kcl = kcl_rows(&c, NodeId(1));
        assert_eq!(kcl.coefficients, all_rows[1..].to_vec());
    }

    #[test]
    fn test_triangle_loop_signs() {
        let mut c = triangle();
        c.extend_branch(
            crate::circuit::BranchId(2),
            crate::components::Component::VoltageSource(
                crate::components::VoltageSource::new("V9", 3.0, crate::circuit::Orientation::Forward).unwrap(),
            ),
        )
        .unwrap();

        let topo = Topology::analyze(&c).unwrap();
        let kvl = kvl_rows(&c, &topo).unwrap();
        assert_eq!(kvl.len(), 1);
        assert_eq!(kvl.kinds[0], RowKind::Loop(crate::circuit::BranchId(2)));
        // Loop [2 (3->1), 1 (2->3), 0 (1->2)] meets each next branch at the
        // current branch's first endpoint
        assert_eq!(kvl.coefficients[0], vec![1.0, 1.0, 1.0]);
        assert_relative_eq!(kvl.rhs[0], -3.0);
    }

    #[test]
    fn test_two_branch_loop_orientation() {
        let mut same = Circuit::new();
        same.add_resistor(2.0, NodeId(0), NodeId(1)).unwrap();
        same.add_resistor(3.0, NodeId(0), NodeId(1)).unwrap();
        let topo = Topology::analyze(&same).unwrap();
        let kvl = kvl_rows(&same, &topo).unwrap();
        // Matching orientation: opposing traversal
        assert_eq!(kvl.coefficients[0], vec![-2.0, 3.0]);

        let mut flipped = Circuit::new();
        flipped.add_resistor(2.0, NodeId(0), NodeId(1)).unwrap();
        flipped.add_resistor(3.0, NodeId(1), NodeId(0)).unwrap();
        let topo = Topology::analyze(&flipped).unwrap();
        let kvl = kvl_rows(&flipped, &topo).unwrap();
        assert_eq!(kvl.coefficients[0], vec![2.0, 3.0]);
    }

    #[test]
    fn test_constraint_rows() {
        let mut c = Circuit::new();
        c.add_current_source(1.0, f64::INFINITY, NodeId(1), NodeId(0)).unwrap();
        c.add_resistor(5.0, NodeId(1), NodeId(0)).unwrap();
        c.add_voltmeter(f64::INFINITY, NodeId(1), NodeId(0)).unwrap();

        let topo = Topology::analyze(&c).unwrap();
        let kvl = kvl_rows(&c, &topo).unwrap();
        assert_eq!(kvl.len(), 2);
        assert_eq!(kvl.coefficients[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(kvl.rhs[0], -1.0);
        assert_eq!(kvl.coefficients[1], vec![0.0, 0.0, 1.0]);
        assert_eq!(kvl.rhs[1], 0.0);
    }

    #[test]
    fn test_square_system() {
        let mut c = triangle();
        c.add_current_source(2.0, f64::INFINITY, NodeId(3), NodeId(2)).unwrap();
        let topo = Topology::analyze(&c).unwrap();
        let system = kcl_rows(&c, NodeId(1)).stack(kvl_rows(&c, &topo).unwrap());
        assert!(system.is_square());
    }
}
