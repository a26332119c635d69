//! Branch-current solver.
//!
//! Unknowns are the branch currents, one column per branch. The system is
//! assembled from Kirchhoff's laws over the graph decomposition:
//!
//! ```text
//! [ K ]       [ 0 ]     K: incidence rows, reference node dropped
//! [ R ] I  =  [ e ]     R: signed loop resistances, e: loop source voltages
//! [ U ]       [ j ]     U: unit rows pinning fixed-current branches to j
//! ```
//!
//! and solved by LU decomposition with partial pivoting. Node potentials
//! follow from the solved currents by walking the spanning tree.

mod analysis;
mod equations;
mod lu;

pub use analysis::{Analyzer, Solution, SolverConfig};
pub use equations::{kcl_rows, kvl_rows, EquationRows, RowKind};
pub use lu::LinearSystem;

/// Default pivot tolerance for the LU factorization.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;
