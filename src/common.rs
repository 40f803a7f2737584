mod atom;
mod index;
mod state;

pub use atom::{Atom, Tuple};
pub use index::TupleIndex;
pub use state::State;

pub type VariableIdx = usize;
pub type ObjectIdx = i32;
pub type SymbolIdx = usize;
pub type ActionIdx = usize;
pub type TupleIdx = usize;
