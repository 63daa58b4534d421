pub(crate) mod dfa;

pub use dfa::State;
pub use dfa::DFA;
