pub(crate) mod nfa;

#[cfg(feature = "nfa-inspection")]
pub use crate::nfa::nfa::State;

#[cfg(feature = "nfa-inspection")]
pub use crate::nfa::nfa::NFA;
