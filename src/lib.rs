pub mod composer;
pub mod dfa;
pub mod error_handling;
pub mod parser;

#[cfg(feature = "nfa-inspection")]
pub mod nfa;
#[cfg(not(feature = "nfa-inspection"))]
mod nfa;

const VERSION: &str = "0.0.1";

pub fn version() -> &'static str {
    VERSION
}
