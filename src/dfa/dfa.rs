use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use crate::nfa::nfa::NFA;

// `transitions` holds at most one target per symbol; targets index `DFA::states`.
pub struct State<S> {
    id: usize,
    transitions: IndexMap<S, usize>,
}

impl<S> State<S> {
    fn new(id: usize) -> Self {
        State {
            id,
            transitions: IndexMap::new(),
        }
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    pub fn get_transitions(&self) -> impl Iterator<Item = (&S, usize)> {
        self.transitions.iter().map(|(symbol, to)| (symbol, *to))
    }
}

pub struct DFA<S> {
    start: usize,
    accept: IndexSet<usize>,
    states: Vec<State<S>>,
}

impl<S: Debug> Debug for DFA<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "DFA( start: {:?}, accept: {:?}, states: {}, transitions: {{",
            self.start,
            self.accept,
            self.states.len()
        )?;

        for state in &self.states {
            if state.transitions.is_empty() {
                continue;
            }
            writeln!(f, "\t{}:", state.id)?;
            for (symbol, to) in state.transitions.iter() {
                writeln!(f, "\t\t{} -> {}, symbol: {:?}", state.id, to, symbol)?;
            }
        }

        write!(f, "}} )")
    }
}

impl<S: Eq + Hash> DFA<S> {
    /// Runs the automaton over `sequence`. Rejects as soon as a symbol has no
    /// outgoing edge; otherwise accepts iff the final state is accepting.
    pub fn test<'a, I>(&self, sequence: I) -> bool
    where
        I: IntoIterator<Item = &'a S>,
        S: 'a,
    {
        let mut current_state = self.start;
        for symbol in sequence {
            match self.get_next_state(current_state, symbol) {
                Some(next_state) => current_state = next_state,
                None => return false,
            }
        }
        self.is_accept_state(current_state)
    }

    pub fn get_next_state(&self, state: usize, symbol: &S) -> Option<usize> {
        self.states.get(state)?.transitions.get(symbol).copied()
    }
}

impl<S> DFA<S> {
    pub fn get_root(&self) -> usize {
        self.start
    }

    pub fn is_accept_state(&self, state: usize) -> bool {
        self.accept.contains(&state)
    }

    pub fn get_accept_states(&self) -> &IndexSet<usize> {
        &self.accept
    }

    pub fn get_states(&self) -> &[State<S>] {
        &self.states
    }

    pub fn get_num_states(&self) -> usize {
        self.states.len()
    }

    pub fn get_transitions_from_state(&self, state: usize) -> impl Iterator<Item = (&S, usize)> {
        self.states
            .get(state)
            .into_iter()
            .flat_map(|state| state.get_transitions())
    }
}

impl<S: Clone + Eq + Hash> DFA<S> {
    pub(crate) fn from_nfa(nfa: &NFA<S>) -> DFA<S> {
        Determinizer::new(nfa).run()
    }
}

// Subset construction. Each DFA state stands for one epsilon closure of NFA
// states; closures are keyed by their id-sorted member list so the same set is
// never materialized twice. Only closures reachable from the start are built.
struct Determinizer<'a, S> {
    nfa: &'a NFA<S>,
    dfa_states: Vec<State<S>>,
    dfa_accept_states: IndexSet<usize>,
    dfa_to_nfa_state_mapping: Vec<Rc<Vec<usize>>>,
    nfa_states_to_dfa_mapping: HashMap<Rc<Vec<usize>>, usize>,
    worklist: VecDeque<usize>,
}

impl<'a, S: Clone + Eq + Hash> Determinizer<'a, S> {
    fn new(nfa: &'a NFA<S>) -> Self {
        Determinizer {
            nfa,
            dfa_states: Vec::new(),
            dfa_accept_states: IndexSet::new(),
            dfa_to_nfa_state_mapping: Vec::new(),
            nfa_states_to_dfa_mapping: HashMap::new(),
            worklist: VecDeque::new(),
        }
    }

    fn run(mut self) -> DFA<S> {
        let nfa = self.nfa;
        let start = self.get_or_create_state(nfa.epsilon_closure(&[nfa.get_start()]));

        while let Some(dfa_state) = self.worklist.pop_front() {
            let nfa_states = self.dfa_to_nfa_state_mapping[dfa_state].clone();

            // Move: union of the successors of every member, per symbol.
            let mut moves: IndexMap<&S, IndexSet<usize>> = IndexMap::new();
            for nfa_state in nfa_states.iter() {
                for (symbol, successors) in nfa.get_state(*nfa_state).get_transitions() {
                    moves
                        .entry(symbol)
                        .or_default()
                        .extend(successors.iter().copied());
                }
            }

            for (symbol, destinations) in moves {
                let destinations: Vec<usize> = destinations.into_iter().collect();
                let destination_dfa_state =
                    self.get_or_create_state(nfa.epsilon_closure(&destinations));
                self.dfa_states[dfa_state]
                    .transitions
                    .insert(symbol.clone(), destination_dfa_state);
            }
        }

        debug!(
            "determinized {} NFA states into {} DFA states ({} accepting)",
            nfa.get_states().len(),
            self.dfa_states.len(),
            self.dfa_accept_states.len()
        );

        DFA {
            start,
            accept: self.dfa_accept_states,
            states: self.dfa_states,
        }
    }

    fn get_or_create_state(&mut self, closure: Vec<usize>) -> usize {
        if let Some(dfa_state) = self.nfa_states_to_dfa_mapping.get(&closure) {
            return *dfa_state;
        }

        let dfa_state = self.dfa_states.len();
        let closure = Rc::new(closure);
        if closure.contains(&self.nfa.get_accept()) {
            self.dfa_accept_states.insert(dfa_state);
        }
        trace!(
            "DFA state {} <- NFA states {:?}",
            dfa_state,
            closure
                .iter()
                .map(|idx| self.nfa.get_state(*idx).get_id())
                .collect::<Vec<_>>()
        );

        self.dfa_states.push(State::new(dfa_state));
        self.dfa_to_nfa_state_mapping.push(closure.clone());
        self.nfa_states_to_dfa_mapping.insert(closure, dfa_state);
        self.worklist.push_back(dfa_state);
        dfa_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{Composer, Transition};
    use std::collections::HashSet;

    fn assert_deterministic<S: Eq + Hash>(dfa: &DFA<S>) {
        for state in dfa.get_states() {
            let mut seen = HashSet::new();
            for (symbol, to) in state.get_transitions() {
                assert!(seen.insert(symbol), "duplicate edge out of {}", state.get_id());
                assert!(to < dfa.get_num_states());
            }
        }
    }

    #[test]
    fn test_dfa() {
        let mut start = State::new(0);
        let mut accept = State::new(1);
        start.transitions.insert('a', 1);
        accept.transitions.insert('b', 0);
        let dfa = DFA {
            start: 0,
            accept: IndexSet::from([1]),
            states: vec![start, accept],
        };

        assert!(!dfa.test(&['a', 'b']));
        assert!(dfa.test(&['a']));
        assert!(!dfa.test(&['b']));
        assert!(!dfa.test(&['b', 'a']));
        assert!(dfa.test(&['a', 'b', 'a']));
        assert!(!dfa.test(&[]));
    }

    #[test]
    fn test_union_with_shared_prefix() {
        // a | ab
        let composer = Composer::unit('a').or(&Composer::sequence(['a', 'b']));
        let dfa = composer.build();
        println!("{:?}", dfa);

        assert_eq!(dfa.get_root(), 0);
        assert_eq!(dfa.get_num_states(), 3);
        assert_eq!(dfa.get_accept_states().len(), 2);
        assert!(dfa.is_accept_state(1));
        assert!(dfa.is_accept_state(2));

        let from_start: Vec<(&char, usize)> = dfa.get_transitions_from_state(0).collect();
        assert_eq!(from_start, vec![(&'a', 1)]);
        let from_a: Vec<(&char, usize)> = dfa.get_transitions_from_state(1).collect();
        assert_eq!(from_a, vec![(&'b', 2)]);
        assert_eq!(dfa.get_transitions_from_state(2).count(), 0);

        assert!(dfa.test(&['a']));
        assert!(dfa.test(&['a', 'b']));
        assert!(!dfa.test(&['a', 'a']));
        assert!(!dfa.test(&['a', 'b', 'b']));
        assert!(!dfa.test(&['a', 'b', 'a']));
        assert_deterministic(&dfa);
    }

    #[test]
    fn test_star_collapses_to_two_states() {
        let dfa = Composer::unit('c').star().build();

        assert_eq!(dfa.get_num_states(), 2);
        assert!(dfa.is_accept_state(0));
        assert!(dfa.is_accept_state(1));
        assert_eq!(dfa.get_next_state(0, &'c'), Some(1));
        assert_eq!(dfa.get_next_state(1, &'c'), Some(1));
        assert_eq!(dfa.get_next_state(1, &'a'), None);
        assert_eq!(dfa.get_next_state(7, &'c'), None);
    }

    #[test]
    fn test_nondeterministic_edges_are_merged() {
        // Two 'a' edges out of the start, only one of them leads on to 'b'.
        let composer = Composer::new(
            0,
            3,
            vec![
                Transition::new(0, 1, 'a'),
                Transition::new(0, 2, 'a'),
                Transition::new(1, 3, 'b'),
                Transition::epsilon(2, 3),
            ],
        );
        let dfa = composer.build();

        assert_deterministic(&dfa);
        assert_eq!(dfa.get_transitions_from_state(dfa.get_root()).count(), 1);
        assert!(dfa.test(&['a']));
        assert!(dfa.test(&['a', 'b']));
        assert!(!dfa.test(&['b']));
    }

    #[test]
    fn test_unreachable_states_are_ignored() {
        let composer = Composer::new(
            0,
            1,
            vec![
                Transition::new(0, 1, 'a'),
                Transition::new(5, 6, 'z'),
                Transition::epsilon(6, 1),
            ],
        );
        let dfa = composer.build();

        assert_eq!(dfa.get_num_states(), 2);
        assert!(dfa.test(&['a']));
        assert!(!dfa.test(&['z']));
    }

    #[test]
    fn test_empty_language() {
        // The end state is never reached from the start.
        let composer = Composer::new(0, 1, vec![Transition::new(1, 0, 'a')]);
        let dfa = composer.build();

        assert_eq!(dfa.get_num_states(), 1);
        assert!(dfa.get_accept_states().is_empty());
        assert!(!dfa.test(&[]));
        assert!(!dfa.test(&['a']));
    }

    #[test]
    fn test_inverse_is_determinized() {
        // (ab | ac) reversed is (ba | ca): two 'a' edges into one state become
        // two 'a' edges out of it.
        let forward = Composer::sequence(['a', 'b']).or(&Composer::sequence(['a', 'c']));
        let dfa = forward.inverse().build();

        assert_deterministic(&dfa);
        assert!(dfa.test(&['b', 'a']));
        assert!(dfa.test(&['c', 'a']));
        assert!(!dfa.test(&['a', 'b']));
        assert!(!dfa.test(&['a']));
    }
}
