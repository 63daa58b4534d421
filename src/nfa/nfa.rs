use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::composer::{Composer, StateId};

// States live in `NFA::states`; every `usize` below is an index into it.
pub struct State<S> {
    id: StateId,
    successors: IndexMap<S, IndexSet<usize>>,
    epsilon_successors: IndexSet<usize>,
}

impl<S: Eq + Hash> State<S> {
    fn new(id: StateId) -> Self {
        State {
            id,
            successors: IndexMap::new(),
            epsilon_successors: IndexSet::new(),
        }
    }

    pub fn get_id(&self) -> StateId {
        self.id
    }

    pub fn get_successors(&self, symbol: &S) -> Option<&IndexSet<usize>> {
        self.successors.get(symbol)
    }

    pub fn get_transitions(&self) -> impl Iterator<Item = (&S, &IndexSet<usize>)> {
        self.successors.iter()
    }

    pub fn get_epsilon_successors(&self) -> &IndexSet<usize> {
        &self.epsilon_successors
    }
}

pub struct NFA<S> {
    start: usize,
    accept: usize,
    states: Vec<State<S>>,
    state_index: HashMap<StateId, usize>,
}

impl<S: Clone + Eq + Hash> NFA<S> {
    /// One pass over the composer's transitions. A state is created the first
    /// time its id shows up, whether or not it is reachable from the start.
    pub fn from_composer(composer: &Composer<S>) -> Self {
        let mut nfa = NFA {
            start: 0,
            accept: 0,
            states: Vec::new(),
            state_index: HashMap::new(),
        };
        nfa.start = nfa.get_or_create_state(composer.get_start());
        nfa.accept = nfa.get_or_create_state(composer.get_end());

        for transition in composer.get_transitions() {
            let from = nfa.get_or_create_state(transition.get_from());
            let to = nfa.get_or_create_state(transition.get_to());
            match transition.get_symbol() {
                None => {
                    nfa.states[from].epsilon_successors.insert(to);
                }
                Some(symbol) => {
                    nfa.states[from]
                        .successors
                        .entry(symbol.clone())
                        .or_default()
                        .insert(to);
                }
            }
        }

        debug!(
            "built NFA with {} states from {} transitions",
            nfa.states.len(),
            composer.get_transitions().len()
        );
        nfa
    }

    fn get_or_create_state(&mut self, id: StateId) -> usize {
        if let Some(idx) = self.state_index.get(&id) {
            return *idx;
        }
        let idx = self.states.len();
        self.states.push(State::new(id));
        self.state_index.insert(id, idx);
        idx
    }
}

impl<S> NFA<S> {
    pub fn get_start(&self) -> usize {
        self.start
    }

    pub fn get_accept(&self) -> usize {
        self.accept
    }

    pub fn get_states(&self) -> &[State<S>] {
        &self.states
    }

    pub fn get_state(&self, idx: usize) -> &State<S> {
        &self.states[idx]
    }

    pub fn get_state_by_id(&self, id: StateId) -> Option<&State<S>> {
        self.state_index.get(&id).map(|idx| &self.states[*idx])
    }

    /// Every state reachable from `seeds` through epsilon edges alone, seeds
    /// included, ordered by state id. Equal sets always yield equal vectors.
    pub fn epsilon_closure(&self, seeds: &[usize]) -> Vec<usize> {
        let mut closure: IndexSet<usize> = seeds.iter().copied().collect();
        let mut pending: Vec<usize> = closure.iter().copied().collect();

        while let Some(idx) = pending.pop() {
            for successor in self.states[idx].epsilon_successors.iter() {
                if closure.insert(*successor) {
                    pending.push(*successor);
                }
            }
        }

        let mut closure: Vec<usize> = closure.into_iter().collect();
        closure.sort_by_key(|idx| self.states[*idx].id);
        closure
    }
}

impl<S: Debug> Debug for NFA<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "NFA( start: {}, accept: {}, transitions: {{",
            self.states[self.start].id, self.states[self.accept].id
        )?;
        for state in &self.states {
            for (symbol, successors) in state.successors.iter() {
                for successor in successors {
                    writeln!(
                        f,
                        "\t{} -> {}, symbol: {:?}",
                        state.id, self.states[*successor].id, symbol
                    )?;
                }
            }
            for successor in state.epsilon_successors.iter() {
                writeln!(
                    f,
                    "\t{} -> {}, symbol: epsilon",
                    state.id, self.states[*successor].id
                )?;
            }
        }
        write!(f, "}} )")
    }
}
