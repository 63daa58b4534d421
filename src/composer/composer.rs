use std::hash::Hash;

use super::StateAllocator;
use crate::dfa::DFA;
use crate::nfa::nfa::NFA;

pub type StateId = usize;

/// An edge of a composer graph. `symbol` is `None` for an epsilon edge, which
/// consumes no input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition<S> {
    from: StateId,
    to: StateId,
    symbol: Option<S>,
}

impl<S> Transition<S> {
    pub fn new(from: StateId, to: StateId, symbol: S) -> Self {
        Transition {
            from,
            to,
            symbol: Some(symbol),
        }
    }

    pub fn epsilon(from: StateId, to: StateId) -> Self {
        Transition {
            from,
            to,
            symbol: None,
        }
    }

    pub fn get_from(&self) -> StateId {
        self.from
    }

    pub fn get_to(&self) -> StateId {
        self.to
    }

    pub fn get_symbol(&self) -> Option<&S> {
        self.symbol.as_ref()
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbol.is_none()
    }
}

/// A nondeterministic graph with a single start and a single end state, built
/// by the composition operators below. Every operator leaves its inputs alone
/// and returns a new graph.
///
/// ```
/// use token_automata::composer::Composer;
///
/// // a (b | c)* a
/// let pattern = Composer::chain(&[
///     Composer::unit('a'),
///     Composer::unit('b').or(&Composer::unit('c')).star(),
///     Composer::unit('a'),
/// ]);
/// let dfa = pattern.build();
/// assert!(dfa.test(&['a', 'b', 'c', 'b', 'a']));
/// assert!(!dfa.test(&['a', 'b']));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composer<S> {
    start: StateId,
    end: StateId,
    transitions: Vec<Transition<S>>,
}

impl<S> Composer<S> {
    /// Assembles a graph by hand. Transitions whose source is unreachable from
    /// `start` are kept but never contribute to the built automaton.
    pub fn new(start: StateId, end: StateId, transitions: Vec<Transition<S>>) -> Self {
        Composer {
            start,
            end,
            transitions,
        }
    }

    pub fn get_start(&self) -> StateId {
        self.start
    }

    pub fn get_end(&self) -> StateId {
        self.end
    }

    pub fn get_transitions(&self) -> &[Transition<S>] {
        &self.transitions
    }

    /// Relabels every non-epsilon edge through `f`. Topology and epsilon edges
    /// are unchanged.
    pub fn modify_transitions<T, F>(&self, f: F) -> Composer<T>
    where
        F: Fn(&S) -> T,
    {
        let transitions = self
            .transitions
            .iter()
            .map(|transition| Transition {
                from: transition.from,
                to: transition.to,
                symbol: transition.symbol.as_ref().map(&f),
            })
            .collect();
        Composer {
            start: self.start,
            end: self.end,
            transitions,
        }
    }

    /// Time-reversed graph: every edge flipped, start and end swapped, symbols
    /// relabeled through `f`. The result is usually nondeterministic even when
    /// `self` is not.
    pub fn inverse_with<T, F>(&self, f: F) -> Composer<T>
    where
        F: Fn(&S) -> T,
    {
        let transitions = self
            .transitions
            .iter()
            .map(|transition| Transition {
                from: transition.to,
                to: transition.from,
                symbol: transition.symbol.as_ref().map(&f),
            })
            .collect();
        Composer {
            start: self.end,
            end: self.start,
            transitions,
        }
    }
}

impl<S: Clone> Composer<S> {
    pub fn unit(symbol: S) -> Self {
        Composer {
            start: 0,
            end: 1,
            transitions: vec![Transition::new(0, 1, symbol)],
        }
    }

    /// Concatenation. With no operands the result is a single state that is
    /// both start and end, which accepts only the empty sequence.
    pub fn chain<'a, I>(graphs: I) -> Self
    where
        I: IntoIterator<Item = &'a Composer<S>>,
        S: 'a,
    {
        let mut floor = 0;
        let mut chained: Option<Composer<S>> = None;
        for graph in graphs {
            let mut allocator = StateAllocator::new(floor);
            let graph = graph.remap(&mut allocator);
            floor = allocator.next_free();

            chained = Some(match chained {
                None => graph,
                Some(mut prefix) => {
                    prefix
                        .transitions
                        .push(Transition::epsilon(prefix.end, graph.start));
                    prefix.transitions.extend(graph.transitions);
                    prefix.end = graph.end;
                    prefix
                }
            });
        }
        chained.unwrap_or_else(|| Composer::new(0, 0, Vec::new()))
    }

    /// Chain of one `unit` per symbol.
    pub fn sequence<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let units: Vec<Composer<S>> = symbols.into_iter().map(Composer::unit).collect();
        Composer::chain(&units)
    }

    pub fn or(&self, rhs: &Composer<S>) -> Self {
        let mut allocator = StateAllocator::new(0);
        let start = allocator.fresh();
        let end = allocator.fresh();

        let mut lhs_allocator = StateAllocator::new(allocator.next_free());
        let lhs = self.remap(&mut lhs_allocator);
        let mut rhs_allocator = StateAllocator::new(lhs_allocator.next_free());
        let rhs = rhs.remap(&mut rhs_allocator);

        let mut transitions = Vec::with_capacity(lhs.transitions.len() + rhs.transitions.len() + 4);
        transitions.push(Transition::epsilon(start, lhs.start));
        transitions.push(Transition::epsilon(start, rhs.start));
        transitions.extend(lhs.transitions);
        transitions.extend(rhs.transitions);
        transitions.push(Transition::epsilon(lhs.end, end));
        transitions.push(Transition::epsilon(rhs.end, end));

        Composer {
            start,
            end,
            transitions,
        }
    }

    /// Left fold of `or` over the operands; `None` when there are none.
    pub fn union<'a, I>(graphs: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Composer<S>>,
        S: 'a,
    {
        let mut graphs = graphs.into_iter();
        let first = graphs.next()?.clone();
        Some(graphs.fold(first, |union, graph| union.or(graph)))
    }

    /// Zero or one occurrence.
    pub fn maybe(&self) -> Self {
        self.bridge(true, false)
    }

    /// One or more occurrences.
    pub fn plus(&self) -> Self {
        self.bridge(false, true)
    }

    /// Zero or more occurrences.
    pub fn star(&self) -> Self {
        self.plus().maybe()
    }

    pub fn inverse(&self) -> Self {
        self.inverse_with(S::clone)
    }

    // Wraps `self` between a new start and end. `skip` adds start -> end,
    // `repeat` adds inner end -> inner start.
    fn bridge(&self, skip: bool, repeat: bool) -> Self {
        let mut allocator = StateAllocator::new(0);
        let start = allocator.fresh();
        let end = allocator.fresh();

        let mut inner_allocator = StateAllocator::new(allocator.next_free());
        let inner = self.remap(&mut inner_allocator);

        let mut transitions = Vec::with_capacity(inner.transitions.len() + 4);
        transitions.push(Transition::epsilon(start, inner.start));
        transitions.extend(inner.transitions);
        transitions.push(Transition::epsilon(inner.end, end));
        if skip {
            transitions.push(Transition::epsilon(start, end));
        }
        if repeat {
            transitions.push(Transition::epsilon(inner.end, inner.start));
        }

        Composer {
            start,
            end,
            transitions,
        }
    }

    fn remap(&self, allocator: &mut StateAllocator) -> Self {
        let start = allocator.get(self.start);
        let end = allocator.get(self.end);
        let transitions = self
            .transitions
            .iter()
            .map(|transition| Transition {
                from: allocator.get(transition.from),
                to: allocator.get(transition.to),
                symbol: transition.symbol.clone(),
            })
            .collect();
        Composer {
            start,
            end,
            transitions,
        }
    }
}

impl<S: Clone + Eq + Hash> Composer<S> {
    /// Determinizes the graph. A fresh NFA and DFA are built on every call.
    pub fn build(&self) -> DFA<S> {
        let nfa = NFA::from_composer(self);
        DFA::from_nfa(&nfa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn state_ids<S>(graph: &Composer<S>) -> HashSet<StateId> {
        let mut ids = HashSet::new();
        ids.insert(graph.get_start());
        ids.insert(graph.get_end());
        for transition in graph.get_transitions() {
            ids.insert(transition.get_from());
            ids.insert(transition.get_to());
        }
        ids
    }

    fn count_epsilons<S>(graph: &Composer<S>) -> usize {
        graph
            .get_transitions()
            .iter()
            .filter(|transition| transition.is_epsilon())
            .count()
    }

    #[test]
    fn test_unit() {
        let unit = Composer::unit('a');
        assert_eq!(unit.get_start(), 0);
        assert_eq!(unit.get_end(), 1);
        assert_eq!(unit.get_transitions(), &[Transition::new(0, 1, 'a')]);
    }

    #[test]
    fn test_empty_chain_is_degenerate() {
        let empty: Composer<char> = Composer::chain(&[]);
        assert_eq!(empty.get_start(), empty.get_end());
        assert!(empty.get_transitions().is_empty());
    }

    #[test]
    fn test_chain_keeps_operands_disjoint() {
        let a = Composer::unit('a');
        let chained = Composer::chain(&[a.clone(), a.clone(), a.clone()]);

        assert_eq!(state_ids(&chained).len(), 6);
        assert_eq!(chained.get_transitions().len(), 5);
        assert_eq!(count_epsilons(&chained), 2);
        assert_ne!(chained.get_start(), chained.get_end());

        // Operands are untouched.
        assert_eq!(a, Composer::unit('a'));
    }

    #[test]
    fn test_or_wiring() {
        let union = Composer::unit('a').or(&Composer::unit('b'));

        assert_eq!(state_ids(&union).len(), 6);
        assert_eq!(count_epsilons(&union), 4);
        let from_start: Vec<&Transition<char>> = union
            .get_transitions()
            .iter()
            .filter(|transition| transition.get_from() == union.get_start())
            .collect();
        assert_eq!(from_start.len(), 2);
        assert!(from_start.iter().all(|transition| transition.is_epsilon()));
        let into_end = union
            .get_transitions()
            .iter()
            .filter(|transition| transition.get_to() == union.get_end())
            .count();
        assert_eq!(into_end, 2);
    }

    #[test]
    fn test_bridges() {
        let a = Composer::unit('a');

        let maybe = a.maybe();
        assert!(maybe
            .get_transitions()
            .contains(&Transition::epsilon(maybe.get_start(), maybe.get_end())));
        assert_eq!(count_epsilons(&maybe), 3);

        let plus = a.plus();
        assert!(!plus
            .get_transitions()
            .contains(&Transition::epsilon(plus.get_start(), plus.get_end())));
        assert!(plus.get_transitions().contains(&Transition::epsilon(3, 2)));
        assert_eq!(count_epsilons(&plus), 3);

        assert_eq!(a.star(), a.plus().maybe());
    }

    #[test]
    fn test_modify_transitions_keeps_topology() {
        let graph = Composer::sequence(['a', 'b']).star();
        let relabeled = graph.modify_transitions(|c| c.to_ascii_uppercase());

        assert_eq!(relabeled.get_start(), graph.get_start());
        assert_eq!(relabeled.get_end(), graph.get_end());
        assert_eq!(relabeled.get_transitions().len(), graph.get_transitions().len());
        for (old, new) in graph.get_transitions().iter().zip(relabeled.get_transitions()) {
            assert_eq!(old.get_from(), new.get_from());
            assert_eq!(old.get_to(), new.get_to());
            assert_eq!(
                old.get_symbol().map(|c| c.to_ascii_uppercase()),
                new.get_symbol().copied()
            );
        }
    }

    #[test]
    fn test_inverse_flips_edges() {
        let graph = Composer::sequence([1u8, 2, 3]);
        let reversed = graph.inverse_with(|n| n * 10);

        assert_eq!(reversed.get_start(), graph.get_end());
        assert_eq!(reversed.get_end(), graph.get_start());
        for (old, new) in graph.get_transitions().iter().zip(reversed.get_transitions()) {
            assert_eq!(old.get_from(), new.get_to());
            assert_eq!(old.get_to(), new.get_from());
            assert_eq!(old.get_symbol().map(|n| n * 10), new.get_symbol().copied());
        }
        assert_eq!(reversed.inverse_with(|n| n / 10), graph);
    }

    #[test]
    fn test_union_of_nothing() {
        let nothing: Vec<Composer<char>> = Vec::new();
        assert!(Composer::union(&nothing).is_none());

        let single = vec![Composer::unit('x')];
        assert_eq!(Composer::union(&single), Some(Composer::unit('x')));
    }
}
