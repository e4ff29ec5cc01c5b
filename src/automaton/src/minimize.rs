//! Trimming, Hopcroft partition refinement and canonical renumbering

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::automaton::{boundaries, push_merged, Automaton, State, Transition};

/// Minimizes a deterministic automaton given as a raw state arena
///
/// State 0 must be the initial state. States that cannot reach an accepting
/// state are dropped, equivalent states are merged and the result is
/// renumbered breadth-first so equal languages yield equal automata.
pub(crate) fn minimize(states: Vec<State>) -> Automaton {
    let live = live_states(&states);
    if !live[0] {
        return Automaton::empty();
    }

    let classes = refine(&states, &live);
    quotient(&states, &classes)
}

/// Marks states from which some accepting state is reachable
fn live_states(states: &[State]) -> Vec<bool> {
    let mut reverse: Vec<Vec<u32>> = vec![Vec::new(); states.len()];
    for (from, state) in states.iter().enumerate() {
        for t in &state.transitions {
            reverse[t.to as usize].push(from as u32);
        }
    }

    let mut live = vec![false; states.len()];
    let mut stack: Vec<u32> = Vec::new();
    for (id, state) in states.iter().enumerate() {
        if state.accept {
            live[id] = true;
            stack.push(id as u32);
        }
    }

    while let Some(id) = stack.pop() {
        for &from in &reverse[id as usize] {
            if !live[from as usize] {
                live[from as usize] = true;
                stack.push(from);
            }
        }
    }

    live
}

/// Transitions of `state` restricted to live targets and expressed in classes
fn signature(state: &State, live: &[bool], classes: &[u32]) -> Vec<Transition> {
    let mut merged = Vec::with_capacity(state.transitions.len());
    for t in &state.transitions {
        if live[t.to as usize] {
            push_merged(&mut merged, t.min, t.max, classes[t.to as usize]);
        }
    }
    merged
}

/// Refinable partition of the live states
///
/// Members of a block are contiguous in `elements`; marked members sit at the
/// front of their block.
struct Partition {
    elements: Vec<u32>,
    location: Vec<usize>,
    block_of: Vec<u32>,
    first: Vec<usize>,
    end: Vec<usize>,
    marked: Vec<usize>,
    touched: Vec<u32>,
}

impl Partition {
    /// Live accepting states form one block, live rejecting states another
    fn new(states: &[State], live: &[bool]) -> Self {
        let mut partition = Self {
            elements: Vec::new(),
            location: vec![0; states.len()],
            block_of: vec![u32::MAX; states.len()],
            first: Vec::new(),
            end: Vec::new(),
            marked: Vec::new(),
            touched: Vec::new(),
        };

        for accept in [true, false] {
            let start = partition.elements.len();
            let block = partition.first.len() as u32;
            for (id, state) in states.iter().enumerate() {
                if live[id] && state.accept == accept {
                    partition.location[id] = partition.elements.len();
                    partition.block_of[id] = block;
                    partition.elements.push(id as u32);
                }
            }
            if partition.elements.len() > start {
                partition.first.push(start);
                partition.end.push(partition.elements.len());
                partition.marked.push(0);
            }
        }
        partition
    }

    fn len(&self) -> usize {
        self.first.len()
    }

    fn members(&self, block: u32) -> &[u32] {
        &self.elements[self.first[block as usize]..self.end[block as usize]]
    }

    fn mark(&mut self, state: u32) {
        let block = self.block_of[state as usize] as usize;
        let boundary = self.first[block] + self.marked[block];
        let loc = self.location[state as usize];
        if loc < boundary {
            return;
        }

        let other = self.elements[boundary];
        self.elements.swap(loc, boundary);
        self.location[other as usize] = loc;
        self.location[state as usize] = boundary;

        if self.marked[block] == 0 {
            self.touched.push(block as u32);
        }
        self.marked[block] += 1;
    }

    /// Splits every partially marked block; returns `(old, new)` pairs
    fn split(&mut self) -> Vec<(u32, u32)> {
        let mut splits = Vec::new();
        for block in std::mem::take(&mut self.touched) {
            let b = block as usize;
            let marked = std::mem::replace(&mut self.marked[b], 0);
            if marked == self.end[b] - self.first[b] {
                continue;
            }

            let new = self.first.len() as u32;
            let start = self.first[b];
            self.first.push(start);
            self.end.push(start + marked);
            self.marked.push(0);
            self.first[b] = start + marked;
            for &state in &self.elements[start..start + marked] {
                self.block_of[state as usize] = new;
            }
            splits.push((block, new));
        }
        splits
    }
}

/// Hopcroft refinement; returns the equivalence class of every live state
///
/// The alphabet is cut into the intervals delimited by all range boundaries.
/// Transitions into dead states are dropped, so the automaton is partial and
/// every initial block starts out pending for every interval. Dead states
/// keep class `u32::MAX` and are never referenced.
fn refine(states: &[State], live: &[bool]) -> Vec<u32> {
    let points = boundaries(
        states
            .iter()
            .zip(live)
            .filter(|(_, l)| **l)
            .flat_map(|(s, _)| s.transitions.iter())
            .filter(|t| live[t.to as usize]),
    );
    let interval = |code: u32| points.partition_point(|&p| p <= code) - 1;

    // (interval, source) pairs per target, sorted by interval
    let mut reverse: Vec<Vec<(u32, u32)>> = vec![Vec::new(); states.len()];
    for (from, state) in states.iter().enumerate() {
        if !live[from] {
            continue;
        }
        for t in &state.transitions {
            if live[t.to as usize] {
                for class in interval(t.min)..=interval(t.max) {
                    reverse[t.to as usize].push((class as u32, from as u32));
                }
            }
        }
    }
    for edges in &mut reverse {
        edges.sort_unstable();
    }

    let mut partition = Partition::new(states, live);
    let all: BTreeSet<u32> = (0..points.len() as u32).collect();
    let mut pending: Vec<BTreeSet<u32>> = vec![all; partition.len()];
    let mut worklist: Vec<u32> = (0..partition.len() as u32).collect();

    while let Some(&block) = worklist.last() {
        let class = match pending[block as usize].pop_first() {
            Some(class) => class,
            None => {
                worklist.pop();
                continue;
            }
        };

        let splitter = partition.members(block).to_vec();
        for target in splitter {
            let edges = &reverse[target as usize];
            let lo = edges.partition_point(|&(c, _)| c < class);
            for &(c, from) in &edges[lo..] {
                if c != class {
                    break;
                }
                partition.mark(from);
            }
        }

        for (old, new) in partition.split() {
            let inherited = pending[old as usize].clone();
            let smaller = if partition.members(old).len() <= partition.members(new).len() {
                old
            } else {
                new
            };

            let mut incoming = BTreeSet::new();
            for &state in partition.members(smaller) {
                incoming.extend(reverse[state as usize].iter().map(|&(c, _)| c));
            }

            pending.push(inherited.clone());
            for class in incoming {
                if !inherited.contains(&class) {
                    pending[smaller as usize].insert(class);
                }
            }
            worklist.push(old);
            worklist.push(new);
        }
    }

    partition.block_of
}

/// Builds the quotient automaton, numbering classes breadth-first
fn quotient(states: &[State], classes: &[u32]) -> Automaton {
    let live: Vec<bool> = classes.iter().map(|&c| c != u32::MAX).collect();

    let mut representative: HashMap<u32, usize> = HashMap::new();
    for (id, &class) in classes.iter().enumerate() {
        if class != u32::MAX {
            representative.entry(class).or_insert(id);
        }
    }

    let mut numbering: HashMap<u32, u32> = HashMap::new();
    let mut order: VecDeque<u32> = VecDeque::new();
    let mut result: Vec<State> = Vec::with_capacity(representative.len());

    numbering.insert(classes[0], 0);
    order.push_back(classes[0]);

    while let Some(class) = order.pop_front() {
        let rep = &states[representative[&class]];
        let mut out = State::new(rep.accept);
        for t in signature(rep, &live, classes) {
            let next_id = numbering.len() as u32;
            let to = *numbering.entry(t.to).or_insert_with(|| {
                order.push_back(t.to);
                next_id
            });
            push_merged(&mut out.transitions, t.min, t.max, to);
        }
        result.push(out);
    }

    Automaton::from_states(result)
}
