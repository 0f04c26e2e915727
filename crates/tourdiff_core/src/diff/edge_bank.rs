use std::{collections::BTreeSet, fmt};

use crate::{Error, Result, tour::Edge};

/// Up to two neighbour ids of one node; removal compacts the remaining slot to the front.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Slots {
    ends: [usize; 2],
    len: u8,
}

impl Slots {
    pub(crate) fn pair(a: usize, b: usize) -> Self {
        Self {
            ends: [a, b],
            len: 2,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn as_slice(&self) -> &[usize] {
        &self.ends[..self.len()]
    }

    /// Returns `false` when both slots are taken.
    pub(crate) fn push(&mut self, node: usize) -> bool {
        if self.len() == 2 {
            return false;
        }
        self.ends[self.len()] = node;
        self.len += 1;
        true
    }

    /// Takes the most recently stored neighbour.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.ends[self.len()])
    }

    /// Removes the first occurrence of `node`; `false` if it is not present.
    pub(crate) fn remove(&mut self, node: usize) -> bool {
        let Some(pos) = self.as_slice().iter().position(|&x| x == node) else {
            return false;
        };
        if pos == 0 && self.len == 2 {
            self.ends[0] = self.ends[1];
        }
        self.len -= 1;
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EdgeKind {
    Del,
    Add,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Del => "deletion",
            Self::Add => "addition",
        })
    }
}

/// Working deletion and addition multigraphs of one tour difference.
///
/// Every node holds at most two edges of each kind. Nodes that start with two
/// edges of either kind are junctions, and stay tagged until evicted even
/// after their edges are consumed. Pops are destructive, so a bank serves
/// exactly one decomposition.
#[derive(Debug)]
pub struct EdgeBank {
    delmap: Vec<Slots>,
    addmap: Vec<Slots>,
    junctions: BTreeSet<usize>,
    add_cursor: usize,
    del_cursor: usize,
}

impl EdgeBank {
    pub fn new(node_count: usize, dels: &[Edge], adds: &[Edge]) -> Result<Self> {
        let delmap = Self::edge_map(node_count, dels, EdgeKind::Del)?;
        let addmap = Self::edge_map(node_count, adds, EdgeKind::Add)?;
        let junctions = (0..node_count)
            .filter(|&node| delmap[node].len() == 2 || addmap[node].len() == 2)
            .collect();

        Ok(Self {
            delmap,
            addmap,
            junctions,
            add_cursor: 0,
            del_cursor: 0,
        })
    }

    fn edge_map(node_count: usize, edges: &[Edge], kind: EdgeKind) -> Result<Vec<Slots>> {
        let mut map = vec![Slots::default(); node_count];
        for &edge in edges {
            let (a, b) = (edge.a(), edge.b());
            if a == b {
                return Err(Error::consistency(format!("{kind} edge {edge} is a self loop")));
            }
            if b >= node_count {
                return Err(Error::consistency(format!(
                    "{kind} edge {edge} is out of range for {node_count} nodes"
                )));
            }
            for (from, to) in [(a, b), (b, a)] {
                if !map[from].push(to) {
                    return Err(Error::consistency(format!(
                        "node {from} has more than 2 {kind} edges"
                    )));
                }
            }
        }
        Ok(map)
    }

    fn map_mut(&mut self, kind: EdgeKind) -> &mut Vec<Slots> {
        match kind {
            EdgeKind::Del => &mut self.delmap,
            EdgeKind::Add => &mut self.addmap,
        }
    }

    fn pop(&mut self, kind: EdgeKind, start: usize) -> Result<(usize, usize)> {
        let map = self.map_mut(kind);
        let end = map
            .get_mut(start)
            .and_then(Slots::pop)
            .ok_or_else(|| Error::consistency(format!("no {kind} edge left at node {start}")))?;
        if !map[end].remove(start) {
            return Err(Error::consistency(format!(
                "{kind} edge ({start},{end}) is missing its back reference"
            )));
        }
        Ok((start, end))
    }

    /// Pops an addition edge incident to `start`, returned as `(start, end)`.
    pub fn pop_add(&mut self, start: usize) -> Result<(usize, usize)> {
        self.pop(EdgeKind::Add, start)
    }

    /// Pops a deletion edge incident to `start`, returned as `(start, end)`.
    pub fn pop_del(&mut self, start: usize) -> Result<(usize, usize)> {
        self.pop(EdgeKind::Del, start)
    }

    /// Lowest node with an addition edge left, else lowest with a deletion edge left.
    pub fn random_start(&mut self) -> Option<usize> {
        // Nodes only ever lose edges, so the cursors never need to move back.
        while self.add_cursor < self.addmap.len() && self.addmap[self.add_cursor].is_empty() {
            self.add_cursor += 1;
        }
        if self.add_cursor < self.addmap.len() {
            return Some(self.add_cursor);
        }
        while self.del_cursor < self.delmap.len() && self.delmap[self.del_cursor].is_empty() {
            self.del_cursor += 1;
        }
        (self.del_cursor < self.delmap.len()).then_some(self.del_cursor)
    }

    #[inline]
    pub fn has_add(&self, node: usize) -> bool {
        self.addmap.get(node).is_some_and(|s| !s.is_empty())
    }

    #[inline]
    pub fn has_del(&self, node: usize) -> bool {
        self.delmap.get(node).is_some_and(|s| !s.is_empty())
    }

    #[inline]
    pub fn has_node(&self, node: usize) -> bool {
        self.has_add(node) || self.has_del(node)
    }

    #[inline]
    pub fn is_junction(&self, node: usize) -> bool {
        self.junctions.contains(&node)
    }

    pub fn first_junction(&self) -> Option<usize> {
        self.junctions.first().copied()
    }

    pub fn evict_junction(&mut self, node: usize) -> bool {
        self.junctions.remove(&node)
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn remaining_adds(&self) -> usize {
        self.addmap.iter().map(Slots::len).sum::<usize>() / 2
    }

    pub fn remaining_dels(&self) -> usize {
        self.delmap.iter().map(Slots::len).sum::<usize>() / 2
    }
}
