use rayon::prelude::*;

use crate::{
    Error, Result,
    diff::{edge_bank::Slots, segment::KMove},
    tour::{Edge, adjacency, validate_tour},
};

/// Tour adjacency with `kmove` applied, every node checked to end at degree two.
fn applied_adjacency(tour: &[usize], kmove: &KMove) -> Result<Vec<Slots>> {
    let n = tour.len();
    let mut adj: Vec<Slots> = adjacency(tour)
        .into_iter()
        .map(|[prev, next]| Slots::pair(prev, next))
        .collect();

    for &edge in &kmove.dels {
        let (a, b) = (edge.a(), edge.b());
        if b >= n || !adj[a].remove(b) || !adj[b].remove(a) {
            return Err(Error::consistency(format!(
                "deleted edge {edge} is not in the tour"
            )));
        }
    }
    for &edge in &kmove.adds {
        let (a, b) = (edge.a(), edge.b());
        if b >= n {
            return Err(Error::consistency(format!(
                "added edge {edge} is out of range for {n} nodes"
            )));
        }
        if !adj[a].push(b) || !adj[b].push(a) {
            return Err(Error::consistency(format!(
                "added edge {edge} gives a node more than 2 neighbours"
            )));
        }
    }
    if let Some(node) = adj.iter().position(|slots| slots.len() != 2) {
        return Err(Error::consistency(format!(
            "node {node} has degree {} after the move",
            adj[node].len()
        )));
    }
    Ok(adj)
}

/// Follows the cycle through `tour[0]`, at most `n` nodes.
fn walk_cycle(adj: &[Slots], first: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(adj.len());
    let mut prev = usize::MAX;
    let mut node = first;
    while order.len() < adj.len() {
        order.push(node);
        let &[left, right] = adj[node].as_slice() else {
            break;
        };
        let next = if left != prev { left } else { right };
        prev = node;
        node = next;
        if node == first {
            break;
        }
    }
    order
}

/// Whether applying `kmove` alone to `tour` leaves one Hamiltonian cycle.
pub fn is_feasible(tour: &[usize], kmove: &KMove) -> Result<bool> {
    validate_tour(tour)?;
    let adj = applied_adjacency(tour, kmove)?;
    Ok(walk_cycle(&adj, tour[0]).len() == tour.len())
}

/// Tour order after applying a feasible `kmove`, starting at `tour[0]`.
pub fn apply_kmove(tour: &[usize], kmove: &KMove) -> Result<Vec<usize>> {
    validate_tour(tour)?;
    let adj = applied_adjacency(tour, kmove)?;
    let order = walk_cycle(&adj, tour[0]);
    if order.len() != tour.len() {
        return Err(Error::invalid_input(format!(
            "{} splits the tour; the cycle through node {} covers {} of {} nodes",
            kmove,
            tour[0],
            order.len(),
            tour.len()
        )));
    }
    Ok(order)
}

/// Cost removed minus cost added; positive means the move shortens the tour.
pub fn kmove_gain<C>(kmove: &KMove, cost: C) -> f64
where
    C: Fn(Edge) -> f64,
{
    let removed: f64 = kmove.dels.iter().map(|&e| cost(e)).sum();
    let added: f64 = kmove.adds.iter().map(|&e| cost(e)).sum();
    removed - added
}

/// Keeps the moves that are feasible alone and shorten the tour.
///
/// Moves that are infeasible alone are unioned; the union is kept when it
/// shortens the tour and is itself feasible.
pub fn evaluate<C>(tour: &[usize], kmoves: Vec<KMove>, cost: C) -> Result<Vec<KMove>>
where
    C: Fn(Edge) -> f64 + Sync,
{
    let checked = kmoves
        .par_iter()
        .map(|kmove| -> Result<(bool, f64)> {
            Ok((is_feasible(tour, kmove)?, kmove_gain(kmove, &cost)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut beneficial = Vec::new();
    let mut infeasible = Vec::new();
    let mut infeasible_gain = 0.0;
    for (kmove, (feasible, gain)) in kmoves.into_iter().zip(checked) {
        if feasible {
            if gain > 0.0 {
                beneficial.push(kmove);
            }
        } else {
            infeasible_gain += gain;
            infeasible.push(kmove);
        }
    }

    if infeasible_gain > 0.0 {
        let count = infeasible.len();
        let combined = KMove::combine(infeasible);
        let feasible = is_feasible(tour, &combined)?;
        log::debug!(
            "evaluate.combined: moves={count} gain={infeasible_gain:.3} feasible={feasible}"
        );
        if feasible {
            beneficial.push(combined);
        }
    }

    Ok(beneficial)
}
