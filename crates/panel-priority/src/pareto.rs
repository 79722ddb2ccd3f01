//! Pareto dominance, front sorting and crowding distance
//!
//! All objectives are minimized. Sorting uses constrained dominance: a
//! candidate with fewer hard-constraint violations dominates one with more,
//! and equal-violation candidates fall back to plain Pareto dominance.

/// `a` dominates `b` iff `a <= b` everywhere and `a < b` somewhere
#[must_use]
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b) {
        if x > y {
            return false;
        }
        if x < y {
            strictly_better = true;
        }
    }
    strictly_better
}

fn constrained_dominates(a: &[f64], va: usize, b: &[f64], vb: usize) -> bool {
    if va != vb {
        return va < vb;
    }
    dominates(a, b)
}

/// Partition points into successive non-dominated fronts
///
/// Returns indices into `objectives`; front 0 is the best. Within a front,
/// indices keep their input order.
#[must_use]
pub fn sort_fronts(objectives: &[[f64; 5]], violations: &[usize]) -> Vec<Vec<usize>> {
    let n = objectives.len();
    let mut dominated_by_count = vec![0usize; n];
    let mut dominates_list: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            if constrained_dominates(&objectives[i], violations[i], &objectives[j], violations[j])
            {
                dominates_list[i].push(j);
            } else if constrained_dominates(
                &objectives[j],
                violations[j],
                &objectives[i],
                violations[i],
            ) {
                dominated_by_count[i] += 1;
            }
        }
    }

    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| dominated_by_count[i] == 0).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominates_list[i] {
                dominated_by_count[j] -= 1;
                if dominated_by_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }
    fronts
}

/// Crowding distance of each member of `front` (same order as `front`)
///
/// Boundary members on any non-degenerate objective get `f64::INFINITY`.
#[must_use]
pub fn crowding_distance(objectives: &[[f64; 5]], front: &[usize]) -> Vec<f64> {
    let size = front.len();
    let mut distance = vec![0.0; size];
    if size <= 2 {
        return vec![f64::INFINITY; size];
    }

    for m in 0..5 {
        let mut order: Vec<usize> = (0..size).collect();
        order.sort_by(|&a, &b| objectives[front[a]][m].total_cmp(&objectives[front[b]][m]));

        let min = objectives[front[order[0]]][m];
        let max = objectives[front[order[size - 1]]][m];
        let range = max - min;
        if range <= f64::EPSILON {
            continue;
        }
        distance[order[0]] = f64::INFINITY;
        distance[order[size - 1]] = f64::INFINITY;
        for k in 1..size - 1 {
            let gap = objectives[front[order[k + 1]]][m] - objectives[front[order[k - 1]]][m];
            distance[order[k]] += gap / range;
        }
    }
    distance
}
