//! Precedence graph helpers over activity indices.

/// Depth-first search along predecessor edges (`predecessors[i]` lists the
/// activities `i` waits on). Returns the first cycle found as indices,
/// starting and ending with the same activity.
pub(crate) fn find_cycle(predecessors: &[Vec<usize>]) -> Option<Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; predecessors.len()];
    let mut path = Vec::new();

    (0..predecessors.len()).find_map(|start| {
        if marks[start] == Mark::Unvisited {
            visit(start, predecessors, &mut marks, &mut path)
        } else {
            None
        }
    })
}

fn visit(
    node: usize,
    predecessors: &[Vec<usize>],
    marks: &mut [Mark],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    marks[node] = Mark::InProgress;
    path.push(node);

    for &next in &predecessors[node] {
        match marks[next] {
            Mark::InProgress => {
                let from = path.iter().position(|&p| p == next)?;
                let mut cycle = path[from..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(next, predecessors, marks, path) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
    }

    path.pop();
    marks[node] = Mark::Done;
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}
