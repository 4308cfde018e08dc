//! Cycle detection over the `target -> sources` adjacency.

use crate::graph::GraphIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnStack,
    Done,
}

/// Depth-first search with an explicit stack. Returns the first node found to be
/// revisited while still on the stack; the search stops there.
pub(crate) fn find_cycle(index: &GraphIndex<'_>) -> Option<usize> {
    let mut state = vec![VisitState::Unvisited; index.len()];
    // (node, position of the next dependency to explore)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..index.len() {
        if state[root] != VisitState::Unvisited {
            continue;
        }
        state[root] = VisitState::OnStack;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            match index.dependencies(node).get(next) {
                Some(&dep) => {
                    frame.1 += 1;
                    match state[dep] {
                        VisitState::OnStack => return Some(dep),
                        VisitState::Unvisited => {
                            state[dep] = VisitState::OnStack;
                            stack.push((dep, 0));
                        }
                        VisitState::Done => {}
                    }
                }
                None => {
                    state[node] = VisitState::Done;
                    stack.pop();
                }
            }
        }
    }

    None
}
