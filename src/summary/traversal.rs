//! Lazy enumeration of group-by paths.
//!
//! Both the summary table and the trend fitter walk the cartesian product of the
//! values of every variate except the last one. `GroupPaths` does this with an
//! explicit work stack, so the walk depth is bounded by the heap rather than the
//! call stack, and yields paths in the same order as a depth-first recursion that
//! visits values in ascending lexicographic order.

use crate::domain::CompleteTrial;

#[derive(Debug, Clone)]
struct Frame {
    depth: usize,
    path: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GroupPaths<'a> {
    levels: Vec<&'a [String]>,
    stack: Vec<Frame>,
}

impl<'a> GroupPaths<'a> {
    /// `levels[d]` are the candidate values at depth `d`, already sorted.
    pub fn new(levels: Vec<&'a [String]>) -> Self {
        Self {
            levels,
            stack: vec![Frame {
                depth: 0,
                path: Vec::new(),
            }],
        }
    }
}

impl Iterator for GroupPaths<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            if frame.depth == self.levels.len() {
                return Some(frame.path);
            }
            // Reverse push so the smallest value is popped first.
            for value in self.levels[frame.depth].iter().rev() {
                let mut path = Vec::with_capacity(frame.depth + 1);
                path.extend(frame.path.iter().cloned());
                path.push(value.clone());
                self.stack.push(Frame {
                    depth: frame.depth + 1,
                    path,
                });
            }
        }
        None
    }
}

/// Does `trial` carry `path[i]` for every `keys[i]`?
pub fn matches_path(trial: &CompleteTrial, keys: &[&str], path: &[String]) -> bool {
    keys.iter()
        .zip(path)
        .all(|(key, want)| trial.parameter(key) == Some(want.as_str()))
}
