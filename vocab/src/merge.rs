/// Combination of partial results computed by independent execution units.
///
/// Implementations must be associative and commutative, with the empty value
/// as identity. Callers may merge in any order and any tree shape.
pub trait Merge: Sized {
    fn merge(self, other: Self) -> Self;
}

pub fn merge_all<T, I>(identity: T, parts: I) -> T
where
    T: Merge,
    I: IntoIterator<Item = T>,
{
    parts.into_iter().fold(identity, Merge::merge)
}

// Each round merges neighbours, halving the operands.
pub fn merge_tree<T: Merge>(identity: T, parts: Vec<T>) -> T {
    let mut level = parts;
    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        let mut operands = level.into_iter();
        while let Some(left) = operands.next() {
            next.push(match operands.next() {
                Some(right) => left.merge(right),
                None => left,
            });
        }
        level = next;
    }

    match level.pop() {
        Some(root) => identity.merge(root),
        None => identity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Trace(String);

    impl Merge for Trace {
        fn merge(self, other: Self) -> Self {
            match (self.0.is_empty(), other.0.is_empty()) {
                (true, _) => other,
                (_, true) => self,
                _ => Trace(format!("({} {})", self.0, other.0)),
            }
        }
    }

    fn traces(names: &[&str]) -> Vec<Trace> {
        names.iter().map(|n| Trace(n.to_string())).collect()
    }

    #[test]
    fn fold_is_left_leaning() {
        let merged = merge_all(Trace(String::new()), traces(&["a", "b", "c"]));
        assert_eq!(merged, Trace("((a b) c)".to_owned()));
    }

    #[test]
    fn tree_is_balanced() {
        let merged = merge_tree(Trace(String::new()), traces(&["a", "b", "c", "d", "e"]));
        assert_eq!(merged, Trace("(((a b) (c d)) e)".to_owned()));
    }

    #[test]
    fn empty_yields_identity() {
        assert_eq!(merge_tree(Trace(String::new()), vec![]), Trace(String::new()));
        assert_eq!(merge_all(Trace(String::new()), vec![]), Trace(String::new()));
    }
}
