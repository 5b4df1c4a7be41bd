//! Lazy adjacent-pair iteration

/// Iterator over consecutive pairs `(a, b), (b, c), ...` of an inner iterator
#[derive(Debug, Clone)]
pub struct Pairwise<I: Iterator> {
    iter: I,
    prev: Option<I::Item>,
}

impl<I> Iterator for Pairwise<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = (I::Item, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        let prev = match self.prev.take() {
            Some(prev) => prev,
            None => self.iter.next()?,
        };
        let next = self.iter.next()?;
        self.prev = Some(next.clone());
        Some((prev, next))
    }
}

/// Pair up consecutive items. Fewer than two items yield nothing.
pub fn pairwise<I>(iter: I) -> Pairwise<I::IntoIter>
where
    I: IntoIterator,
    I::Item: Clone,
{
    Pairwise {
        iter: iter.into_iter(),
        prev: None,
    }
}

/// True when `key` strictly decreases across `items`
pub fn is_strictly_descending_by<T, K, F>(items: &[T], key: F) -> bool
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    pairwise(items.iter()).all(|(a, b)| key(a) > key(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_of_sequence() {
        let pairs: Vec<(i32, i32)> = pairwise(vec![1, 2, 3, 4]).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn test_short_sequences_yield_nothing() {
        assert_eq!(pairwise(Vec::<i32>::new()).count(), 0);
        assert_eq!(pairwise(vec![7]).count(), 0);
    }

    #[test]
    fn test_pairwise_is_lazy() {
        let mut pulled = 0;
        let source = (0..).inspect(|_| pulled += 1);
        let first: Vec<(i32, i32)> = pairwise(source).take(2).collect();
        assert_eq!(first, vec![(0, 1), (1, 2)]);
        assert_eq!(pulled, 3);
    }

    #[test]
    fn test_strictly_descending() {
        assert!(is_strictly_descending_by(&[9, 5, 2], |v| *v));
        assert!(!is_strictly_descending_by(&[9, 9, 2], |v| *v));
        assert!(!is_strictly_descending_by(&[1, 2], |v| *v));
        assert!(is_strictly_descending_by::<i32, i32, _>(&[], |v| *v));
    }
}
