use itertools::Itertools;

/// Every (left, right) pair, left-outer and right-inner. No dedup.
pub fn cartesian_product<'a, L, R>(
    left: &'a [L],
    right: &'a [R],
) -> impl Iterator<Item = (&'a L, &'a R)> + 'a {
    left.iter().cartesian_product(right.iter())
}
