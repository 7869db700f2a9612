use std::cmp::Ordering;

use crate::model::Recipe;

/// Direction of a name sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Compare two names byte-wise on their UTF-8 encoding. No locale
/// folding: "apple" sorts after "Zucchini".
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Sort by name in the given direction. Stable, so recipes with equal names
/// keep their relative order.
pub fn sort_by_order(recipes: &mut [Recipe], order: SortOrder) {
    match order {
        SortOrder::Ascending => recipes.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortOrder::Descending => recipes.sort_by(|a, b| compare_names(&b.name, &a.name)),
    }
}

/// Order the next [`sort`] call will apply: descending when the first name
/// starts with an uppercase `A`, ascending otherwise.
pub fn next_order(recipes: &[Recipe]) -> SortOrder {
    match recipes.first() {
        Some(first) if first.name.starts_with('A') => SortOrder::Descending,
        _ => SortOrder::Ascending,
    }
}

/// Toggle-sort by inspecting the first element and return the order applied.
pub fn sort(recipes: &mut [Recipe]) -> SortOrder {
    let order = next_order(recipes);
    sort_by_order(recipes, order);
    order
}
