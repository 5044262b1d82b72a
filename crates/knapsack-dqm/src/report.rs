use std::fmt;

use crate::items::Items;
use crate::solve::KnapsackSolution;

/// Totals for one selected item
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedItem {
    pub index: usize,
    pub quantity: usize,
    pub weight: f64,
    pub cost: f64,
    pub total_weight: f64,
    pub total_cost: f64,
}

/// Per-item breakdown of a solution
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub energy: f64,
    pub items: Vec<SelectedItem>,
    pub total_weight: f64,
    pub total_cost: f64,
}

impl Report {
    /// Selected indices missing from `items` are skipped
    pub fn new(solution: &KnapsackSolution, items: &Items) -> Self {
        let selected: Vec<SelectedItem> = solution
            .selected
            .iter()
            .filter_map(|(&index, &quantity)| {
                let item = items.get(index)?;
                Some(SelectedItem {
                    index,
                    quantity,
                    weight: item.weight,
                    cost: item.cost,
                    total_weight: item.weight * quantity as f64,
                    total_cost: item.cost * quantity as f64,
                })
            })
            .collect();

        Self {
            energy: solution.energy,
            total_weight: selected.iter().map(|s| s.total_weight).sum(),
            total_cost: selected.iter().map(|s| s.total_cost).sum(),
            items: selected,
        }
    }
}

fn list<'a>(values: impl Iterator<Item = &'a f64>) -> String {
    let parts: Vec<String> = values.map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found solution at energy {:?}", self.energy)?;

        let pairs: Vec<String> = self
            .items
            .iter()
            .map(|s| format!("{}: {}", s.index, s.quantity))
            .collect();
        writeln!(
            f,
            "Selected item numbers (0-indexed) and corresponding number of items: {{{}}}",
            pairs.join(", ")
        )?;

        writeln!(
            f,
            "Selected item weights: {}, selected item weights times number of each item: {}, total = {}",
            list(self.items.iter().map(|s| &s.weight)),
            list(self.items.iter().map(|s| &s.total_weight)),
            self.total_weight
        )?;
        write!(
            f,
            "Selected item costs: {}, selected item costs times number of each item: {}, total = {}",
            list(self.items.iter().map(|s| &s.cost)),
            list(self.items.iter().map(|s| &s.total_cost)),
            self.total_cost
        )
    }
}
