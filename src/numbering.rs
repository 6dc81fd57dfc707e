use std::fmt;

/// Position of one label inside the sequence and inside its group.
///
/// Grouping only renumbers the printed text. It never reorders anything:
/// aligner 6 of 10 sits in the same sheet slot whether it reads `6 of 10`
/// or `2.1 of 2.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayNumber {
    pub index: u32,
    pub total: u32,
    pub group: u32,
    pub item_in_group: u32,
    pub group_count: u32,
    pub items_per_group: u32,
}

impl DisplayNumber {
    /// File-name fragment for per-group artifacts, `"2.1"` style.
    pub fn group_tag(&self) -> String {
        format!("{}.{}", self.group, self.item_in_group)
    }
}

impl fmt::Display for DisplayNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group_count <= 1 {
            write!(f, "{} of {}", self.index, self.total)
        } else {
            write!(
                f,
                "{}.{} of {}.{}",
                self.group, self.item_in_group, self.group_count, self.items_per_group
            )
        }
    }
}

/// Renumber a 1-based sequence index into `group_count` equal groups.
///
/// Groups are filled in order and every group advertises the same capacity,
/// so the last group may run short when the total does not divide evenly.
pub fn display_number(index: u32, total: u32, group_count: u32) -> DisplayNumber {
    let group_count = group_count.max(1);
    let items_per_group = total.div_ceil(group_count).max(1);
    let group = index.div_ceil(items_per_group);
    let item_in_group = (index.saturating_sub(1)) % items_per_group + 1;
    DisplayNumber {
        index,
        total,
        group,
        item_in_group,
        group_count,
        items_per_group,
    }
}
