use crate::error::LayoutError;
use crate::sheet::SheetGeometry;

/// One filled slot: page index plus grid cell plus the top-left corner of the
/// label in sheet units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: u32,
    pub row: u32,
    pub col: u32,
    pub x: f32,
    pub y: f32,
}

/// Row-major, page-increasing walk over the grid.
///
/// The walk is dense: consecutive items land in consecutive slots, with the
/// only empty slots being the ones skipped before the starting position.
#[derive(Debug, Clone)]
pub struct Placements {
    geometry: SheetGeometry,
    remaining: u32,
    page: u32,
    slot: u32,
}

impl Placements {
    pub fn geometry(&self) -> &SheetGeometry {
        &self.geometry
    }
}

impl Iterator for Placements {
    type Item = Placement;

    fn next(&mut self) -> Option<Placement> {
        if self.remaining == 0 {
            return None;
        }
        if self.slot >= self.geometry.slots_per_page() {
            self.page += 1;
            self.slot = 0;
        }
        let row = self.slot / self.geometry.columns;
        let col = self.slot % self.geometry.columns;
        let placement = Placement {
            page: self.page,
            row,
            col,
            x: self.geometry.horizontal_margin + col as f32 * self.geometry.label_width,
            y: self.geometry.vertical_margin + row as f32 * self.geometry.label_height,
        };
        self.slot += 1;
        self.remaining -= 1;
        Some(placement)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for Placements {}

/// Place `total_items` sequential labels starting at the 1-based
/// `starting_position` slot. Positions past the end of a page spill onto
/// later pages rather than being an error, so a run can top up a sheet whose
/// early slots were used by a previous run.
pub fn placements(
    total_items: u32,
    starting_position: u32,
    geometry: &SheetGeometry,
) -> Result<Placements, LayoutError> {
    if starting_position < 1 {
        return Err(LayoutError::InvalidStartPosition(starting_position as i64));
    }
    let offset = starting_position - 1;
    let per_page = geometry.slots_per_page();
    Ok(Placements {
        geometry: *geometry,
        remaining: total_items,
        page: offset / per_page,
        slot: offset % per_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{GridMode, SheetSpec, Unit, resolve_geometry};

    fn letter_geometry() -> SheetGeometry {
        resolve_geometry(&SheetSpec {
            name: "letter".into(),
            label_width: 1.5,
            label_height: 1.5,
            page_width: 8.5,
            page_height: 11.0,
            unit: Unit::In,
            grid: GridMode::Computed { margin: 0.25 },
        })
        .unwrap()
    }

    fn linear_index(placement: &Placement, geometry: &SheetGeometry) -> u32 {
        placement.page * geometry.slots_per_page()
            + placement.row * geometry.columns
            + placement.col
    }

    #[test]
    fn walk_is_row_major_from_the_top_left() {
        let geometry = letter_geometry();
        let slots: Vec<_> = placements(7, 1, &geometry).unwrap().collect();
        assert_eq!((slots[0].page, slots[0].row, slots[0].col), (0, 0, 0));
        assert_eq!((slots[4].page, slots[4].row, slots[4].col), (0, 0, 4));
        assert_eq!((slots[5].page, slots[5].row, slots[5].col), (0, 1, 0));
        assert_eq!((slots[6].page, slots[6].row, slots[6].col), (0, 1, 1));
    }

    #[test]
    fn coordinates_follow_the_centering_offsets() {
        let geometry = letter_geometry();
        let slots: Vec<_> = placements(6, 1, &geometry).unwrap().collect();
        assert!((slots[0].x - 0.5).abs() < 1e-4);
        assert!((slots[0].y - 0.25).abs() < 1e-4);
        assert!((slots[4].x - (0.5 + 4.0 * 1.5)).abs() < 1e-4);
        assert!((slots[5].y - (0.25 + 1.5)).abs() < 1e-4);
    }

    #[test]
    fn start_past_the_last_slot_spills_to_the_next_page() {
        // 35 slots a page; position 36 is the first slot of page 1.
        let geometry = letter_geometry();
        let slots: Vec<_> = placements(5, 36, &geometry).unwrap().collect();
        assert_eq!(slots.len(), 5);
        for (offset, slot) in slots.iter().enumerate() {
            assert_eq!(slot.page, 1);
            assert_eq!(slot.row, 0);
            assert_eq!(slot.col, offset as u32);
        }
    }

    #[test]
    fn start_positions_pages_by_whole_multiples() {
        let geometry = letter_geometry();
        let first = placements(1, 71, &geometry).unwrap().next().unwrap();
        assert_eq!((first.page, first.row, first.col), (2, 0, 0));
    }

    #[test]
    fn no_slot_is_skipped_or_reused_across_a_page_break() {
        let geometry = letter_geometry();
        let start = 3u32;
        let slots: Vec<_> = placements(40, start, &geometry).unwrap().collect();
        assert_eq!(slots.len(), 40);
        for (offset, slot) in slots.iter().enumerate() {
            assert_eq!(
                linear_index(slot, &geometry),
                start - 1 + offset as u32,
                "item {} landed out of sequence",
                offset + 1
            );
        }
        assert_eq!(slots[32].page, 0);
        assert_eq!(slots[33].page, 1);
    }

    #[test]
    fn a_full_page_ends_exactly_at_the_last_slot() {
        let geometry = letter_geometry();
        let slots: Vec<_> = placements(36, 1, &geometry).unwrap().collect();
        let last_on_first = &slots[34];
        assert_eq!((last_on_first.page, last_on_first.row, last_on_first.col), (0, 6, 4));
        assert_eq!((slots[35].page, slots[35].row, slots[35].col), (1, 0, 0));
    }

    #[test]
    fn zero_start_position_is_rejected() {
        let geometry = letter_geometry();
        let err = placements(5, 0, &geometry).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidStartPosition(0)));
    }

    #[test]
    fn iterator_length_is_exact() {
        let geometry = letter_geometry();
        let iter = placements(12, 30, &geometry).unwrap();
        assert_eq!(iter.len(), 12);
        assert_eq!(iter.count(), 12);
    }

    #[test]
    fn zero_items_yields_nothing() {
        let geometry = letter_geometry();
        assert_eq!(placements(0, 1, &geometry).unwrap().count(), 0);
    }
}
