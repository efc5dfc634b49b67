                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
             Translation Table
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Handle to one index cell in a [`TranslationTable`] arena. Copyable and
/// cheap; stays valid until the cell is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell(usize);

/// Ordered sequence of mutable integer cells, one per element currently
/// visible in a derived view, each holding that element's index in the
/// immediate upstream sequence.
///
/// Cells live in an arena and the view order is a separate table of cell
/// handles, so a second structure (a sort view's reverse table) can hold
/// handles to the same cells: a cell shifted once through the arena is
/// seen by every table referencing it, with no second pass.
///
/// Each slot also carries the cell's current view position, patched on
/// every link/unlink, so resolving a handle back to its position costs
/// O(1) instead of a scan.
pub struct TranslationTable {
    slots: Vec<usize>,
    pos: Vec<usize>,
    free: Vec<usize>,
    order: Vec<Cell>,
}

impl TranslationTable {
    pub fn new() -> Self {
        TranslationTable {
            slots: Vec::new(),
            pos: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Upstream index stored by the cell at view position `view_idx`.
    pub fn src(&self, view_idx: usize) -> usize {
        self.slots[self.order[view_idx].0]
    }

    pub fn cell_at(&self, view_idx: usize) -> Cell {
        self.order[view_idx]
    }

    pub fn get(&self, cell: Cell) -> usize {
        self.slots[cell.0]
    }

    pub fn set(&mut self, cell: Cell, src: usize) {
        self.slots[cell.0] = src;
    }

    /// Creates a cell without linking it into the view order.
    pub fn alloc(&mut self, src: usize) -> Cell {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = src;
                Cell(slot)
            }
            None => {
                self.slots.push(src);
                self.pos.push(0);
                Cell(self.slots.len() - 1)
            }
        }
    }

    pub fn release(&mut self, cell: Cell) {
        self.free.push(cell.0);
    }

    pub fn link_at(&mut self, view_idx: usize, cell: Cell) {
        let TranslationTable { pos, order, .. } = self;
        for c in &order[view_idx..] {
            pos[c.0] += 1;
        }
        order.insert(view_idx, cell);
        pos[cell.0] = view_idx;
    }

    pub fn unlink_at(&mut self, view_idx: usize) -> Cell {
        let TranslationTable { pos, order, .. } = self;
        let cell = order.remove(view_idx);
        for c in &order[view_idx..] {
            pos[c.0] -= 1;
        }
        cell
    }

    pub fn insert(&mut self, view_idx: usize, src: usize) -> Cell {
        let cell = self.alloc(src);
        self.link_at(view_idx, cell);
        cell
    }

    /// Drops the cell at `view_idx`, returning the upstream index it held.
    pub fn remove(&mut self, view_idx: usize) -> usize {
        let cell = self.unlink_at(view_idx);
        let src = self.get(cell);
        self.release(cell);
        src
    }

    /// Increments in place every live cell holding an upstream index
    /// `>= from` by `delta`.
    pub fn shift_up(&mut self, from: usize, delta: usize) {
        let TranslationTable { slots, order, .. } = self;
        for cell in order.iter() {
            let src = &mut slots[cell.0];
            if *src >= from {
                *src += delta;
            }
        }
    }

    pub fn shift_down(&mut self, from: usize, delta: usize) {
        let TranslationTable { slots, order, .. } = self;
        for cell in order.iter() {
            let src = &mut slots[cell.0];
            if *src >= from {
                *src -= delta;
            }
        }
    }

    /// First view position whose stored upstream index is `>= src`.
    /// Requires the table to be monotone in stored indices (filter and
    /// window tables are; sort tables are not).
    pub fn lower_bound_src(&self, src: usize) -> usize {
        self.order.partition_point(|cell| self.slots[cell.0] < src)
    }

    /// View position of the cell holding exactly `src`, in a monotone table.
    pub fn find_src(&self, src: usize) -> Option<usize> {
        let i = self.lower_bound_src(src);
        if i < self.len() && self.src(i) == src {
            Some(i)
        } else {
            None
        }
    }

    /// View position of a cell, by handle identity. O(1) through the
    /// maintained position slot.
    pub fn position_of(&self, cell: Cell) -> Option<usize> {
        let p = self.pos[cell.0];
        if p < self.order.len() && self.order[p] == cell {
            Some(p)
        } else {
            None
        }
    }

    pub fn order_snapshot(&self) -> Vec<Cell> {
        self.order.clone()
    }

    /// Replaces the view order with a permutation of the same cells.
    pub fn set_order(&mut self, order: Vec<Cell>) {
        for (i, c) in order.iter().enumerate() {
            self.pos[c.0] = i;
        }
        self.order = order;
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.pos.clear();
        self.free.clear();
        self.order.clear();
    }

    pub fn is_monotone(&self) -> bool {
        self.order
            .windows(2)
            .all(|w| self.slots[w[0].0] < self.slots[w[1].0])
    }
}

impl Default for TranslationTable {
    fn default() -> Self {
        TranslationTable::new()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_remove_and_lookup() {
        let mut table = TranslationTable::new();
        table.insert(0, 2);
        table.insert(1, 5);
        table.insert(1, 3);

        assert_eq!(table.len(), 3);
        assert_eq!(table.src(0), 2);
        assert_eq!(table.src(1), 3);
        assert_eq!(table.src(2), 5);
        assert!(table.is_monotone());

        assert_eq!(table.lower_bound_src(3), 1);
        assert_eq!(table.lower_bound_src(4), 2);
        assert_eq!(table.find_src(5), Some(2));
        assert_eq!(table.find_src(4), None);

        assert_eq!(table.remove(1), 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.src(1), 5);
    }

    #[test]
    fn shifts_touch_only_cells_at_or_past_threshold() {
        let mut table = TranslationTable::new();
        table.insert(0, 1);
        table.insert(1, 4);
        table.insert(2, 7);

        table.shift_up(4, 2);
        assert_eq!(
            (table.src(0), table.src(1), table.src(2)),
            (1, 6, 9)
        );

        table.shift_down(6, 3);
        assert_eq!(
            (table.src(0), table.src(1), table.src(2)),
            (1, 3, 6)
        );
    }

    #[test]
    fn released_slots_are_recycled() {
        let mut table = TranslationTable::new();
        let a = table.insert(0, 0);
        table.insert(1, 1);
        table.remove(0);

        let b = table.alloc(9);
        assert_eq!(a, b);
        table.link_at(1, b);
        assert_eq!(table.src(1), 9);
    }

    #[test]
    fn shared_cell_updates_are_seen_through_every_handle() {
        let mut table = TranslationTable::new();
        let cell = table.insert(0, 3);
        // a second structure holding the same handle observes the shift
        table.shift_up(0, 10);
        assert_eq!(table.get(cell), 13);
        assert_eq!(table.position_of(cell), Some(0));
    }

    #[test]
    fn position_lookup_tracks_links_and_permutations() {
        let mut table = TranslationTable::new();
        let a = table.insert(0, 0);
        let b = table.insert(1, 1);
        let c = table.insert(2, 2);

        // linking in front shifts every later cell's position
        let d = table.alloc(9);
        table.link_at(0, d);
        assert_eq!(table.position_of(d), Some(0));
        assert_eq!(table.position_of(a), Some(1));
        assert_eq!(table.position_of(c), Some(3));

        // unlinking shifts them back, and the unlinked cell resolves to
        // no position at all
        assert_eq!(table.unlink_at(1), a);
        assert_eq!(table.position_of(b), Some(1));
        assert_eq!(table.position_of(c), Some(2));
        assert_eq!(table.position_of(a), None);

        table.set_order(vec![c, b, d]);
        assert_eq!(table.position_of(c), Some(0));
        assert_eq!(table.position_of(b), Some(1));
        assert_eq!(table.position_of(d), Some(2));
    }

    #[test]
    fn set_order_permutes_existing_cells() {
        let mut table = TranslationTable::new();
        let a = table.insert(0, 0);
        let b = table.insert(1, 1);
        table.set_order(vec![b, a]);
        assert_eq!(table.src(0), 1);
        assert_eq!(table.src(1), 0);
        assert!(!table.is_monotone());
    }
}
