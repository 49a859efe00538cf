use core_text::LineRange;

/// Fold operations the command core issues. Counts are fold levels.
pub trait FoldManager {
    fn create_fold(&mut self, range: LineRange);
    fn open_fold(&mut self, line: usize, count: usize);
    fn close_fold(&mut self, line: usize, count: usize);
    fn open_all_folds(&mut self, range: LineRange);
    fn close_all_folds(&mut self, range: LineRange);
    fn delete_fold(&mut self, line: usize);
    fn delete_all_folds(&mut self, range: LineRange);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fold {
    pub range: LineRange,
    pub closed: bool,
}

/// Flat list of manual folds. Folds may nest; a fold "contains" a line when
/// its range covers it.
#[derive(Debug, Default, Clone)]
pub struct FoldSet {
    folds: Vec<Fold>,
}

impl FoldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folds(&self) -> &[Fold] {
        &self.folds
    }

    pub fn is_line_folded(&self, line: usize) -> bool {
        self.folds.iter().any(|f| f.closed && f.range.contains(line))
    }

    /// Indices of folds covering `line`, outermost first.
    fn covering(&self, line: usize) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.folds.len())
            .filter(|&i| self.folds[i].range.contains(line))
            .collect();
        idx.sort_by_key(|&i| std::cmp::Reverse(self.folds[i].range.count));
        idx
    }

    fn intersects(a: LineRange, b: LineRange) -> bool {
        a.start <= b.last_line() && b.start <= a.last_line()
    }
}

impl FoldManager for FoldSet {
    fn create_fold(&mut self, range: LineRange) {
        self.folds.push(Fold {
            range,
            closed: true,
        });
    }

    fn open_fold(&mut self, line: usize, count: usize) {
        let covering = self.covering(line);
        for i in covering
            .into_iter()
            .filter(|&i| self.folds[i].closed)
            .take(count.max(1))
            .collect::<Vec<_>>()
        {
            self.folds[i].closed = false;
        }
    }

    fn close_fold(&mut self, line: usize, count: usize) {
        let covering = self.covering(line);
        for i in covering
            .into_iter()
            .rev()
            .filter(|&i| !self.folds[i].closed)
            .take(count.max(1))
            .collect::<Vec<_>>()
        {
            self.folds[i].closed = true;
        }
    }

    fn open_all_folds(&mut self, range: LineRange) {
        for f in self.folds.iter_mut().filter(|f| Self::intersects(f.range, range)) {
            f.closed = false;
        }
    }

    fn close_all_folds(&mut self, range: LineRange) {
        for f in self.folds.iter_mut().filter(|f| Self::intersects(f.range, range)) {
            f.closed = true;
        }
    }

    fn delete_fold(&mut self, line: usize) {
        if let Some(&innermost) = self.covering(line).last() {
            self.folds.remove(innermost);
        }
    }

    fn delete_all_folds(&mut self, range: LineRange) {
        self.folds.retain(|f| !Self::intersects(f.range, range));
    }
}
