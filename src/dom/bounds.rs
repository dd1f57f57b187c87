use ratatui::layout::Rect;

/// Cell-space rectangle. Unlike [`Rect`] the origin may be negative so that
/// scrolled content can sit above or left of the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(i32::from(self.width))
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(i32::from(self.height))
    }

    pub fn area(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains_point(&self, column: i32, row: i32) -> bool {
        column >= self.x && column < self.right() && row >= self.y && row < self.bottom()
    }

    /// Overlapping region of two rectangles, `None` when they share no cell.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Bounds::from_edges(left, top, right, bottom))
    }

    /// Moves every edge inwards by the given amounts. Negative amounts grow
    /// the rectangle; a rectangle shrunk past zero collapses at its centre.
    /// Growth beyond `u16::MAX` cells is trimmed around the original centre.
    pub fn inset(&self, top: i32, right: i32, bottom: i32, left: i32) -> Bounds {
        let (x0, x1) = fit_span(
            self.x.saturating_add(left),
            self.right().saturating_sub(right),
            self.x,
            self.right(),
        );
        let (y0, y1) = fit_span(
            self.y.saturating_add(top),
            self.bottom().saturating_sub(bottom),
            self.y,
            self.bottom(),
        );
        Bounds::from_edges(x0, y0, x1, y1)
    }

    /// Portion of the rectangle that falls inside `clip`, ready for drawing.
    pub fn visible_in(&self, clip: Rect) -> Option<Rect> {
        let visible = self.intersection(&Bounds::from(clip))?;
        Some(Rect::new(
            visible.x as u16,
            visible.y as u16,
            visible.width,
            visible.height,
        ))
    }

    fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Bounds {
        Bounds {
            x: left,
            y: top,
            width: clamp_len(right.saturating_sub(left)),
            height: clamp_len(bottom.saturating_sub(top)),
        }
    }
}

impl From<Rect> for Bounds {
    fn from(value: Rect) -> Self {
        Bounds::new(
            i32::from(value.x),
            i32::from(value.y),
            value.width,
            value.height,
        )
    }
}

fn clamp_len(len: i32) -> u16 {
    len.clamp(0, i32::from(u16::MAX)) as u16
}

fn midpoint(a: i32, b: i32) -> i32 {
    ((i64::from(a) + i64::from(b)) / 2) as i32
}

/// Normalises the edges `[lo, hi)` of one axis. Crossed edges meet in the
/// middle; a span longer than `u16::MAX` keeps the window of that length
/// closest to the centre of `[keep_lo, keep_hi)`.
fn fit_span(lo: i32, hi: i32, keep_lo: i32, keep_hi: i32) -> (i32, i32) {
    if hi < lo {
        let mid = midpoint(lo, hi);
        return (mid, mid);
    }
    let max = i64::from(u16::MAX);
    let (lo, hi) = (i64::from(lo), i64::from(hi));
    if hi - lo <= max {
        return (lo as i32, hi as i32);
    }
    let centre = i64::from(midpoint(keep_lo, keep_hi));
    let start = (centre - max / 2).clamp(lo, hi - max);
    (start as i32, (start + max) as i32)
}
