/// Axis-aligned rectangles in world pixels (y grows downward).
///
/// Rects are half-open: a rect covers `[x, x + w)` × `[y, y + h)`, so two
/// rects that merely share an edge do not intersect. This is what lets a
/// body rest on a platform (`bottom == platform.y`) without overlapping it.
///
/// Probe rectangles (feet, head, slam zone) are plain values derived on
/// demand; nothing keeps a reference into an entity's body.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    #[inline]
    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }

    /// Overlap test. Zero-area rects never intersect anything.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.w > 0 && self.h > 0 && other.w > 0 && other.h > 0
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    pub fn set_left(&mut self, left: i32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: i32) {
        self.x = right - self.w;
    }

    pub fn set_top(&mut self, top: i32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: i32) {
        self.y = bottom - self.h;
    }
}

// ── Probes ──

/// Narrow strip straddling the bottom edge of a body, used for stomps.
pub fn feet_probe(body: &Rect) -> Rect {
    Rect::new(body.x + 6, body.bottom() - 6, body.w - 12, 8)
}

/// Top slice of an enemy or boss that a stomp must land on.
pub fn head_probe(body: &Rect) -> Rect {
    Rect::new(body.x, body.y, body.w, 10)
}

/// Ground-slam area of effect directly beneath a body.
pub fn slam_zone(body: &Rect) -> Rect {
    Rect::new(body.center_x() - 40, body.bottom(), 80, 40)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_is_not_an_intersection() {
        let floor = Rect::new(0, 100, 200, 20);
        let standing = Rect::new(10, 54, 40, 46);
        assert_eq!(standing.bottom(), floor.y);
        assert!(!standing.intersects(&floor));
        assert!(standing.translated(0, 1).intersects(&floor));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut r = Rect::new(0, 0, 40, 46);
        r.set_right(100);
        assert_eq!((r.x, r.w), (60, 40));
        r.set_bottom(480);
        assert_eq!((r.y, r.h), (434, 46));
        r.set_left(5);
        r.set_top(7);
        assert_eq!(r, Rect::new(5, 7, 40, 46));
    }

    #[test]
    fn zero_area_never_hits() {
        let empty = Rect::new(5, 5, 0, 10);
        assert!(!empty.intersects(&Rect::new(0, 0, 50, 50)));
    }

    #[test]
    fn probes_sit_where_expected() {
        let player = Rect::new(100, 200, 40, 46);
        assert_eq!(feet_probe(&player), Rect::new(106, 240, 28, 8));
        assert_eq!(head_probe(&player), Rect::new(100, 200, 40, 10));
        assert_eq!(slam_zone(&player), Rect::new(80, 246, 80, 40));
    }
}
