use super::Rect;

/// A set of boxes, used for damage tracking.
///
/// Boxes are kept as given; overlapping entries are not merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `rect` to the region. Empty boxes are dropped.
    pub fn add(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        self.rects.iter()
    }

    /// Bounding box of the whole region, or `None` when empty.
    pub fn extents(&self) -> Option<Rect> {
        let mut it = self.rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, Rect::union))
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        let mut region = Region::new();
        region.add(rect);
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_boxes_are_dropped() {
        let region = Region::from(Rect::new(0, 0, 0, 10));
        assert!(region.is_empty());
        assert_eq!(region.extents(), None);
    }

    #[test]
    fn extents_cover_all_boxes() {
        let mut region = Region::new();
        region.add(Rect::new(0, 0, 4, 4));
        region.add(Rect::new(10, 2, 2, 8));
        assert_eq!(region.extents(), Some(Rect::new(0, 0, 12, 10)));
        assert_eq!(region.iter().count(), 2);
    }
}
