use super::DrawCmd;

/// Pending draw stream for the current batch.
///
/// Paint order is submission order. `clear()` keeps the allocation so a
/// warmed-up list does not allocate per frame.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawCmd>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCmd) {
        self.items.push(cmd);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterates commands in paint order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &DrawCmd> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;

    #[test]
    fn preserves_submission_order() {
        let mut list = DrawList::new();
        list.push_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::transparent());
        list.push_rect(Rect::new(5.0, 0.0, 1.0, 1.0), Color::transparent());

        let xs: Vec<f32> = list
            .iter()
            .map(|cmd| match cmd {
                DrawCmd::Rect(r) => r.rect.origin.x,
            })
            .collect();
        assert_eq!(xs, vec![0.0, 5.0]);
    }

    #[test]
    fn clear_empties_list() {
        let mut list = DrawList::new();
        list.push_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::transparent());
        assert_eq!(list.len(), 1);
        list.clear();
        assert!(list.is_empty());
    }
}
