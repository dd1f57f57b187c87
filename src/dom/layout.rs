use super::Bounds;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    #[default]
    Column,
}

/// How an element sizes itself inside its parent and arranges its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutSpec {
    pub direction: FlexDirection,
    /// Length along the parent's main axis. Unsized children share what is left.
    pub size: Option<u16>,
    pub border: bool,
    /// Scroll containers stack children from `-offset` without fitting them.
    pub scroll: Option<u16>,
}

impl LayoutSpec {
    pub(crate) fn content_area(&self, bounds: Bounds) -> Bounds {
        if self.border {
            bounds.inset(1, 1, 1, 1)
        } else {
            bounds
        }
    }
}

/// Splits `area` along the main axis of `spec` for children of the given
/// main-axis lengths.
pub(crate) fn arrange(area: Bounds, spec: &LayoutSpec, children: &[Option<u16>]) -> Vec<Bounds> {
    let main_len = match spec.direction {
        FlexDirection::Column => area.height,
        FlexDirection::Row => area.width,
    };
    let lengths = match spec.scroll {
        Some(_) => children.iter().map(|len| len.unwrap_or(1)).collect(),
        None => distribute(main_len, children),
    };
    let mut cursor = -i32::from(spec.scroll.unwrap_or(0));
    lengths
        .into_iter()
        .map(|len| {
            let placed = match spec.direction {
                FlexDirection::Column => Bounds::new(area.x, area.y + cursor, area.width, len),
                FlexDirection::Row => Bounds::new(area.x + cursor, area.y, len, area.height),
            };
            cursor += i32::from(len);
            placed
        })
        .collect()
}

fn distribute(total: u16, children: &[Option<u16>]) -> Vec<u16> {
    let fixed: u16 = children
        .iter()
        .flatten()
        .fold(0u16, |acc, len| acc.saturating_add(*len));
    let flexible = children.iter().filter(|len| len.is_none()).count() as u16;
    if flexible == 0 {
        return children.iter().map(|len| len.unwrap_or(0)).collect();
    }
    let remaining = total.saturating_sub(fixed);
    let share = remaining / flexible;
    let mut leftover = remaining - share * flexible;
    let mut seen = 0u16;
    children
        .iter()
        .map(|len| match len {
            Some(len) => *len,
            None => {
                seen += 1;
                if seen == flexible {
                    let extra = leftover;
                    leftover = 0;
                    share + extra
                } else {
                    share
                }
            }
        })
        .collect()
}
