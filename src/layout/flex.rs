//! # Flex Layout Utilities
//!
//! Pure arithmetic for the flexbox algorithm: wrap-line grouping, flex-share
//! division and justify spacing. The box algorithm in
//! [`box_layout`](super::box_layout) and the intrinsic calculator both group
//! lines through [`partition_into_lines`], so measured and laid-out wrap
//! points always agree.

use crate::style::Justify;

/// Split `available` among items by flex factor. Non-positive factors get
/// zero. Negative space is treated as none.
pub fn distribute_flex(factors: &[f64], available: f64) -> Vec<f64> {
    let total: f64 = factors.iter().filter(|f| **f > 0.0).sum();
    let available = available.max(0.0);
    factors
        .iter()
        .map(|&f| {
            if f > 0.0 && total > 0.0 {
                available * f / total
            } else {
                0.0
            }
        })
        .collect()
}

/// A single line of items in a wrapping flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapLine {
    /// Index of the first item in this line.
    pub start: usize,
    /// One past the last item (exclusive end).
    pub end: usize,
}

impl WrapLine {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Partition items into wrap lines based on the available main-axis size.
/// Always adds at least one item per line (prevents infinite loops on oversized items).
pub fn partition_into_lines(main_sizes: &[f64], gap: f64, available: f64) -> Vec<WrapLine> {
    if main_sizes.is_empty() {
        return vec![];
    }

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_size = 0.0;

    for (i, &size) in main_sizes.iter().enumerate() {
        let needed = if i == line_start { size } else { gap + size };
        if i > line_start && line_size + needed > available {
            lines.push(WrapLine {
                start: line_start,
                end: i,
            });
            line_start = i;
            line_size = size;
        } else {
            line_size += needed;
        }
    }

    lines.push(WrapLine {
        start: line_start,
        end: main_sizes.len(),
    });

    lines
}

/// Main-axis size of a line: item sizes plus the gaps between them.
pub fn line_main_size(main_sizes: &[f64], gap: f64) -> f64 {
    let gaps = gap * main_sizes.len().saturating_sub(1) as f64;
    main_sizes.iter().sum::<f64>() + gaps
}

/// Where the first item starts and how much extra space follows each item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MainAxisSpacing {
    pub leading: f64,
    pub between: f64,
}

/// Spacing for `count` items sharing `free` leftover space.
///
/// Negative space is used as is: `end` and `center` overflow at the start
/// and the distributed modes pull items into each other.
pub fn justify_spacing(justify: Justify, free: f64, count: usize) -> MainAxisSpacing {
    let n = count as f64;
    match justify {
        Justify::Start => MainAxisSpacing::default(),
        Justify::End => MainAxisSpacing {
            leading: free,
            between: 0.0,
        },
        Justify::Center => MainAxisSpacing {
            leading: free / 2.0,
            between: 0.0,
        },
        Justify::SpaceBetween => {
            if count > 1 {
                MainAxisSpacing {
                    leading: 0.0,
                    between: free / (n - 1.0),
                }
            } else {
                MainAxisSpacing::default()
            }
        }
        Justify::SpaceAround => {
            let extra = if count > 0 { free / n } else { 0.0 };
            MainAxisSpacing {
                leading: extra / 2.0,
                between: extra,
            }
        }
        Justify::SpaceEvenly => {
            let extra = free / (n + 1.0);
            MainAxisSpacing {
                leading: extra,
                between: extra,
            }
        }
    }
}
