// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Partial node appearances and their field-wise merge.

/// An 8-bit-per-channel RGB color.
pub type Rgb = [u8; 3];

/// Outline color of a node, as an index into the renderer's outline palette.
///
/// The discriminant is what ends up in the upper bits of a packed
/// [`Texel`](crate::Texel); see [`OutlinePalette`](crate::OutlinePalette) for
/// the colors the indices map to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeOutlineColor {
    /// No outline is drawn.
    #[default]
    NoOutline = 0,
    /// White outline.
    White = 1,
    /// Black outline.
    Black = 2,
    /// Cyan outline.
    Cyan = 3,
    /// Blue outline.
    Blue = 4,
    /// Green outline.
    Green = 5,
    /// Red outline.
    Red = 6,
    /// Orange outline.
    Orange = 7,
}

impl NodeOutlineColor {
    /// Every outline color, in palette order.
    pub const ALL: [Self; 8] = [
        Self::NoOutline,
        Self::White,
        Self::Black,
        Self::Cyan,
        Self::Blue,
        Self::Green,
        Self::Red,
        Self::Orange,
    ];

    /// Returns the palette index of this color.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the color for a palette index, or `None` if out of range.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < Self::ALL.len() {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }
}

/// A partial style for a set of nodes.
///
/// Every field is optional. `None` means "not specified here": during
/// resolution it never overwrites a value resolved from an earlier
/// appearance, and is distinct from any concrete value (`visible: None` is
/// not the same as `visible: Some(false)`).
///
/// Appearances are small `Copy` values. Build them with the `with_*`
/// methods or start from one of the presets:
///
/// ```rust
/// use thicket_styling::{NodeAppearance, NodeOutlineColor};
///
/// let flagged = NodeAppearance::new()
///     .with_color([255, 0, 0])
///     .with_outline_color(NodeOutlineColor::Red);
///
/// assert_eq!(flagged.visible, None);
/// assert_eq!(flagged.color, Some([255, 0, 0]));
///
/// let ghosted_but_flagged = NodeAppearance::GHOSTED.overlaid(&flagged);
/// assert_eq!(ghosted_but_flagged.render_ghosted, Some(true));
/// assert_eq!(ghosted_but_flagged.outline_color, Some(NodeOutlineColor::Red));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeAppearance {
    /// Color override. Unresolved colors encode as black, which the renderer
    /// treats as "use the model's own color".
    pub color: Option<Rgb>,
    /// Whether the node is drawn at all. Resolves to `true` when unset.
    pub visible: Option<bool>,
    /// Whether the node is drawn on top of other geometry, ignoring depth.
    pub render_in_front: Option<bool>,
    /// Whether the node is drawn de-emphasized (translucent).
    pub render_ghosted: Option<bool>,
    /// Outline drawn around the node.
    pub outline_color: Option<NodeOutlineColor>,
}

impl NodeAppearance {
    /// An appearance with every field unset.
    pub const INHERIT: Self = Self {
        color: None,
        visible: None,
        render_in_front: None,
        render_ghosted: None,
        outline_color: None,
    };

    /// Every field set to the plain rendering state: visible, not ghosted,
    /// not in front, no outline and no color override.
    pub const DEFAULT: Self = Self {
        color: Some([0, 0, 0]),
        visible: Some(true),
        render_in_front: Some(false),
        render_ghosted: Some(false),
        outline_color: Some(NodeOutlineColor::NoOutline),
    };

    /// Visible with a white outline.
    pub const OUTLINED: Self = Self::INHERIT
        .with_visible(true)
        .with_outline_color(NodeOutlineColor::White);

    /// Not drawn.
    pub const HIDDEN: Self = Self::INHERIT.with_visible(false);

    /// Drawn on top of other geometry.
    pub const IN_FRONT: Self = Self::INHERIT.with_render_in_front(true);

    /// Drawn de-emphasized.
    pub const GHOSTED: Self = Self::INHERIT.with_render_ghosted(true);

    /// Drawn in front, tinted blue and outlined in white.
    pub const HIGHLIGHTED: Self = Self::IN_FRONT
        .with_color([100, 100, 255])
        .with_visible(true)
        .with_outline_color(NodeOutlineColor::White);

    /// Creates an appearance with every field unset.
    #[must_use]
    pub const fn new() -> Self {
        Self::INHERIT
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.visible.is_none()
            && self.render_in_front.is_none()
            && self.render_ghosted.is_none()
            && self.outline_color.is_none()
    }

    /// Sets the color override.
    #[must_use]
    pub const fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets visibility.
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Sets in-front rendering.
    #[must_use]
    pub const fn with_render_in_front(mut self, render_in_front: bool) -> Self {
        self.render_in_front = Some(render_in_front);
        self
    }

    /// Sets ghosted rendering.
    #[must_use]
    pub const fn with_render_ghosted(mut self, render_ghosted: bool) -> Self {
        self.render_ghosted = Some(render_ghosted);
        self
    }

    /// Sets the outline color.
    #[must_use]
    pub const fn with_outline_color(mut self, outline_color: NodeOutlineColor) -> Self {
        self.outline_color = Some(outline_color);
        self
    }

    /// Copies every field that `other` sets into `self`.
    ///
    /// Fields `other` leaves unset keep their current value.
    pub fn overlay(&mut self, other: &Self) {
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.visible.is_some() {
            self.visible = other.visible;
        }
        if other.render_in_front.is_some() {
            self.render_in_front = other.render_in_front;
        }
        if other.render_ghosted.is_some() {
            self.render_ghosted = other.render_ghosted;
        }
        if other.outline_color.is_some() {
            self.outline_color = other.outline_color;
        }
    }

    /// Returns `self` with `other` overlaid on top.
    #[must_use]
    pub fn overlaid(mut self, other: &Self) -> Self {
        self.overlay(other);
        self
    }
}
