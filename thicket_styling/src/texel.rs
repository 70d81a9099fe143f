// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed per-node texels and the outline palette.
//!
//! Each node's resolved appearance is stored as four bytes, laid out for
//! direct upload into an RGBA8 texture:
//!
//! | byte | contents |
//! |------|----------|
//! | 0..3 | color override (`0, 0, 0` when none was resolved) |
//! | 3    | bit 0 visible, bit 1 in front, bit 2 ghosted, bits 3..8 outline color index |

#![allow(unsafe_code, reason = "the bytemuck derives expand to `unsafe impl`s")]

use bytemuck::{Pod, Zeroable};

use crate::appearance::{NodeAppearance, NodeOutlineColor, Rgb};

/// Bit position of the outline color index in [`Texel::flags`].
pub const OUTLINE_SHIFT: u8 = 3;

/// Mask of the render flag bits below [`OUTLINE_SHIFT`].
const RENDER_FLAGS_MASK: u8 = (1 << OUTLINE_SHIFT) - 1;

bitflags::bitflags! {
    /// The boolean render flags packed into the low bits of [`Texel::flags`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u8 {
        /// Node is drawn.
        const VISIBLE  = 0b0000_0001;
        /// Node is drawn on top of other geometry.
        const IN_FRONT = 0b0000_0010;
        /// Node is drawn de-emphasized.
        const GHOSTED  = 0b0000_0100;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// The packed appearance of one node.
///
/// `Texel` is plain old data (`#[repr(C)]`, four `u8`s), so a slice of them
/// can be reinterpreted as bytes with [`bytemuck::cast_slice`] for upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Texel {
    /// Red channel of the color override.
    pub r: u8,
    /// Green channel of the color override.
    pub g: u8,
    /// Blue channel of the color override.
    pub b: u8,
    /// Render flags and outline color index.
    pub flags: u8,
}

impl Texel {
    /// The texel of a node with nothing resolved: visible, no color
    /// override, not in front, not ghosted, no outline.
    pub const UNSTYLED: Self = Self::new(0, 0, 0, RenderFlags::VISIBLE.bits());

    /// Creates a texel from raw channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, flags: u8) -> Self {
        Self { r, g, b, flags }
    }

    /// Encodes a resolved appearance.
    ///
    /// Unset fields take their renderer defaults, so
    /// `Texel::encode(&NodeAppearance::INHERIT) == Texel::UNSTYLED`.
    #[must_use]
    pub fn encode(appearance: &NodeAppearance) -> Self {
        let mut texel = Self::UNSTYLED;
        texel.apply(appearance);
        texel
    }

    /// Overwrites the channels for every field `appearance` sets, leaving
    /// the rest untouched.
    ///
    /// Applying appearances one after another is equivalent to encoding
    /// their [overlay](NodeAppearance::overlay).
    pub fn apply(&mut self, appearance: &NodeAppearance) {
        if let Some([r, g, b]) = appearance.color {
            self.r = r;
            self.g = g;
            self.b = b;
        }
        let mut render_flags = self.render_flags();
        if let Some(visible) = appearance.visible {
            render_flags.set(RenderFlags::VISIBLE, visible);
        }
        if let Some(in_front) = appearance.render_in_front {
            render_flags.set(RenderFlags::IN_FRONT, in_front);
        }
        if let Some(ghosted) = appearance.render_ghosted {
            render_flags.set(RenderFlags::GHOSTED, ghosted);
        }
        let outline = match appearance.outline_color {
            Some(outline) => outline.index() << OUTLINE_SHIFT,
            None => self.flags & !RENDER_FLAGS_MASK,
        };
        self.flags = outline | render_flags.bits();
    }

    /// Returns the channels as `[r, g, b, flags]`.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.flags]
    }

    /// Returns the color channels.
    #[must_use]
    pub const fn color(self) -> Rgb {
        [self.r, self.g, self.b]
    }

    /// Returns the render flag bits.
    #[must_use]
    pub const fn render_flags(self) -> RenderFlags {
        RenderFlags::from_bits_truncate(self.flags)
    }

    /// Returns `true` if the visible bit is set.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        self.render_flags().contains(RenderFlags::VISIBLE)
    }

    /// Returns `true` if the in-front bit is set.
    #[must_use]
    pub const fn renders_in_front(self) -> bool {
        self.render_flags().contains(RenderFlags::IN_FRONT)
    }

    /// Returns `true` if the ghosted bit is set.
    #[must_use]
    pub const fn renders_ghosted(self) -> bool {
        self.render_flags().contains(RenderFlags::GHOSTED)
    }

    /// Returns the outline color, or `None` for an index outside the
    /// palette.
    #[must_use]
    pub const fn outline_color(self) -> Option<NodeOutlineColor> {
        NodeOutlineColor::from_index(self.flags >> OUTLINE_SHIFT)
    }
}

impl Default for Texel {
    fn default() -> Self {
        Self::UNSTYLED
    }
}

impl From<[u8; 4]> for Texel {
    fn from([r, g, b, flags]: [u8; 4]) -> Self {
        Self::new(r, g, b, flags)
    }
}

impl From<Texel> for [u8; 4] {
    fn from(texel: Texel) -> Self {
        texel.to_array()
    }
}

/// The colors outline indices map to, as a lookup table for the renderer.
///
/// [`NodeOutlineColor::NoOutline`] always maps to transparent black; every
/// other entry is opaque.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutlinePalette {
    colors: [Rgb; 8],
}

impl OutlinePalette {
    /// Returns the color drawn for `outline`.
    #[must_use]
    pub const fn color(&self, outline: NodeOutlineColor) -> Rgb {
        self.colors[outline.index() as usize]
    }

    /// Changes the color drawn for `outline`.
    ///
    /// Setting a color for [`NodeOutlineColor::NoOutline`] has no effect on
    /// [`to_texels`](Self::to_texels), which keeps that entry transparent.
    pub fn set_color(&mut self, outline: NodeOutlineColor, color: Rgb) {
        self.colors[usize::from(outline.index())] = color;
    }

    /// Returns the palette as the texels of an 8×1 RGBA8 texture.
    #[must_use]
    pub fn to_texels(&self) -> [[u8; 4]; 8] {
        core::array::from_fn(|index| match NodeOutlineColor::ALL[index] {
            NodeOutlineColor::NoOutline => [0; 4],
            _ => {
                let [r, g, b] = self.colors[index];
                [r, g, b, 255]
            }
        })
    }
}

impl Default for OutlinePalette {
    fn default() -> Self {
        Self {
            colors: [
                [0, 0, 0],
                [255, 255, 255],
                [0, 0, 0],
                [102, 213, 234],
                [77, 106, 242],
                [0, 200, 0],
                [230, 30, 30],
                [255, 130, 0],
            ],
        }
    }
}
