//! Visual theming for the network graph.
//!
//! Provides color palettes, the success-rate edge colors and the background
//! style.

use super::simulation::EdgeBucket;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// CSS color string; opaque colors use hex notation.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// A curated color palette for node categories.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePalette {
	/// Palette entries; an empty palette draws gray.
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Distinct hues for datasets with many categories.
	pub fn categorical() -> Self {
		Self {
			colors: vec![
				Color::rgb(91, 141, 239),  // Blue
				Color::rgb(240, 144, 82),  // Orange
				Color::rgb(102, 187, 106), // Green
				Color::rgb(171, 120, 214), // Violet
				Color::rgb(236, 100, 122), // Rose
				Color::rgb(77, 182, 172),  // Teal
				Color::rgb(220, 190, 80),  // Mustard
				Color::rgb(141, 153, 174), // Gray
			],
		}
	}

	/// Color at `index`, wrapping around.
	pub fn get(&self, index: usize) -> Color {
		match self.colors.len() {
			0 => Color::rgb(128, 128, 128),
			len => self.colors[index % len],
		}
	}

	/// Stable color for a category name. The same name gets the same color
	/// across reloads and datasets.
	pub fn for_category(&self, category: &str) -> Color {
		self.get(fnv1a(category) as usize)
	}
}

/// 32-bit FNV-1a.
fn fnv1a(text: &str) -> u32 {
	text.bytes().fold(0x811c_9dc5, |hash, byte| {
		(hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
	})
}

/// Background style configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
}

/// Edge visual style.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Color of edges with a high success rate.
	pub strong: Color,
	/// Color of edges with a moderate success rate.
	pub moderate: Color,
	/// Color of edges with a low success rate.
	pub weak: Color,
	/// Color of the hovered edge.
	pub hovered: Color,
}

impl EdgeStyle {
	/// Stroke color for an edge bucket.
	pub fn color(&self, bucket: EdgeBucket) -> Color {
		match bucket {
			EdgeBucket::Strong => self.strong,
			EdgeBucket::Moderate => self.moderate,
			EdgeBucket::Weak => self.weak,
		}
	}
}

/// Node visual style.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Ring drawn around pinned nodes.
	pub pin_color: Color,
	/// Ring drawn around the hovered or dragged node.
	pub focus_color: Color,
}

/// Text style.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelStyle {
	/// Primary label color.
	pub color: Color,
	/// Detail annotation color.
	pub detail_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
	/// Background.
	pub background: BackgroundStyle,
	/// Edges.
	pub edge: EdgeStyle,
	/// Nodes.
	pub node: NodeStyle,
	/// Labels.
	pub label: LabelStyle,
	/// Category colors.
	pub palette: NodePalette,
}

impl Theme {
	/// Dark theme with gradient nodes (default)
	pub fn default_theme() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
			},
			edge: EdgeStyle {
				strong: Color::rgba(102, 187, 106, 0.55),
				moderate: Color::rgba(230, 180, 80, 0.55),
				weak: Color::rgba(229, 96, 96, 0.55),
				hovered: Color::rgba(255, 255, 255, 0.9),
			},
			node: NodeStyle {
				use_gradient: true,
				pin_color: Color::rgba(255, 255, 255, 0.85),
				focus_color: Color::rgba(255, 255, 255, 0.6),
			},
			label: LabelStyle {
				color: Color::rgba(255, 255, 255, 0.85),
				detail_color: Color::rgba(200, 210, 220, 0.7),
			},
			palette: NodePalette::categorical(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
