// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Coverwerk print compositor.
//
// A `DesignState` is an immutable snapshot handed over by the external
// editor for the duration of one render. All positions and sizes are
// percentages of the owning panel's unbled content box; the editor
// soft-clamps them and the compositor does not re-validate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::color::Color;
use crate::error::{CoverError, Result};

/// Unique identifier for a user-added text or image element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to an image source (uploaded artwork, logo, barcode...).
///
/// The bytes behind a handle live with the external collaborator that owns
/// file picking; the assets loader resolves handles into decoded pixels
/// before the compositor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(pub Uuid);

impl ImageRef {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageRef {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reading orientation of the finished book.
///
/// Determines the left-to-right order of the three panels on the printed
/// sheet: a right-bound book (e.g. English) lays out back, spine, front; a
/// left-bound book (e.g. Arabic) lays out front, spine, back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    RightBound,
    LeftBound,
}

impl Orientation {
    /// Panels in left-to-right order on the printed sheet.
    pub fn panel_order(&self) -> [Panel; 3] {
        match self {
            Self::RightBound => [Panel::Back, Panel::Spine, Panel::Front],
            Self::LeftBound => [Panel::Front, Panel::Spine, Panel::Back],
        }
    }
}

/// One of the three printable regions of the cover sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Back,
    Spine,
    Front,
}

impl Panel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Spine => "spine",
            Self::Front => "front",
        }
    }
}

/// Physical cover dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width of one cover panel (front or back).
    pub width_in: f32,
    /// Height of the cover.
    pub height_in: f32,
    /// Spine thickness.
    pub spine_in: f32,
    /// Bleed margin beyond the trim line, consumed by cutter tolerance.
    pub bleed_in: f32,
    /// Safety-margin inset inside the trim line (advisory).
    pub trim_in: f32,
}

impl Dimensions {
    /// Total sheet width including both panels, the spine, and bleed.
    pub fn total_width_in(&self) -> f32 {
        2.0 * self.width_in + self.spine_in + 2.0 * self.bleed_in
    }

    /// Total sheet height including bleed.
    pub fn total_height_in(&self) -> f32 {
        self.height_in + 2.0 * self.bleed_in
    }

    /// Defensive validation: upstream input forms should already prevent
    /// these, but the resolver refuses to divide by zero on bad data.
    pub fn validate(&self) -> Result<()> {
        if !(self.width_in > 0.0) || !(self.height_in > 0.0) || !(self.spine_in > 0.0) {
            return Err(CoverError::InvalidGeometry(format!(
                "width, height and spine must be positive (got {} x {} x {})",
                self.width_in, self.height_in, self.spine_in
            )));
        }
        if !(self.bleed_in >= 0.0) || !(self.trim_in >= 0.0) {
            return Err(CoverError::InvalidGeometry(format!(
                "bleed and trim must be non-negative (got bleed {}, trim {})",
                self.bleed_in, self.trim_in
            )));
        }
        Ok(())
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        // The editor's initial 6" x 9" trade paperback with a 1" spine.
        Self {
            width_in: 6.0,
            height_in: 9.0,
            spine_in: 1.0,
            bleed_in: 0.125,
            trim_in: 0.125,
        }
    }
}

/// Horizontal text alignment. `Justify` is only offered on box-bound
/// back-cover text; elsewhere the editor restricts to the first three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

/// An anchor position as percentages (0–100) of the panel content box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionPct {
    pub x: f32,
    pub y: f32,
}

impl PositionPct {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Styling record shared by named text fields and custom text elements.
///
/// All size-like values are in points; the render layer converts to pixels
/// through the single `dpi / 72` boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub size_pt: f32,
    pub color: Color,
    pub align: TextAlign,
    /// Multiplier on the font size giving the advance between line tops.
    pub line_height: f32,
    pub letter_spacing_pt: f32,
    pub stroke_width_pt: f32,
    pub stroke_color: Color,
    pub shadow_blur_pt: f32,
    pub shadow_color: Color,
}

impl TextStyle {
    pub fn new(font_family: impl Into<String>, size_pt: f32, align: TextAlign) -> Self {
        Self {
            font_family: font_family.into(),
            size_pt,
            color: Color::WHITE,
            align,
            line_height: 1.2,
            letter_spacing_pt: 0.0,
            stroke_width_pt: 0.0,
            stroke_color: Color::BLACK,
            shadow_blur_pt: 0.0,
            shadow_color: Color::rgba(0, 0, 0, 128),
        }
    }
}

/// A named text field (title, author, back-cover blurb...).
///
/// Fields with `width_pct: Some(_)` are box-bound: the anchor is the box's
/// top-left corner and text wraps to the box width. Fields without a box
/// are anchor-centered: the anchor is the block center and the render layer
/// supplies a panel-relative maximum width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextField {
    pub content: String,
    pub style: TextStyle,
    pub position: PositionPct,
    pub width_pct: Option<f32>,
}

impl TextField {
    pub fn anchored(content: impl Into<String>, style: TextStyle, position: PositionPct) -> Self {
        Self {
            content: content.into(),
            style,
            position,
            width_pct: None,
        }
    }

    pub fn boxed(
        content: impl Into<String>,
        style: TextStyle,
        position: PositionPct,
        width_pct: f32,
    ) -> Self {
        Self {
            content: content.into(),
            style,
            position,
            width_pct: Some(width_pct),
        }
    }

    /// Empty fields are skipped entirely — no layout, no font requirement.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Background of one panel: a two-color linear gradient or an uploaded
/// image. Exactly one variant is authoritative at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BackgroundSpec {
    Gradient {
        color1: Color,
        color2: Color,
        /// CSS-style gradient angle in degrees.
        angle_deg: f32,
    },
    Upload { image: ImageRef },
}

impl BackgroundSpec {
    pub fn image_ref(&self) -> Option<ImageRef> {
        match self {
            Self::Upload { image } => Some(*image),
            Self::Gradient { .. } => None,
        }
    }
}

/// Placement of a fixed-role image (publisher logo, author photo, ISBN
/// barcode): position anchor plus width as a percentage of the panel width.
/// Height follows the decoded source's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub image: ImageRef,
    pub position: PositionPct,
    pub width_pct: f32,
}

/// The closed set of clip shapes for custom image elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipShape {
    None,
    Circle,
    Oval,
    Square,
    Rectangle,
    Triangle,
    Star,
}

/// A free-form text element added by the user. Insertion order in
/// `DesignState::custom_text` is z-order among siblings on the same panel;
/// panel membership is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTextElement {
    pub id: ElementId,
    pub panel: Panel,
    pub text: String,
    pub position: PositionPct,
    /// Box width as a percentage of the panel width.
    pub width_pct: f32,
    pub style: TextStyle,
}

impl CustomTextElement {
    /// A new element with the editor's insertion defaults for `panel`.
    pub fn new(panel: Panel) -> Self {
        let spine = panel == Panel::Spine;
        Self {
            id: ElementId::new(),
            panel,
            text: "New Text".to_owned(),
            position: PositionPct::new(50.0, 50.0),
            width_pct: if spine { 80.0 } else { 40.0 },
            style: TextStyle::new("sans-serif", if spine { 18.0 } else { 24.0 }, TextAlign::Center),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A free-form image element added by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomImageElement {
    pub id: ElementId,
    pub image: ImageRef,
    pub panel: Panel,
    pub position: PositionPct,
    /// Width as a percentage of the panel width.
    pub width_pct: f32,
    pub rotation_deg: f32,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub opacity: f32,
    pub clip_shape: ClipShape,
    /// Source width / height, fixed at import time and never recomputed.
    pub aspect_ratio: f32,
}

impl CustomImageElement {
    /// A new element with the editor's insertion defaults.
    pub fn new(image: ImageRef, panel: Panel, aspect_ratio: f32) -> Self {
        Self {
            id: ElementId::new(),
            image,
            panel,
            position: PositionPct::new(50.0, 50.0),
            width_pct: 30.0,
            rotation_deg: 0.0,
            opacity: 1.0,
            clip_shape: ClipShape::None,
            aspect_ratio,
        }
    }
}

/// Front cover: background, the three named fields, optional publisher logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontPanel {
    pub background: BackgroundSpec,
    pub title: TextField,
    pub subtitle: TextField,
    pub author: TextField,
    pub logo: Option<ImagePlacement>,
}

impl FrontPanel {
    /// Editor default placement for a newly assigned publisher logo.
    pub fn default_logo(image: ImageRef) -> ImagePlacement {
        ImagePlacement {
            image,
            position: PositionPct::new(50.0, 95.0),
            width_pct: 15.0,
        }
    }
}

/// Spine: background, title/author channel fields, optional publisher logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinePanel {
    pub background: BackgroundSpec,
    pub title: TextField,
    pub author: TextField,
    pub logo: Option<ImagePlacement>,
}

impl SpinePanel {
    /// Editor default placement for a newly assigned publisher logo.
    pub fn default_logo(image: ImageRef) -> ImagePlacement {
        ImagePlacement {
            image,
            position: PositionPct::new(50.0, 95.0),
            width_pct: 60.0,
        }
    }
}

/// Back cover: background, box-bound blurb, and the fixed-role images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackPanel {
    pub background: BackgroundSpec,
    pub blurb: TextField,
    pub author_photo: Option<ImagePlacement>,
    pub logo: Option<ImagePlacement>,
    pub isbn_barcode: Option<ImagePlacement>,
}

impl BackPanel {
    /// Editor default placement for a newly assigned publisher logo.
    pub fn default_logo(image: ImageRef) -> ImagePlacement {
        ImagePlacement {
            image,
            position: PositionPct::new(5.0, 93.0),
            width_pct: 10.0,
        }
    }

    /// Editor default placement for a newly assigned author photo.
    pub fn default_author_photo(image: ImageRef) -> ImagePlacement {
        ImagePlacement {
            image,
            position: PositionPct::new(70.0, 5.0),
            width_pct: 25.0,
        }
    }

    /// Editor default placement for a newly assigned ISBN barcode.
    pub fn default_isbn_barcode(image: ImageRef) -> ImagePlacement {
        ImagePlacement {
            image,
            position: PositionPct::new(70.0, 85.0),
            width_pct: 25.0,
        }
    }
}

/// Mode flag pair selecting which drawing stages run.
///
/// The surrounding product exercises `WITH_TEXT` (the free export) and
/// `ARTWORK_ONLY` (the gated export that strips text and overlay imagery);
/// the flags stay independent rather than coupled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub include_text: bool,
    pub include_overlay_images: bool,
}

impl RenderOptions {
    pub const WITH_TEXT: Self = Self {
        include_text: true,
        include_overlay_images: true,
    };

    pub const ARTWORK_ONLY: Self = Self {
        include_text: false,
        include_overlay_images: false,
    };
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::WITH_TEXT
    }
}

/// A complete, immutable design snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignState {
    pub orientation: Orientation,
    pub dimensions: Dimensions,
    pub front: FrontPanel,
    pub spine: SpinePanel,
    pub back: BackPanel,
    pub custom_text: Vec<CustomTextElement>,
    pub custom_images: Vec<CustomImageElement>,
}

impl DesignState {
    pub fn background(&self, panel: Panel) -> &BackgroundSpec {
        match panel {
            Panel::Back => &self.back.background,
            Panel::Spine => &self.spine.background,
            Panel::Front => &self.front.background,
        }
    }

    /// Custom text elements on `panel`, in z-order.
    pub fn custom_text_on(&self, panel: Panel) -> impl Iterator<Item = &CustomTextElement> {
        self.custom_text.iter().filter(move |el| el.panel == panel)
    }

    /// Custom image elements on `panel`, in z-order.
    pub fn custom_images_on(&self, panel: Panel) -> impl Iterator<Item = &CustomImageElement> {
        self.custom_images.iter().filter(move |el| el.panel == panel)
    }

    /// Every image handle a render with these options will touch.
    ///
    /// Background uploads are always needed; fixed-role and custom images
    /// only when the overlay stage runs. May contain duplicates (the same
    /// logo placed on several panels); the loader de-duplicates.
    pub fn referenced_images(&self, include_overlay_images: bool) -> Vec<ImageRef> {
        let mut refs = Vec::new();
        for panel in [Panel::Back, Panel::Spine, Panel::Front] {
            refs.extend(self.background(panel).image_ref());
        }
        if include_overlay_images {
            let placements = [
                self.front.logo.as_ref(),
                self.spine.logo.as_ref(),
                self.back.author_photo.as_ref(),
                self.back.logo.as_ref(),
                self.back.isbn_barcode.as_ref(),
            ];
            refs.extend(placements.into_iter().flatten().map(|p| p.image));
            refs.extend(self.custom_images.iter().map(|el| el.image));
        }
        refs
    }

    /// Distinct font families required before text can be measured: every
    /// family referenced by a non-empty field or custom element.
    pub fn font_families(&self) -> BTreeSet<&str> {
        let named = [
            &self.front.title,
            &self.front.subtitle,
            &self.front.author,
            &self.spine.title,
            &self.spine.author,
            &self.back.blurb,
        ];
        named
            .into_iter()
            .filter(|f| !f.is_empty())
            .map(|f| f.style.font_family.as_str())
            .chain(
                self.custom_text
                    .iter()
                    .filter(|el| !el.is_empty())
                    .map(|el| el.style.font_family.as_str()),
            )
            .collect()
    }
}

impl Default for DesignState {
    /// The editor's initial state: empty text on default gradients.
    fn default() -> Self {
        let gradient = |c1: &str, c2: &str, angle_deg: f32| BackgroundSpec::Gradient {
            color1: Color::from_hex(c1).unwrap_or(Color::WHITE),
            color2: Color::from_hex(c2).unwrap_or(Color::WHITE),
            angle_deg,
        };

        Self {
            orientation: Orientation::RightBound,
            dimensions: Dimensions::default(),
            front: FrontPanel {
                background: gradient("#63B3ED", "#3182CE", 145.0),
                title: TextField::anchored(
                    "",
                    TextStyle::new("serif", 64.0, TextAlign::Center),
                    PositionPct::new(50.0, 25.0),
                ),
                subtitle: TextField::anchored(
                    "",
                    TextStyle::new("sans-serif", 32.0, TextAlign::Center),
                    PositionPct::new(50.0, 45.0),
                ),
                author: TextField::anchored(
                    "",
                    TextStyle::new("sans-serif", 42.0, TextAlign::Center),
                    PositionPct::new(50.0, 85.0),
                ),
                logo: None,
            },
            spine: SpinePanel {
                background: gradient("#ED8936", "#C05621", 180.0),
                title: TextField::anchored(
                    "",
                    TextStyle::new("serif", 36.0, TextAlign::Center),
                    PositionPct::new(50.0, 30.0),
                ),
                author: TextField::anchored(
                    "",
                    TextStyle::new("sans-serif", 24.0, TextAlign::Center),
                    PositionPct::new(50.0, 80.0),
                ),
                logo: None,
            },
            back: BackPanel {
                background: gradient("#2D3748", "#1A202C", 180.0),
                blurb: TextField::boxed(
                    "",
                    TextStyle::new("sans-serif", 12.0, TextAlign::Left),
                    PositionPct::new(5.0, 15.0),
                    60.0,
                ),
                author_photo: None,
                logo: None,
                isbn_barcode: None,
            },
            custom_text: Vec::new(),
            custom_images: Vec::new(),
        }
    }
}
