//! Property edits on the selected element.
//!
//! The editor never holds the element; each call looks the selection up in
//! the store by id. A discrete change is one committed mutation. Slider
//! drags bracket their changes with `begin_slider` / `end_slider` so the
//! whole drag lands as a single history entry holding the final value.

use crate::error::EditorError;
use ovl_core::wire::FontEntry;
use ovl_core::{
    Background, Color, ElementId, ElementPatch, ElementStore, FontStyle, InlineStyle, RichText, TextAlign,
    TextDecoration, TextRange,
};

/// One property change.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleChange {
    Text(RichText),
    FontFamily(String),
    FontSize(f64),
    FontWeight(u16),
    FontStyle(FontStyle),
    Decoration(TextDecoration),
    Align(TextAlign),
    Color(Color),
    StrokeWidth(f64),
    StrokeColor(Color),
    Shadow(bool),
    ShadowColor(Color),
    ShadowBlur(f64),
    ShadowOffsetX(f64),
    ShadowOffsetY(f64),
    Background(Background),
    BackgroundOpacity(f64),
    Opacity(f64),
    LetterSpacing(f64),
    LineHeight(f64),
}

impl StyleChange {
    pub fn into_patch(self) -> ElementPatch {
        let mut p = ElementPatch::default();
        match self {
            StyleChange::Text(v) => p.text = Some(v),
            StyleChange::FontFamily(v) => p.font_name = Some(v),
            StyleChange::FontSize(v) => p.font_size = Some(v),
            StyleChange::FontWeight(v) => p.font_weight = Some(v),
            StyleChange::FontStyle(v) => p.font_style = Some(v),
            StyleChange::Decoration(v) => p.text_decoration = Some(v),
            StyleChange::Align(v) => p.text_align = Some(v),
            StyleChange::Color(v) => p.color = Some(v),
            StyleChange::StrokeWidth(v) => p.stroke_width = Some(v),
            StyleChange::StrokeColor(v) => p.stroke_color = Some(v),
            StyleChange::Shadow(v) => p.shadow_enabled = Some(v),
            StyleChange::ShadowColor(v) => p.shadow_color = Some(v),
            StyleChange::ShadowBlur(v) => p.shadow_blur = Some(v),
            StyleChange::ShadowOffsetX(v) => p.shadow_offset_x = Some(v),
            StyleChange::ShadowOffsetY(v) => p.shadow_offset_y = Some(v),
            StyleChange::Background(v) => p.background_color = Some(v),
            StyleChange::BackgroundOpacity(v) => p.background_opacity = Some(v),
            StyleChange::Opacity(v) => p.opacity = Some(v),
            StyleChange::LetterSpacing(v) => p.letter_spacing = Some(v),
            StyleChange::LineHeight(v) => p.line_height = Some(v),
        }
        p
    }
}

#[derive(Debug, Default)]
pub struct StyleEditor {
    catalog: Vec<FontEntry>,
    sliding: bool,
}

impl StyleEditor {
    pub fn new(catalog: Vec<FontEntry>) -> Self {
        Self {
            catalog,
            sliding: false,
        }
    }

    pub fn catalog(&self) -> &[FontEntry] {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: Vec<FontEntry>) {
        self.catalog = catalog;
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding
    }

    fn target(store: &ElementStore) -> Result<ElementId, EditorError> {
        store.selected_id().ok_or(EditorError::NoSelection)
    }

    /// Apply one change to the selected element.
    pub fn apply(&mut self, store: &mut ElementStore, change: StyleChange) -> Result<(), EditorError> {
        let id = Self::target(store)?;
        if let StyleChange::FontFamily(family) = &change {
            if !self.catalog.is_empty() && !self.catalog.iter().any(|f| &f.family == family) {
                return Err(EditorError::UnknownFont(family.clone()));
            }
        }
        let patch = change.into_patch();
        if self.sliding {
            store.preview_update(id, &patch)?;
        } else {
            store.commit_update(id, &patch)?;
            log::debug!("style change on {id}");
        }
        Ok(())
    }

    /// A slider grab: changes until `end_slider` coalesce into one entry.
    pub fn begin_slider(&mut self, store: &mut ElementStore) -> Result<(), EditorError> {
        Self::target(store)?;
        if !self.sliding {
            self.sliding = true;
            store.begin_gesture();
        }
        Ok(())
    }

    /// Returns whether the drag changed anything.
    pub fn end_slider(&mut self, store: &mut ElementStore) -> bool {
        if !self.sliding {
            return false;
        }
        self.sliding = false;
        store.end_gesture()
    }

    /// Toggle shadow on/off.
    pub fn toggle_shadow(&mut self, store: &mut ElementStore) -> Result<bool, EditorError> {
        let enabled = store.selected().ok_or(EditorError::NoSelection)?.shadow_enabled;
        self.apply(store, StyleChange::Shadow(!enabled))?;
        Ok(!enabled)
    }

    /// Bold / italic / underline over `range` of the selected element's text.
    ///
    /// Clears the attribute if the whole range already has it, sets it
    /// otherwise. A collapsed range targets the whole text.
    pub fn apply_inline(
        &mut self,
        store: &mut ElementStore,
        range: TextRange,
        style: InlineStyle,
    ) -> Result<(), EditorError> {
        let mut text = store.selected().ok_or(EditorError::NoSelection)?.text.clone();
        text.apply_style(range, style);
        self.apply(store, StyleChange::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovl_core::{Point, TextElement};
    use pretty_assertions::assert_eq;

    fn store_with_selection() -> (ElementStore, ElementId) {
        let mut store = ElementStore::new();
        let id = store
            .add(TextElement::new(ElementId::UNASSIGNED, RichText::plain("Hello"), Point::ZERO))
            .unwrap();
        (store, id)
    }

    #[test]
    fn discrete_change_is_one_entry() {
        let (mut store, id) = store_with_selection();
        let mut editor = StyleEditor::default();
        let before = store.history().len();
        editor.apply(&mut store, StyleChange::Color(Color::rgb(255, 0, 0))).unwrap();
        assert_eq!(store.history().len(), before + 1);
        assert_eq!(store.get(id).unwrap().color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn slider_drag_coalesces_to_final_value() {
        let (mut store, id) = store_with_selection();
        let mut editor = StyleEditor::default();
        let before = store.history().len();
        editor.begin_slider(&mut store).unwrap();
        for v in [90.0, 70.0, 40.0] {
            editor.apply(&mut store, StyleChange::Opacity(v)).unwrap();
        }
        assert!(editor.end_slider(&mut store));
        assert_eq!(store.history().len(), before + 1);
        assert_eq!(store.get(id).unwrap().opacity, 40.0);

        store.undo().unwrap();
        assert_eq!(store.get(id).unwrap().opacity, 100.0);
    }

    #[test]
    fn slider_values_are_clamped() {
        let (mut store, id) = store_with_selection();
        let mut editor = StyleEditor::default();
        editor.apply(&mut store, StyleChange::LetterSpacing(99.0)).unwrap();
        editor.apply(&mut store, StyleChange::ShadowOffsetX(-80.0)).unwrap();
        let el = store.get(id).unwrap();
        assert_eq!(el.letter_spacing, 20.0);
        assert_eq!(el.shadow_offset_x, -50.0);
    }

    #[test]
    fn needs_selection() {
        let (mut store, _) = store_with_selection();
        store.deselect();
        let mut editor = StyleEditor::default();
        assert_eq!(
            editor.apply(&mut store, StyleChange::FontSize(30.0)),
            Err(EditorError::NoSelection)
        );
        assert_eq!(editor.begin_slider(&mut store), Err(EditorError::NoSelection));
    }

    #[test]
    fn font_family_checked_against_catalog() {
        let (mut store, id) = store_with_selection();
        let mut editor = StyleEditor::new(vec![FontEntry::new("Roboto", "Roboto")]);
        assert_eq!(
            editor.apply(&mut store, StyleChange::FontFamily("Comic".into())),
            Err(EditorError::UnknownFont("Comic".into()))
        );
        editor.apply(&mut store, StyleChange::FontFamily("Roboto".into())).unwrap();
        assert_eq!(store.get(id).unwrap().font_name, "Roboto");
    }

    #[test]
    fn inline_bold_toggles_range() {
        let (mut store, id) = store_with_selection();
        let mut editor = StyleEditor::default();
        editor
            .apply_inline(&mut store, TextRange::new(0, 2), InlineStyle::Bold)
            .unwrap();
        assert_eq!(store.get(id).unwrap().text.to_markup(), "<b>He</b>llo");
        editor
            .apply_inline(&mut store, TextRange::new(0, 2), InlineStyle::Bold)
            .unwrap();
        assert_eq!(store.get(id).unwrap().text.to_markup(), "Hello");
        // Collapsed caret: whole text.
        editor
            .apply_inline(&mut store, TextRange::new(3, 3), InlineStyle::Italic)
            .unwrap();
        assert_eq!(store.get(id).unwrap().text.to_markup(), "<i>Hello</i>");
    }

    #[test]
    fn toggle_shadow_flips() {
        let (mut store, id) = store_with_selection();
        let mut editor = StyleEditor::default();
        assert_eq!(editor.toggle_shadow(&mut store), Ok(true));
        assert!(store.get(id).unwrap().shadow_enabled);
        assert_eq!(editor.toggle_shadow(&mut store), Ok(false));
    }
}
