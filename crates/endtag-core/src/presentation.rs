//! Presentation helpers for a UI layer.
//!
//! Rendering is up to the host. These helpers only turn a [`Region`] and the user's
//! [`EndTagOptions`] into the decisions every renderer needs: what the tag shows, whether it is
//! shown right now, and where a click on it navigates.

use crate::icon::IconCategory;
use crate::options::{ClickMode, DisplayMode, EndTagOptions, VisibilityMode};
use crate::region::Region;
use crate::snapshot::TextSnapshot;
use std::ops::Range;

/// What a single end tag displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTagView {
    /// Icon, if the display mode includes it.
    pub icon: Option<IconCategory>,
    /// Header text, if the display mode includes it.
    pub text: Option<String>,
    /// Full header, for a tooltip regardless of display mode.
    pub tooltip: String,
    /// Gap before the tag, in pixels.
    pub margin: u32,
}

impl EndTagView {
    /// Build the view of `region` under `options`.
    pub fn new(region: &Region, options: &EndTagOptions) -> Self {
        let (icon, text) = match options.display_mode {
            DisplayMode::Icon => (Some(region.icon), None),
            DisplayMode::Text => (None, Some(region.header.clone())),
            DisplayMode::IconAndText => (Some(region.icon), Some(region.header.clone())),
        };
        Self {
            icon,
            text,
            tooltip: region.header.clone(),
            margin: options.margin,
        }
    }
}

/// Whether the tag for `region` should be shown while `visible_lines` are on screen.
///
/// With [`VisibilityMode::HeaderNotVisible`] a tag is only useful once its header has scrolled
/// out of view.
pub fn should_display(
    region: &Region,
    snapshot: &dyn TextSnapshot,
    visible_lines: Range<usize>,
    options: &EndTagOptions,
) -> bool {
    match options.visibility_mode {
        VisibilityMode::Always => true,
        VisibilityMode::HeaderNotVisible => {
            !visible_lines.contains(&snapshot.line_of(region.header_start()))
        }
    }
}

/// A pointer gesture on an end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickGesture {
    /// Click count (1 for a single click, 2 for a double click).
    pub clicks: u8,
    /// Whether Ctrl (Cmd on macOS) was held.
    pub ctrl: bool,
}

impl ClickGesture {
    /// A plain single click.
    pub const fn single() -> Self {
        Self {
            clicks: 1,
            ctrl: false,
        }
    }

    /// A plain double click.
    pub const fn double() -> Self {
        Self {
            clicks: 2,
            ctrl: false,
        }
    }

    /// A single click with Ctrl held.
    pub const fn ctrl_click() -> Self {
        Self {
            clicks: 1,
            ctrl: true,
        }
    }

    /// Whether this gesture navigates under `mode`.
    pub fn triggers(&self, mode: ClickMode) -> bool {
        match mode {
            ClickMode::Single => self.clicks == 1,
            ClickMode::Double => self.clicks == 2,
            ClickMode::CtrlClick => self.clicks == 1 && self.ctrl,
        }
    }
}

/// Where navigation from an end tag lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTarget {
    /// Character offset of the header start.
    pub offset: usize,
    /// Zero-based line of the header start.
    pub line: usize,
}

/// The navigation target of `region`.
pub fn jump_target(region: &Region, snapshot: &dyn TextSnapshot) -> JumpTarget {
    let offset = region.header_start().min(snapshot.len_chars());
    JumpTarget {
        offset,
        line: snapshot.line_of(offset),
    }
}

/// Resolve a gesture on `region` to a jump target, if the gesture matches the click mode.
pub fn handle_click(
    region: &Region,
    gesture: ClickGesture,
    snapshot: &dyn TextSnapshot,
    options: &EndTagOptions,
) -> Option<JumpTarget> {
    gesture
        .triggers(options.click_mode)
        .then(|| jump_target(region, snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::Visibility;
    use crate::snapshot::RopeSnapshot;
    use crate::span::TextSpan;

    fn sample() -> (RopeSnapshot, Region) {
        let snapshot = RopeSnapshot::new("a\nvoid Run()\n{\n}\n", 0);
        let region = Region::new(
            TextSpan::new(2, 16),
            "void Run()",
            IconCategory::Method(Visibility::Private),
        );
        (snapshot, region)
    }

    #[test]
    fn test_view_follows_display_mode() {
        let (_, region) = sample();
        let mut options = EndTagOptions::default();
        let both = EndTagView::new(&region, &options);
        assert_eq!(both.text.as_deref(), Some("void Run()"));
        assert!(both.icon.is_some());

        options.display_mode = DisplayMode::Icon;
        let icon = EndTagView::new(&region, &options);
        assert_eq!(icon.text, None);
        assert_eq!(icon.tooltip, "void Run()");

        options.display_mode = DisplayMode::Text;
        assert_eq!(EndTagView::new(&region, &options).icon, None);
    }

    #[test]
    fn test_header_not_visible_mode() {
        let (snapshot, region) = sample();
        let mut options = EndTagOptions::default();
        assert!(should_display(&region, &snapshot, 0..10, &options));

        options.visibility_mode = VisibilityMode::HeaderNotVisible;
        assert!(!should_display(&region, &snapshot, 0..10, &options));
        assert!(should_display(&region, &snapshot, 2..10, &options));
    }

    #[test]
    fn test_click_modes() {
        assert!(ClickGesture::single().triggers(ClickMode::Single));
        assert!(!ClickGesture::single().triggers(ClickMode::Double));
        assert!(ClickGesture::double().triggers(ClickMode::Double));
        assert!(ClickGesture::ctrl_click().triggers(ClickMode::CtrlClick));
        assert!(!ClickGesture::single().triggers(ClickMode::CtrlClick));
    }

    #[test]
    fn test_click_jumps_to_header_start() {
        let (snapshot, region) = sample();
        let options = EndTagOptions::default();
        assert_eq!(
            handle_click(&region, ClickGesture::single(), &snapshot, &options),
            Some(JumpTarget { offset: 2, line: 1 })
        );
        assert_eq!(
            handle_click(&region, ClickGesture::double(), &snapshot, &options),
            None
        );
    }
}
