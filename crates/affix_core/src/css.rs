//! Class-name contract between the engine, the markup, and the
//! stylesheet
//!
//! Selector classes mark candidate elements and boundary landmarks in
//! the server-rendered markup. Marker classes are the engine's output:
//! the stylesheet keys `position: fixed` and transition animations off
//! them.

/// Candidate elements that stick to the top of the viewport.
pub const STICK_AT_TOP_SELECTOR: &str = "js-stick-at-top-when-scrolling";

/// Candidate elements that stick to the bottom of the viewport.
pub const STICK_AT_BOTTOM_SELECTOR: &str = "js-stick-at-bottom-when-scrolling";

/// Travel limit landmark for top-stickies; first match wins.
pub const FOOTER_SELECTOR: &str = "js-footer";

/// Travel limit landmark for bottom-stickies; first match wins.
pub const HEADER_SELECTOR: &str = "js-header";

/// Applied when an element becomes sticky from user scrolling; the
/// stylesheet animates this one.
pub const FIXED_CLASS: &str = "content-fixed";

/// Applied when an element is already past its threshold on the
/// initial position pass; no transition animation.
pub const FIXED_ONLOAD_CLASS: &str = "content-fixed-onload";

/// Boundary marker for the lowest stuck member of a top-edge group.
pub const GROUP_BOTTOM_CLASS: &str = "content-fixed__bottom";

/// Boundary marker for the highest stuck member of a bottom-edge
/// group.
pub const GROUP_TOP_CLASS: &str = "content-fixed__top";

/// Placeholder inserted to hold an element's flow space while it is
/// out of flow.
pub const SHIM_CLASS: &str = "shim";

/// Format a pixel length the way it is written into inline styles.
pub(crate) fn px(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}px")
    } else {
        format!("{value}px")
    }
}
