//! # Visibility classification
//!
//! Maps numeric local circumstances to exactly one textual category. The
//! classification is total: every combination of defined contacts and
//! altitude signs lands in exactly one variant, and an event whose every
//! contact is below the horizon is `Invisible`.
//!
//! Solar events are classified by the situation at maximum phase, with
//! sunrise/sunset refinements when the maximum itself happens below the
//! horizon. Lunar events walk a fixed ladder of phase checks in which the
//! last satisfied condition wins, so the final category names the most
//! relevant visible aspect of the event.

use std::fmt;

use crate::local::{ContactPoint, LunarLocalCircumstances, SolarLocalCircumstances};
use crate::search::SolarEclipseKind;

/// Visibility of a solar eclipse from one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolarVisibility {
    /// Nothing of the event happens above the horizon.
    Invisible,
    /// The eclipse is already in progress when the Sun rises.
    VisibleOnSunrise,
    /// The Sun sets while the eclipse is still in progress.
    VisibleOnSunset,
    /// The total or annular phase is observable at the site.
    VisibleTotally,
    /// Only the partial phase is observable although the event is central
    /// somewhere else.
    VisibleAsPartial,
    /// The (intrinsically partial) eclipse is observable.
    Visible,
}

impl fmt::Display for SolarVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SolarVisibility::Invisible => "invisible",
            SolarVisibility::VisibleOnSunrise => "visible on sunrise",
            SolarVisibility::VisibleOnSunset => "visible on sunset",
            SolarVisibility::VisibleTotally => "visible totally",
            SolarVisibility::VisibleAsPartial => "visible as partial",
            SolarVisibility::Visible => "visible",
        };
        f.write_str(text)
    }
}

/// Visibility of a lunar eclipse from one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LunarVisibility {
    Invisible,
    /// The Moon is up when the penumbral phase begins, then sets.
    VisiblePenumbralBegin,
    /// The Moon is up when the partial phase begins.
    VisiblePartialBegin,
    /// The Moon is up when the total phase begins.
    VisibleTotalBegin,
    /// The Moon rises before the penumbral phase ends.
    VisiblePenumbralEnd,
    /// The Moon rises before the partial phase ends.
    VisiblePartialEnd,
    /// The Moon rises before the total phase ends.
    VisibleTotalEnd,
    /// The Moon is up at maximum: the event as a whole is observable.
    Visible,
}

impl fmt::Display for LunarVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LunarVisibility::Invisible => "invisible",
            LunarVisibility::VisiblePenumbralBegin => "visible at penumbral phase beginning",
            LunarVisibility::VisiblePartialBegin => "visible at partial phase beginning",
            LunarVisibility::VisibleTotalBegin => "visible at total phase beginning",
            LunarVisibility::VisiblePenumbralEnd => "visible at penumbral phase end",
            LunarVisibility::VisiblePartialEnd => "visible at partial phase end",
            LunarVisibility::VisibleTotalEnd => "visible at total phase end",
            LunarVisibility::Visible => "visible",
        };
        f.write_str(text)
    }
}

#[inline]
fn above_horizon(contact: &Option<ContactPoint>) -> bool {
    contact.map(|c| c.altitude > 0.0).unwrap_or(false)
}

/// Classify the solar circumstances of one site.
///
/// `kind` is the geometric type of the event as a whole; it decides whether a
/// merely-partial view is reported as `Visible` or `VisibleAsPartial`.
pub fn classify_solar(
    circumstances: &SolarLocalCircumstances,
    kind: SolarEclipseKind,
) -> SolarVisibility {
    if circumstances.magnitude <= 0.0 {
        return SolarVisibility::Invisible;
    }

    if circumstances.maximum.altitude <= 0.0 {
        // Maximum happens below the horizon; the event may still straddle
        // sunrise or sunset.
        let begin_up = above_horizon(&circumstances.first_contact)
            || above_horizon(&circumstances.second_contact);
        let end_up = above_horizon(&circumstances.third_contact)
            || above_horizon(&circumstances.fourth_contact);

        return match (begin_up, end_up) {
            (true, _) => SolarVisibility::VisibleOnSunset,
            (false, true) => SolarVisibility::VisibleOnSunrise,
            (false, false) => SolarVisibility::Invisible,
        };
    }

    if circumstances.total_duration_days > 0.0 {
        SolarVisibility::VisibleTotally
    } else if kind == SolarEclipseKind::Partial {
        SolarVisibility::Visible
    } else {
        SolarVisibility::VisibleAsPartial
    }
}

/// Classify the lunar circumstances of one site.
///
/// The checks run in a fixed order and the **last** satisfied one wins: phase
/// begin checks first, phase end checks next, plain visibility at maximum
/// last. A site where every contact is below the horizon stays `Invisible`.
pub fn classify_lunar(circumstances: &LunarLocalCircumstances) -> LunarVisibility {
    let mut visibility = LunarVisibility::Invisible;

    if above_horizon(&circumstances.penumbral_begin) {
        visibility = LunarVisibility::VisiblePenumbralBegin;
    }
    if above_horizon(&circumstances.partial_begin) {
        visibility = LunarVisibility::VisiblePartialBegin;
    }
    if above_horizon(&circumstances.total_begin) {
        visibility = LunarVisibility::VisibleTotalBegin;
    }
    if above_horizon(&circumstances.penumbral_end) {
        visibility = LunarVisibility::VisiblePenumbralEnd;
    }
    if above_horizon(&circumstances.partial_end) {
        visibility = LunarVisibility::VisiblePartialEnd;
    }
    if above_horizon(&circumstances.total_end) {
        visibility = LunarVisibility::VisibleTotalEnd;
    }
    if circumstances.maximum.altitude > 0.0 {
        visibility = LunarVisibility::Visible;
    }

    visibility
}
