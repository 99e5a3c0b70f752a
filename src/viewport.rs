/// Value for the `--vh` custom property: one percent of the visible height,
/// which mobile browsers change as the address bar collapses.
pub fn viewport_unit(inner_height: f64) -> String {
    let inner_height = if inner_height.is_finite() { inner_height.max(0.0) } else { 0.0 };
    format!("{}px", inner_height * 0.01)
}

/// The overlay only exists below the breakpoint; a resize past it dismisses it.
pub fn should_close_menu_after_resize(width: f64, mobile_breakpoint: f64) -> bool {
    width > mobile_breakpoint
}

/// Width for a skills progress bar from its label, e.g. `"85%"` → `"85%"`.
pub fn skill_bar_width(label: &str) -> Option<String> {
    let value = label.trim().trim_end_matches('%').trim().parse::<f64>().ok()?;

    if !(0.0..=100.0).contains(&value) {
        return None;
    }

    Some(format!("{value}%"))
}
