use std::collections::HashSet;

use serde_json::json;

use crate::config::PageConfig;
use crate::logging::{log_event, LogLevel};
use crate::menu::MobileMenu;

#[derive(Clone, Debug, PartialEq)]
pub struct SectionGeometry {
    pub id: String,
    pub offset_top: f64,
    pub height: f64,
}

impl SectionGeometry {
    pub fn new(id: impl Into<String>, offset_top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            offset_top,
            height,
        }
    }
}

/// Cached section range with the trigger margin already applied.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionDescriptor {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionDescriptor {
    fn from_geometry(geometry: SectionGeometry, trigger_margin: f64) -> Self {
        Self {
            id: geometry.id,
            top: geometry.offset_top - trigger_margin,
            height: geometry.height,
        }
    }

    /// Half-open `[top, top + height)`. NaN geometry and non-positive
    /// heights never contain anything.
    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.top && offset < self.top + self.height
    }
}

pub fn nav_target_from_href(href: &str) -> Option<String> {
    let (_, fragment) = href.split_once('#')?;
    let fragment = fragment.trim();

    if fragment.is_empty() {
        return None;
    }

    Some(fragment.to_string())
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavLink {
    pub target: String,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    pub offset: f64,
    pub sticky: bool,
}

pub trait PageHost {
    /// Reads every section's id, top offset and height. Forces layout, so the
    /// tracker only calls it while rebuilding.
    fn measure_sections(&mut self) -> Vec<SectionGeometry>;
    fn nav_link_targets(&mut self) -> Vec<String>;
    fn set_nav_link_active(&mut self, index: usize, active: bool);
    fn set_header_sticky(&mut self, sticky: bool);
    fn reveal_section(&mut self, id: &str);
    fn set_back_to_top_visible(&mut self, visible: bool);
}

type ActivationListener = Box<dyn FnMut(&str)>;

pub struct ScrollTracker<H: PageHost, M: MobileMenu> {
    config: PageConfig,
    host: H,
    menu: M,
    sections: Vec<SectionDescriptor>,
    links: Vec<NavLink>,
    active_section: Option<String>,
    state: ScrollState,
    applied_sticky: Option<bool>,
    applied_back_to_top: Option<bool>,
    revealed: HashSet<String>,
    listeners: Vec<ActivationListener>,
}

impl<H: PageHost, M: MobileMenu> ScrollTracker<H, M> {
    pub fn new(config: PageConfig, host: H, menu: M) -> Self {
        let mut tracker = Self {
            config,
            host,
            menu,
            sections: Vec::new(),
            links: Vec::new(),
            active_section: None,
            state: ScrollState::default(),
            applied_sticky: None,
            applied_back_to_top: None,
            revealed: HashSet::new(),
            listeners: Vec::new(),
        };
        tracker.rebuild();
        tracker
    }

    /// Re-measures sections and re-reads nav links.
    pub fn rebuild(&mut self) {
        let trigger_margin = self.config.trigger_margin;
        self.sections = self
            .host
            .measure_sections()
            .into_iter()
            .map(|geometry| SectionDescriptor::from_geometry(geometry, trigger_margin))
            .collect();
        self.links = self
            .host
            .nav_link_targets()
            .into_iter()
            .map(|target| NavLink {
                target,
                active: false,
            })
            .collect();
        self.sync_links(true);

        log_event(
            self.config.log_level,
            LogLevel::Debug,
            "sections_rebuilt",
            json!({
                "sections": self.sections.len(),
                "links": self.links.len(),
                "triggerMargin": trigger_margin,
            }),
        );
    }

    /// Applies one scroll offset. Idempotent for a fixed offset and layout.
    pub fn tick(&mut self, offset: f64) {
        let sticky = offset > self.config.sticky_threshold;
        self.state = ScrollState { offset, sticky };

        if self.applied_sticky != Some(sticky) {
            self.host.set_header_sticky(sticky);
            self.applied_sticky = Some(sticky);
        }

        let back_to_top = offset > self.config.back_to_top_threshold;
        if self.applied_back_to_top != Some(back_to_top) {
            self.host.set_back_to_top_visible(back_to_top);
            self.applied_back_to_top = Some(back_to_top);
        }

        // No match leaves the previous highlight in place.
        if let Some(id) = self.match_section(offset).map(|section| section.id.clone()) {
            let changed = self.active_section.as_deref() != Some(id.as_str());
            if changed {
                self.active_section = Some(id.clone());
                self.sync_links(false);
            }

            if self.revealed.insert(id.clone()) {
                self.host.reveal_section(&id);
            }

            if changed {
                log_event(
                    self.config.log_level,
                    LogLevel::Debug,
                    "section_activated",
                    json!({ "section": id, "offset": offset }),
                );
                for listener in &mut self.listeners {
                    listener(&id);
                }
            }
        }

        if self.menu.is_open() {
            self.menu.close();
        }
    }

    pub fn on_section_activated(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn active_section(&self) -> Option<&str> {
        self.active_section.as_deref()
    }

    pub fn active_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.active)
            .map(|link| link.target.as_str())
    }

    pub fn sections(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed.contains(id)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn menu(&self) -> &M {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut M {
        &mut self.menu
    }

    fn match_section(&self, offset: f64) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|section| section.contains(offset))
    }

    /// Clears every link, then marks the first one targeting the active
    /// section. With `force` every link is written, otherwise only changes.
    fn sync_links(&mut self, force: bool) {
        let chosen = self.active_section.as_deref().and_then(|active| {
            self.links
                .iter()
                .position(|link| link.target == active)
        });

        for (index, link) in self.links.iter_mut().enumerate() {
            let active = Some(index) == chosen;
            if force || link.active != active {
                self.host.set_nav_link_active(index, active);
            }
            link.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakePage {
        geometry: Vec<SectionGeometry>,
        link_targets: Vec<String>,
        link_active: Vec<bool>,
        sticky: bool,
        back_to_top: bool,
        revealed: Vec<String>,
        measure_calls: usize,
    }

    impl FakePage {
        fn new(geometry: Vec<SectionGeometry>, link_targets: &[&str]) -> Self {
            Self {
                geometry,
                link_targets: link_targets.iter().map(|target| target.to_string()).collect(),
                ..Self::default()
            }
        }

        fn active_count(&self) -> usize {
            self.link_active.iter().filter(|active| **active).count()
        }
    }

    impl PageHost for FakePage {
        fn measure_sections(&mut self) -> Vec<SectionGeometry> {
            self.measure_calls += 1;
            self.geometry.clone()
        }

        fn nav_link_targets(&mut self) -> Vec<String> {
            self.link_active.resize(self.link_targets.len(), false);
            self.link_targets.clone()
        }

        fn set_nav_link_active(&mut self, index: usize, active: bool) {
            self.link_active[index] = active;
        }

        fn set_header_sticky(&mut self, sticky: bool) {
            self.sticky = sticky;
        }

        fn reveal_section(&mut self, id: &str) {
            self.revealed.push(id.to_string());
        }

        fn set_back_to_top_visible(&mut self, visible: bool) {
            self.back_to_top = visible;
        }
    }

    #[derive(Default)]
    struct FakeMenu {
        open: bool,
        closes: usize,
    }

    impl MobileMenu for FakeMenu {
        fn is_open(&self) -> bool {
            self.open
        }

        fn close(&mut self) {
            self.open = false;
            self.closes += 1;
        }
    }

    fn config_with_margin(trigger_margin: f64) -> PageConfig {
        PageConfig {
            trigger_margin,
            ..PageConfig::default()
        }
    }

    fn home_and_about() -> Vec<SectionGeometry> {
        vec![
            SectionGeometry::new("home", 0.0, 500.0),
            SectionGeometry::new("about", 500.0, 400.0),
        ]
    }

    fn tracker(
        geometry: Vec<SectionGeometry>,
        links: &[&str],
        margin: f64,
    ) -> ScrollTracker<FakePage, FakeMenu> {
        ScrollTracker::new(
            config_with_margin(margin),
            FakePage::new(geometry, links),
            FakeMenu::default(),
        )
    }

    #[test]
    fn nav_target_is_the_href_fragment() {
        assert_eq!(nav_target_from_href("#about").as_deref(), Some("about"));
        assert_eq!(nav_target_from_href("/index.html#contact").as_deref(), Some("contact"));
        assert_eq!(nav_target_from_href("#"), None);
        assert_eq!(nav_target_from_href("/resume.pdf"), None);
    }

    #[test]
    fn margin_pulls_activation_ahead_of_section_top() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 120.0);
        tracker.tick(450.0);

        assert_eq!(tracker.active_section(), Some("about"));
        assert_eq!(tracker.active_link(), Some("about"));
        assert_eq!(tracker.host().link_active, vec![false, true]);
        assert_eq!(tracker.sections()[1].top, 380.0);
    }

    #[test]
    fn offset_past_every_section_keeps_previous_highlight() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 120.0);
        tracker.tick(100.0);
        tracker.tick(3_000.0);

        assert_eq!(tracker.active_link(), Some("home"));
        assert_eq!(tracker.host().link_active, vec![true, false]);
    }

    #[test]
    fn sticky_header_below_threshold() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 120.0);
        tracker.tick(50.0);

        assert!(!tracker.state().sticky);
        assert!(!tracker.host().sticky);
    }

    #[test]
    fn sticky_header_above_threshold() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 120.0);
        tracker.tick(150.0);

        assert!(tracker.state().sticky);
        assert!(tracker.host().sticky);
    }

    #[test]
    fn offset_equal_to_threshold_is_not_sticky() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 120.0);
        tracker.tick(150.0);
        tracker.tick(100.0);

        assert!(!tracker.state().sticky);
        assert!(!tracker.host().sticky);
    }

    #[test]
    fn rebuild_uses_new_geometry_for_the_same_offset() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 120.0);
        tracker.tick(450.0);
        assert_eq!(tracker.active_link(), Some("about"));

        tracker.host_mut().geometry = vec![
            SectionGeometry::new("home", 0.0, 1_000.0),
            SectionGeometry::new("about", 1_000.0, 800.0),
        ];
        tracker.rebuild();
        tracker.tick(450.0);

        assert_eq!(tracker.active_link(), Some("home"));
        assert_eq!(tracker.host().active_count(), 1);
    }

    #[test]
    fn ticks_never_read_layout() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 150.0);
        for offset in [0.0, 200.0, 400.0, 800.0, 1_200.0] {
            tracker.tick(offset);
        }

        assert_eq!(tracker.host().measure_calls, 1);
    }

    #[test]
    fn section_without_nav_link_clears_links_silently() {
        let geometry = vec![
            SectionGeometry::new("home", 0.0, 500.0),
            SectionGeometry::new("footer", 500.0, 200.0),
        ];
        let mut tracker = tracker(geometry, &["home"], 0.0);
        tracker.tick(10.0);
        tracker.tick(600.0);

        assert_eq!(tracker.active_section(), Some("footer"));
        assert_eq!(tracker.active_link(), None);
        assert_eq!(tracker.host().active_count(), 0);
    }

    #[test]
    fn gaps_between_sections_keep_highlight() {
        let geometry = vec![
            SectionGeometry::new("home", 0.0, 300.0),
            SectionGeometry::new("about", 600.0, 300.0),
        ];
        let mut tracker = tracker(geometry, &["home", "about"], 0.0);
        tracker.tick(100.0);
        tracker.tick(450.0);

        assert_eq!(tracker.active_link(), Some("home"));
    }

    #[test]
    fn overlapping_sections_resolve_to_first_in_document_order() {
        let geometry = vec![
            SectionGeometry::new("home", 0.0, 800.0),
            SectionGeometry::new("about", 400.0, 800.0),
        ];
        let mut tracker = tracker(geometry, &["home", "about"], 0.0);
        tracker.tick(500.0);

        assert_eq!(tracker.active_link(), Some("home"));
    }

    #[test]
    fn hidden_and_malformed_sections_never_match() {
        let geometry = vec![
            SectionGeometry::new("hidden", 0.0, 0.0),
            SectionGeometry::new("negative", 0.0, -50.0),
            SectionGeometry::new("nan", f64::NAN, 500.0),
        ];
        let mut tracker = tracker(geometry, &["hidden", "negative", "nan"], 0.0);
        tracker.tick(0.0);
        tracker.tick(10.0);

        assert_eq!(tracker.sections().len(), 3);
        assert_eq!(tracker.active_section(), None);
        assert_eq!(tracker.host().active_count(), 0);
    }

    #[test]
    fn empty_page_is_inert() {
        let mut tracker = tracker(Vec::new(), &[], 150.0);
        tracker.tick(400.0);

        assert!(tracker.sections().is_empty());
        assert_eq!(tracker.active_section(), None);
        assert!(tracker.state().sticky);
    }

    #[test]
    fn reveal_is_applied_once_per_section() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 0.0);
        for offset in [10.0, 600.0, 10.0, 600.0, 3_000.0] {
            tracker.tick(offset);
        }

        assert_eq!(tracker.host().revealed, vec!["home".to_string(), "about".to_string()]);
        assert!(tracker.is_revealed("home"));
        assert!(tracker.is_revealed("about"));
    }

    #[test]
    fn scrolling_closes_open_menu() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 0.0);
        tracker.menu_mut().open = true;
        tracker.tick(20.0);
        tracker.tick(40.0);

        assert!(!tracker.menu().open);
        assert_eq!(tracker.menu().closes, 1);
    }

    #[test]
    fn back_to_top_follows_threshold() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 0.0);
        tracker.tick(301.0);
        assert!(tracker.host().back_to_top);

        tracker.tick(300.0);
        assert!(!tracker.host().back_to_top);
    }

    #[test]
    fn activation_listener_fires_on_change_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut tracker = tracker(home_and_about(), &["home", "about"], 0.0);
        {
            let seen = seen.clone();
            tracker.on_section_activated(move |id| seen.borrow_mut().push(id.to_string()));
        }

        for offset in [10.0, 20.0, 600.0, 650.0, 10.0] {
            tracker.tick(offset);
        }

        assert_eq!(
            *seen.borrow(),
            vec!["home".to_string(), "about".to_string(), "home".to_string()]
        );
    }

    #[test]
    fn rebuild_restores_highlight_on_fresh_links() {
        let mut tracker = tracker(home_and_about(), &["home", "about"], 0.0);
        tracker.tick(600.0);

        tracker.host_mut().link_targets = vec!["about".to_string(), "home".to_string()];
        tracker.host_mut().link_active = vec![true, true];
        tracker.rebuild();

        assert_eq!(tracker.host().link_active, vec![true, false]);
        assert_eq!(tracker.active_link(), Some("about"));
    }

    fn contiguous_layout() -> impl Strategy<Value = Vec<SectionGeometry>> {
        prop::collection::vec(1.0f64..1_500.0, 0..8).prop_map(|heights| {
            let mut top = 0.0;
            heights
                .into_iter()
                .enumerate()
                .map(|(index, height)| {
                    let geometry = SectionGeometry::new(format!("section-{index}"), top, height);
                    top += height;
                    geometry
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn at_most_one_link_is_ever_active(
            layout in contiguous_layout(),
            offsets in prop::collection::vec(-500.0f64..12_000.0, 1..40),
        ) {
            let targets: Vec<String> = layout.iter().map(|section| section.id.clone()).collect();
            let target_refs: Vec<&str> = targets.iter().map(String::as_str).collect();
            let mut tracker = tracker(layout, &target_refs, 120.0);

            for offset in offsets {
                tracker.tick(offset);
                prop_assert!(tracker.host().active_count() <= 1);
                prop_assert!(tracker.links().iter().filter(|link| link.active).count() <= 1);
            }
        }

        #[test]
        fn repeated_ticks_are_idempotent(
            layout in contiguous_layout(),
            offset in -500.0f64..12_000.0,
        ) {
            let targets: Vec<String> = layout.iter().map(|section| section.id.clone()).collect();
            let target_refs: Vec<&str> = targets.iter().map(String::as_str).collect();
            let mut tracker = tracker(layout, &target_refs, 120.0);

            tracker.tick(offset);
            let first = (tracker.host().link_active.clone(), tracker.host().sticky, tracker.state());
            tracker.tick(offset);
            let second = (tracker.host().link_active.clone(), tracker.host().sticky, tracker.state());

            prop_assert_eq!(first, second);
        }

        #[test]
        fn revealed_sections_stay_revealed(
            layout in contiguous_layout(),
            offsets in prop::collection::vec(-500.0f64..12_000.0, 1..40),
        ) {
            let mut tracker = tracker(layout, &[], 120.0);
            let mut seen: Vec<String> = Vec::new();

            for offset in offsets {
                tracker.tick(offset);
                for id in &seen {
                    prop_assert!(tracker.is_revealed(id));
                }
                if let Some(active) = tracker.active_section() {
                    if !seen.iter().any(|id| id == active) {
                        seen.push(active.to_string());
                    }
                }
            }
        }
    }
}
