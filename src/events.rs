use serde_json::json;

use crate::config::PageConfig;
use crate::frame::{FrameCoalescer, FrameScheduler};
use crate::logging::{log_event, LogLevel};
use crate::menu::{MenuSurface, MenuToggle, MobileMenu};
use crate::tracker::{PageHost, ScrollTracker};
use crate::viewport::{should_close_menu_after_resize, viewport_unit};

pub trait DocumentEffects {
    fn set_viewport_unit(&mut self, value: &str);
    fn mark_touch_device(&mut self);
    fn mark_loaded(&mut self);
    fn toggle_project_layer(&mut self, index: usize);
}

#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    Scroll { offset: f64 },
    FrameReady,
    Resize { width: f64, height: f64 },
    /// Fired once resizing has been quiet for the debounce interval.
    ResizeSettled { width: f64 },
    OrientationChange,
    Loaded,
    /// Deferred content such as a lazily loaded image finished loading.
    ContentLoaded,
    MenuIconClicked,
    NavLinkClicked,
    KeyDown { key: String },
    TouchStart,
    ProjectTapped { index: usize },
    ConnectivityChanged { online: bool },
}

pub struct PageController<H, S, F, E>
where
    H: PageHost,
    S: MenuSurface,
    F: FrameScheduler,
    E: DocumentEffects,
{
    config: PageConfig,
    tracker: ScrollTracker<H, MenuToggle<S>>,
    coalescer: FrameCoalescer,
    frames: F,
    effects: E,
    touch_device: bool,
}

impl<H, S, F, E> PageController<H, S, F, E>
where
    H: PageHost,
    S: MenuSurface,
    F: FrameScheduler,
    E: DocumentEffects,
{
    pub fn new(config: PageConfig, host: H, menu_surface: S, frames: F, effects: E) -> Self {
        let tracker = ScrollTracker::new(config.clone(), host, MenuToggle::new(menu_surface));

        Self {
            config,
            tracker,
            coalescer: FrameCoalescer::default(),
            frames,
            effects,
            touch_device: false,
        }
    }

    pub fn dispatch(&mut self, event: PageEvent) {
        match event {
            PageEvent::Scroll { offset } => self.on_scroll(offset),
            PageEvent::FrameReady => self.on_frame(),
            PageEvent::Resize { width, height } => self.on_resize(width, height),
            PageEvent::ResizeSettled { width } => self.on_resize_settled(width),
            PageEvent::OrientationChange => self.on_orientation_change(),
            PageEvent::Loaded => self.on_loaded(),
            PageEvent::ContentLoaded => self.on_content_loaded(),
            PageEvent::MenuIconClicked => self.on_menu_icon_click(),
            PageEvent::NavLinkClicked => self.on_nav_link_click(),
            PageEvent::KeyDown { key } => self.on_key_down(&key),
            PageEvent::TouchStart => self.on_touch_start(),
            PageEvent::ProjectTapped { index } => self.on_project_tap(index),
            PageEvent::ConnectivityChanged { online } => self.on_connectivity_change(online),
        }
    }

    pub fn on_scroll(&mut self, offset: f64) {
        if !self.config.frame_coalescing {
            self.tracker.tick(offset);
            return;
        }

        if self.coalescer.push(offset) {
            self.frames.request_frame();
        }
    }

    pub fn on_frame(&mut self) {
        if let Some(offset) = self.coalescer.flush() {
            self.tracker.tick(offset);
        }
    }

    /// Geometry is rebuilt before returning, so a frame already pending
    /// ticks against the new layout.
    pub fn on_resize(&mut self, width: f64, height: f64) {
        self.tracker.rebuild();
        self.effects.set_viewport_unit(&viewport_unit(height));

        log_event(
            self.config.log_level,
            LogLevel::Debug,
            "viewport_resized",
            json!({ "width": width, "height": height }),
        );
    }

    pub fn on_resize_settled(&mut self, width: f64) {
        if should_close_menu_after_resize(width, self.config.mobile_breakpoint) {
            self.tracker.menu_mut().close();
        }
    }

    pub fn on_orientation_change(&mut self) {
        self.tracker.menu_mut().close();
        self.tracker.rebuild();
    }

    pub fn on_loaded(&mut self) {
        self.effects.mark_loaded();
        self.tracker.rebuild();

        log_event(
            self.config.log_level,
            LogLevel::Info,
            "page_loaded",
            json!({ "sections": self.tracker.sections().len() }),
        );
    }

    pub fn on_content_loaded(&mut self) {
        self.tracker.rebuild();

        log_event(
            self.config.log_level,
            LogLevel::Debug,
            "content_loaded",
            json!({ "sections": self.tracker.sections().len() }),
        );
    }

    pub fn on_menu_icon_click(&mut self) {
        self.tracker.menu_mut().toggle();
    }

    pub fn on_nav_link_click(&mut self) {
        self.tracker.menu_mut().close();
    }

    pub fn on_key_down(&mut self, key: &str) {
        if key == "Escape" {
            self.tracker.menu_mut().close();
        }
    }

    pub fn on_touch_start(&mut self) {
        if self.touch_device {
            return;
        }
        self.touch_device = true;
        self.effects.mark_touch_device();
    }

    // Pointer devices get the overlay from hover styles.
    pub fn on_project_tap(&mut self, index: usize) {
        if self.touch_device {
            self.effects.toggle_project_layer(index);
        }
    }

    pub fn on_connectivity_change(&mut self, online: bool) {
        let event = if online { "back_online" } else { "connection_lost" };
        log_event(self.config.log_level, LogLevel::Info, event, json!({}));
    }

    pub fn tracker(&self) -> &ScrollTracker<H, MenuToggle<S>> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ScrollTracker<H, MenuToggle<S>> {
        &mut self.tracker
    }

    pub fn is_touch_device(&self) -> bool {
        self.touch_device
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::SectionGeometry;

    #[derive(Default)]
    struct StubPage {
        geometry: Vec<SectionGeometry>,
        targets: Vec<String>,
        active: Vec<bool>,
        sticky: bool,
    }

    impl PageHost for StubPage {
        fn measure_sections(&mut self) -> Vec<SectionGeometry> {
            self.geometry.clone()
        }

        fn nav_link_targets(&mut self) -> Vec<String> {
            self.active.resize(self.targets.len(), false);
            self.targets.clone()
        }

        fn set_nav_link_active(&mut self, index: usize, active: bool) {
            self.active[index] = active;
        }

        fn set_header_sticky(&mut self, sticky: bool) {
            self.sticky = sticky;
        }

        fn reveal_section(&mut self, _id: &str) {}

        fn set_back_to_top_visible(&mut self, _visible: bool) {}
    }

    #[derive(Default)]
    struct StubMenu {
        navbar_active: bool,
    }

    impl MenuSurface for StubMenu {
        fn set_icon_close(&mut self, _close: bool) {}

        fn set_navbar_active(&mut self, active: bool) {
            self.navbar_active = active;
        }

        fn set_body_scroll_locked(&mut self, _locked: bool) {}
    }

    #[derive(Default)]
    struct ManualFrames {
        requested: usize,
    }

    impl FrameScheduler for ManualFrames {
        fn request_frame(&mut self) {
            self.requested += 1;
        }
    }

    #[derive(Default)]
    struct StubEffects {
        viewport_unit: Option<String>,
        touch_marks: usize,
        loaded: bool,
        toggled_layers: Vec<usize>,
    }

    impl DocumentEffects for StubEffects {
        fn set_viewport_unit(&mut self, value: &str) {
            self.viewport_unit = Some(value.to_string());
        }

        fn mark_touch_device(&mut self) {
            self.touch_marks += 1;
        }

        fn mark_loaded(&mut self) {
            self.loaded = true;
        }

        fn toggle_project_layer(&mut self, index: usize) {
            self.toggled_layers.push(index);
        }
    }

    type TestController = PageController<StubPage, StubMenu, ManualFrames, StubEffects>;

    fn controller(config: PageConfig) -> TestController {
        let page = StubPage {
            geometry: vec![
                SectionGeometry::new("home", 0.0, 500.0),
                SectionGeometry::new("about", 500.0, 400.0),
                SectionGeometry::new("contact", 900.0, 600.0),
            ],
            targets: vec!["home".to_string(), "about".to_string(), "contact".to_string()],
            ..StubPage::default()
        };
        PageController::new(
            config,
            page,
            StubMenu::default(),
            ManualFrames::default(),
            StubEffects::default(),
        )
    }

    fn margin(trigger_margin: f64) -> PageConfig {
        PageConfig {
            trigger_margin,
            ..PageConfig::default()
        }
    }

    #[test]
    fn scroll_burst_within_a_frame_ticks_once_with_last_offset() {
        let mut controller = controller(margin(0.0));
        for offset in [20.0, 300.0, 950.0, 600.0] {
            controller.dispatch(PageEvent::Scroll { offset });
        }

        assert_eq!(controller.frames().requested, 1);
        assert_eq!(controller.tracker().active_section(), None);

        controller.dispatch(PageEvent::FrameReady);
        assert_eq!(controller.tracker().state().offset, 600.0);
        assert_eq!(controller.tracker().active_link(), Some("about"));

        controller.dispatch(PageEvent::FrameReady);
        assert_eq!(controller.tracker().state().offset, 600.0);
    }

    #[test]
    fn coalescing_disabled_ticks_on_every_scroll() {
        let mut controller = controller(PageConfig {
            frame_coalescing: false,
            trigger_margin: 0.0,
            ..PageConfig::default()
        });
        controller.dispatch(PageEvent::Scroll { offset: 1_000.0 });

        assert_eq!(controller.frames().requested, 0);
        assert_eq!(controller.tracker().active_link(), Some("contact"));
    }

    #[test]
    fn resize_between_frames_rebuilds_before_the_pending_tick() {
        let mut controller = controller(margin(0.0));
        controller.dispatch(PageEvent::Scroll { offset: 700.0 });
        controller.dispatch(PageEvent::FrameReady);
        assert_eq!(controller.tracker().active_link(), Some("about"));

        controller.tracker_mut().host_mut().geometry = vec![
            SectionGeometry::new("home", 0.0, 1_000.0),
            SectionGeometry::new("about", 1_000.0, 800.0),
            SectionGeometry::new("contact", 1_800.0, 1_200.0),
        ];
        controller.dispatch(PageEvent::Scroll { offset: 700.0 });
        controller.dispatch(PageEvent::Resize {
            width: 390.0,
            height: 844.0,
        });
        controller.dispatch(PageEvent::FrameReady);

        assert_eq!(controller.tracker().active_link(), Some("home"));
        assert_eq!(controller.effects().viewport_unit.as_deref(), Some("8.44px"));
    }

    #[test]
    fn menu_icon_toggles_and_escape_closes() {
        let mut controller = controller(margin(0.0));
        controller.dispatch(PageEvent::MenuIconClicked);
        assert!(controller.tracker().menu().is_open());
        assert!(controller.tracker().menu().surface().navbar_active);

        controller.dispatch(PageEvent::KeyDown {
            key: "Enter".to_string(),
        });
        assert!(controller.tracker().menu().is_open());

        controller.dispatch(PageEvent::KeyDown {
            key: "Escape".to_string(),
        });
        assert!(!controller.tracker().menu().is_open());
        assert!(!controller.tracker().menu().surface().navbar_active);
    }

    #[test]
    fn nav_link_click_and_orientation_change_close_menu() {
        let mut controller = controller(margin(0.0));
        controller.dispatch(PageEvent::MenuIconClicked);
        controller.dispatch(PageEvent::NavLinkClicked);
        assert!(!controller.tracker().menu().is_open());

        controller.dispatch(PageEvent::MenuIconClicked);
        controller.dispatch(PageEvent::OrientationChange);
        assert!(!controller.tracker().menu().is_open());
    }

    #[test]
    fn scroll_tick_dismisses_open_menu() {
        let mut controller = controller(margin(0.0));
        controller.dispatch(PageEvent::MenuIconClicked);
        controller.dispatch(PageEvent::Scroll { offset: 40.0 });
        assert!(controller.tracker().menu().is_open());

        controller.dispatch(PageEvent::FrameReady);
        assert!(!controller.tracker().menu().is_open());
    }

    #[test]
    fn settled_resize_closes_menu_only_on_wide_viewports() {
        let mut controller = controller(margin(0.0));
        controller.dispatch(PageEvent::MenuIconClicked);
        controller.dispatch(PageEvent::ResizeSettled { width: 600.0 });
        assert!(controller.tracker().menu().is_open());

        controller.dispatch(PageEvent::ResizeSettled { width: 1_280.0 });
        assert!(!controller.tracker().menu().is_open());
    }

    #[test]
    fn project_taps_need_a_prior_touch() {
        let mut controller = controller(margin(0.0));
        controller.dispatch(PageEvent::ProjectTapped { index: 0 });
        assert!(controller.effects().toggled_layers.is_empty());

        controller.dispatch(PageEvent::TouchStart);
        controller.dispatch(PageEvent::TouchStart);
        controller.dispatch(PageEvent::ProjectTapped { index: 2 });

        assert!(controller.is_touch_device());
        assert_eq!(controller.effects().touch_marks, 1);
        assert_eq!(controller.effects().toggled_layers, vec![2]);
    }

    #[test]
    fn load_marks_body_and_remeasures() {
        let mut controller = controller(margin(0.0));
        controller.tracker_mut().host_mut().geometry.push(SectionGeometry::new(
            "projects",
            1_500.0,
            700.0,
        ));
        controller.dispatch(PageEvent::Loaded);

        assert!(controller.effects().loaded);
        assert_eq!(controller.tracker().sections().len(), 4);
    }

    #[test]
    fn loaded_image_pushing_sections_down_moves_the_highlight() {
        let mut controller = controller(margin(0.0));
        controller.dispatch(PageEvent::Scroll { offset: 1_000.0 });
        controller.dispatch(PageEvent::FrameReady);
        assert_eq!(controller.tracker().active_link(), Some("contact"));

        controller.tracker_mut().host_mut().geometry = vec![
            SectionGeometry::new("home", 0.0, 500.0),
            SectionGeometry::new("about", 500.0, 800.0),
            SectionGeometry::new("contact", 1_300.0, 600.0),
        ];
        controller.dispatch(PageEvent::ContentLoaded);
        controller.dispatch(PageEvent::Scroll { offset: 1_000.0 });
        controller.dispatch(PageEvent::FrameReady);

        assert_eq!(controller.tracker().active_link(), Some("about"));
        assert_eq!(controller.tracker().sections()[2].top, 1_300.0);
    }

    #[test]
    fn missed_frame_keeps_offsets_until_the_retried_frame() {
        let mut controller = controller(margin(0.0));
        controller.dispatch(PageEvent::Scroll { offset: 100.0 });
        // The first frame never reaches the controller.
        controller.dispatch(PageEvent::Scroll { offset: 950.0 });
        assert_eq!(controller.frames().requested, 1);

        controller.dispatch(PageEvent::FrameReady);
        assert_eq!(controller.tracker().active_link(), Some("contact"));

        controller.dispatch(PageEvent::Scroll { offset: 20.0 });
        assert_eq!(controller.frames().requested, 2);
    }
}
