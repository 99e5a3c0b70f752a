use super::dom::{
    self, AnimationFrames, DomEffects, DomMenu, DomPage, FrameCallbackSlot, MENU_ICON_ID,
    NAVBAR_SELECTOR, NAV_LINK_SELECTOR, PROJECT_BOX_SELECTOR,
};
use js_sys::Array;
use portfolio_site::config::PageConfig;
use portfolio_site::events::{PageController, PageEvent};
use portfolio_site::logging::{log_event, LogLevel};
use portfolio_site::menu::{wrap_focus, MobileMenu};
use portfolio_site::viewport::skill_bar_width;
use serde_json::json;
use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

const FOCUSABLE_SELECTOR: &str = "a[href], button, textarea, input, select";
const SKILLS_SELECTOR: &str = ".skills";
const SKILL_PROGRESS_SELECTOR: &str = ".skills-content .progress";
const SKILLS_VISIBLE_THRESHOLD: f64 = 0.3;

pub type Controller = PageController<DomPage, DomMenu, AnimationFrames, DomEffects>;

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

/// Owns the controller and every DOM registration made for it. Dropping it
/// detaches all listeners and observers.
pub struct PageBindings {
    _controller: Rc<RefCell<Controller>>,
    listeners: Vec<Listener>,
    observers: Vec<(IntersectionObserver, ObserverCallback)>,
    resize_timer: Rc<Cell<Option<i32>>>,
    _resize_settled: Rc<Closure<dyn FnMut()>>,
    _frame_callback: FrameCallbackSlot,
}

impl Drop for PageBindings {
    fn drop(&mut self) {
        for listener in &self.listeners {
            let _ = listener.target.remove_event_listener_with_callback_and_bool(
                listener.kind,
                listener.callback.as_ref().unchecked_ref(),
                listener.capture,
            );
        }

        for (observer, _) in &self.observers {
            observer.disconnect();
        }

        if let (Some(win), Some(handle)) = (window(), self.resize_timer.take()) {
            win.clear_timeout_with_handle(handle);
        }
    }
}

/// Returns false when the controller is gone or already mid-dispatch, in
/// which case `event` was not applied.
fn dispatch(controller: &Weak<RefCell<Controller>>, event: PageEvent) -> bool {
    let Some(controller) = controller.upgrade() else {
        return false;
    };

    let Ok(mut controller) = controller.try_borrow_mut() else {
        return false;
    };

    controller.dispatch(event);
    true
}

fn listen(
    target: &EventTarget,
    kind: &'static str,
    passive: bool,
    handler: impl FnMut(Event) + 'static,
) -> Option<Listener> {
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    register(target, kind, false, &options, handler)
}

/// Capture-phase listener, for events such as `load` that do not bubble.
fn listen_capture(
    target: &EventTarget,
    kind: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Option<Listener> {
    let options = AddEventListenerOptions::new();
    options.set_capture(true);
    options.set_passive(true);
    register(target, kind, true, &options, handler)
}

fn register(
    target: &EventTarget,
    kind: &'static str,
    capture: bool,
    options: &AddEventListenerOptions,
    handler: impl FnMut(Event) + 'static,
) -> Option<Listener> {
    let callback = Closure::<dyn FnMut(Event)>::new(handler);

    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            options,
        )
        .ok()?;

    Some(Listener {
        target: target.clone(),
        kind,
        capture,
        callback,
    })
}

fn window_offset() -> f64 {
    window().and_then(|win| win.scroll_y().ok()).unwrap_or(0.0)
}

fn inner_extent(read: fn(&Window) -> Result<JsValue, JsValue>) -> Option<f64> {
    window()
        .and_then(|win| read(&win).ok())
        .and_then(|value| value.as_f64())
}

fn resize_event() -> Option<PageEvent> {
    Some(PageEvent::Resize {
        width: inner_extent(Window::inner_width)?,
        height: inner_extent(Window::inner_height)?,
    })
}

pub fn mount(config: PageConfig) -> Option<PageBindings> {
    let win = window()?;
    let document = win.document()?;
    let log_level = config.log_level;
    let resize_debounce_ms = config.resize_debounce_ms;

    let frame_callback: FrameCallbackSlot = Rc::new(RefCell::new(None));
    let controller = Rc::new(RefCell::new(PageController::new(
        config,
        DomPage::new(document.clone()),
        DomMenu::new(&document),
        AnimationFrames::new(frame_callback.clone()),
        DomEffects::new(document.clone()),
    )));
    let weak = Rc::downgrade(&controller);

    *frame_callback.borrow_mut() = Some(Closure::<dyn FnMut()>::new({
        let weak = weak.clone();
        let slot = Rc::downgrade(&frame_callback);
        move || {
            // The coalescer stays pending until a frame is delivered, so a
            // frame that could not reach the controller is asked for again.
            if !dispatch(&weak, PageEvent::FrameReady) && weak.strong_count() > 0 {
                if let Some(slot) = slot.upgrade() {
                    dom::request_animation_frame(&slot);
                }
            }
        }
    }));

    let resize_timer: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let resize_settled = Rc::new(Closure::<dyn FnMut()>::new({
        let weak = weak.clone();
        let resize_timer = resize_timer.clone();
        move || {
            resize_timer.set(None);
            if let Some(width) = inner_extent(Window::inner_width) {
                dispatch(&weak, PageEvent::ResizeSettled { width });
            }
        }
    }));

    let window_target: &EventTarget = win.as_ref();
    let document_target: &EventTarget = document.as_ref();
    let mut listeners = Vec::new();

    listeners.extend(listen(window_target, "scroll", true, {
        let weak = weak.clone();
        move |_| {
            dispatch(&weak, PageEvent::Scroll { offset: window_offset() });
        }
    }));

    listeners.extend(listen(window_target, "resize", false, {
        let weak = weak.clone();
        let resize_timer = resize_timer.clone();
        let resize_settled = resize_settled.clone();
        move |_| {
            if let Some(event) = resize_event() {
                dispatch(&weak, event);
            }

            let Some(win) = window() else {
                return;
            };
            if let Some(handle) = resize_timer.take() {
                win.clear_timeout_with_handle(handle);
            }
            let settled: &Closure<dyn FnMut()> = &resize_settled;
            let handle = win
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    settled.as_ref().unchecked_ref(),
                    resize_debounce_ms as i32,
                )
                .ok();
            resize_timer.set(handle);
        }
    }));

    listeners.extend(listen(window_target, "orientationchange", false, {
        let weak = weak.clone();
        move |_| {
            dispatch(&weak, PageEvent::OrientationChange);
        }
    }));

    listeners.extend(listen(window_target, "load", false, {
        let weak = weak.clone();
        move |_| {
            dispatch(&weak, PageEvent::Loaded);
        }
    }));

    listeners.extend(listen(window_target, "touchstart", true, {
        let weak = weak.clone();
        move |_| {
            dispatch(&weak, PageEvent::TouchStart);
        }
    }));

    // Lazily loaded images change section heights once they decode.
    listeners.extend(listen_capture(document_target, "load", {
        let weak = weak.clone();
        move |event: Event| {
            let is_image = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .is_some_and(|element| element.tag_name().eq_ignore_ascii_case("img"));
            if is_image {
                dispatch(&weak, PageEvent::ContentLoaded);
            }
        }
    }));

    for (kind, online) in [("online", true), ("offline", false)] {
        listeners.extend(listen(window_target, kind, false, {
            let weak = weak.clone();
            move |_| {
                dispatch(&weak, PageEvent::ConnectivityChanged { online });
            }
        }));
    }

    listeners.extend(listen(document_target, "keydown", false, {
        let weak = weak.clone();
        move |event: Event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                dispatch(&weak, PageEvent::KeyDown { key: event.key() });
            }
        }
    }));

    if let Some(icon) = document.get_element_by_id(MENU_ICON_ID) {
        listeners.extend(listen(icon.as_ref(), "click", false, {
            let weak = weak.clone();
            move |_| {
                dispatch(&weak, PageEvent::MenuIconClicked);
            }
        }));
    }

    for link in dom::query_all(&document, NAV_LINK_SELECTOR) {
        listeners.extend(listen(link.as_ref(), "click", false, {
            let weak = weak.clone();
            move |_| {
                dispatch(&weak, PageEvent::NavLinkClicked);
            }
        }));
    }

    for (index, project) in dom::query_all(&document, PROJECT_BOX_SELECTOR).into_iter().enumerate() {
        listeners.extend(listen(project.as_ref(), "click", false, {
            let weak = weak.clone();
            move |_| {
                dispatch(&weak, PageEvent::ProjectTapped { index });
            }
        }));
    }

    for anchor in dom::query_all(&document, "a[href^=\"#\"]") {
        listeners.extend(bind_smooth_scroll(&document, anchor));
    }

    if let Some(navbar) = dom::query_one(&document, NAVBAR_SELECTOR) {
        listeners.extend(bind_focus_trap(&document, navbar, weak.clone()));
    }

    let mut observers = Vec::new();
    observers.extend(observe_lazy_images(&document));
    observers.extend(observe_skills(&document));

    {
        let mut controller = controller.borrow_mut();
        if let Some(event) = resize_event() {
            controller.dispatch(event);
        }
        controller.dispatch(PageEvent::Scroll {
            offset: window_offset(),
        });
        // The window load event has usually fired before the app mounts.
        if document.ready_state() == "complete" {
            controller.dispatch(PageEvent::Loaded);
        }
    }

    log_event(
        log_level,
        LogLevel::Info,
        "page_ready",
        json!({
            "sections": controller.borrow().tracker().sections().len(),
            "links": controller.borrow().tracker().links().len(),
            "observers": observers.len(),
        }),
    );

    Some(PageBindings {
        _controller: controller,
        listeners,
        observers,
        resize_timer,
        _resize_settled: resize_settled,
        _frame_callback: frame_callback,
    })
}

fn bind_smooth_scroll(document: &Document, anchor: Element) -> Option<Listener> {
    let target: EventTarget = anchor.clone().into();
    let document = document.clone();

    listen(&target, "click", false, move |event: Event| {
        let Some(href) = anchor.get_attribute("href") else {
            return;
        };
        if href.is_empty() || href == "#" {
            return;
        }

        let Some(section) = dom::query_one(&document, &href) else {
            return;
        };

        event.prevent_default();
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        section.scroll_into_view_with_scroll_into_view_options(&options);
    })
}

fn bind_focus_trap(
    document: &Document,
    navbar: Element,
    controller: Weak<RefCell<Controller>>,
) -> Option<Listener> {
    let target: EventTarget = navbar.clone().into();
    let document = document.clone();

    listen(&target, "keydown", false, move |event: Event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if event.key() != "Tab" {
            return;
        }

        let menu_open = controller
            .upgrade()
            .and_then(|controller| {
                controller
                    .try_borrow()
                    .ok()
                    .map(|controller| controller.tracker().menu().is_open())
            })
            .unwrap_or(false);
        if !menu_open {
            return;
        }

        let focusables = dom::query_all_within(&navbar, FOCUSABLE_SELECTOR);
        let focused = document.active_element();
        let current = focusables
            .iter()
            .position(|element| Some(element) == focused.as_ref());

        let Some(next) = wrap_focus(focusables.len(), current, event.shift_key()) else {
            return;
        };

        if let Some(element) = focusables.get(next).and_then(|element| element.dyn_ref::<HtmlElement>()) {
            event.prevent_default();
            let _ = element.focus();
        }
    })
}

fn load_deferred_image(image: &Element) {
    if let Some(src) = image.get_attribute("data-src") {
        let _ = image.set_attribute("src", &src);
        let _ = image.remove_attribute("data-src");
    }
}

fn observe_lazy_images(document: &Document) -> Option<(IntersectionObserver, ObserverCallback)> {
    let images = dom::query_all(document, "img[data-src]");
    if images.is_empty() {
        return None;
    }

    let callback: ObserverCallback = Closure::new(|entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if entry.is_intersecting() {
                let image = entry.target();
                load_deferred_image(&image);
                observer.unobserve(&image);
            }
        }
    });

    // Without IntersectionObserver every image loads up front.
    let Ok(observer) = IntersectionObserver::new(callback.as_ref().unchecked_ref()) else {
        images.iter().for_each(load_deferred_image);
        return None;
    };

    for image in &images {
        observer.observe(image);
    }

    Some((observer, callback))
}

fn show_skill_progress(document: &Document) {
    for progress in dom::query_all(document, SKILL_PROGRESS_SELECTOR) {
        let label = progress
            .query_selector("h3 span")
            .ok()
            .flatten()
            .and_then(|label| label.text_content());
        let bar = progress
            .query_selector(".bar span")
            .ok()
            .flatten()
            .and_then(|bar| bar.dyn_into::<HtmlElement>().ok());

        if let (Some(width), Some(bar)) = (label.as_deref().and_then(skill_bar_width), bar) {
            let _ = bar.style().set_property("width", &width);
        }
    }
}

fn observe_skills(document: &Document) -> Option<(IntersectionObserver, ObserverCallback)> {
    let skills = dom::query_one(document, SKILLS_SELECTOR)?;

    let callback: ObserverCallback = Closure::new({
        let document = document.clone();
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    show_skill_progress(&document);
                    observer.unobserve(&entry.target());
                }
            }
        }
    });

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(SKILLS_VISIBLE_THRESHOLD));

    let Ok(observer) = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) else {
        show_skill_progress(document);
        return None;
    };
    observer.observe(&skills);

    Some((observer, callback))
}
