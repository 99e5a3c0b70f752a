use portfolio_site::events::DocumentEffects;
use portfolio_site::frame::FrameScheduler;
use portfolio_site::menu::MenuSurface;
use portfolio_site::tracker::{nav_target_from_href, PageHost, SectionGeometry};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, Document, Element, HtmlElement};

pub const SECTION_SELECTOR: &str = "section";
pub const NAV_LINK_SELECTOR: &str = "header nav a";
pub const HEADER_SELECTOR: &str = ".header";
pub const BACK_TO_TOP_SELECTOR: &str = ".back-to-top";
pub const MENU_ICON_ID: &str = "menu-icon";
pub const NAVBAR_SELECTOR: &str = ".navbar";
pub const PROJECT_BOX_SELECTOR: &str = ".project-box";

const ACTIVE_CLASS: &str = "active";
const STICKY_CLASS: &str = "sticky";
const REVEALED_CLASS: &str = "show-animate";
const BACK_TO_TOP_VISIBLE_CLASS: &str = "show";
const MENU_CLOSE_ICON_CLASS: &str = "bx-x";
const TOUCH_DEVICE_CLASS: &str = "touch-device";
const LOADED_CLASS: &str = "loaded";

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_all_within(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query_one(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

fn set_class(element: &Element, class: &str, enabled: bool) {
    let _ = element.class_list().toggle_with_force(class, enabled);
}

/// Live sections, nav links, header and back-to-top control. Element lists
/// are re-queried on every rebuild so inserted content is picked up.
pub struct DomPage {
    document: Document,
    sections: Vec<HtmlElement>,
    links: Vec<Element>,
    header: Option<Element>,
    back_to_top: Option<Element>,
}

impl DomPage {
    pub fn new(document: Document) -> Self {
        let header = query_one(&document, HEADER_SELECTOR);
        let back_to_top = query_one(&document, BACK_TO_TOP_SELECTOR);

        Self {
            document,
            sections: Vec::new(),
            links: Vec::new(),
            header,
            back_to_top,
        }
    }
}

impl PageHost for DomPage {
    fn measure_sections(&mut self) -> Vec<SectionGeometry> {
        // Sections without an id cannot be targeted or revealed by id.
        self.sections = query_all(&self.document, SECTION_SELECTOR)
            .into_iter()
            .filter_map(|element| element.dyn_into::<HtmlElement>().ok())
            .filter(|section| !section.id().is_empty())
            .collect();

        self.sections
            .iter()
            .map(|section| {
                SectionGeometry::new(
                    section.id(),
                    f64::from(section.offset_top()),
                    f64::from(section.offset_height()),
                )
            })
            .collect()
    }

    fn nav_link_targets(&mut self) -> Vec<String> {
        self.links = query_all(&self.document, NAV_LINK_SELECTOR);

        self.links
            .iter()
            .map(|link| {
                link.get_attribute("href")
                    .and_then(|href| nav_target_from_href(&href))
                    .unwrap_or_default()
            })
            .collect()
    }

    fn set_nav_link_active(&mut self, index: usize, active: bool) {
        if let Some(link) = self.links.get(index) {
            set_class(link, ACTIVE_CLASS, active);
        }
    }

    fn set_header_sticky(&mut self, sticky: bool) {
        if let Some(header) = self.header.as_ref() {
            set_class(header, STICKY_CLASS, sticky);
        }
    }

    fn reveal_section(&mut self, id: &str) {
        if let Some(section) = self.sections.iter().find(|section| section.id() == id) {
            set_class(section, REVEALED_CLASS, true);
        }
    }

    fn set_back_to_top_visible(&mut self, visible: bool) {
        if let Some(button) = self.back_to_top.as_ref() {
            set_class(button, BACK_TO_TOP_VISIBLE_CLASS, visible);
        }
    }
}

pub struct DomMenu {
    icon: Option<Element>,
    navbar: Option<Element>,
    body: Option<HtmlElement>,
}

impl DomMenu {
    pub fn new(document: &Document) -> Self {
        Self {
            icon: document.get_element_by_id(MENU_ICON_ID),
            navbar: query_one(document, NAVBAR_SELECTOR),
            body: document.body(),
        }
    }
}

impl MenuSurface for DomMenu {
    fn set_icon_close(&mut self, close: bool) {
        if let Some(icon) = self.icon.as_ref() {
            set_class(icon, MENU_CLOSE_ICON_CLASS, close);
        }
    }

    fn set_navbar_active(&mut self, active: bool) {
        if let Some(navbar) = self.navbar.as_ref() {
            set_class(navbar, ACTIVE_CLASS, active);
        }
    }

    fn set_body_scroll_locked(&mut self, locked: bool) {
        let Some(body) = self.body.as_ref() else {
            return;
        };

        let style = body.style();
        if locked {
            let _ = style.set_property("overflow", "hidden");
        } else {
            let _ = style.remove_property("overflow");
        }
    }
}

pub type FrameCallbackSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// `requestAnimationFrame` scheduler. The callback is installed after the
/// controller exists, since it has to reach back into it.
pub struct AnimationFrames {
    callback: FrameCallbackSlot,
}

impl AnimationFrames {
    pub fn new(callback: FrameCallbackSlot) -> Self {
        Self { callback }
    }
}

pub fn request_animation_frame(slot: &FrameCallbackSlot) {
    let Some(win) = window() else {
        return;
    };

    if let Some(callback) = slot.borrow().as_ref() {
        let _ = win.request_animation_frame(callback.as_ref().unchecked_ref());
    }
}

impl FrameScheduler for AnimationFrames {
    fn request_frame(&mut self) {
        request_animation_frame(&self.callback);
    }
}

pub struct DomEffects {
    document: Document,
}

impl DomEffects {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl DocumentEffects for DomEffects {
    fn set_viewport_unit(&mut self, value: &str) {
        if let Some(root) = self
            .document
            .document_element()
            .and_then(|root| root.dyn_into::<HtmlElement>().ok())
        {
            let _ = root.style().set_property("--vh", value);
        }
    }

    fn mark_touch_device(&mut self) {
        if let Some(body) = self.document.body() {
            set_class(&body, TOUCH_DEVICE_CLASS, true);
        }
    }

    fn mark_loaded(&mut self) {
        if let Some(body) = self.document.body() {
            set_class(&body, LOADED_CLASS, true);
        }

        if let Some(loader) = query_one(&self.document, ".loader")
            .and_then(|loader| loader.dyn_into::<HtmlElement>().ok())
        {
            let _ = loader.style().set_property("display", "none");
        }
    }

    fn toggle_project_layer(&mut self, index: usize) {
        let Some(project) = query_all(&self.document, PROJECT_BOX_SELECTOR).into_iter().nth(index) else {
            return;
        };

        if let Some(layer) = project.query_selector(".project-layer").ok().flatten() {
            let _ = layer.class_list().toggle(ACTIVE_CLASS);
        }
    }
}
