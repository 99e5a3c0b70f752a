pub trait MobileMenu {
    fn is_open(&self) -> bool;
    fn close(&mut self);
}

/// Visual side of the menu: hamburger icon, nav overlay and body scroll lock.
pub trait MenuSurface {
    fn set_icon_close(&mut self, close: bool);
    fn set_navbar_active(&mut self, active: bool);
    fn set_body_scroll_locked(&mut self, locked: bool);
}

pub struct MenuToggle<S: MenuSurface> {
    surface: S,
    open: bool,
}

impl<S: MenuSurface> MenuToggle<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            open: false,
        }
    }

    pub fn toggle(&mut self) {
        let next = !self.open;
        self.apply(next);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn apply(&mut self, open: bool) {
        self.open = open;
        self.surface.set_icon_close(open);
        self.surface.set_navbar_active(open);
        self.surface.set_body_scroll_locked(open);
    }
}

impl<S: MenuSurface> MobileMenu for MenuToggle<S> {
    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        if self.open {
            self.apply(false);
        }
    }
}

/// Tab focus trap inside the open overlay. Returns the index that should
/// receive focus instead of the browser default, if any.
pub fn wrap_focus(count: usize, current: Option<usize>, backwards: bool) -> Option<usize> {
    if count == 0 {
        return None;
    }

    let last = count - 1;
    match (current, backwards) {
        (Some(0), true) => Some(last),
        (Some(index), false) if index == last => Some(0),
        _ => None,
    }
}
