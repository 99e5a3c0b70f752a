mod bindings;
mod dom;

use portfolio_site::config::{PageConfig, CONFIG_ELEMENT_ID};
use portfolio_site::contact::ContactForm;
use portfolio_site::theme::{Theme, DARK_MODE_CLASS, DARK_MODE_KEY};
use portfolio_site::typing::TypingEffect;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, HtmlInputElement, HtmlTextAreaElement, Storage};
use yew::prelude::*;

fn read_page_config() -> PageConfig {
    let raw = dom::document()
        .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|element| element.text_content());

    PageConfig::from_json(raw.as_deref())
}

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

fn read_stored_theme() -> Option<String> {
    local_storage()?.get_item(DARK_MODE_KEY).ok().flatten()
}

fn system_prefers_dark() -> bool {
    window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

fn resolve_theme() -> Theme {
    Theme::resolve(read_stored_theme().as_deref(), system_prefers_dark())
}

fn apply_theme(theme: Theme) {
    if let Some(body) = dom::document().and_then(|document| document.body()) {
        let _ = body
            .class_list()
            .toggle_with_force(DARK_MODE_CLASS, theme.is_dark());
    }
}

fn persist_theme(theme: Theme) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(DARK_MODE_KEY, theme.as_stored());
    }
}

fn alert(message: &str) {
    if let Some(win) = window() {
        let _ = win.alert_with_message(message);
    }
}

fn schedule_typing(
    effect: Rc<RefCell<TypingEffect>>,
    text: UseStateHandle<String>,
    alive: Rc<Cell<bool>>,
    delay_ms: u32,
) {
    let Some(win) = window() else {
        return;
    };

    let callback = Closure::once_into_js(move || {
        if !alive.get() {
            return;
        }

        let frame = effect.borrow_mut().step();
        if let Some(frame) = frame {
            text.set(frame.text);
            schedule_typing(effect, text, alive, frame.delay_ms);
        }
    });

    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms.min(i32::MAX as u32) as i32,
    );
}

#[derive(Properties, PartialEq)]
struct TypingTextProps {
    config: Rc<PageConfig>,
}

#[function_component(TypingText)]
fn typing_text(props: &TypingTextProps) -> Html {
    let text = use_state(String::new);

    {
        let text = text.clone();
        use_effect_with(props.config.clone(), move |config| {
            let alive = Rc::new(Cell::new(true));
            let effect = Rc::new(RefCell::new(TypingEffect::from_config(config)));
            schedule_typing(effect, text, alive.clone(), 0);
            move || alive.set(false)
        });
    }

    html! {
        <span class="typing-text">
            {(*text).clone()}
            <span class="typing-caret" aria-hidden="true">{"|"}</span>
        </span>
    }
}

fn input_setter(
    form: &UseStateHandle<ContactForm>,
    apply: fn(&mut ContactForm, String),
) -> Callback<InputEvent> {
    let form = form.clone();
    Callback::from(move |event: InputEvent| {
        let value = event.target_unchecked_into::<HtmlInputElement>().value();
        let mut next = (*form).clone();
        apply(&mut next, value);
        form.set(next);
    })
}

#[function_component(ContactSection)]
fn contact_section() -> Html {
    let form = use_state(ContactForm::default);

    let on_name = input_setter(&form, |form, value| form.name = value);
    let on_email = input_setter(&form, |form, value| form.email = value);
    let on_mobile = input_setter(&form, |form, value| form.mobile = value);
    let on_subject = input_setter(&form, |form, value| form.subject = value);

    let on_message = {
        let form = form.clone();
        Callback::from(move |event: InputEvent| {
            let value = event.target_unchecked_into::<HtmlTextAreaElement>().value();
            let mut next = (*form).clone();
            next.message = value;
            form.set(next);
        })
    };

    let on_submit = {
        let form = form.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();

            match form.submission_message() {
                Ok(message) => {
                    alert(message);
                    form.set(ContactForm::default());
                }
                Err(error) => alert(&error.to_string()),
            }
        })
    };

    html! {
        <section class="contact" id="contact">
            <h2 class="heading">{"Contact "}<span>{"Me!"}</span></h2>
            <form id="contact-form" onsubmit={on_submit}>
                <div class="input-box">
                    <div class="input-field">
                        <input type="text" placeholder="Full Name" value={form.name.clone()} oninput={on_name} />
                    </div>
                    <div class="input-field">
                        <input type="email" placeholder="Email" value={form.email.clone()} oninput={on_email} />
                    </div>
                </div>
                <div class="input-box">
                    <div class="input-field">
                        <input type="tel" placeholder="Mobile Number" value={form.mobile.clone()} oninput={on_mobile} />
                    </div>
                    <div class="input-field">
                        <input type="text" placeholder="Email Subject" value={form.subject.clone()} oninput={on_subject} />
                    </div>
                </div>
                <div class="textarea-field">
                    <textarea cols="30" rows="10" placeholder="Your Message" value={form.message.clone()} oninput={on_message}></textarea>
                </div>
                <div class="btn-box btns">
                    <button type="submit" class="btn">{"Submit"}</button>
                </div>
            </form>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct SkillProps {
    label: AttrValue,
    percent: AttrValue,
}

#[function_component(Skill)]
fn skill(props: &SkillProps) -> Html {
    html! {
        <div class="progress">
            <h3>{props.label.clone()}<span>{props.percent.clone()}</span></h3>
            <div class="bar"><span></span></div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct ProjectProps {
    title: AttrValue,
    description: AttrValue,
    image: AttrValue,
    href: AttrValue,
}

#[function_component(Project)]
fn project(props: &ProjectProps) -> Html {
    html! {
        <div class="project-box">
            <img data-src={props.image.clone()} alt={props.title.clone()} />
            <div class="project-layer">
                <h4>{props.title.clone()}</h4>
                <p>{props.description.clone()}</p>
                <a href={props.href.clone()} target="_blank" rel="noopener noreferrer">
                    <i class="bx bx-link-external"></i>
                    <span class="sr-only">{" (opens in a new tab)"}</span>
                </a>
            </div>
        </div>
    }
}

#[function_component(App)]
fn app() -> Html {
    let config = use_memo((), |_| read_page_config());
    let theme = use_state(resolve_theme);

    {
        let current = *theme;
        use_effect_with(current, move |_| {
            apply_theme(current);
            || ()
        });
    }

    {
        let config = config.clone();
        use_effect_with((), move |_| {
            let page = bindings::mount((*config).clone());
            move || drop(page)
        });
    }

    let on_toggle_theme = {
        let theme = theme.clone();
        Callback::from(move |_| {
            let next = (*theme).toggled();
            persist_theme(next);
            theme.set(next);
        })
    };

    html! {
        <>
            <div class="loader" aria-hidden="true"></div>
            <header class="header">
                <a href="#home" class="logo">{"Portfolio."}</a>
                <i class="bx bx-menu" id="menu-icon" role="button" aria-label="Toggle navigation"></i>
                <nav class="navbar">
                    <a href="#home">{"Home"}</a>
                    <a href="#about">{"About"}</a>
                    <a href="#skills">{"Skills"}</a>
                    <a href="#projects">{"Projects"}</a>
                    <a href="#contact">{"Contact"}</a>
                </nav>
                <button
                    class="theme-toggle"
                    type="button"
                    aria-label={(*theme).toggle_label()}
                    aria-pressed={(*theme).is_dark().to_string()}
                    onclick={on_toggle_theme}
                >
                    <i class={(*theme).icon()} aria-hidden="true"></i>
                </button>
            </header>

            <section class="home" id="home">
                <div class="home-content">
                    <h1>{"Hi, I'm "}<span>{"Siddharth Tiwari"}</span></h1>
                    <h3>{"I'm a "}<TypingText config={config.clone()} /></h3>
                    <p>{"I build fast, responsive and accessible websites, with a soft spot for systems programming."}</p>
                    <div class="btn-box">
                        <a href="#contact" class="btn">{"Hire Me"}</a>
                        <a href="#projects" class="btn">{"My Work"}</a>
                    </div>
                </div>
            </section>

            <section class="about" id="about">
                <h2 class="heading">{"About "}<span>{"Me"}</span></h2>
                <div class="about-content">
                    <h3>{"Frontend Developer"}</h3>
                    <p>
                        {"Computer science student who enjoys turning designs into interfaces that feel instant on every device. "}
                        {"Currently exploring WebAssembly and Rust for the parts of the web that need to be fast."}
                    </p>
                </div>
            </section>

            <section class="skills" id="skills">
                <h2 class="heading">{"My "}<span>{"Skills"}</span></h2>
                <div class="skills-row">
                    <div class="skills-column">
                        <h3 class="title">{"Coding Skills"}</h3>
                        <div class="skills-box">
                            <div class="skills-content">
                                <Skill label="HTML" percent="90%" />
                                <Skill label="CSS" percent="85%" />
                                <Skill label="JavaScript" percent="80%" />
                                <Skill label="Rust" percent="65%" />
                            </div>
                        </div>
                    </div>
                    <div class="skills-column">
                        <h3 class="title">{"Professional Skills"}</h3>
                        <div class="skills-box">
                            <div class="skills-content">
                                <Skill label="Web Design" percent="90%" />
                                <Skill label="Responsive Layout" percent="85%" />
                                <Skill label="Communication" percent="80%" />
                            </div>
                        </div>
                    </div>
                </div>
            </section>

            <section class="projects" id="projects">
                <h2 class="heading">{"Latest "}<span>{"Projects"}</span></h2>
                <div class="projects-container">
                    <Project
                        title="Weather Dashboard"
                        description="Forecast viewer with offline caching and unit switching."
                        image="/images/project-weather.jpg"
                        href="https://github.com/"
                    />
                    <Project
                        title="Task Board"
                        description="Drag-and-drop kanban board with keyboard support."
                        image="/images/project-tasks.jpg"
                        href="https://github.com/"
                    />
                    <Project
                        title="Portfolio"
                        description="This site: yew front end with a Rust scroll tracker."
                        image="/images/project-portfolio.jpg"
                        href="https://github.com/"
                    />
                </div>
            </section>

            <ContactSection />

            <footer class="footer">
                <div class="footer-text">
                    <p>{"Copyright © Siddharth Tiwari | All Rights Reserved."}</p>
                </div>
                <div class="footer-icon-top">
                    <a href="#home" class="back-to-top" aria-label="Back to top"><i class="bx bx-up-arrow-alt"></i></a>
                </div>
            </footer>
        </>
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        dom::document()
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
