use js_sys::{Array, Math};
use portfolio_polish::{
    contact::{
        ContactController, ContactField, ContactForm, ContactSurface, CONTACT_FORM_ID,
        SENDING_LABEL,
    },
    motion::{
        card_transform, load_delay_ms, LOADED_CLASS, LOADING_SELECTOR, PROJECT_CARD_SELECTOR,
        SHAPE_SELECTOR,
    },
    navigation::{
        link_is_active, Section, ACTIVE_CLASS, NAVBAR_ID, NAV_LINK_SELECTOR, SCROLLED_CLASS,
        SECTION_SELECTOR,
    },
    notify::{Notification, ToastQueue, AUTO_DISMISS_MS},
    page::{PageState, PageSurface},
    reveal::{
        skill_animation_delay, FADE_IN_CLASS, REVEAL_OBSERVER_ROOT_MARGIN,
        REVEAL_OBSERVER_THRESHOLD, REVEAL_SELECTOR, SKILL_ANIMATE_CLASS, SKILL_OBSERVER_THRESHOLD,
        SKILL_SELECTOR, VISIBLE_CLASS,
    },
    theme::{PreferenceStore, Theme, DARK_THEME_CLASS, THEME_TOGGLE_ID},
    timers::{TimerCallback, TimerId, Timers},
    typing::{
        parse_phrase_list, start_typing, DEFAULT_PHRASES, HERO_TITLE_SELECTOR, PHRASES_ATTRIBUTE,
    },
};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    console, window, Document, Element, Event, EventTarget, FormData, HtmlButtonElement,
    HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollToOptions, Storage,
};
use yew::prelude::*;

const TOAST_ROOT_ID: &str = "toastStack";
const SUBMIT_BUTTON_SELECTOR: &str = "button[type=\"submit\"]";
const SENDING_BUTTON_HTML: &str = "<i class=\"fas fa-spinner fa-spin me-2\"></i>";
const CONSOLE_BANNER: &str = "\
Hi there, fellow developer!
This portfolio runs on Rust compiled to WebAssembly.

Built with:
- HTML5 & CSS3
- Rust + Yew + web-sys
- Bootstrap 5
- Font Awesome
- Intersection Observer API";

struct BrowserTimers;

impl Timers for BrowserTimers {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Option<TimerId> {
        let handler = Closure::once_into_js(move || callback());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);

        window()?
            .set_timeout_with_callback_and_timeout_and_arguments_0(handler.unchecked_ref(), delay)
            .ok()
            .map(TimerId)
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Some(win) = window() {
            win.clear_timeout_with_handle(id.0);
        }
    }
}

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

struct LocalStore;

impl PreferenceStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, value);
        }
    }
}

fn debug_skip(feature: &str, selector: &str) {
    console::debug_1(&JsValue::from_str(&format!(
        "{feature} disabled: nothing matches `{selector}`"
    )));
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..nodes.length())
        .filter_map(|index| nodes.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn query_all_html(document: &Document, selector: &str) -> Vec<HtmlElement> {
    query_all(document, selector)
        .into_iter()
        .filter_map(|element| element.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn listen<F>(target: &EventTarget, event: &str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn observe_intersections<F>(
    targets: &[Element],
    threshold: f64,
    root_margin: Option<&str>,
    on_enter: F,
) where
    F: Fn(&Element) + 'static,
{
    if targets.is_empty() {
        return;
    }

    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    on_enter(&entry.target());
                }
            }
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    if let Some(root_margin) = root_margin {
        options.set_root_margin(root_margin);
    }

    let Ok(observer) =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
    else {
        return;
    };
    for target in targets {
        observer.observe(target);
    }
    callback.forget();
}

struct DomSurface {
    document: Document,
    body: Option<HtmlElement>,
    navbar: Option<Element>,
    nav_links: Vec<Element>,
    reveal_targets: Vec<Element>,
    shapes: Vec<HtmlElement>,
    theme_icon: Option<Element>,
}

impl DomSurface {
    fn locate(document: &Document) -> Self {
        Self {
            document: document.clone(),
            body: document.body(),
            navbar: document.get_element_by_id(NAVBAR_ID),
            nav_links: query_all(document, NAV_LINK_SELECTOR),
            reveal_targets: query_all(document, REVEAL_SELECTOR),
            shapes: query_all_html(document, SHAPE_SELECTOR),
            theme_icon: document
                .query_selector(&format!("#{THEME_TOGGLE_ID} i"))
                .ok()
                .flatten(),
        }
    }
}

impl PageSurface for DomSurface {
    fn scroll_y(&self) -> f64 {
        window().and_then(|win| win.scroll_y().ok()).unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        window()
            .and_then(|win| win.inner_height().ok())
            .and_then(|value| value.as_f64())
            .unwrap_or(720.0)
    }

    fn sections(&self) -> Vec<Section> {
        query_all_html(&self.document, SECTION_SELECTOR)
            .into_iter()
            .map(|section| {
                Section::new(
                    section.id(),
                    f64::from(section.offset_top()),
                    f64::from(section.client_height()),
                )
            })
            .collect()
    }

    fn section_top(&self, id: &str) -> Option<f64> {
        let section = self
            .document
            .get_element_by_id(id)?
            .dyn_into::<HtmlElement>()
            .ok()?;
        Some(f64::from(section.offset_top()))
    }

    fn reveal_tops(&self) -> Vec<f64> {
        self.reveal_targets
            .iter()
            .map(|target| target.get_bounding_client_rect().top())
            .collect()
    }

    fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn set_navbar_scrolled(&self, scrolled: bool) {
        if let Some(navbar) = self.navbar.as_ref() {
            let _ = navbar.class_list().toggle_with_force(SCROLLED_CLASS, scrolled);
        }
    }

    fn set_active_section(&self, id: Option<&str>) {
        for link in &self.nav_links {
            let href = link.get_attribute("href").unwrap_or_default();
            let _ = link
                .class_list()
                .toggle_with_force(ACTIVE_CLASS, link_is_active(&href, id));
        }
    }

    fn reveal(&self, index: usize) {
        if let Some(target) = self.reveal_targets.get(index) {
            let _ = target.class_list().add_1(VISIBLE_CLASS);
        }
    }

    fn set_shape_transform(&self, index: usize, transform: &str) {
        if let Some(shape) = self.shapes.get(index) {
            let _ = shape.style().set_property("transform", transform);
        }
    }

    fn smooth_scroll_to(&self, top: f64) {
        let Some(win) = window() else {
            return;
        };

        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        win.scroll_to_with_scroll_to_options(&options);
    }

    fn apply_theme(&self, theme: Theme) {
        if let Some(body) = self.body.as_ref() {
            let _ = body
                .class_list()
                .toggle_with_force(DARK_THEME_CLASS, theme.is_dark());
        }
        if let Some(icon) = self.theme_icon.as_ref() {
            icon.set_class_name(theme.icon_class());
        }
    }
}

#[derive(Clone)]
struct ToastBus {
    queue: Rc<RefCell<ToastQueue>>,
    refresh: Rc<RefCell<Option<Callback<()>>>>,
    timers: Rc<BrowserTimers>,
}

impl PartialEq for ToastBus {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.queue, &other.queue)
    }
}

impl ToastBus {
    fn new(timers: Rc<BrowserTimers>) -> Self {
        Self {
            queue: Rc::new(RefCell::new(ToastQueue::default())),
            refresh: Rc::new(RefCell::new(None)),
            timers,
        }
    }

    fn push(&self, notification: Notification) {
        let id = self.queue.borrow_mut().push(notification);
        self.refresh();

        let bus = self.clone();
        self.timers
            .set_timeout(AUTO_DISMISS_MS, Box::new(move || bus.dismiss(id)));
    }

    fn dismiss(&self, id: u64) {
        let removed = self.queue.borrow_mut().dismiss(id);
        if removed {
            self.refresh();
        }
    }

    fn refresh(&self) {
        let refresh = self.refresh.borrow().clone();
        if let Some(refresh) = refresh {
            refresh.emit(());
        }
    }
}

#[derive(Properties, PartialEq)]
struct ToastStackProps {
    bus: ToastBus,
}

#[function_component(ToastStack)]
fn toast_stack(props: &ToastStackProps) -> Html {
    let force_update = use_force_update();

    {
        let bus = props.bus.clone();
        use_effect_with((), move |_| {
            *bus.refresh.borrow_mut() = Some(Callback::from(move |_| force_update.force_update()));
            move || {
                bus.refresh.borrow_mut().take();
            }
        });
    }

    let toasts = props.bus.queue.borrow().toasts().to_vec();

    html! {
        <div class="toast-stack" aria-live="polite">
            { for toasts.into_iter().map(|toast| {
                let on_close = {
                    let bus = props.bus.clone();
                    let id = toast.id;
                    Callback::from(move |_: MouseEvent| bus.dismiss(id))
                };
                let kind = toast.notification.kind;

                html! {
                    <div key={toast.id} class={kind.alert_class()} role="alert">
                        <i class={kind.icon_class()} aria-hidden="true"></i>
                        {toast.notification.message}
                        <button
                            type="button"
                            class="btn-close"
                            aria-label="Close"
                            onclick={on_close}
                        ></button>
                    </div>
                }
            }) }
        </div>
    }
}

fn mount_toast_stack(document: &Document, timers: Rc<BrowserTimers>) -> ToastBus {
    let bus = ToastBus::new(timers);

    let root = document.create_element("div").ok().and_then(|root| {
        root.set_id(TOAST_ROOT_ID);
        document.body()?.append_child(&root).ok()?;
        Some(root)
    });

    if let Some(root) = root {
        yew::Renderer::<ToastStack>::with_root_and_props(root, ToastStackProps { bus: bus.clone() })
            .render();
    }

    bus
}

#[derive(Properties, PartialEq)]
struct TypedHeadlineProps {
    initial: AttrValue,
    phrases: Vec<AttrValue>,
}

#[function_component(TypedHeadline)]
fn typed_headline(props: &TypedHeadlineProps) -> Html {
    let text = use_state(|| props.initial.to_string());

    {
        let text = text.clone();
        use_effect_with(props.phrases.clone(), move |phrases| {
            let phrases: Vec<String> = phrases.iter().map(ToString::to_string).collect();
            let handle = start_typing(Rc::new(BrowserTimers), phrases, move |rendered: &str| {
                text.set(rendered.to_string())
            });

            move || {
                if let Some(handle) = handle {
                    handle.cancel();
                }
            }
        });
    }

    html! { <>{ (*text).clone() }</> }
}

fn init_typing_effect(document: &Document) {
    let Some(title) = document.query_selector(HERO_TITLE_SELECTOR).ok().flatten() else {
        debug_skip("typing effect", HERO_TITLE_SELECTOR);
        return;
    };

    let phrases = title
        .get_attribute(PHRASES_ATTRIBUTE)
        .map(|value| parse_phrase_list(&value))
        .filter(|phrases| !phrases.is_empty())
        .unwrap_or_else(|| DEFAULT_PHRASES.iter().map(ToString::to_string).collect());
    let initial = title.text_content().unwrap_or_default();
    title.set_text_content(None);

    let props = TypedHeadlineProps {
        initial: AttrValue::from(initial),
        phrases: phrases.into_iter().map(AttrValue::from).collect(),
    };
    yew::Renderer::<TypedHeadline>::with_root_and_props(title, props).render();
}

fn init_navigation(page: &Rc<RefCell<PageState>>, surface: &Rc<DomSurface>) {
    let Some(win) = window() else {
        return;
    };

    for event in ["scroll", "resize"] {
        let page = page.clone();
        let surface = surface.clone();
        listen(&win, event, move |_| page.borrow_mut().on_scroll(&*surface));
    }

    for link in &surface.nav_links {
        let page = page.clone();
        let surface = surface.clone();
        let href = link.get_attribute("href").unwrap_or_default();
        listen(link, "click", move |event: Event| {
            if page.borrow().on_nav_click(&*surface, &href) {
                event.prevent_default();
            }
        });
    }
}

fn init_scroll_animations(surface: &DomSurface) {
    for target in &surface.reveal_targets {
        let _ = target.class_list().add_1(FADE_IN_CLASS);
    }

    observe_intersections(
        &surface.reveal_targets,
        REVEAL_OBSERVER_THRESHOLD,
        Some(REVEAL_OBSERVER_ROOT_MARGIN),
        |target| {
            let _ = target.class_list().add_1(VISIBLE_CLASS);
        },
    );
}

fn init_skill_bars(document: &Document) {
    let items = query_all(document, SKILL_SELECTOR);

    observe_intersections(&items, SKILL_OBSERVER_THRESHOLD, None, |item| {
        if let Some(item) = item.dyn_ref::<HtmlElement>() {
            let _ = item
                .style()
                .set_property("animation-delay", &skill_animation_delay(Math::random()));
        }
        let _ = item.class_list().add_1(SKILL_ANIMATE_CLASS);
    });
}

fn init_theme_toggle(
    document: &Document,
    page: &Rc<RefCell<PageState>>,
    surface: &Rc<DomSurface>,
) {
    let store = Rc::new(LocalStore);
    page.borrow_mut().init_theme(&**surface, &*store);

    let Some(toggle) = document.get_element_by_id(THEME_TOGGLE_ID) else {
        debug_skip("theme toggle", THEME_TOGGLE_ID);
        return;
    };

    let page = page.clone();
    let surface = surface.clone();
    listen(&toggle, "click", move |_| {
        page.borrow_mut().on_theme_toggle(&*surface, &*store);
    });
}

struct ContactDom {
    document: Document,
    form: HtmlFormElement,
    submit_button: Option<HtmlButtonElement>,
    idle_label: String,
    toasts: ToastBus,
}

impl ContactDom {
    fn field_value(&self, form_data: Option<&FormData>, field: ContactField) -> String {
        let name = field.as_str();
        if let Some(value) = form_data
            .and_then(|data| data.get(name).as_string())
            .filter(|value| !value.is_empty())
        {
            return value;
        }

        let Some(element) = self.document.get_element_by_id(name) else {
            return String::new();
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            return input.value();
        }
        element
            .dyn_ref::<HtmlTextAreaElement>()
            .map(HtmlTextAreaElement::value)
            .unwrap_or_default()
    }

    fn read(&self) -> ContactForm {
        let form_data = FormData::new_with_form(&self.form).ok();
        let form_data = form_data.as_ref();

        ContactForm {
            name: self.field_value(form_data, ContactField::Name),
            email: self.field_value(form_data, ContactField::Email),
            subject: self.field_value(form_data, ContactField::Subject),
            message: self.field_value(form_data, ContactField::Message),
        }
    }
}

impl ContactSurface for ContactDom {
    fn set_submit_busy(&self, busy: bool) {
        let Some(button) = self.submit_button.as_ref() else {
            return;
        };

        if busy {
            button.set_inner_html(&format!("{SENDING_BUTTON_HTML}{SENDING_LABEL}"));
        } else {
            button.set_inner_html(&self.idle_label);
        }
        button.set_disabled(busy);
    }

    fn reset_form(&self) {
        self.form.reset();
    }

    fn notify(&self, notification: Notification) {
        self.toasts.push(notification);
    }
}

fn init_contact_form(document: &Document, timers: Rc<BrowserTimers>, toasts: ToastBus) {
    let Some(form) = document
        .get_element_by_id(CONTACT_FORM_ID)
        .and_then(|form| form.dyn_into::<HtmlFormElement>().ok())
    else {
        debug_skip("contact form", CONTACT_FORM_ID);
        return;
    };

    let submit_button = form
        .query_selector(SUBMIT_BUTTON_SELECTOR)
        .ok()
        .flatten()
        .and_then(|button| button.dyn_into::<HtmlButtonElement>().ok());
    let idle_label = submit_button
        .as_ref()
        .map(|button| button.inner_html())
        .unwrap_or_default();

    let contact = Rc::new(ContactDom {
        document: document.clone(),
        form: form.clone(),
        submit_button,
        idle_label,
        toasts,
    });
    let controller = ContactController::new(timers);

    listen(&form, "submit", move |event: Event| {
        event.prevent_default();

        let fields = contact.read();
        if let Err(error) = controller.submit(&fields, contact.clone()) {
            console::debug_1(&JsValue::from_str(&format!("contact form rejected: {error}")));
        }
    });
}

fn init_card_hover(document: &Document) {
    for card in query_all_html(document, PROJECT_CARD_SELECTOR) {
        for (event, hovered) in [("mouseenter", true), ("mouseleave", false)] {
            let target = card.clone();
            listen(&card, event, move |_| {
                let _ = target.style().set_property("transform", card_transform(hovered));
            });
        }
    }
}

fn init_load_animation(document: &Document, timers: Rc<BrowserTimers>) {
    let reveal_loading = {
        let document = document.clone();
        move || {
            if let Some(body) = document.body() {
                let _ = body.class_list().add_1(LOADED_CLASS);
            }

            for (index, element) in query_all(&document, LOADING_SELECTOR).into_iter().enumerate() {
                timers.set_timeout(
                    load_delay_ms(index),
                    Box::new(move || {
                        let _ = element.class_list().add_1(LOADED_CLASS);
                    }),
                );
            }
        }
    };

    if document.ready_state() == "complete" {
        reveal_loading();
        return;
    }

    let Some(win) = window() else {
        return;
    };
    let mut reveal_loading = Some(reveal_loading);
    listen(&win, "load", move |_| {
        if let Some(reveal_loading) = reveal_loading.take() {
            reveal_loading();
        }
    });
}

pub fn run() {
    console::log_1(&JsValue::from_str(CONSOLE_BANNER));

    let Some(document) = window().and_then(|win| win.document()) else {
        return;
    };

    let timers = Rc::new(BrowserTimers);
    let toasts = mount_toast_stack(&document, timers.clone());
    let surface = Rc::new(DomSurface::locate(&document));
    let page = Rc::new(RefCell::new(PageState::new()));

    init_navigation(&page, &surface);
    init_scroll_animations(&surface);
    init_theme_toggle(&document, &page, &surface);
    init_contact_form(&document, timers.clone(), toasts);
    init_typing_effect(&document);
    init_skill_bars(&document);
    init_card_hover(&document);
    init_load_animation(&document, timers);

    page.borrow_mut().on_scroll(&*surface);
}
