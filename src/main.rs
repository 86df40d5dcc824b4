//! Titanic entry point
//!
//! In the browser, binds the animation core to the page. Natively, runs the
//! whole voyage headless against a model layout and logs each transition.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use titanic_anim::platform::web::{DomScene, IntervalHandle, now_ms};
    use titanic_anim::Settings;
    use titanic_anim::sim::Animation;

    /// Page-level state: the core, its scene and the live ticker
    struct App {
        animation: Animation,
        scene: DomScene,
        settings: Settings,
        /// Present only while the ship sails
        ticker: Option<IntervalHandle>,
    }

    impl App {
        fn log_events(&mut self) {
            for event in self.animation.drain_events() {
                log::debug!("{event:?}");
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Titanic starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let settings = Settings::load();
        let mut scene = DomScene::from_document(&document)?;
        let mut animation = Animation::new(&settings);
        // Mount: idle at the origin
        animation.reset(&mut scene);
        animation.drain_events();

        let app = Rc::new(RefCell::new(App {
            animation,
            scene,
            settings,
            ticker: None,
        }));

        setup_buttons(&document, app.clone())?;
        setup_crash_listener(app.clone());

        log::info!("Titanic ready ({} preset)", app.borrow().settings.preset.as_str());
        Ok(())
    }

    /// Set sail and replace the ticker with a fresh one
    fn start(app: &Rc<RefCell<App>>) {
        let mut guard = app.borrow_mut();
        let a = &mut *guard;
        // Drop the old interval before anything else can fire
        a.ticker = None;
        a.animation.start(now_ms(), &mut a.scene);
        a.log_events();
        if !a.animation.is_ticking() {
            return;
        }

        let period_ms = a.animation.period_ms();
        let tick_app = app.clone();
        match IntervalHandle::new(period_ms, move || on_tick(&tick_app)) {
            Ok(handle) => a.ticker = Some(handle),
            Err(e) => log::error!("Failed to start ticker: {e:?}"),
        }
    }

    fn on_tick(app: &Rc<RefCell<App>>) {
        let finished = {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            a.animation.advance(now_ms(), &mut a.scene);
            a.log_events();
            !a.animation.is_ticking()
        };
        if finished {
            // Leaving Sailing cancels the interval
            let handle = app.borrow_mut().ticker.take();
            drop(handle);
        }
    }

    fn reset(app: &Rc<RefCell<App>>) {
        let mut guard = app.borrow_mut();
        let a = &mut *guard;
        a.ticker = None;
        a.animation.reset(&mut a.scene);
        a.log_events();
    }

    fn toggle_speed(app: &Rc<RefCell<App>>) {
        let mut guard = app.borrow_mut();
        let a = &mut *guard;
        let preset = a.settings.preset.toggle();
        a.settings.apply_preset(preset);
        a.settings.save();

        // New speed applies from the next run
        a.ticker = None;
        a.animation = Animation::new(&a.settings);
        a.animation.reset(&mut a.scene);
        a.animation.drain_events();
        log::info!("Speed preset: {}", preset.as_str());
    }

    fn on_click(
        document: &web_sys::Document,
        id: &str,
        app: Rc<RefCell<App>>,
        action: fn(&Rc<RefCell<App>>),
    ) -> Result<(), JsValue> {
        let Some(button) = document.get_element_by_id(id) else {
            log::warn!("No #{id} button on the page");
            return Ok(());
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            action(&app);
        });
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_buttons(document: &web_sys::Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        on_click(document, "start", app.clone(), start)?;
        on_click(document, "reset", app.clone(), reset)?;
        on_click(document, "speed", app, toggle_speed)?;
        Ok(())
    }

    /// The crash animation on the hull ends -> split
    fn setup_crash_listener(app: Rc<RefCell<App>>) {
        let hull = app.borrow().scene.hull().clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::AnimationEvent| {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            a.animation.crash_finished(&mut a.scene);
            a.log_events();
        });
        let _ = hull.add_event_listener_with_callback("animationend", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_app::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Titanic (native) starting...");
    log::info!("Browser build required for the DOM scene - running headless voyage");

    let settings = headless::settings_from_args(std::env::args().nth(1).as_deref());
    let report = headless::voyage(&settings, titanic_anim::sim::FixedLayout::default());
    println!("{report}");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::fmt;
    use std::path::Path;

    use titanic_anim::sim::{Animation, FixedLayout, Frame, Phase};
    use titanic_anim::{Settings, SpeedPreset};

    /// Give up if the iceberg is never reached
    const MAX_VOYAGE_MS: f64 = 10.0 * 60.0 * 1000.0;

    /// Outcome of one headless run
    #[derive(Debug, Clone, PartialEq)]
    pub struct VoyageReport {
        pub preset: SpeedPreset,
        pub ticks: u64,
        pub collided_at_ms: Option<f64>,
        pub split_at_ms: Option<f64>,
        pub final_frame: Frame,
    }

    impl fmt::Display for VoyageReport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Preset:    {}", self.preset.as_str())?;
            writeln!(f, "Ticks:     {}", self.ticks)?;
            match self.collided_at_ms {
                Some(ms) => writeln!(f, "Collision: {ms}ms")?,
                None => writeln!(f, "Collision: never")?,
            }
            if let Some(ms) = self.split_at_ms {
                writeln!(f, "Split:     {ms}ms")?;
            }
            write!(
                f,
                "Final:     {} at {}px",
                self.final_frame.phase, self.final_frame.offset
            )
        }
    }

    /// First argument: a preset name or a path to a settings JSON file
    pub fn settings_from_args(arg: Option<&str>) -> Settings {
        match arg {
            None => Settings::default(),
            Some(arg) => match SpeedPreset::from_str(arg) {
                Some(preset) => Settings::from_preset(preset),
                None => Settings::load_from_path(Path::new(arg)),
            },
        }
    }

    /// Sail until the crash animation would have finished, on a virtual clock
    pub fn voyage(settings: &Settings, mut layout: FixedLayout) -> VoyageReport {
        let settings = settings.clone().validated();
        let mut animation = Animation::new(&settings);
        let mut now = 0.0;

        animation.start(now, &mut layout);
        while animation.phase() == Phase::Sailing && now < MAX_VOYAGE_MS {
            now = animation.next_tick_ms().unwrap_or(now);
            animation.advance(now, &mut layout);
        }

        let collided_at_ms = (animation.phase() == Phase::Colliding).then_some(now);
        let split_at_ms = collided_at_ms.and_then(|ms| {
            let ms = ms + settings.crash_duration_ms;
            animation.crash_finished(&mut layout).then_some(ms)
        });
        if collided_at_ms.is_none() {
            log::warn!("Never reached the iceberg within {MAX_VOYAGE_MS}ms");
        }

        let report = VoyageReport {
            preset: settings.preset,
            ticks: animation.state().ticks,
            collided_at_ms,
            split_at_ms,
            final_frame: animation.frame(),
        };
        for event in animation.drain_events() {
            log::debug!("{event:?}");
        }
        animation.reset(&mut layout);
        report
    }

}
