//! Byte Runner entry point
//!
//! In the browser this wires the canvas, WebGPU, keyboard and DOM HUD to the game
//! loop. Natively it runs a headless demo session and prints the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{Event, EventTarget, HtmlCanvasElement, KeyboardEvent, PageTransitionEvent};

    use byte_runner::Settings;
    use byte_runner::audio::{AudioManager, SoundEffect};
    use byte_runner::game_loop::{FrameHandle, FrameScheduler, GameLoop, InputEvent};
    use byte_runner::renderer::{RenderState, ShapeBatch};
    use byte_runner::sim::{GameEvent, GameStatus};

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// requestAnimationFrame-backed scheduler
    struct AnimationFrames {
        callback: FrameCallback,
    }

    impl FrameScheduler for AnimationFrames {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            let window = web_sys::window()?;
            let callback = self.callback.borrow();
            let Some(closure) = callback.as_ref() else {
                log::error!("Frame requested without a frame callback");
                return None;
            };
            match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                Ok(id) => Some(FrameHandle(id as u64)),
                Err(e) => {
                    log::error!("requestAnimationFrame failed: {:?}", e);
                    None
                }
            }
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle.0 as i32);
            }
        }
    }

    /// A registered DOM listener, removed again on teardown
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    }

    impl Listener {
        fn attach(
            target: EventTarget,
            kind: &'static str,
            handler: impl FnMut(Event) + 'static,
        ) -> Option<Self> {
            let closure = Closure::<dyn FnMut(Event)>::new(handler);
            match target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
                Ok(()) => Some(Self {
                    target,
                    kind,
                    closure,
                }),
                Err(e) => {
                    log::warn!("Could not listen for {}: {:?}", kind, e);
                    None
                }
            }
        }

        fn detach(&self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
        }
    }

    /// Game instance holding all host state
    struct Game {
        game_loop: GameLoop,
        render_state: Option<RenderState>,
        batch: ShapeBatch,
        audio: AudioManager,
        frame_callback: FrameCallback,
        listeners: Vec<Listener>,
    }

    impl Game {
        /// Present the last painted batch, if the GPU surface is ready
        fn present(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            match render_state.render(&self.batch) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Start or retry, then repaint the HUD overlays
        fn start(&mut self) {
            let now = now_ms();
            match self.game_loop.set_status(GameStatus::Playing, now) {
                Ok(()) => {
                    self.audio.play(SoundEffect::Start);
                    set_hidden("start-screen", true);
                    set_hidden("game-over", true);
                    set_text("#hud-score .hud-value", "0");
                }
                Err(e) => log::warn!("Start ignored: {}", e),
            }
        }

        fn handle_events(&self, events: &[GameEvent]) {
            for event in events {
                if let Some(effect) = SoundEffect::for_event(event) {
                    self.audio.play(effect);
                }
                match event {
                    GameEvent::Score(score) => {
                        set_text("#hud-score .hud-value", &score.to_string());
                    }
                    GameEvent::GameOver { score } => {
                        set_text("#hud-score .hud-value", &score.to_string());
                        set_text("#final-score", &score.to_string());
                        set_hidden("game-over", false);
                    }
                    _ => {}
                }
            }
        }

        /// Stop the loop, detach every listener and drop the frame callback
        fn teardown(&mut self) {
            self.game_loop.teardown();
            for listener in self.listeners.drain(..) {
                listener.detach();
            }
            self.frame_callback.borrow_mut().take();
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn set_text(selector: &str, text: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn with_game(f: impl FnOnce(&mut Game)) {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                f(&mut game.borrow_mut());
            }
        });
    }

    /// Status signal from the surrounding page ("START" | "PLAYING" | "GAMEOVER")
    #[wasm_bindgen]
    pub fn set_status(status: &str) {
        with_game(|g| {
            if GameStatus::parse(status) == Some(GameStatus::Playing) {
                g.start();
            } else if let Err(e) = g.game_loop.apply_status_signal(status, now_ms()) {
                log::debug!("Status signal {:?} ignored: {}", status, e);
            }
        });
    }

    /// Obstacle speed from the surrounding page
    #[wasm_bindgen]
    pub fn set_speed(speed: f32) {
        with_game(|g| g.game_loop.set_speed(speed));
    }

    /// Current integer score
    #[wasm_bindgen]
    pub fn score() -> f64 {
        let mut score = 0.0;
        with_game(|g| score = g.game_loop.score() as f64);
        score
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Byte Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);

        let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
        let scheduler = AnimationFrames {
            callback: frame_callback.clone(),
        };

        let mut audio = AudioManager::new();
        audio.set_volume(settings.volume);
        audio.set_muted(!settings.sound);

        let game = Rc::new(RefCell::new(Game {
            game_loop: GameLoop::new(&settings, seed, Box::new(scheduler)),
            render_state: None,
            batch: ShapeBatch::new(),
            audio,
            frame_callback: frame_callback.clone(),
            listeners: Vec::new(),
        }));
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        log::info!("Game initialized with seed: {}", seed);

        // Closures hold weak references; the GAME slot owns the game
        {
            let weak = Rc::downgrade(&game);
            *frame_callback.borrow_mut() = Some(Closure::new(move |time: f64| {
                let Some(game) = weak.upgrade() else { return };
                let mut g = game.borrow_mut();
                let g = &mut *g;
                let events = g.game_loop.frame(time, Some(&mut g.batch));
                g.present();
                g.handle_events(&events);
            }));
        }

        let listeners = [
            input_listener(&game),
            button_listener(&game, "start-btn"),
            button_listener(&game, "retry-btn"),
            page_hide_listener(&game),
            page_show_listener(&game),
        ];
        game.borrow_mut()
            .listeners
            .extend(listeners.into_iter().flatten());

        // The canvas may be missing on pages that embed the game lazily
        let canvas: Option<HtmlCanvasElement> = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok());
        let Some(canvas) = canvas else {
            log::warn!("No canvas found - running without rendering");
            return;
        };

        let width = canvas.width();
        let height = canvas.height();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas)) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => {
                let mut g = game.borrow_mut();
                g.render_state = Some(render_state);
                // Paint the idle scene behind the start screen
                let g = &mut *g;
                g.game_loop.render(&mut g.batch);
                g.present();
            }
            Err(e) => log::error!("Failed to set up renderer: {}", e),
        }

        log::info!("Byte Runner running!");
    }

    fn input_listener(game: &Rc<RefCell<Game>>) -> Option<Listener> {
        let window = web_sys::window()?;
        let input = game.borrow().game_loop.input_handle();
        Listener::attach(window.into(), "keydown", move |event: Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let Some(command) = InputEvent::from_key_code(&event.code()) else {
                return;
            };
            if command == InputEvent::Jump {
                // Keep Space from scrolling the page
                event.prevent_default();
            }
            if !input.send(command) {
                log::debug!("Input after teardown dropped");
            }
        })
    }

    fn button_listener(game: &Rc<RefCell<Game>>, id: &str) -> Option<Listener> {
        let btn = web_sys::window()?.document()?.get_element_by_id(id)?;
        let weak = Rc::downgrade(game);
        Listener::attach(btn.into(), "click", move |_event: Event| {
            if let Some(game) = weak.upgrade() {
                game.borrow_mut().start();
            }
        })
    }

    /// Pages kept in the back/forward cache are suspended; real unloads tear down
    fn page_hide_listener(game: &Rc<RefCell<Game>>) -> Option<Listener> {
        let window = web_sys::window()?;
        let weak: Weak<RefCell<Game>> = Rc::downgrade(game);
        Listener::attach(window.into(), "pagehide", move |event: Event| {
            let Some(game) = weak.upgrade() else { return };
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .is_some_and(|e| e.persisted());
            if persisted {
                game.borrow_mut().game_loop.suspend();
                return;
            }
            game.borrow_mut().teardown();
            GAME.with(|slot| *slot.borrow_mut() = None);
        })
    }

    fn page_show_listener(game: &Rc<RefCell<Game>>) -> Option<Listener> {
        let window = web_sys::window()?;
        let weak = Rc::downgrade(game);
        Listener::attach(window.into(), "pageshow", move |_event: Event| {
            if let Some(game) = weak.upgrade() {
                game.borrow_mut().game_loop.resume(now_ms());
            }
        })
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use byte_runner::game_loop::{FrameHandle, FrameScheduler, GameLoop};
    use byte_runner::renderer::ShapeBatch;
    use byte_runner::sim::GameStatus;
    use byte_runner::Settings;

    /// Frames are driven by the loop below; handles are just counters
    #[derive(Default)]
    struct HeadlessFrames {
        next: u64,
    }

    impl FrameScheduler for HeadlessFrames {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            self.next += 1;
            Some(FrameHandle(self.next))
        }

        fn cancel_frame(&mut self, _handle: FrameHandle) {}
    }

    env_logger::init();
    log::info!("Byte Runner (native) starting...");
    log::info!("Native mode runs a headless demo - use `trunk serve` for the playable web version");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(1);
    let mut settings = Settings::load();
    if let Some(speed) = args.next().and_then(|s| s.parse::<f32>().ok()) {
        settings.speed = speed;
    }
    settings.autopilot = true;

    // Ten minutes at 60 Hz
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    let mut game = GameLoop::new(&settings, seed, Box::new(HeadlessFrames::default()));
    let mut batch = ShapeBatch::new();
    if let Err(e) = game.set_status(GameStatus::Playing, 0.0) {
        log::error!("Could not start: {}", e);
        return;
    }

    let mut frames = 0;
    while game.is_scheduled() && frames < MAX_FRAMES {
        frames += 1;
        game.frame(frames as f64 * FRAME_MS, Some(&mut batch));
    }

    match game.final_score() {
        Some(score) => println!("Crashed after {} frames with score {}", frames, score),
        None => println!("Survived {} frames, score {}", frames, game.score()),
    }
    println!("Last frame: {} vertices", batch.vertices().len());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry point is wasm_main
}
