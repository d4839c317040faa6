//! The engine facade: one `tick` per frame drives everything
//!
//! Per tick, in order:
//! 1. publish target fields finished by background jobs
//! 2. auto-advance timer
//! 3. sleigh progress and the one-shot "reached top"
//! 4. explosion interlude (deferred wish, end of the explosion signal)
//! 5. particle integration

use crate::config::ChoreographyConfig;
use crate::event::{GameEvent, TransitionCause};
use crate::event_bus::EventBus;
use crate::input::TapGesture;
use crate::mode::ModeMachine;
use crate::scheduler::{AutoAdvance, ExplosionInterlude};
use crate::wishes::WishPool;
use flurry_core::{ContentHash, FlurryError, Mode, Result};
use flurry_particles::rand::ParticleRng;
use flurry_particles::targets::{decode_image, DynamicImage};
use flurry_particles::{
    default_raster, FrameInput, OutlineFontRaster, ParticleField, SleighPath, SleighPose, TargetCache,
    TargetSource, TextRaster,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub struct Choreographer {
    config: ChoreographyConfig,
    modes: ModeMachine,
    timer: AutoAdvance,
    interlude: ExplosionInterlude,
    cache: TargetCache,
    field: ParticleField,
    sleigh: SleighPath,
    wishes: WishPool,
    rng: ParticleRng,
    events: EventBus,
    tap: TapGesture,
    wish_text: Option<String>,
    reached_top: bool,
    sleigh_progress: f32,
    now: f32,
}

impl Choreographer {
    /// Engine drawing text with the configured font, or the bundled one.
    pub fn new(config: ChoreographyConfig) -> Result<Self> {
        let raster = text_raster(&config);
        Self::with_raster(config, raster)
    }

    /// Engine drawing text targets through `raster`. Initial targets are
    /// queued as background jobs; see [`Choreographer::wait_for_targets`].
    pub fn with_raster(config: ChoreographyConfig, raster: Arc<dyn TextRaster>) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.particles.seed {
            Some(seed) => ParticleRng::new(seed),
            None => ParticleRng::from_entropy(),
        };
        let count = config.particles.count;
        let field_seed = rng.next_u64();
        let cache_seed = rng.next_u64();
        let field = ParticleField::new(count, field_seed, config.field_config());
        let mut cache = TargetCache::new(count, cache_seed, raster);

        cache.request(greeting_source(&config));
        let [line1, line2] = config.assets.banner.clone();
        cache.request(TargetSource::Banner(line1, line2));
        cache.request(TargetSource::Tree);
        cache.request(TargetSource::Scatter);

        let schedule = &config.schedule;
        let mut timer = AutoAdvance::new(schedule.advance_interval);
        if schedule.autoplay {
            timer.arm(0.0);
        }
        log::info!(
            "[choreo] {} particles, autoplay {}",
            count,
            if schedule.autoplay { "on" } else { "off" }
        );

        Ok(Self {
            modes: ModeMachine::new(0.0),
            timer,
            interlude: ExplosionInterlude::new(schedule.interlude_delay, schedule.explosion_signal),
            cache,
            field,
            sleigh: SleighPath::new(schedule.sleigh_duration),
            wishes: WishPool::new(config.assets.wishes.clone()),
            rng,
            events: EventBus::new(),
            tap: TapGesture::default(),
            wish_text: None,
            reached_top: false,
            sleigh_progress: 0.0,
            now: 0.0,
            config,
        })
    }

    /// Block until queued target jobs have reported, publishing them.
    pub fn wait_for_targets(&mut self, timeout: Duration) {
        let published = self.cache.wait_idle(timeout);
        self.on_published(published);
    }

    /// Advance one frame. `elapsed` is seconds since start, `delta` the
    /// frame duration.
    pub fn tick(&mut self, elapsed: f32, delta: f32) {
        self.now = elapsed;

        let published = self.cache.poll();
        self.on_published(published);

        if self.timer.poll(elapsed) {
            self.transition(self.modes.current().next(), elapsed, TransitionCause::Auto);
        }

        let mode = self.modes.current();
        self.sleigh_progress = match mode {
            Mode::Tree => self.sleigh.progress(self.modes.since_entry(elapsed)),
            _ => 0.0,
        };
        if mode == Mode::Tree && !self.reached_top && SleighPath::reached_top(self.sleigh_progress) {
            self.on_reached_top(elapsed);
        }

        let step = self.interlude.poll(elapsed);
        if step.handover {
            self.transition(Mode::Wish, elapsed, TransitionCause::Interlude);
            // The reveal gets its own, shorter stay
            self.timer.arm_for(elapsed, self.config.schedule.wish_interval);
        }
        if step.signal_ended {
            self.events.push(GameEvent::ExplosionEnded { at: elapsed });
            log::debug!("[choreo] explosion signal ended");
        }

        let mode = self.modes.current();
        let light = match mode {
            Mode::Tree => self.sleigh.light_at(self.sleigh_progress),
            _ => None,
        };
        let input = FrameInput {
            mode,
            elapsed,
            delta,
            since_entry: self.modes.since_entry(elapsed),
            light,
            exploding: self.interlude.signal_active(),
            targets: &self.cache,
        };
        self.field.step(&input);
    }

    /// Move to the next mode in the cycle (the tap action).
    pub fn request_advance(&mut self, now: f32) {
        self.timer.arm(now);
        self.transition(self.modes.current().next(), now, TransitionCause::Advance);
    }

    /// A tap: advance and, if the timer was waiting for a first
    /// interaction, arm it.
    pub fn tap(&mut self, now: f32) {
        log::debug!("[input] tap at {:.2}s", now);
        self.request_advance(now);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, now: f32) {
        self.tap.pointer_down(x, y, now as f64);
    }

    /// Pointer release; a short, still press counts as a tap.
    pub fn pointer_up(&mut self, x: f64, y: f64, now: f32) -> bool {
        let tapped = self.tap.pointer_up(x, y, now as f64);
        if tapped {
            self.tap(now);
        }
        tapped
    }

    /// Decode an uploaded photo, queue its mosaic and switch to image mode.
    /// Undecodable bytes leave the mode and targets untouched.
    pub fn upload_image(&mut self, bytes: &[u8], now: f32) -> Result<ContentHash> {
        let image = match decode_image(bytes) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("[choreo] rejected upload: {e}");
                self.events.push(GameEvent::UploadRejected { reason: e.to_string() });
                return Err(e);
            }
        };
        let hash = ContentHash::from_bytes(bytes);
        log::info!("[choreo] photo {} ({}x{})", hash, image.width(), image.height());
        self.cache.request(TargetSource::Photo {
            image: Arc::new(image),
            hash,
        });
        self.timer.arm(now);
        if let Some(t) = self.modes.upload(now) {
            self.after_transition(t.from, t.to, now, TransitionCause::Upload);
        }
        Ok(hash)
    }

    /// Jump straight to `mode`.
    pub fn set_mode(&mut self, mode: Mode, now: f32) {
        self.timer.rearm(now);
        self.transition(mode, now, TransitionCause::Explicit);
    }

    /// Parse a mode name and jump to it.
    pub fn set_mode_named(&mut self, name: &str, now: f32) -> Result<()> {
        let mode: Mode = name.parse()?;
        self.set_mode(mode, now);
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.modes.current()
    }

    pub fn previous_mode(&self) -> Option<Mode> {
        self.modes.previous()
    }

    pub fn wish_text(&self) -> Option<&str> {
        self.wish_text.as_deref()
    }

    pub fn reached_top(&self) -> bool {
        self.reached_top
    }

    /// The explosion signal is active (3 s from the treetop by default)
    pub fn explosion_active(&self) -> bool {
        self.interlude.signal_active()
    }

    /// Sleigh pose while in tree mode
    pub fn sleigh_pose(&self) -> Option<SleighPose> {
        (self.modes.current() == Mode::Tree).then(|| self.sleigh.pose_at(self.sleigh_progress))
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn targets(&self) -> &TargetCache {
        &self.cache
    }

    pub fn config(&self) -> &ChoreographyConfig {
        &self.config
    }

    /// Time of the last tick
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn auto_advance_deadline(&self) -> Option<f32> {
        self.timer.deadline()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    fn transition(&mut self, mode: Mode, now: f32, cause: TransitionCause) {
        if let Some(t) = self.modes.enter(mode, now) {
            self.after_transition(t.from, t.to, now, cause);
        }
    }

    fn after_transition(&mut self, from: Mode, to: Mode, now: f32, cause: TransitionCause) {
        log::info!("[mode] {} -> {} ({:?}) at {:.2}s", from, to, cause, now);
        if to != Mode::Wish {
            self.field.clear_explosion();
            self.interlude.cancel_handover();
        }
        match to {
            Mode::Tree => {
                self.reached_top = false;
                self.interlude.reset();
            }
            Mode::Wish if self.wish_text.is_none() => {
                let wish = self.wishes.pick(&mut self.rng).to_string();
                self.set_wish(wish);
            }
            _ => {}
        }
        self.timer.rearm(now);
        self.events.push(GameEvent::ModeChanged {
            from,
            to,
            cause,
            at: now,
        });
    }

    fn on_reached_top(&mut self, now: f32) {
        self.reached_top = true;
        self.events.push(GameEvent::ReachedTop { at: now });
        log::info!("[choreo] sleigh reached the top at {:.2}s", now);
        if self.interlude.trigger(now) {
            self.field.trigger_explosion(now);
            let wish = self.wishes.pick(&mut self.rng).to_string();
            self.set_wish(wish);
            self.events.push(GameEvent::ExplosionStarted { at: now });
        }
    }

    fn set_wish(&mut self, text: String) {
        log::debug!("[choreo] wish: {:?}", text);
        // Until the new text publishes, the reveal falls back to scatter
        self.cache.invalidate(Mode::Wish);
        self.cache.request(TargetSource::Wish(text.clone()));
        self.wish_text = Some(text);
    }

    fn on_published(&mut self, modes: Vec<Mode>) {
        for mode in modes {
            if mode == Mode::Tree {
                if let Some(tree) = self.cache.field(Mode::Tree) {
                    self.field.reset_to(&tree);
                }
            }
            self.events.push(GameEvent::TargetsPublished { mode });
        }
    }
}

fn text_raster(config: &ChoreographyConfig) -> Arc<dyn TextRaster> {
    let Some(path) = &config.assets.font else {
        return default_raster();
    };
    let loaded = std::fs::read(path)
        .map_err(FlurryError::from)
        .and_then(OutlineFontRaster::from_bytes);
    match loaded {
        Ok(raster) => {
            log::info!("[choreo] lettering font {}", path.display());
            Arc::new(raster)
        }
        Err(e) => {
            log::warn!("[choreo] font {} unusable ({e}), using the bundled font", path.display());
            default_raster()
        }
    }
}

fn greeting_source(config: &ChoreographyConfig) -> TargetSource {
    let Some(path) = &config.assets.logo_image else {
        return TargetSource::Logo;
    };
    match load_image(path) {
        Ok((image, hash)) => TargetSource::LogoImage {
            image: Arc::new(image),
            hash,
        },
        Err(e) => {
            log::warn!("[choreo] logo image {} unusable ({e}), using lettering", path.display());
            TargetSource::Logo
        }
    }
}

fn load_image(path: &Path) -> Result<(DynamicImage, ContentHash)> {
    let bytes = std::fs::read(path)?;
    let image = decode_image(&bytes)?;
    Ok((image, ContentHash::from_bytes(&bytes)))
}

impl std::fmt::Debug for Choreographer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Choreographer")
            .field("mode", &self.modes.current())
            .field("now", &self.now)
            .field("particles", &self.field.len())
            .field("wish", &self.wish_text)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wishes::WISHES;
    use flurry_particles::TargetLookup;

    const DT: f32 = 1.0 / 60.0;

    fn config(count: usize, autoplay: bool) -> ChoreographyConfig {
        let mut config = ChoreographyConfig::default();
        config.particles.count = count;
        config.particles.seed = Some(11);
        config.schedule.autoplay = autoplay;
        config
    }

    fn ready(config: ChoreographyConfig) -> Choreographer {
        let mut choreo = Choreographer::new(config).unwrap();
        choreo.wait_for_targets(Duration::from_secs(60));
        choreo
    }

    /// Tick from `from` up to (not including) `to` at a fixed step
    fn run(choreo: &mut Choreographer, from: usize, to: usize, dt: f32) {
        for k in from..to {
            choreo.tick(k as f32 * dt, dt);
        }
    }

    fn index_of(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().position(pred).unwrap()
    }

    #[test]
    fn initial_targets_are_published() {
        let mut choreo = ready(config(300, true));
        assert_eq!(choreo.mode(), Mode::Greeting);
        for mode in [Mode::Greeting, Mode::Text, Mode::Tree, Mode::Scatter] {
            assert!(choreo.targets().target(mode).is_some(), "{mode}");
        }
        let published = choreo
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::TargetsPublished { .. }))
            .count();
        assert_eq!(published, 4);
    }

    #[test]
    fn five_intervals_cycle_every_mode_once() {
        let mut config = config(200, true);
        // Keep the sleigh from reaching the top inside the tree interval
        config.schedule.sleigh_duration = 1000.0;
        let mut choreo = ready(config);
        choreo.drain_events();

        let dt = 0.5;
        run(&mut choreo, 0, (5.0 * 45.0 / dt) as usize + 1, dt);
        let visited: Vec<(Mode, TransitionCause)> = choreo
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::ModeChanged { to, cause, .. } => Some((to, cause)),
                _ => None,
            })
            .collect();
        let expected: Vec<(Mode, TransitionCause)> = [Mode::Image, Mode::Text, Mode::Tree, Mode::Wish, Mode::Greeting]
            .into_iter()
            .map(|m| (m, TransitionCause::Auto))
            .collect();
        assert_eq!(visited, expected);
        assert!(!choreo.reached_top());
    }

    #[test]
    fn reaching_the_top_explodes_then_reveals_a_wish() {
        let mut choreo = ready(config(200, false));
        choreo.set_mode(Mode::Tree, 0.0);
        assert!(choreo.sleigh_pose().is_some());

        // 9.95 s: just past 99% of the 10 s flight
        let top = 597;
        run(&mut choreo, 1, top + 1, DT);
        assert!(choreo.reached_top());
        assert!(choreo.explosion_active());
        assert_eq!(choreo.mode(), Mode::Tree);
        assert!(choreo.field().explosion_started().is_some());
        let wish = choreo.wish_text().map(str::to_string).unwrap();
        assert!(WISHES.contains(&wish.as_str()));

        // One second later the wish takes over
        run(&mut choreo, top + 1, top + 62, DT);
        assert_eq!(choreo.mode(), Mode::Wish);
        assert_eq!(choreo.wish_text(), Some(wish.as_str()));
        assert!(choreo.explosion_active());
        let handover = choreo.now();
        let deadline = choreo.auto_advance_deadline().unwrap();
        assert!((deadline - (handover + 18.0)).abs() < 0.1);

        // The signal lasts three seconds in total
        run(&mut choreo, top + 62, top + 190, DT);
        assert!(!choreo.explosion_active());

        let events = choreo.drain_events();
        let reached = index_of(&events, |e| matches!(e, GameEvent::ReachedTop { .. }));
        let started = index_of(&events, |e| matches!(e, GameEvent::ExplosionStarted { .. }));
        let reveal = index_of(&events, |e| {
            matches!(
                e,
                GameEvent::ModeChanged {
                    to: Mode::Wish,
                    cause: TransitionCause::Interlude,
                    ..
                }
            )
        });
        let ended = index_of(&events, |e| matches!(e, GameEvent::ExplosionEnded { .. }));
        assert!(reached < started && started < reveal && reveal < ended);
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::ReachedTop { .. })).count(),
            1
        );
    }

    #[test]
    fn leaving_during_the_interlude_cancels_the_reveal() {
        let mut choreo = ready(config(100, false));
        choreo.set_mode(Mode::Tree, 0.0);
        run(&mut choreo, 1, 600, DT);
        assert!(choreo.reached_top());

        choreo.set_mode(Mode::Greeting, choreo.now());
        assert!(choreo.field().explosion_started().is_none());
        run(&mut choreo, 600, 800, DT);
        assert_eq!(choreo.mode(), Mode::Greeting);

        // Re-entering the tree starts a fresh flight
        choreo.set_mode(Mode::Tree, choreo.now());
        assert!(!choreo.reached_top());
        assert!(!choreo.explosion_active());
    }

    #[test]
    fn a_new_wish_drops_the_old_wish_field() {
        let mut choreo = ready(config(100, false));
        choreo.set_mode(Mode::Tree, 0.0);
        run(&mut choreo, 1, 600, DT);
        choreo.wait_for_targets(Duration::from_secs(60));
        assert!(choreo.targets().target(Mode::Wish).is_some());

        choreo.set_mode(Mode::Greeting, 10.0);
        choreo.set_mode(Mode::Tree, 10.0);
        let mut k = 600;
        while !choreo.reached_top() {
            k += 1;
            assert!(k < 1300, "sleigh never reached the top");
            choreo.tick(k as f32 * DT, DT);
        }
        assert!(choreo.targets().target(Mode::Wish).is_none());

        choreo.wait_for_targets(Duration::from_secs(60));
        let wish = choreo.targets().target(Mode::Wish).unwrap();
        assert_eq!(wish.len(), 100);
    }

    #[test]
    fn tap_arms_the_timer_and_advances() {
        let mut choreo = ready(config(100, false));
        assert!(choreo.auto_advance_deadline().is_none());
        choreo.pointer_down(10.0, 10.0, 1.0);
        assert!(choreo.pointer_up(12.0, 11.0, 1.1));
        assert_eq!(choreo.mode(), Mode::Image);
        assert_eq!(choreo.auto_advance_deadline(), Some(1.1 + 45.0));

        // A drag does nothing
        choreo.pointer_down(10.0, 10.0, 2.0);
        assert!(!choreo.pointer_up(80.0, 10.0, 2.1));
        assert_eq!(choreo.mode(), Mode::Image);
    }

    #[test]
    fn any_transition_rearms_the_timer() {
        let mut choreo = ready(config(100, true));
        assert_eq!(choreo.auto_advance_deadline(), Some(45.0));
        choreo.request_advance(30.0);
        assert_eq!(choreo.auto_advance_deadline(), Some(75.0));
        choreo.set_mode(Mode::Scatter, 40.0);
        assert_eq!(choreo.auto_advance_deadline(), Some(85.0));
        run(&mut choreo, 0, 2, DT);
        assert_eq!(choreo.mode(), Mode::Scatter);
    }

    #[test]
    fn bad_upload_changes_nothing() {
        let mut choreo = ready(config(100, true));
        choreo.drain_events();
        let err = choreo.upload_image(b"not an image", 3.0).unwrap_err();
        assert!(matches!(err, FlurryError::ImageDecode(_)));
        assert_eq!(choreo.mode(), Mode::Greeting);
        assert!(choreo.targets().target(Mode::Image).is_none());
        assert_eq!(choreo.auto_advance_deadline(), Some(45.0));
        let events = choreo.drain_events();
        assert!(matches!(events.as_slice(), [GameEvent::UploadRejected { .. }]));
    }

    #[test]
    fn upload_switches_to_a_colored_mosaic() {
        let mut img = image::RgbaImage::new(8, 8);
        for px in img.pixels_mut() {
            *px = image::Rgba([0, 255, 0, 255]);
        }
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let mut choreo = ready(config(100, true));
        let hash = choreo.upload_image(&bytes, 5.0).unwrap();
        assert_eq!(hash, ContentHash::from_bytes(&bytes));
        assert_eq!(choreo.mode(), Mode::Image);
        choreo.wait_for_targets(Duration::from_secs(60));
        let mosaic = choreo.targets().target(Mode::Image).unwrap();
        assert_eq!(mosaic.len(), 100);
        assert!(mosaic.colors().unwrap().iter().all(|c| c.g > 0.99));
    }

    #[test]
    fn unreadable_font_falls_back_to_bundled() {
        let mut config = config(200, false);
        config.assets.font = Some("/nonexistent/font.ttf".into());
        let mut choreo = ready(config);
        let greeting = choreo.targets().target(Mode::Greeting).unwrap();
        assert_eq!(greeting.len(), 200);
        assert!(greeting.positions().iter().any(|p| p.x != 0.0));
    }

    #[test]
    fn vietnamese_wish_is_drawn_from_its_own_glyphs() {
        let mut config = config(20_000, false);
        config.assets.wishes = vec!["Giáng Sinh rạng rỡ nhé!".to_string()];
        let mut choreo = ready(config);
        choreo.set_mode(Mode::Wish, 0.0);
        assert_eq!(choreo.wish_text(), Some("Giáng Sinh rạng rỡ nhé!"));
        choreo.wait_for_targets(Duration::from_secs(60));
        let drawn = choreo.targets().target(Mode::Wish).unwrap().clone();

        let garbled = flurry_particles::targets::wish_positions(
            default_raster().as_ref(),
            "Giáng Sinh r?ng r? nhé!",
            20_000,
        );
        assert_ne!(drawn, garbled);
    }

    #[test]
    fn set_mode_by_name() {
        let mut choreo = ready(config(50, false));
        choreo.set_mode_named("scatter", 1.0).unwrap();
        assert_eq!(choreo.mode(), Mode::Scatter);
        assert!(choreo.set_mode_named("disco", 2.0).is_err());
        assert_eq!(choreo.previous_mode(), Some(Mode::Greeting));
    }
}
