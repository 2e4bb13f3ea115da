mod cli;
mod render;
mod tone;

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use akiba_config::AkibaConfig;
use akiba_core::{BootScript, CursorBlink, Sequencer, Tuning};

const TICK: Duration = Duration::from_millis(15);

fn tuning_from(config: &AkibaConfig) -> Tuning {
    Tuning {
        fail_settle_ms: config.boot.fail_settle_ms,
        advance_settle_ms: config.boot.advance_settle_ms,
        retry_delay_ms: (config.boot.retry_delay_min_ms, config.boot.retry_delay_max_ms),
        progress_steps: config.memory_test.steps,
        progress_target_kb: config.memory_test.target_kb,
        tone_hz: config.memory_test.tone_hz,
    }
}

fn load_config(args: &cli::Args) -> AkibaConfig {
    let loaded = match &args.config {
        Some(path) => akiba_config::toml_loader::load_from_path(Path::new(path)),
        None => akiba_config::load_config(),
    };
    loaded.unwrap_or_else(|e| {
        tracing::warn!("config load failed, using defaults: {e}");
        AkibaConfig::default()
    })
}

fn main() {
    let args = cli::parse();

    let log_directive = args.log_level.clone().unwrap_or_else(|| "akiba=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "akiba=info".parse().unwrap()),
            ),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Akiba v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let script = BootScript::standard(&mut rng);
    tracing::info!("boot script loaded ({} lines)", script.len());

    let audio = config.audio.enabled && !args.no_audio;
    let mut sequencer = match args.seed {
        Some(seed) => Sequencer::with_seed(script, tuning_from(&config), tone::make_tone(audio), seed),
        None => Sequencer::new(script, tuning_from(&config), tone::make_tone(audio)),
    };

    // The completion signal is the only thing the sequencer tells the
    // outside world; here "switching views" means leaving the draw loop.
    let finished = Rc::new(Cell::new(false));
    let signal = finished.clone();
    sequencer.set_on_complete(move || signal.set(true));

    let mut blink = CursorBlink::new(Duration::from_millis(config.boot.blink_period_ms));
    let mut renderer = render::BootRenderer::new(std::io::stdout());

    if let Err(e) = run(&mut sequencer, &mut blink, &mut renderer, &finished) {
        tracing::error!("render error: {e}");
        sequencer.teardown();
        std::process::exit(1);
    }
    tracing::info!("shutdown complete");
}

fn run(
    sequencer: &mut Sequencer,
    blink: &mut CursorBlink,
    renderer: &mut render::BootRenderer<std::io::Stdout>,
    finished: &Rc<Cell<bool>>,
) -> std::io::Result<()> {
    renderer.init()?;
    sequencer.start();

    let mut last_tick = Instant::now();
    let mut drawn_revision = u64::MAX;
    let mut drawn_blink = false;

    loop {
        let now = Instant::now();
        let dt = now - last_tick;
        last_tick = now;

        sequencer.advance(dt);
        blink.advance(dt);

        if sequencer.revision() != drawn_revision || blink.visible() != drawn_blink {
            drawn_revision = sequencer.revision();
            drawn_blink = blink.visible();
            let frame = akiba_core::frame(sequencer.lines(), drawn_blink, !sequencer.is_complete());
            renderer.draw(&frame)?;
        }

        if finished.get() {
            break;
        }
        std::thread::sleep(TICK);
    }

    renderer.finish()
}
