mod render;
mod window;

use backdrop::BackdropConfig;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use winit::event_loop::{ControlFlow, EventLoop};

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let level = std::env::var("BACKDROP_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LevelFilter::Info);

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = match std::env::args().nth(1) {
        Some(path) => BackdropConfig::load(&path).unwrap_or_else(|e| {
            log::warn!("{}: {}, using defaults", path, e);
            BackdropConfig::default()
        }),
        None => BackdropConfig::default(),
    };

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = window::App::new(config);
    event_loop.run_app(&mut app).unwrap();
}
