use std::error::Error;
use std::fs::File;

use clap::Parser;
use log::error;

use chip8vm::config::Config;
use chip8vm::display::MonoTermDisplay;
use chip8vm::environment::Environment;
use chip8vm::input::StdinInput;
use chip8vm::interpreter::Chip8Interpreter;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = Config::parse();

    // initialise
    let mut interpreter = match config.seed {
        Some(seed) => Chip8Interpreter::with_seed(seed),
        None => Chip8Interpreter::new(),
    };

    // load a program; a bad ROM is reported but the machine still runs
    match File::open(&config.rom) {
        Ok(mut f) => {
            if let Err(e) = interpreter.load_program(&mut f) {
                error!("unable to load {}: {}", config.rom.display(), e);
            }
        }
        Err(e) => error!("unable to open {}: {}", config.rom.display(), e),
    }

    if config.disassemble {
        for line in interpreter.disassemble_program() {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut display = MonoTermDisplay::new()?;
    let mut input = StdinInput::new(config.keymap.table(), config.key_hold_frames)?;
    let mut environment = Environment::new(
        interpreter,
        &mut display,
        &mut input,
        config.steps_per_frame,
        config.frame_rate,
    );
    environment.set_paused(config.paused);
    let result = environment.main_loop(config.frames);
    drop(environment);
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }

    if let Err(e) = result {
        error!("halted: {}", e);
        return Err(e.into());
    }
    Ok(())
}
