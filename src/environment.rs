//! The environment wires an interpreter to a display and an input device
//! and drives it frame by frame: sample the keys, run a batch of
//! instructions, count the timers down, redraw, then sleep until the next
//! frame is due.
//!
//! The run can be paused. A paused machine still polls and redraws, but
//! runs no instructions and its timers hold still; single steps can be
//! requested one instruction at a time. A reset reloads the program image
//! the environment was built with.
use crate::display::Display;
use crate::error::{Chip8Error, Result};
use crate::input::{Controls, Input};
use crate::interpreter::Chip8Interpreter;
use crate::memory::CHIP8_PROGRAM_ADDR;
use log::{debug, info, trace};
use std::time::{Duration, Instant};

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    steps_per_frame: u32,
    frame_period: Option<Duration>,
    paused: bool,
    // program region as loaded, for resets
    program: Vec<u8>,
}

impl<'a> Environment<'a> {
    /// `frame_rate` of 0 means run as fast as possible
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut impl Display,
        input: &'a mut impl Input,
        steps_per_frame: u32,
        frame_rate: u32,
    ) -> Self {
        let program = interpreter.memory()[CHIP8_PROGRAM_ADDR as usize..].to_vec();
        Environment {
            interpreter,
            display,
            input,
            steps_per_frame,
            frame_period: (frame_rate > 0).then(|| Duration::from_secs(1) / frame_rate),
            paused: false,
            program,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// put the machine back to its just-loaded state
    pub fn reset(&mut self) -> Result<()> {
        self.interpreter.load_program(&mut self.program.as_slice())?;
        info!("program reloaded");
        Ok(())
    }

    /// one tick of the 60Hz clock
    pub fn frame(&mut self) -> Result<()> {
        let keys = self.input.poll_keys().map_err(Chip8Error::Frontend)?;
        let controls = self.input.take_controls();
        self.apply(controls)?;
        self.interpreter.set_keys(keys);

        if self.paused {
            for _ in 0..controls.steps {
                let instruction = self.interpreter.step()?;
                debug!("stepped {}", instruction);
            }
        } else {
            self.run_batch()?;
        }

        self.display
            .draw(self.interpreter.framebuffer())
            .map_err(Chip8Error::Frontend)
    }

    fn apply(&mut self, controls: Controls) -> Result<()> {
        if controls.reset {
            self.reset()?;
        }
        if controls.toggle_pause {
            self.paused = !self.paused;
            info!("{}", if self.paused { "paused" } else { "running" });
        }
        Ok(())
    }

    fn run_batch(&mut self) -> Result<()> {
        for _ in 0..self.steps_per_frame {
            self.interpreter.step()?;
        }

        let i = &mut self.interpreter;
        i.set_delay_timer(i.delay_timer().saturating_sub(1));
        i.set_sound_timer(i.sound_timer().saturating_sub(1));
        if i.sound_timer() > 0 {
            trace!("tone on ({} frames left)", i.sound_timer());
        }
        Ok(())
    }

    /// Run frames until the input asks to quit, `max_frames` have run, or
    /// the interpreter faults. Returns the number of frames run.
    pub fn main_loop(&mut self, max_frames: Option<u64>) -> Result<u64> {
        let mut frames = 0;
        while max_frames.map_or(true, |max| frames < max) {
            let started = Instant::now();
            self.frame()?;
            frames += 1;
            if self.input.quit_requested() {
                debug!("quit requested after {} frames", frames);
                break;
            }
            if let Some(period) = self.frame_period {
                if let Some(remaining) = period.checked_sub(started.elapsed()) {
                    spin_sleep::sleep(remaining);
                }
            }
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DummyDisplay;
    use crate::input::{Controls, DummyInput};

    const PAUSE: Controls = Controls {
        toggle_pause: true,
        steps: 0,
        reset: false,
    };

    fn steps(n: u32) -> Controls {
        Controls {
            steps: n,
            ..Controls::default()
        }
    }

    fn interpreter(program: &[u8]) -> Result<Chip8Interpreter> {
        let mut i = Chip8Interpreter::with_seed(7);
        i.load_program(&mut &program[..])?;
        Ok(i)
    }

    #[test]
    fn test_frame_runs_steps_and_ticks_timers() -> Result<()> {
        // LD V0, 3 ; LD DT, V0 ; LD ST, V0 ; JMP 206
        let i = interpreter(&[0x60, 0x03, 0xF0, 0x15, 0xF0, 0x18, 0x12, 0x06])?;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0, 0]);
        let mut env = Environment::new(i, &mut display, &mut input, 4, 0);
        env.frame()?;
        assert_eq!(env.interpreter().program_counter(), 0x206);
        assert_eq!(env.interpreter().delay_timer(), 2);
        assert_eq!(env.interpreter().sound_timer(), 2);
        env.frame()?;
        assert_eq!(env.interpreter().delay_timer(), 1);
        drop(env);
        assert_eq!(display.frames, 2);
        Ok(())
    }

    #[test]
    fn test_timers_stop_at_zero() -> Result<()> {
        let i = interpreter(&[0x12, 0x00])?;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0]);
        let mut env = Environment::new(i, &mut display, &mut input, 1, 0);
        env.frame()?;
        assert_eq!(env.interpreter().delay_timer(), 0);
        Ok(())
    }

    #[test]
    fn test_key_wait_released_by_input() -> Result<()> {
        // LD V1, KEY ; LD F, V1 ; DRW V2, V2, 5 ; JMP 206
        let i = interpreter(&[0xF1, 0x0A, 0xF1, 0x29, 0xD2, 0x25, 0x12, 0x06])?;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0, 0, 0x0100]);
        let mut env = Environment::new(i, &mut display, &mut input, 5, 0);
        assert_eq!(env.main_loop(None)?, 3);
        assert_eq!(env.interpreter().register(1), 8);
        drop(env);
        // the "8" glyph has 16 lit pixels
        assert_eq!(display.lit, 16);
        Ok(())
    }

    #[test]
    fn test_main_loop_frame_limit() -> Result<()> {
        let i = interpreter(&[0x12, 0x00])?;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0; 10]);
        let mut env = Environment::new(i, &mut display, &mut input, 1, 0);
        assert_eq!(env.main_loop(Some(4))?, 4);
        Ok(())
    }

    #[test]
    fn test_main_loop_stops_on_fault() -> Result<()> {
        let i = interpreter(&[0x00, 0xEE])?;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0; 10]);
        let mut env = Environment::new(i, &mut display, &mut input, 1, 0);
        assert!(matches!(
            env.main_loop(None),
            Err(Chip8Error::StackUnderflow { pc: 0x200 })
        ));
        Ok(())
    }

    #[test]
    fn test_paused_frame_runs_nothing_but_draws() -> Result<()> {
        // LD V0, 3 ; LD DT, V0 ; JMP 204
        let mut i = interpreter(&[0x60, 0x03, 0xF0, 0x15, 0x12, 0x04])?;
        i.set_sound_timer(5);
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0, 0]);
        let mut env = Environment::new(i, &mut display, &mut input, 4, 0);
        env.set_paused(true);
        env.frame()?;
        env.frame()?;
        assert!(env.is_paused());
        assert_eq!(env.interpreter().program_counter(), 0x200);
        assert_eq!(env.interpreter().register(0), 0);
        assert_eq!(env.interpreter().sound_timer(), 5);
        drop(env);
        assert_eq!(display.frames, 2);
        Ok(())
    }

    #[test]
    fn test_single_step_while_paused() -> Result<()> {
        // LD V0, 3 ; LD DT, V0 ; JMP 204
        let i = interpreter(&[0x60, 0x03, 0xF0, 0x15, 0x12, 0x04])?;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0, 0, 0]).with_controls(&[steps(1), steps(0), steps(1)]);
        let mut env = Environment::new(i, &mut display, &mut input, 10, 0);
        env.set_paused(true);
        env.frame()?;
        assert_eq!(env.interpreter().program_counter(), 0x202);
        assert_eq!(env.interpreter().register(0), 3);
        env.frame()?;
        assert_eq!(env.interpreter().program_counter(), 0x202);
        env.frame()?;
        assert_eq!(env.interpreter().program_counter(), 0x204);
        // the step set DT, but a paused clock doesn't tick it
        assert_eq!(env.interpreter().delay_timer(), 3);
        Ok(())
    }

    #[test]
    fn test_steps_ignored_while_running() -> Result<()> {
        // LD V0, 1 ; LD V1, 2 ; LD V2, 3 ; JMP 206
        let i = interpreter(&[0x60, 0x01, 0x61, 0x02, 0x62, 0x03, 0x12, 0x06])?;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0]).with_controls(&[steps(3)]);
        let mut env = Environment::new(i, &mut display, &mut input, 1, 0);
        env.frame()?;
        assert_eq!(env.interpreter().program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_toggle_pause() -> Result<()> {
        let i = interpreter(&[0x60, 0x01, 0x61, 0x02, 0x12, 0x04])?;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0, 0, 0, 0]).with_controls(&[PAUSE, steps(0), PAUSE]);
        let mut env = Environment::new(i, &mut display, &mut input, 1, 0);
        env.frame()?;
        assert!(env.is_paused());
        assert_eq!(env.interpreter().program_counter(), 0x200);
        env.frame()?;
        assert_eq!(env.interpreter().program_counter(), 0x200);
        env.frame()?;
        assert!(!env.is_paused());
        assert_eq!(env.interpreter().program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_reset_reloads_program() -> Result<()> {
        // LD V0, 3 ; LD DT, V0 ; CLS ; JMP 206
        let program = [0x60, 0x03, 0xF0, 0x15, 0x00, 0xE0, 0x12, 0x06];
        let i = interpreter(&program)?;
        let reset = Controls {
            reset: true,
            ..Controls::default()
        };
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0, 0]).with_controls(&[steps(0), reset]);
        let mut env = Environment::new(i, &mut display, &mut input, 2, 0);
        env.frame()?;
        assert_eq!(env.interpreter().register(0), 3);
        assert_eq!(env.interpreter().delay_timer(), 2);
        env.set_paused(true);
        env.frame()?;
        let i = env.interpreter();
        assert_eq!(i.register(0), 0);
        assert_eq!(i.delay_timer(), 0);
        assert_eq!(i.program_counter(), 0x200);
        assert_eq!(&i.memory()[0x200..0x208], &program[..]);
        assert_eq!(i.memory()[0x000], 0xF0);
        // reset doesn't change whether the clock runs
        assert!(env.is_paused());
        Ok(())
    }

    #[test]
    fn test_reset_direct() -> Result<()> {
        let i = interpreter(&[0x60, 0x07, 0x12, 0x02])?;
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0]);
        let mut env = Environment::new(i, &mut display, &mut input, 3, 0);
        env.frame()?;
        assert_eq!(env.interpreter().register(0), 7);
        env.reset()?;
        assert_eq!(env.interpreter().register(0), 0);
        assert_eq!(env.interpreter().memory()[0x200], 0x60);
        Ok(())
    }
}
